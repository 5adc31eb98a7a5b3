#![recursion_limit = "1024"]

extern crate chrono;
#[macro_use]
extern crate error_chain;
extern crate futures;
extern crate futures_cpupool;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
extern crate uuid;

pub mod errors {
    error_chain!{}
}

pub mod combiner;
pub mod counters;
pub mod emitter;
pub mod intermediate;
pub mod io;
pub mod job;
pub mod mapper;
pub mod numbers;
pub mod output;
pub mod pipeline;
pub mod reducer;
pub mod registry;
pub mod serialise;
pub mod splitter;

pub use combiner::Combine;
pub use counters::{JobCounters, TaskCounters};
pub use emitter::{EmitFinal, EmitIntermediate, FinalVecEmitter, IntermediateVecEmitter};
pub use errors::*;
pub use intermediate::{group_by_key, IntermediateInputKV};
pub use job::{run_job, JobConfig, JobReport};
pub use mapper::{InputRecord, Map};
pub use numbers::{parse_record, sum, NumberMapper, SumAggregator, MAP_KEY, REDUCE_KEY};
pub use reducer::Reduce;
pub use registry::{NullCombiner, UserImplRegistry, UserImplRegistryBuilder};
