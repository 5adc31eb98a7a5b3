use combiner::Combine;
use counters::{JobCounters, TaskCounters};
use emitter::{FinalVecEmitter, IntermediateVecEmitter};
use errors::*;
use intermediate::group_by_key;
use mapper::{InputRecord, Map};
use reducer::Reduce;
use serialise::IntermediateOutputObject;

/// `MapTaskOutput` is everything a map task hands on to the reduce task.
#[derive(Debug)]
pub struct MapTaskOutput<K, V> {
    pub output: IntermediateOutputObject<K, V>,
    pub counters: TaskCounters,
}

/// `run_map_task` maps every record of one split and, when a combiner is given, combines the
/// map output of the split key by key.
///
/// A record for which the mapper emits nothing is counted as skipped. A failing record read or a
/// failing map or combine operation fails the whole task.
pub fn run_map_task<M, C, I>(
    mapper: &M,
    combiner: Option<&C>,
    records: I,
) -> Result<MapTaskOutput<M::Key, M::Value>>
where
    M: Map,
    M::Key: Ord + Clone,
    C: Combine<M::Key, M::Value>,
    I: IntoIterator<Item = Result<InputRecord>>,
{
    let mut counters = TaskCounters::default();
    let mut pairs: Vec<(M::Key, M::Value)> = Vec::new();

    for record in records {
        let record = record.chain_err(|| "Error reading map input record.")?;
        let emitted_before = pairs.len();

        mapper
            .map(record, IntermediateVecEmitter::new(&mut pairs))
            .chain_err(|| "Error running map operation.")?;

        counters.map_input_records += 1;
        if pairs.len() == emitted_before {
            counters.skipped_records += 1;
        }
    }
    counters.map_output_records = pairs.len() as u64;

    let mut output = IntermediateOutputObject::default();
    match combiner {
        Some(combiner) => {
            for group in group_by_key(Vec::new(), pairs) {
                let key = group.key.clone();
                counters.combine_input_records += group.values.len() as u64;

                let mut combined = Vec::new();
                combiner
                    .combine(group, FinalVecEmitter::new(&mut combined))
                    .chain_err(|| "Error running combine operation.")?;

                counters.combine_output_records += combined.len() as u64;
                for value in combined {
                    output.push(key.clone(), value);
                }
            }
        }
        None => {
            for (key, value) in pairs {
                output.push(key, value);
            }
        }
    }

    Ok(MapTaskOutput { output, counters })
}

/// `run_reduce_task` groups the output of every map task by key and reduces each group.
///
/// Groups are seeded with `seed_keys`, so each of those keys is reduced even when no map task
/// produced a value for it.
pub fn run_reduce_task<R, K, V>(
    reducer: &R,
    seed_keys: Vec<K>,
    pairs: Vec<(K, V)>,
    counters: &mut JobCounters,
) -> Result<Vec<(R::OutputKey, R::Output)>>
where
    R: Reduce<K, V>,
    K: Ord,
{
    counters.reduce_input_records += pairs.len() as u64;

    let mut results = Vec::new();
    for group in group_by_key(seed_keys, pairs) {
        counters.reduce_input_groups += 1;
        reducer
            .reduce(group, IntermediateVecEmitter::new(&mut results))
            .chain_err(|| "Error running reduce operation.")?;
    }
    counters.reduce_output_records = results.len() as u64;

    Ok(results)
}
