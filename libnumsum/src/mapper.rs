use serde::Serialize;

use emitter::EmitIntermediate;
use errors::*;

/// The `InputRecord` is a struct for passing input data to a `Map`.
///
/// It holds one line of an input file, without its line terminator, and the byte offset of the
/// start of that line within the file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputRecord {
    pub offset: u64,
    pub line: String,
}

impl InputRecord {
    pub fn new<S: Into<String>>(offset: u64, line: S) -> Self {
        InputRecord {
            offset,
            line: line.into(),
        }
    }
}

/// The `Map` trait defines a function for performing a map operation.
///
/// The output types are decided by the implementation of this trait.
///
/// # Arguments
///
/// * `input` - An `InputRecord` containing the input data for the map operation.
/// * `emitter` - A struct implementing the `EmitIntermediate` trait, provided by the map runner.
///
/// # Outputs
///
/// An empty result used for returning an error. Outputs of the map operation are sent out through
/// the `emitter`.
pub trait Map {
    type Key: Serialize;
    type Value: Serialize;
    fn map<E>(&self, input: InputRecord, emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::Key, Self::Value>;

    /// Keys which are always handed to the reducer, as an empty group when no record emitted
    /// them.
    fn output_keys(&self) -> Vec<Self::Key> {
        Vec::new()
    }
}
