use emitter::EmitIntermediate;
use errors::*;
use intermediate::IntermediateInputKV;

/// The `Reduce` trait defines a function for performing a reduce operation.
///
/// The output types are decided by the implementation of this trait. Unlike a combiner, a reducer
/// chooses the key of each pair it emits.
///
/// # Arguments
///
/// * `input` - A `IntermediateInputKV` containing the input data for the reduce operation.
/// * `emitter` - A struct implementing the `EmitIntermediate` trait, provided by the reduce
///               runner.
///
/// # Outputs
///
/// An empty result used for returning an error. Outputs of the reduce operation are sent out
/// through the `emitter`.
pub trait Reduce<K, V> {
    type OutputKey;
    type Output;
    fn reduce<E>(&self, input: IntermediateInputKV<K, V>, emitter: E) -> Result<()>
    where
        E: EmitIntermediate<Self::OutputKey, Self::Output>;
}
