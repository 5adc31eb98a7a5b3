use emitter::EmitFinal;
use errors::*;
use intermediate::IntermediateInputKV;

/// The `Combine` trait defines a function for performing a combine operation.
///
/// A combine operation runs inside a single map task, over the values that task produced for one
/// key. The key itself is kept by the map task, so only values are emitted. Running a combiner
/// must give the same final result as not running it.
///
/// # Arguments
///
/// * `input`   - A `IntermediateInputKV` containing the input data for the combine operation.
/// * `emitter` - A struct implementing the `EmitFinal` trait,
///               provided by the combine runner.
///
/// # Outputs
///
/// An empty result used for returning an error. Outputs of the combine operation are sent out
/// through the `emitter`.
pub trait Combine<K, V> {
    fn combine<E>(&self, input: IntermediateInputKV<K, V>, emitter: E) -> Result<()>
    where
        E: EmitFinal<V>;
}
