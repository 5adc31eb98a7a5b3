use errors::*;

/// The `EmitIntermediate` trait specifies structs which can send key-value pairs to an in-memory
/// data structure.
///
/// It is used by map operations and by reduce operations, which both decide the key of what
/// they emit.
pub trait EmitIntermediate<K, V> {
    /// Takes ownership of a key-value pair and moves it somewhere else.
    ///
    /// Returns an empty `Result` used for error handling.
    fn emit(&mut self, key: K, value: V) -> Result<()>;
}

/// The `EmitFinal` trait specifies structs which can send values to an in-memory data structure.
///
/// It is used by combine operations, where the key of the group is kept by the caller.
pub trait EmitFinal<V> {
    /// Takes ownership of a value and moves it somewhere else.
    ///
    /// Returns an empty `Result` used for error handling.
    fn emit(&mut self, value: V) -> Result<()>;
}

/// A struct implementing `EmitIntermediate` which emits to a `std::vec::Vec`.
pub struct IntermediateVecEmitter<'a, K: 'a, V: 'a> {
    sink: &'a mut Vec<(K, V)>,
}

impl<'a, K, V> IntermediateVecEmitter<'a, K, V> {
    /// Constructs a new `IntermediateVecEmitter` with a mutable reference to a given `Vec`.
    ///
    /// # Arguments
    ///
    /// * `sink` - A mutable reference to the `Vec` to receive the emitted pairs.
    pub fn new(sink: &'a mut Vec<(K, V)>) -> Self {
        IntermediateVecEmitter { sink }
    }
}

impl<'a, K, V> EmitIntermediate<K, V> for IntermediateVecEmitter<'a, K, V> {
    fn emit(&mut self, key: K, value: V) -> Result<()> {
        self.sink.push((key, value));
        Ok(())
    }
}

/// A struct implementing `EmitFinal` which emits to a `std::vec::Vec`.
pub struct FinalVecEmitter<'a, V: 'a> {
    sink: &'a mut Vec<V>,
}

impl<'a, V> FinalVecEmitter<'a, V> {
    /// Constructs a new `FinalVecEmitter` with a mutable reference to a given `Vec`.
    ///
    /// # Arguments
    ///
    /// * `sink` - A mutable reference to the `Vec` to receive the emitted values.
    pub fn new(sink: &'a mut Vec<V>) -> Self {
        FinalVecEmitter { sink }
    }
}

impl<'a, V> EmitFinal<V> for FinalVecEmitter<'a, V> {
    fn emit(&mut self, value: V) -> Result<()> {
        self.sink.push(value);
        Ok(())
    }
}
