/// `IntermediateOutputPair` is a struct representing an intermediate key-value pair as outputted
/// from a map task, after the optional combine step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntermediateOutputPair<K, V> {
    pub key: K,
    pub value: V,
}

/// `IntermediateOutputObject` is a struct comprising a collection of `IntermediateOutputPair`s,
/// representing the entire output of a map task, ready to be serialised to JSON and read back by
/// the reduce task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntermediateOutputObject<K, V> {
    pub pairs: Vec<IntermediateOutputPair<K, V>>,
}

impl<K, V> Default for IntermediateOutputObject<K, V> {
    fn default() -> Self {
        IntermediateOutputObject { pairs: Vec::new() }
    }
}

impl<K, V> IntermediateOutputObject<K, V> {
    pub fn push(&mut self, key: K, value: V) {
        self.pairs.push(IntermediateOutputPair { key, value });
    }

    /// Consumes the object, returning its pairs as tuples.
    pub fn into_pairs(self) -> Vec<(K, V)> {
        self.pairs
            .into_iter()
            .map(|pair| (pair.key, pair.value))
            .collect()
    }
}
