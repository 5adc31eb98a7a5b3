use std::collections::BTreeMap;

/// The `IntermediateInputKV` is a struct for passing input data to a `Reduce` or `Combine`.
///
/// `IntermediateInputKV` is a thin wrapper around a `(Key, Vec<Value>)`,
/// used for creating a clearer API.
/// It can be constructed normally or using `IntermediateInputKV::new()`.
#[derive(Debug, Default, PartialEq)]
pub struct IntermediateInputKV<K, V> {
    pub key: K,
    pub values: Vec<V>,
}

impl<K, V> IntermediateInputKV<K, V> {
    pub fn new(key: K, values: Vec<V>) -> Self {
        IntermediateInputKV { key, values }
    }
}

/// `group_by_key` collects key-value pairs into one `IntermediateInputKV` per distinct key.
///
/// Every key in `seed_keys` gets a group even if no pair carries it. Values keep the order in
/// which they were given and groups are returned in ascending key order.
pub fn group_by_key<K, V, S, I>(seed_keys: S, pairs: I) -> Vec<IntermediateInputKV<K, V>>
where
    K: Ord,
    S: IntoIterator<Item = K>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut groups: BTreeMap<K, Vec<V>> = BTreeMap::new();

    for key in seed_keys {
        groups.entry(key).or_insert_with(Vec::new);
    }

    for (key, value) in pairs {
        groups.entry(key).or_insert_with(Vec::new).push(value);
    }

    groups
        .into_iter()
        .map(|(key, values)| IntermediateInputKV::new(key, values))
        .collect()
}
