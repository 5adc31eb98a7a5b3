use std::sync::Arc;

use combiner::Combine;
use emitter::EmitFinal;
use errors::*;
use intermediate::IntermediateInputKV;
use mapper::Map;
use reducer::Reduce;

/// `UserImplRegistry` tracks the user's implementations of Map, Reduce, etc.
///
/// The user should use the `UserImplRegistryBuilder` to create this and then pass it in to
/// `run_job`. Implementations are held behind `Arc`s so that map tasks running on other threads
/// can share them, and so that one value can be registered as both combiner and reducer.
pub struct UserImplRegistry<M, R, C>
where
    M: Map,
    R: Reduce<M::Key, M::Value>,
    C: Combine<M::Key, M::Value>,
{
    pub mapper: Arc<M>,
    pub reducer: Arc<R>,
    pub combiner: Option<Arc<C>>,
}

impl<M, R, C> Clone for UserImplRegistry<M, R, C>
where
    M: Map,
    R: Reduce<M::Key, M::Value>,
    C: Combine<M::Key, M::Value>,
{
    fn clone(&self) -> Self {
        UserImplRegistry {
            mapper: Arc::clone(&self.mapper),
            reducer: Arc::clone(&self.reducer),
            combiner: self.combiner.as_ref().map(Arc::clone),
        }
    }
}

/// `UserImplRegistryBuilder` is used to create a `UserImplRegistry`.
pub struct UserImplRegistryBuilder<M, R, C>
where
    M: Map,
    R: Reduce<M::Key, M::Value>,
    C: Combine<M::Key, M::Value>,
{
    mapper: Option<Arc<M>>,
    reducer: Option<Arc<R>>,
    combiner: Option<Arc<C>>,
}

impl<M, R, C> Default for UserImplRegistryBuilder<M, R, C>
where
    M: Map,
    R: Reduce<M::Key, M::Value>,
    C: Combine<M::Key, M::Value>,
{
    fn default() -> UserImplRegistryBuilder<M, R, C> {
        UserImplRegistryBuilder {
            mapper: None,
            reducer: None,
            combiner: None,
        }
    }
}

impl<M, R, C> UserImplRegistryBuilder<M, R, C>
where
    M: Map,
    R: Reduce<M::Key, M::Value>,
    C: Combine<M::Key, M::Value>,
{
    pub fn new() -> UserImplRegistryBuilder<M, R, C> {
        Default::default()
    }

    pub fn mapper(&mut self, mapper: Arc<M>) -> &mut UserImplRegistryBuilder<M, R, C> {
        self.mapper = Some(mapper);
        self
    }

    pub fn reducer(&mut self, reducer: Arc<R>) -> &mut UserImplRegistryBuilder<M, R, C> {
        self.reducer = Some(reducer);
        self
    }

    pub fn combiner(&mut self, combiner: Arc<C>) -> &mut UserImplRegistryBuilder<M, R, C> {
        self.combiner = Some(combiner);
        self
    }

    pub fn build(&self) -> Result<UserImplRegistry<M, R, C>> {
        let mapper = self.mapper
            .clone()
            .chain_err(|| "Error building UserImplRegistry: No Mapper provided")?;
        let reducer = self.reducer
            .clone()
            .chain_err(|| "Error building UserImplRegistry: No Reducer provided")?;

        Ok(UserImplRegistry {
            mapper,
            reducer,
            combiner: self.combiner.clone(),
        })
    }
}

/// A null implementation for `Combine` as this is optional component.
/// This should not be used by user code.
pub struct NullCombiner;
impl<K, V> Combine<K, V> for NullCombiner {
    fn combine<E>(&self, _input: IntermediateInputKV<K, V>, _emitter: E) -> Result<()>
    where
        E: EmitFinal<V>,
    {
        Err("This code should never run".into())
    }
}

/// Construct a `UserImplRegistryBuilder` that does not need a `Combine` implementation
impl<M, R> UserImplRegistryBuilder<M, R, NullCombiner>
where
    M: Map,
    R: Reduce<M::Key, M::Value>,
{
    pub fn new_no_combiner() -> UserImplRegistryBuilder<M, R, NullCombiner> {
        Default::default()
    }
}
