use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;

use crate::{Compute, State};

/// Cloned states captured at command-flush time.
#[derive(Default)]
pub struct StateSnapshot {
    inner: BTreeMap<TypeId, Box<dyn Any + Send>>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    pub fn insert_cloned(&mut self, id: TypeId, value: Box<dyn Any + Send>) {
        self.inner.insert(id, value);
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.inner
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }
}

/// Cloned computes captured at command-flush time.
#[derive(Default)]
pub struct ComputeSnapshot {
    inner: BTreeMap<TypeId, Box<dyn Any + Send>>,
}

impl ComputeSnapshot {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    pub fn insert_cloned(&mut self, id: TypeId, value: Box<dyn Any + Send>) {
        self.inner.insert(id, value);
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.inner
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }
}

/// Everything a command is allowed to read: cloned states and computes.
///
/// Commands own their snapshot; there is no shared mutable access back into
/// the [`crate::StateCtx`]. Results flow out through the updater only.
#[derive(Default)]
pub struct CommandSnapshot {
    states: StateSnapshot,
    computes: ComputeSnapshot,
}

impl CommandSnapshot {
    pub fn new(states: StateSnapshot, computes: ComputeSnapshot) -> Self {
        Self { states, computes }
    }

    /// Read a state captured in this snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the state was not captured — either it is not registered,
    /// or its `State::snapshot` implementation was not overridden.
    pub fn state<T: State>(&self) -> &T {
        self.states.get::<T>().unwrap_or_else(|| {
            panic!(
                "state snapshot for {} is missing (is snapshot() overridden?)",
                type_name::<T>()
            )
        })
    }

    /// Read a compute captured in this snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the compute was not captured.
    pub fn compute<T: Compute>(&self) -> &T {
        self.computes.get::<T>().unwrap_or_else(|| {
            panic!(
                "compute snapshot for {} is missing (is snapshot() overridden?)",
                type_name::<T>()
            )
        })
    }
}
