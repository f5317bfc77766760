use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) struct UpdateMsg {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub value: Box<dyn Any + Send>,
}

/// Publishes replacement values for registered states and computes.
///
/// `set` sends the value over the context's channel; nothing is applied
/// until [`crate::StateCtx::sync_computes`] drains it on the owning side.
#[derive(Clone)]
pub struct Updater {
    tx: flume::Sender<UpdateMsg>,
}

impl Updater {
    pub(crate) fn new(tx: flume::Sender<UpdateMsg>) -> Self {
        Self { tx }
    }

    pub fn set<T: Send + 'static>(&self, value: T) {
        let msg = UpdateMsg {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: Box::new(value),
        };
        if self.tx.send(msg).is_err() {
            log::warn!("update dropped for {}: state context is gone", type_name::<T>());
        }
    }
}

/// An [`Updater`] bound to one spawned command task.
///
/// Each flush of a command type bumps a shared generation counter; a task
/// whose generation has been superseded publishes nothing. This keeps a
/// re-dispatched command's stale results from overwriting fresher ones. It
/// is a delivery-ordering guard, not mutual exclusion between different
/// command types.
#[derive(Clone)]
pub struct LatestOnlyUpdater {
    inner: Updater,
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl LatestOnlyUpdater {
    pub(crate) fn new(inner: Updater, generation: u64, latest: Arc<AtomicU64>) -> Self {
        Self {
            inner,
            generation,
            latest,
        }
    }

    pub fn set<T: Send + 'static>(&self, value: T) {
        if self.latest.load(Ordering::Acquire) != self.generation {
            log::debug!("stale command update dropped for {}", type_name::<T>());
            return;
        }
        self.inner.set(value);
    }
}
