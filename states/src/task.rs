//! Task identity and cooperative cancellation for spawned commands.

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

/// Unique identifier for a spawned command task.
///
/// Combines the command's `TypeId` with a generation counter, so multiple
/// dispatches of the same command type stay distinguishable and the newest
/// one can supersede the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self {
            type_id,
            generation,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Higher generations are more recently spawned tasks.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle to a spawned command task.
///
/// Cancellation is cooperative: `cancel` signals the token, and the task
/// stops at its next check point. Nothing is forcibly aborted here.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}
