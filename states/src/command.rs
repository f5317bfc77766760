use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::{CommandSnapshot, LatestOnlyUpdater};

/// A manual-only unit of work, dispatched explicitly via
/// `StateCtx::enqueue_command` + `flush_commands`.
///
/// Commands are where side effects (network IO) live. They read their
/// inputs from the snapshot, publish progress and results through the
/// updater, and respect the cancellation token at their await points if
/// they have long-running work to interrupt.
pub trait Command: Any + Send {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}
