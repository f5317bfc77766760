//! State context initialization and task management utilities.

use roster_business::{
    AdminTableState, BlockUsersCommand, BulkActionCompute, BulkActionInput, BusinessConfig,
    DeleteUsersCommand, DirectoryCompute, PendingSessionToken, RefreshDirectoryCommand,
    SessionCompute, SignInCommand, SignInInput, SignOutCommand, UnblockUsersCommand,
    ValidateSessionCommand,
};
use roster_states::StateCtx;
use tracing::instrument;

/// Initialize `StateCtx` with every state, compute, and command the
/// console uses.
pub fn build_state_ctx(config: BusinessConfig) -> StateCtx {
    let mut ctx = StateCtx::new();

    // Connection settings
    ctx.add_state(config);

    // Session gateway states and compute
    ctx.add_state(SignInInput::default());
    ctx.add_state(PendingSessionToken::default());
    ctx.record_compute(SessionCompute::default());

    // Directory and table view
    ctx.record_compute(DirectoryCompute::default());
    ctx.add_state(AdminTableState::default());

    // Bulk actions
    ctx.add_state(BulkActionInput::default());
    ctx.record_compute(BulkActionCompute::default());

    // Commands
    ctx.record_command(SignInCommand);
    ctx.record_command(ValidateSessionCommand);
    ctx.record_command(SignOutCommand);
    ctx.record_command(RefreshDirectoryCommand);
    ctx.record_command(BlockUsersCommand);
    ctx.record_command(UnblockUsersCommand);
    ctx.record_command(DeleteUsersCommand);

    ctx
}

/// Await all pending tasks in the `JoinSet` and sync computes.
#[instrument(skip_all, name = "await_tasks")]
pub async fn await_pending_tasks(ctx: &mut StateCtx) {
    while ctx.task_count() > 0 {
        if ctx.task_set_mut().join_next().await.is_some() {
            ctx.sync_computes();
        }
    }
}

/// Flush commands and await all spawned tasks.
#[instrument(skip_all, name = "flush")]
pub async fn flush_and_await(ctx: &mut StateCtx) {
    ctx.sync_computes();
    ctx.flush_commands();
    await_pending_tasks(ctx).await;
    ctx.sync_computes();
}
