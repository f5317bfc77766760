//! One-shot bulk action commands: `roster block|unblock|delete <id>…`.

use anyhow::Result;
use inquire::Confirm;
use roster_business::{
    BlockUsersCommand, BulkActionCompute, BulkActionInput, BulkActionKind, BulkActionState,
    DeleteUsersCommand, SignOutCommand, UnblockUsersCommand,
};
use roster_states::StateCtx;
use tracing::instrument;
use ustr::Ustr;

use crate::auth::{clear_saved_session, ensure_authenticated};
use crate::commands::users::{refresh_table, render_table};
use crate::context::flush_and_await;
use crate::output::Output;

pub(crate) fn success_message(kind: BulkActionKind) -> &'static str {
    match kind {
        BulkActionKind::Block => "Users blocked!",
        BulkActionKind::Unblock => "Users unblocked!",
        BulkActionKind::Delete => "Users deleted!",
    }
}

#[instrument(skip_all, name = "bulk", fields(kind = %kind))]
pub async fn run_bulk(
    mut ctx: StateCtx,
    kind: BulkActionKind,
    ids: Vec<String>,
    assume_yes: bool,
) -> Result<()> {
    let out = Output::new();

    let acting_user_id = ensure_authenticated(&mut ctx).await?;
    let ids: Vec<Ustr> = ids.iter().map(|id| Ustr::from(id.as_str())).collect();

    if kind == BulkActionKind::Delete && !assume_yes {
        let confirmed = Confirm::new(&format!(
            "Delete {} users? Data rows and identity records are removed.",
            ids.len()
        ))
        .with_default(false)
        .prompt()?;
        if !confirmed {
            out.dim("Aborted.");
            ctx.shutdown().await;
            return Ok(());
        }
    }

    match dispatch_bulk_action(&mut ctx, kind, ids, Some(acting_user_id)).await {
        Ok(sign_out_acting) => {
            out.success(success_message(kind));
            refresh_table(&mut ctx, &out).await;
            render_table(&out, &ctx);
            if sign_out_acting {
                exit_transition(&mut ctx, &out).await?;
            }
            ctx.shutdown().await;
            Ok(())
        }
        Err(message) => {
            out.error(format!("Failed to {kind} users: {message}"));
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }
}

/// Hand the selection to the controller and wait for the outcome.
///
/// Returns whether the acting session must end; failures come back as the
/// user-facing message.
pub async fn dispatch_bulk_action(
    ctx: &mut StateCtx,
    kind: BulkActionKind,
    ids: Vec<Ustr>,
    acting_user_id: Option<Ustr>,
) -> Result<bool, String> {
    ctx.update::<BulkActionInput>(|input| {
        input.ids = ids;
        input.acting_user_id = acting_user_id;
    });

    match kind {
        BulkActionKind::Block => ctx.enqueue_command::<BlockUsersCommand>(),
        BulkActionKind::Unblock => ctx.enqueue_command::<UnblockUsersCommand>(),
        BulkActionKind::Delete => ctx.enqueue_command::<DeleteUsersCommand>(),
    }
    flush_and_await(ctx).await;

    match ctx.compute::<BulkActionCompute>().state() {
        BulkActionState::Success {
            sign_out_acting, ..
        } => Ok(*sign_out_acting),
        BulkActionState::Error { message, .. } => Err(message.clone()),
        BulkActionState::Idle | BulkActionState::InFlight { .. } => {
            Err("action did not complete".to_owned())
        }
    }
}

/// The view's exit transition: the acting user operated on their own
/// account, so the session is invalidated and credentials are dropped.
pub(crate) async fn exit_transition(ctx: &mut StateCtx, out: &Output) -> Result<()> {
    out.warning("Your account was included in this action; signing out.");

    ctx.enqueue_command::<SignOutCommand>();
    flush_and_await(ctx).await;
    clear_saved_session()?;

    out.info("Signed out. Run `roster login` to sign in again.");
    Ok(())
}
