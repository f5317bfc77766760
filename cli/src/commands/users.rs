//! The users table: plain listing and the interactive selection loop.
//!
//! The interactive loop is the table view state machine from the business
//! crate driven end to end: toggle rows, toggle select-all, run a bulk
//! action, re-fetch after every success, and run the exit transition when
//! the acting user removed or blocked themselves.

use anyhow::{Context as _, Result};
use inquire::{Confirm, Select};
use roster_business::{
    AdminTableState, BulkActionKind, DirectoryCompute, DirectoryResult, RefreshDirectoryCommand,
};
use roster_states::StateCtx;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{error, instrument};
use ustr::Ustr;

use crate::auth::ensure_authenticated;
use crate::commands::actions::{dispatch_bulk_action, exit_transition, success_message};
use crate::context::flush_and_await;
use crate::output::{Output, status_chip};

#[derive(Tabled)]
struct UserRowDisplay {
    #[tabled(rename = "")]
    mark: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Last Login")]
    last_login: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[instrument(skip_all, name = "users", fields(interactive = interactive))]
pub async fn run_users(mut ctx: StateCtx, interactive: bool) -> Result<()> {
    let out = Output::new();

    let acting_user_id = ensure_authenticated(&mut ctx).await?;

    refresh_table(&mut ctx, &out).await;

    if interactive {
        run_interactive(&mut ctx, &out, acting_user_id).await?;
    } else {
        render_table(&out, &ctx);
    }

    ctx.shutdown().await;
    Ok(())
}

/// Re-read the directory and replace the table rows.
///
/// A failed read degrades to an empty table; the error goes to the log
/// only and the view shows its "no users" messaging.
pub(crate) async fn refresh_table(ctx: &mut StateCtx, out: &Output) {
    out.dim("Loading users...");
    ctx.update::<AdminTableState>(AdminTableState::begin_loading);
    ctx.enqueue_command::<RefreshDirectoryCommand>();
    flush_and_await(ctx).await;

    let rows = match &ctx.compute::<DirectoryCompute>().result {
        DirectoryResult::Loaded(rows) => rows.clone(),
        DirectoryResult::Error(message) => {
            error!("Error fetching users: {message}");
            Vec::new()
        }
        DirectoryResult::Idle | DirectoryResult::Loading => Vec::new(),
    };
    ctx.update::<AdminTableState>(|table| table.loaded(rows));
}

pub(crate) fn render_table(out: &Output, ctx: &StateCtx) {
    let table_state = ctx.state::<AdminTableState>();

    if table_state.rows().is_empty() {
        out.dim("No users found.");
        out.dim("Invite new users or check back later.");
        return;
    }

    if !table_state.selection().is_empty() {
        out.print(format!("{} selected", table_state.selection().len()));
    }

    let display: Vec<UserRowDisplay> = table_state
        .rows()
        .iter()
        .map(|row| UserRowDisplay {
            mark: if table_state.is_selected(row.id) {
                "[x]".to_owned()
            } else {
                "[ ]".to_owned()
            },
            id: row.id.as_str().to_owned(),
            name: row.name.clone().unwrap_or_else(|| "—".to_owned()),
            email: row.email.clone(),
            last_login: row
                .last_login
                .map(|t| {
                    t.with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                })
                .unwrap_or_else(|| "—".to_owned()),
            status: status_chip(row.status),
        })
        .collect();

    let mut table = Table::new(display);
    table.with(Style::rounded());
    out.print(table);
}

const TOGGLE_ROW: &str = "Toggle row selection";
const TOGGLE_ALL: &str = "Toggle select all";
const BLOCK_SELECTED: &str = "Block selected";
const UNBLOCK_SELECTED: &str = "Unblock selected";
const DELETE_SELECTED: &str = "Delete selected";
const REFRESH: &str = "Refresh";
const QUIT: &str = "Quit";

async fn run_interactive(
    ctx: &mut StateCtx,
    out: &Output,
    acting_user_id: Ustr,
) -> Result<()> {
    loop {
        out.newline();
        render_table(out, ctx);

        let choice = Select::new(
            "Action:",
            vec![
                TOGGLE_ROW,
                TOGGLE_ALL,
                BLOCK_SELECTED,
                UNBLOCK_SELECTED,
                DELETE_SELECTED,
                REFRESH,
                QUIT,
            ],
        )
        .prompt()
        .context("Failed to read action")?;

        match choice {
            TOGGLE_ROW => toggle_one_row(ctx, out)?,
            TOGGLE_ALL => ctx.update::<AdminTableState>(AdminTableState::toggle_select_all),
            BLOCK_SELECTED | UNBLOCK_SELECTED | DELETE_SELECTED => {
                let kind = match choice {
                    BLOCK_SELECTED => BulkActionKind::Block,
                    UNBLOCK_SELECTED => BulkActionKind::Unblock,
                    _ => BulkActionKind::Delete,
                };
                if run_selected_action(ctx, out, kind, acting_user_id).await? {
                    // Acting user was in the set: the session is gone,
                    // leave the page.
                    return Ok(());
                }
            }
            REFRESH => refresh_table(ctx, out).await,
            QUIT => break,
            _ => {}
        }
    }

    Ok(())
}

fn toggle_one_row(ctx: &mut StateCtx, out: &Output) -> Result<()> {
    let rows: Vec<(Ustr, String)> = ctx
        .state::<AdminTableState>()
        .rows()
        .iter()
        .map(|row| (row.id, format!("{} ({})", row.email, row.status)))
        .collect();

    if rows.is_empty() {
        out.dim("No users found.");
        return Ok(());
    }

    let labels: Vec<String> = rows.iter().map(|(_, label)| label.clone()).collect();
    let picked = Select::new("User:", labels)
        .raw_prompt()
        .context("Failed to read user")?;

    let id = rows[picked.index].0;
    ctx.update::<AdminTableState>(|table| table.toggle_row(id));
    Ok(())
}

/// Run one bulk action over the current selection. Returns true when the
/// exit transition ran (acting user included in the set).
async fn run_selected_action(
    ctx: &mut StateCtx,
    out: &Output,
    kind: BulkActionKind,
    acting_user_id: Ustr,
) -> Result<bool> {
    let selection = ctx.state::<AdminTableState>().selected_ids();
    if selection.is_empty() {
        out.warning("No users selected.");
        return Ok(false);
    }

    if kind == BulkActionKind::Delete {
        let confirmed = Confirm::new(&format!(
            "Delete {} users? Data rows and identity records are removed.",
            selection.len()
        ))
        .with_default(false)
        .prompt()
        .context("Failed to read confirmation")?;
        if !confirmed {
            return Ok(false);
        }
    }

    match dispatch_bulk_action(ctx, kind, selection, Some(acting_user_id)).await {
        Ok(sign_out_acting) => {
            out.success(success_message(kind));
            ctx.update::<AdminTableState>(AdminTableState::clear_selection);
            refresh_table(ctx, out).await;
            if sign_out_acting {
                exit_transition(ctx, out).await?;
                return Ok(true);
            }
            Ok(false)
        }
        Err(message) => {
            out.error(format!("Failed to {kind} users: {message}"));
            Ok(false)
        }
    }
}
