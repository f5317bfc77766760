//! Bulk action controller: block, unblock, and delete over a set of ids.
//!
//! Semantics carried from the original flow:
//! - block/unblock are one filtered status write for the whole set
//! - delete is one filtered row delete, then identity deletions issued
//!   sequentially, aborting on the first failure; the window where rows
//!   are gone but identities remain is the accepted baseline contract
//! - `sign_out_acting` reports whether the acting user operated on their
//!   own account, so the view can run its exit transition
//!
//! The acting user id is explicit input; the controller never reads the
//! session compute ambiently.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use log::{error, info};
use roster_states::{
    Command, CommandSnapshot, Compute, LatestOnlyUpdater, State, assign_impl, state_assign_impl,
};
use ustr::Ustr;

use crate::BusinessConfig;
use crate::directory::UserStatus;
use crate::service_api;

/// Strongly-typed action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkActionKind {
    Block,
    Unblock,
    Delete,
}

impl BulkActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for BulkActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strongly-typed action state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BulkActionState {
    /// No active action.
    #[default]
    Idle,

    /// An action is currently running.
    InFlight { kind: BulkActionKind },

    /// An action succeeded. `sign_out_acting` is true when the acting
    /// user's own id was in the set (block and delete only).
    Success {
        kind: BulkActionKind,
        sign_out_acting: bool,
    },

    /// An action failed with a user-facing message.
    Error {
        kind: BulkActionKind,
        message: String,
    },
}

/// Compute-shaped cache for the latest bulk action outcome.
#[derive(Debug, Clone, Default)]
pub struct BulkActionCompute {
    pub state: BulkActionState,
}

impl BulkActionCompute {
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, BulkActionState::InFlight { .. })
    }

    pub fn state(&self) -> &BulkActionState {
        &self.state
    }
}

impl Compute for BulkActionCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Input state for bulk actions.
///
/// The view sets the selected ids and the acting user id before
/// dispatching one of the commands below.
#[derive(Debug, Clone, Default)]
pub struct BulkActionInput {
    /// Target user ids. Must be non-empty.
    pub ids: Vec<Ustr>,

    /// The authenticated session performing the action, when known.
    pub acting_user_id: Option<Ustr>,
}

impl BulkActionInput {
    /// True when the acting user is operating on their own account.
    pub fn sign_out_acting(&self) -> bool {
        self.acting_user_id
            .is_some_and(|acting| self.ids.contains(&acting))
    }
}

impl State for BulkActionInput {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

fn empty_selection_error(kind: BulkActionKind) -> BulkActionCompute {
    BulkActionCompute {
        state: BulkActionState::Error {
            kind,
            message: "no users selected".to_owned(),
        },
    }
}

async fn run_status_write(
    kind: BulkActionKind,
    status: UserStatus,
    input: BulkActionInput,
    config: BusinessConfig,
    updater: LatestOnlyUpdater,
) {
    if input.ids.is_empty() {
        updater.set(empty_selection_error(kind));
        return;
    }

    updater.set(BulkActionCompute {
        state: BulkActionState::InFlight { kind },
    });

    match service_api::update_status(&config, &input.ids, status).await {
        Ok(()) => {
            info!("{kind}: updated {} users", input.ids.len());
            updater.set(BulkActionCompute {
                state: BulkActionState::Success {
                    kind,
                    // Unblocking yourself keeps your session; only block
                    // and delete can end it.
                    sign_out_acting: kind != BulkActionKind::Unblock && input.sign_out_acting(),
                },
            });
        }
        Err(err) => {
            error!("{kind}: {err}");
            updater.set(BulkActionCompute {
                state: BulkActionState::Error {
                    kind,
                    message: err.to_string(),
                },
            });
        }
    }
}

/// Sets `status = blocked` for every selected id in one request.
#[derive(Default, Debug)]
pub struct BlockUsersCommand;

impl Command for BlockUsersCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let input: BulkActionInput = snap.state::<BulkActionInput>().clone();
        let config: BusinessConfig = snap.state::<BusinessConfig>().clone();

        Box::pin(run_status_write(
            BulkActionKind::Block,
            UserStatus::Blocked,
            input,
            config,
            updater,
        ))
    }
}

/// Sets `status = active` for every selected id in one request.
#[derive(Default, Debug)]
pub struct UnblockUsersCommand;

impl Command for UnblockUsersCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let input: BulkActionInput = snap.state::<BulkActionInput>().clone();
        let config: BusinessConfig = snap.state::<BusinessConfig>().clone();

        Box::pin(run_status_write(
            BulkActionKind::Unblock,
            UserStatus::Active,
            input,
            config,
            updater,
        ))
    }
}

/// Deletes the data rows for every selected id in one request, then the
/// corresponding identity records one at a time.
///
/// The identity loop stops at the first failure: already-deleted
/// identities stay deleted, unprocessed ones keep orphaned state. No
/// compensating transactions.
#[derive(Default, Debug)]
pub struct DeleteUsersCommand;

impl Command for DeleteUsersCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let input: BulkActionInput = snap.state::<BulkActionInput>().clone();
        let config: BusinessConfig = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let kind = BulkActionKind::Delete;

            if input.ids.is_empty() {
                updater.set(empty_selection_error(kind));
                return;
            }

            updater.set(BulkActionCompute {
                state: BulkActionState::InFlight { kind },
            });

            if let Err(err) = service_api::delete_rows(&config, &input.ids).await {
                error!("{kind}: {err}");
                updater.set(BulkActionCompute {
                    state: BulkActionState::Error {
                        kind,
                        message: err.to_string(),
                    },
                });
                return;
            }

            for id in &input.ids {
                if let Err(err) = service_api::delete_identity(&config, *id).await {
                    error!("{kind}: {err}");
                    updater.set(BulkActionCompute {
                        state: BulkActionState::Error {
                            kind,
                            message: err.to_string(),
                        },
                    });
                    return;
                }
            }

            info!("{kind}: removed {} users", input.ids.len());
            updater.set(BulkActionCompute {
                state: BulkActionState::Success {
                    kind,
                    sign_out_acting: input.sign_out_acting(),
                },
            });
        })
    }
}
