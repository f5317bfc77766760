//! State, compute, and command runtime for the Roster console.
//!
//! The model is deliberately small:
//! - [`State`]: plain application state stored in [`StateCtx`], mutated
//!   synchronously by the owning view via `state_mut`/`update`.
//! - [`Compute`]: a compute-shaped cache (status enums, fetched lists)
//!   that async commands update through an [`Updater`].
//! - [`Command`]: a manual-only unit of work. Commands receive a
//!   [`CommandSnapshot`] (cloned inputs), perform their side effects
//!   (network IO), and publish results with [`LatestOnlyUpdater::set`].
//!
//! Commands are spawned into a `tokio::task::JoinSet`; results travel back
//! over a `flume` channel and are applied by [`StateCtx::sync_computes`].
//! Side effects never run implicitly: nothing happens until a command is
//! enqueued and flushed.

mod command;
mod compute;
mod ctx;
mod error;
mod snapshot;
mod state;
mod task;
mod updater;

pub use command::Command;
pub use compute::{Compute, assign_impl};
pub use ctx::StateCtx;
pub use error::Error;
pub use snapshot::{CommandSnapshot, ComputeSnapshot, StateSnapshot};
pub use state::{State, state_assign_impl};
pub use task::{TaskHandle, TaskId};
pub use updater::{LatestOnlyUpdater, Updater};
