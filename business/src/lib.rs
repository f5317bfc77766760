//! Business layer for the Roster admin console.
//!
//! Views (the CLI today) stay dumb: they mutate input states, dispatch
//! commands, and read compute-shaped caches back out of the
//! [`roster_states::StateCtx`]. Everything that talks to the hosted
//! identity/data service lives here.

pub mod admin_table;
pub mod bulk_actions;
pub mod config;
pub mod directory;
pub mod http;
pub mod service_api;
pub mod session;

mod test_utils;

pub use admin_table::{AdminTableState, TablePhase};
pub use bulk_actions::{
    BlockUsersCommand, BulkActionCompute, BulkActionInput, BulkActionKind, BulkActionState,
    DeleteUsersCommand, UnblockUsersCommand,
};
pub use config::BusinessConfig;
pub use directory::{
    DirectoryCompute, DirectoryResult, RefreshDirectoryCommand, UserRow, UserStatus,
};
pub use service_api::{ServiceError, ServiceResult};
pub use session::{
    BLOCKED_ACCOUNT_MARKER, BLOCKED_ACCOUNT_MESSAGE, PendingSessionToken, SessionCompute,
    SessionStatus, SignInCommand, SignInInput, SignOutCommand, ValidateSessionCommand,
};
