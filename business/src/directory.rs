//! User directory: row model and the list-users refresh flow.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use log::{error, info};
use roster_states::{Command, CommandSnapshot, Compute, LatestOnlyUpdater, assign_impl};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::BusinessConfig;
use crate::service_api;
use crate::session::SessionCompute;

/// Account status column. Closed enumeration; anything else the service
/// sends collapses to [`UserStatus::Unknown`] and renders unstyled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum UserStatus {
    Active,
    Blocked,
    Pending,
    #[default]
    Unknown,
}

impl UserStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "active" => Self::Active,
            "blocked" => Self::Blocked,
            "pending" => Self::Pending,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for UserStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the user directory, as the service returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    /// Opaque unique identifier, immutable.
    pub id: Ustr,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Unique login identifier.
    pub email: String,
    /// Last sign-in time; null for accounts that never signed in.
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: UserStatus,
}

/// Status/result of the directory read.
#[derive(Debug, Clone, Default)]
pub enum DirectoryResult {
    /// No read attempted yet.
    #[default]
    Idle,
    /// A refresh is in flight.
    Loading,
    /// The last read succeeded; rows arrive ordered by `last_login`
    /// descending (null placement is the service's default).
    Loaded(Vec<UserRow>),
    /// The last read failed. Callers log and present an empty list.
    Error(String),
}

/// Compute-shaped cache for the directory read.
#[derive(Default, Debug, Clone)]
pub struct DirectoryCompute {
    pub result: DirectoryResult,
}

impl DirectoryCompute {
    pub fn is_loading(&self) -> bool {
        matches!(self.result, DirectoryResult::Loading)
    }

    pub fn users(&self) -> Option<&[UserRow]> {
        match &self.result {
            DirectoryResult::Loaded(rows) => Some(rows.as_slice()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.result {
            DirectoryResult::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compute for DirectoryCompute {
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

/// Manual-only command that re-reads the whole directory.
///
/// Dispatched after every mutation and on explicit refresh; there is no
/// incremental update path, the row set is replaced wholesale.
#[derive(Default, Debug)]
pub struct RefreshDirectoryCommand;

impl Command for RefreshDirectoryCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let config: BusinessConfig = snap.state::<BusinessConfig>().clone();
        let session: SessionCompute = snap.compute::<SessionCompute>().clone();

        Box::pin(async move {
            updater.set(DirectoryCompute {
                result: DirectoryResult::Loading,
            });

            match service_api::list_users(&config, session.token()).await {
                Ok(rows) => {
                    info!("RefreshDirectoryCommand: fetched {} users", rows.len());
                    updater.set(DirectoryCompute {
                        result: DirectoryResult::Loaded(rows),
                    });
                }
                Err(err) => {
                    error!("RefreshDirectoryCommand: {err}");
                    updater.set(DirectoryCompute {
                        result: DirectoryResult::Error(err.to_string()),
                    });
                }
            }
        })
    }
}
