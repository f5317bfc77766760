//! Session gateway: sign-in, session validation, sign-out.
//!
//! The flow mirrors the rest of the business layer:
//! - the view edits [`SignInInput`] (or [`PendingSessionToken`] for a
//!   stored token) and dispatches a command
//! - the command talks to the identity service and publishes a
//!   [`SessionCompute`] update
//! - the view reads the compute back after syncing
//!
//! Blocked accounts are recognized by a substring of the upstream error
//! text. That heuristic is brittle — a structured error code from the
//! service is the right replacement — but it is the contract the service
//! exposes today, so it is kept behind one named constant.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;

use log::{error, info, warn};
use roster_states::{
    Command, CommandSnapshot, Compute, LatestOnlyUpdater, State, assign_impl, state_assign_impl,
};
use ustr::Ustr;

use crate::BusinessConfig;
use crate::service_api;

/// Upstream error fragment that marks a blocked account.
pub const BLOCKED_ACCOUNT_MARKER: &str = "granting user";

/// User-facing message shown for blocked accounts.
pub const BLOCKED_ACCOUNT_MESSAGE: &str =
    "Your account has been blocked. Please contact support.";

/// Map an upstream sign-in error onto the message shown to the user.
///
/// Anything carrying the blocked-account marker becomes the distinct
/// blocked message; everything else passes through unchanged.
pub fn classify_sign_in_error(message: &str) -> String {
    if message.contains(BLOCKED_ACCOUNT_MARKER) {
        BLOCKED_ACCOUNT_MESSAGE.to_owned()
    } else {
        message.to_owned()
    }
}

/// Editable sign-in form state.
#[derive(Default, Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

impl State for SignInInput {
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

/// A stored bearer token awaiting validation on startup.
#[derive(Default, Debug, Clone)]
pub struct PendingSessionToken {
    pub token: Option<String>,
}

impl State for PendingSessionToken {
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

/// Result/status of the acting session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session.
    #[default]
    NotAuthenticated,
    /// A sign-in or validation call is in flight.
    Authenticating,
    /// Signed in.
    Authenticated {
        user_id: Ustr,
        email: String,
        token: String,
    },
    /// Sign-in failed with a user-facing message.
    Failed(String),
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// The acting session's identifier, or none if unauthenticated.
    pub fn user_id(&self) -> Option<Ustr> {
        match self {
            Self::Authenticated { user_id, .. } => Some(*user_id),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token.as_str()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Compute-shaped cache for the acting session.
#[derive(Default, Debug, Clone)]
pub struct SessionCompute {
    pub status: SessionStatus,
}

impl SessionCompute {
    /// Construct an authenticated session directly; test setup helper.
    pub fn new_authenticated(
        user_id: Ustr,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            status: SessionStatus::Authenticated {
                user_id,
                email: email.into(),
                token: token.into(),
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    pub fn user_id(&self) -> Option<Ustr> {
        self.status.user_id()
    }

    pub fn token(&self) -> Option<&str> {
        self.status.token()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }
}

impl Compute for SessionCompute {
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

/// Manual-only command that signs the user in with email + password.
///
/// Dispatch explicitly via `ctx.enqueue_command::<SignInCommand>()`.
#[derive(Default, Debug)]
pub struct SignInCommand;

impl Command for SignInCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let input: SignInInput = snap.state::<SignInInput>().clone();
        let config: BusinessConfig = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let email = input.email.trim().to_owned();
            let password = input.password.clone();

            if email.is_empty() {
                info!("SignInCommand: email is empty");
                updater.set(SessionCompute {
                    status: SessionStatus::Failed("Email is required".to_owned()),
                });
                return;
            }

            if password.is_empty() {
                info!("SignInCommand: password is empty");
                updater.set(SessionCompute {
                    status: SessionStatus::Failed("Password is required".to_owned()),
                });
                return;
            }

            updater.set(SessionCompute {
                status: SessionStatus::Authenticating,
            });

            match service_api::sign_in(&config, &email, &password).await {
                Ok(grant) => {
                    info!("SignInCommand: signed in as '{}'", grant.user.email);
                    updater.set(SessionCompute {
                        status: SessionStatus::Authenticated {
                            user_id: grant.user.id,
                            email: grant.user.email,
                            token: grant.access_token,
                        },
                    });
                }
                Err(service_api::ServiceError::Auth(message)) => {
                    info!("SignInCommand: sign-in rejected: {message}");
                    updater.set(SessionCompute {
                        status: SessionStatus::Failed(classify_sign_in_error(&message)),
                    });
                }
                Err(err) => {
                    error!("SignInCommand: {err}");
                    updater.set(SessionCompute {
                        status: SessionStatus::Failed(err.to_string()),
                    });
                }
            }
        })
    }
}

/// Manual-only command that validates a stored token and restores the
/// session. Reads [`PendingSessionToken`]; resolves to `Authenticated` or
/// back to `NotAuthenticated`.
#[derive(Default, Debug)]
pub struct ValidateSessionCommand;

impl Command for ValidateSessionCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let pending: PendingSessionToken = snap.state::<PendingSessionToken>().clone();
        let config: BusinessConfig = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let token = match pending.token {
                Some(token) if !token.is_empty() => token,
                _ => {
                    info!("ValidateSessionCommand: no token to validate");
                    updater.set(SessionCompute {
                        status: SessionStatus::NotAuthenticated,
                    });
                    return;
                }
            };

            updater.set(SessionCompute {
                status: SessionStatus::Authenticating,
            });

            match service_api::fetch_session(&config, &token).await {
                Ok(user) => {
                    info!("ValidateSessionCommand: session restored for '{}'", user.email);
                    updater.set(SessionCompute {
                        status: SessionStatus::Authenticated {
                            user_id: user.id,
                            email: user.email,
                            token,
                        },
                    });
                }
                Err(err) => {
                    info!("ValidateSessionCommand: stored session rejected: {err}");
                    updater.set(SessionCompute {
                        status: SessionStatus::NotAuthenticated,
                    });
                }
            }
        })
    }
}

/// Manual-only command that signs the acting session out.
///
/// The local session is always cleared; the remote invalidation is
/// best-effort, matching the original flow where sign-out precedes the
/// redirect unconditionally. The token is taken from the live session, or
/// from [`PendingSessionToken`] when signing out a stored session.
#[derive(Default, Debug)]
pub struct SignOutCommand;

impl Command for SignOutCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: tokio_util::sync::CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let session: SessionCompute = snap.compute::<SessionCompute>().clone();
        let pending: PendingSessionToken = snap.state::<PendingSessionToken>().clone();
        let config: BusinessConfig = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            let token = session
                .token()
                .map(str::to_owned)
                .or(pending.token);

            if let Some(token) = token {
                if let Err(err) = service_api::sign_out(&config, &token).await {
                    warn!("SignOutCommand: sign-out request failed: {err}");
                }
            }

            info!("SignOutCommand: session cleared");
            updater.set(SessionCompute {
                status: SessionStatus::NotAuthenticated,
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_marker_yields_blocked_message() {
        let message = classify_sign_in_error("Database error granting user");
        assert_eq!(message, BLOCKED_ACCOUNT_MESSAGE);
    }

    #[test]
    fn other_errors_pass_through_unchanged() {
        let message = classify_sign_in_error("Invalid login credentials");
        assert_eq!(message, "Invalid login credentials");
    }

    #[test]
    fn default_session_is_not_authenticated() {
        let session = SessionCompute::default();
        assert!(!session.is_authenticated());
        assert!(session.user_id().is_none());
        assert!(session.token().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn authenticated_session_exposes_identity() {
        let session =
            SessionCompute::new_authenticated(Ustr::from("u1"), "admin@example.com", "jwt");
        assert!(session.is_authenticated());
        assert_eq!(session.user_id(), Some(Ustr::from("u1")));
        assert_eq!(session.token(), Some("jwt"));
    }
}
