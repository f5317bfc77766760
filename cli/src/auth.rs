//! Session handling for the CLI.
//!
//! The console is the "single admin page requiring an authenticated
//! session": every account-facing command validates the stored token
//! first and sends the user back to `roster login` when it is missing or
//! stale.

use anyhow::{Result, bail};
use roster_business::{PendingSessionToken, SessionCompute, ValidateSessionCommand};
use roster_states::StateCtx;
use tracing::{info, instrument};
use ustr::Ustr;

use crate::config::Config;
use crate::context::flush_and_await;

/// Validate the saved session and return the acting user's id.
#[instrument(skip_all, name = "ensure_authenticated")]
pub async fn ensure_authenticated(ctx: &mut StateCtx) -> Result<Ustr> {
    let config = Config::load()?;
    let Some(token) = config.token() else {
        bail!("Not signed in. Run `roster login` first.");
    };

    let token = token.to_owned();
    ctx.update::<PendingSessionToken>(|pending| pending.token = Some(token));
    ctx.enqueue_command::<ValidateSessionCommand>();
    flush_and_await(ctx).await;

    let session = ctx.compute::<SessionCompute>();
    match session.user_id() {
        Some(user_id) => {
            info!("acting user is {user_id}");
            Ok(user_id)
        }
        None => {
            clear_saved_session()?;
            bail!("Stored session is no longer valid. Run `roster login` again.");
        }
    }
}

/// Persist a fresh session after sign-in.
pub fn save_session(email: &str, token: &str) -> Result<()> {
    let mut config = Config::load().unwrap_or_default();
    config.set_session(email, token);
    config.save()
}

/// Drop saved credentials.
pub fn clear_saved_session() -> Result<()> {
    let mut config = Config::load().unwrap_or_default();
    config.clear_session();
    config.save()
}
