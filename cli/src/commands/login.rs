//! Sign-in and sign-out commands.

use anyhow::{Context as _, Result};
use inquire::{Password, PasswordDisplayMode, Text};
use roster_business::{SessionCompute, SessionStatus, SignInCommand, SignInInput};
use roster_states::StateCtx;
use tracing::{error, info, instrument};

use crate::auth::{clear_saved_session, save_session};
use crate::config::Config;
use crate::context::flush_and_await;
use crate::output::Output;

#[instrument(skip_all, name = "login")]
pub async fn run_login(mut ctx: StateCtx) -> Result<()> {
    let out = Output::new();

    out.header("Sign in to Roster");
    out.newline();

    let email = Text::new("Email:")
        .with_help_message("The email you use for the admin console")
        .prompt()
        .context("Failed to read email")?;

    let password = Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read password")?;

    info!(email = ?email, "Attempting sign-in");

    ctx.update::<SignInInput>(|input| {
        input.email = email.clone();
        input.password = password.clone();
    });

    ctx.enqueue_command::<SignInCommand>();
    flush_and_await(&mut ctx).await;

    let session = ctx.compute::<SessionCompute>();
    match &session.status {
        SessionStatus::Authenticated { email, token, .. } => {
            info!("Signed in as {email}");
            out.newline();
            out.success(format!("Signed in as {email}"));
            save_session(email, token)?;
            out.info(format!(
                "Session saved to {}",
                Config::config_path()?.display()
            ));
        }
        SessionStatus::Failed(message) => {
            error!("Sign-in failed: {message}");
            out.newline();
            out.error(format!("Sign-in failed: {message}"));
            ctx.shutdown().await;
            std::process::exit(1);
        }
        SessionStatus::NotAuthenticated | SessionStatus::Authenticating => {
            error!("Sign-in did not complete");
            out.newline();
            out.error("Sign-in did not complete");
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "logout")]
pub async fn run_logout(mut ctx: StateCtx) -> Result<()> {
    let out = Output::new();

    let config = Config::load().unwrap_or_default();
    let Some(token) = config.token() else {
        out.dim("Not signed in.");
        return Ok(());
    };

    // Best-effort remote invalidation; local credentials are removed
    // regardless of the outcome.
    let token = token.to_owned();
    ctx.update::<roster_business::PendingSessionToken>(|pending| {
        pending.token = Some(token);
    });
    ctx.enqueue_command::<roster_business::SignOutCommand>();
    flush_and_await(&mut ctx).await;

    clear_saved_session()?;
    out.success("Signed out");

    ctx.shutdown().await;
    Ok(())
}
