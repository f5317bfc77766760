#![allow(clippy::exit)]

use anyhow::Result;
use clap::Parser as _;
use roster_business::{BulkActionKind, BusinessConfig};
use roster_cli::cli::{Cli, Commands};
use roster_cli::commands;
use roster_cli::context::build_state_ctx;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = BusinessConfig::from_env();
    let ctx = build_state_ctx(config);

    match cli.command {
        Commands::Login => commands::login::run_login(ctx).await,
        Commands::Logout => commands::login::run_logout(ctx).await,
        Commands::Users { interactive } => commands::users::run_users(ctx, interactive).await,
        Commands::Block { ids } => {
            commands::actions::run_bulk(ctx, BulkActionKind::Block, ids, true).await
        }
        Commands::Unblock { ids } => {
            commands::actions::run_bulk(ctx, BulkActionKind::Unblock, ids, true).await
        }
        Commands::Delete { ids, yes } => {
            commands::actions::run_bulk(ctx, BulkActionKind::Delete, ids, yes).await
        }
        Commands::Completions { shell } => {
            commands::completions::run_completions(shell);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
