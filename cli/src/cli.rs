use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Admin console for Roster user accounts", long_about = None)]
#[command(version, long_version = &*roster_utils::version_info::long_version().leak())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login,
    /// Sign out and remove saved credentials
    Logout,
    /// List user accounts
    Users {
        /// Interactive mode (select rows, run bulk actions)
        #[arg(long, short = 'I')]
        interactive: bool,
    },
    /// Block user accounts by id
    Block {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Unblock user accounts by id
    Unblock {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete user accounts by id (data row and identity record)
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
