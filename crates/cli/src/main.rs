//! Teeforge CLI - Session store setup and backend checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table used by the storefront
//! tf-cli migrate sessions
//!
//! # Check that the REST backend is reachable
//! tf-cli backend ping
//! ```
//!
//! # Commands
//!
//! - `migrate sessions` - Create the `tower-sessions` table
//! - `backend ping` - Call the backend with the storefront's configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use thiserror::Error;

mod commands;

#[derive(Parser)]
#[command(name = "tf-cli")]
#[command(author, version, about = "Teeforge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare databases
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Talk to the REST backend
    Backend {
        #[command(subcommand)]
        action: BackendAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Create the storefront session table
    Sessions,
}

#[derive(Subcommand)]
enum BackendAction {
    /// Check that the backend is reachable
    Ping,
}

/// Any failure from a subcommand.
#[derive(Debug, Error)]
enum CommandError {
    #[error(transparent)]
    Migration(#[from] commands::migrate::MigrationError),

    #[error(transparent)]
    Backend(#[from] commands::backend::BackendCommandError),
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Sessions => commands::migrate::sessions().await?,
        },
        Commands::Backend { action } => match action {
            BackendAction::Ping => commands::backend::ping().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_migrate_sessions() {
        let cli = Cli::try_parse_from(["tf-cli", "migrate", "sessions"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Migrate { target: MigrateTarget::Sessions })
        ));
    }
}
