//! Comptes CLI - bank accounts from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

use commands::{config, create, delete, list};

/// Environment variable holding an explicit log filter
const LOG_ENV: &str = "COMPTES_LOG";

/// Comptes - manage remote bank accounts
#[derive(Parser)]
#[command(name = "comptes", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every account
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account
    Create {
        /// Opening balance
        balance: Decimal,
        /// Account type (checking or savings)
        #[arg(long = "type", short = 't', value_parser = create::parse_account_type)]
        account_type: comptes_core::AccountType,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an account
    Delete {
        /// Account ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change the service endpoint
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr subscriber; `COMPTES_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::List { json } => list::run(json),
        Commands::Create {
            balance,
            account_type,
            json,
        } => create::run(balance, account_type, json),
        Commands::Delete { id, force, json } => delete::run(id, force, json),
        Commands::Config { command } => config::run(command),
    }
}
