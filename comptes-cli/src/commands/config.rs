//! Config command - show or change the service endpoint

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use comptes_core::config::Config;

use super::get_comptes_dir;
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective endpoint
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the endpoint stored in settings.json
    Set {
        /// Service URL
        #[arg(long)]
        url: Option<String>,
        /// Service namespace
        #[arg(long)]
        namespace: Option<String>,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let dir = get_comptes_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.endpoint)?);
                return Ok(());
            }

            let mut table = output::create_table();
            table.add_row(vec!["URL", config.endpoint.url.as_str()]);
            table.add_row(vec!["Namespace", config.endpoint.namespace.as_str()]);
            println!("{}", table);
            println!("{}", format!("Settings: {}", dir.join("settings.json").display()).dimmed());
            Ok(())
        }
        ConfigCommands::Set { url, namespace } => {
            if url.is_none() && namespace.is_none() {
                output::warning("Nothing to change (use --url and/or --namespace)");
                return Ok(());
            }

            let mut config = Config::from_file(&dir)?;
            if let Some(url) = url {
                config.set_url(url);
            }
            if let Some(namespace) = namespace {
                config.set_namespace(namespace);
            }
            config.save(&dir)?;

            output::success(&format!("Endpoint set to {}", config.endpoint.url));
            Ok(())
        }
    }
}
