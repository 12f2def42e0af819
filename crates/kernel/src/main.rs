//! Stampa CLI
//!
//! Plugin inspection commands for a Stampa site project.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use stampa_kernel::config::{Config, SiteConfig};
use stampa_kernel::plugin::cli;

#[derive(Parser)]
#[command(name = "stampa", about = "Static-site build pipeline", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect and validate the plugin configuration.
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
}

#[derive(Subcommand)]
enum PluginCommand {
    /// List discovered plugins and whether they are enabled.
    List,
    /// Print the resolved plugin load order.
    Order,
    /// Validate the enabled plugin set.
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env();
    debug!(project_root = %config.project_root.display(), "configuration loaded");

    let site = SiteConfig::load(&config.site_config_path())
        .context("failed to load site configuration")?;

    match cli.command {
        Command::Plugin { command } => match command {
            PluginCommand::List => cli::cmd_plugin_list(&config, &site)?,
            PluginCommand::Order => cli::cmd_plugin_order(&config, &site)?,
            PluginCommand::Validate => {
                if !cli::cmd_plugin_validate(&config, &site)? {
                    std::process::exit(1);
                }
            }
        },
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
