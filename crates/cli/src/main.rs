use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use flowctl_types::ClientConfig;
use flowctl_util::{ConfigStore, resolve_config_path};

mod commands;

#[derive(Parser)]
#[command(name = "flowctl", version, about = "Manage workflows on a remote n8n instance")]
struct Cli {
    /// Path to the config file (default ./config.json, env FLOWCTL_CONFIG_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List workflows on the instance
    List,
    /// List available workflow templates
    Templates,
    /// Deploy a template workflow and activate it
    Deploy {
        /// Template key, as printed by `templates`
        template: String,
        /// Optional display name overriding the template's own
        name: Option<String>,
    },
    /// Delete a workflow by id
    Delete { id: String },
    /// Show a detail view of one workflow
    Show { id: String },
    /// Probe connectivity and summarize the instance
    Test,
    /// Probe candidate API endpoints and classify their responses
    Diagnose,
    /// Try each authentication scheme against the listing endpoint
    AuthProbe,
    /// Update the config file in place
    Config(ConfigArgs),
}

#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// New instance base URL
    #[arg(long = "base-url", value_name = "URL")]
    pub(crate) base_url: Option<String>,
    /// New API key
    #[arg(long = "api-key", value_name = "KEY")]
    pub(crate) api_key: Option<String>,
    /// New username
    #[arg(long)]
    pub(crate) username: Option<String>,
    /// New password
    #[arg(long)]
    pub(crate) password: Option<String>,
    /// Set all four credentials at once
    #[arg(long, num_args = 4, value_names = ["URL", "KEY", "USER", "PASS"])]
    pub(crate) all: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let config_flag = cli.config.as_deref();

    match cli.command {
        Command::List => commands::workflows::list(&load_client_config(config_flag)?).await,
        Command::Templates => commands::workflows::templates(),
        Command::Deploy { template, name } => {
            commands::workflows::deploy(&load_client_config(config_flag)?, &template, name.as_deref()).await
        }
        Command::Delete { id } => commands::workflows::delete(&load_client_config(config_flag)?, &id).await,
        Command::Show { id } => commands::workflows::show(&load_client_config(config_flag)?, &id).await,
        Command::Test => commands::probes::test(&load_client_config(config_flag)?).await,
        Command::Diagnose => commands::probes::diagnose(&load_client_config(config_flag)?).await,
        Command::AuthProbe => commands::probes::auth_probe(&load_client_config(config_flag)?).await,
        Command::Config(args) => commands::config::update(config_flag, args),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .try_init();
}

/// Load the `n8n` section of the config file. Failures here are fatal: no
/// command can proceed without credentials.
fn load_client_config(flag: Option<&str>) -> Result<ClientConfig> {
    let path = resolve_config_path(flag);
    let store = ConfigStore::load(&path).context("load configuration")?;
    store.client_config().context("read n8n connection settings")
}
