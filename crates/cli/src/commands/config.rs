//! The `config` subcommand: rewrite the connection settings file in place.

use std::process::ExitCode;

use anyhow::{Context, Result};

use flowctl_util::{ConfigStore, ConfigUpdate, redact_sensitive, resolve_config_path};

/// Shallow-merge the provided fields over the `n8n` section and save.
///
/// Invoked with no fields at all, this is a usage error and exits nonzero;
/// every other path reports and exits zero.
pub fn update(config_flag: Option<&str>, args: crate::ConfigArgs) -> Result<ExitCode> {
    let update = build_update(args);
    if update.is_empty() {
        println!("No valid configuration options provided");
        return Ok(ExitCode::FAILURE);
    }

    let path = resolve_config_path(config_flag);
    let mut store = ConfigStore::load(&path).context("load configuration")?;
    store.apply(&update).context("merge configuration update")?;
    store.save().context("save configuration")?;

    println!("Configuration updated successfully!");
    println!("New configuration:");
    let config = store.client_config().context("read n8n connection settings")?;
    let rendered = serde_json::to_string_pretty(&config).context("render configuration")?;
    println!("{}", redact_sensitive(&rendered));
    Ok(ExitCode::SUCCESS)
}

/// `--all URL KEY USER PASS` wins over the individual flags.
fn build_update(args: crate::ConfigArgs) -> ConfigUpdate {
    if let Some(all) = args.all {
        let mut values = all.into_iter();
        return ConfigUpdate {
            base_url: values.next(),
            api_key: values.next(),
            username: values.next(),
            password: values.next(),
        };
    }
    ConfigUpdate {
        base_url: args.base_url,
        api_key: args.api_key,
        username: args.username,
        password: args.password,
    }
}
