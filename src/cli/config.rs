//! Configuration commands

use clap::ValueEnum;
use colored::Colorize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::output::json::format_json;

/// Values `config set` can change
#[derive(Debug, Clone, Default)]
pub struct ConfigChanges {
    pub api_host: Option<String>,
    pub timeout: Option<u64>,
    pub format: Option<OutputFormat>,
    pub import_concurrency: Option<usize>,
}

impl ConfigChanges {
    fn is_empty(&self) -> bool {
        self.api_host.is_none()
            && self.timeout.is_none()
            && self.format.is_none()
            && self.import_concurrency.is_none()
    }

    /// Write the requested values into `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref host) = self.api_host {
            config.api_host = Some(host.trim_end_matches('/').to_string());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(format) = self.format {
            config.preferences.format = format.to_possible_value().map(|v| v.get_name().to_string());
        }
        if let Some(concurrency) = self.import_concurrency {
            config.preferences.import_concurrency = concurrency;
        }
    }
}

/// Print the effective configuration, overrides included
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let config = opts.load_config()?;
    let path = Config::resolve_path(opts.config_ref())?;
    let session_path = config.session_path()?;

    match opts.output_format(&config) {
        OutputFormat::Json => {
            let shown = json!({
                "path": path.display().to_string(),
                "api_host": config.api_host(),
                "timeout_secs": config.timeout_secs,
                "session_path": session_path.display().to_string(),
                "preferences": config.preferences,
            });
            println!("{}", format_json(&shown)?);
        }
        _ => {
            println!("{} {}\n", "Config file:".bold(), path.display());
            println!("api_host: {}", config.api_host());
            println!("timeout_secs: {}", config.timeout_secs);
            println!("session_path: {}", session_path.display());
            println!("preferences:");
            println!(
                "  format: {}",
                config.preferences.format.as_deref().unwrap_or("pretty")
            );
            println!(
                "  import_concurrency: {}",
                config.preferences.import_concurrency
            );
        }
    }
    Ok(())
}

/// Change values in the config file. Command-line overrides are not saved.
pub fn set(opts: &GlobalOptions, changes: ConfigChanges) -> Result<()> {
    if changes.is_empty() {
        return Err(ConfigError::Invalid(
            "Nothing to change; pass at least one of --host, --request-timeout, --default-format, --import-concurrency"
                .to_string(),
        )
        .into());
    }

    let path = Config::resolve_path(opts.config_ref())?;
    let mut config = Config::load_from(&path)?;
    changes.apply(&mut config);
    config.validate()?;
    config.save_to(&path)?;

    println!("{} Saved {}", "✓".green(), path.display());
    Ok(())
}
