//! Global CLI options shared across all commands

use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. Clap resolves the
/// first two; [`apply_to`](Self::apply_to) layers them over the loaded config.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format; `None` defers to the config preference
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.syntexa/config.yaml)
    pub config: Option<String>,

    /// Custom session file path
    pub session: Option<PathBuf>,

    /// API host override
    pub api_host: Option<String>,

    /// Request timeout override, seconds
    pub timeout: Option<u64>,

    /// Bypass the response cache
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            session: cli.session.clone(),
            api_host: cli.api_host.clone(),
            timeout: cli.timeout,
            no_cache: cli.no_cache,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Load the config file and apply command-line overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_at(self.config_ref())?;
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref host) = self.api_host {
            config.api_host = Some(host.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(ref session) = self.session {
            config.session_path = Some(session.clone());
        }
    }

    /// Effective output format
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        if let Some(format) = self.format {
            return format;
        }
        match config.preferences.format.as_deref().map(str::parse) {
            Some(Ok(format)) => format,
            Some(Err(e)) => {
                log::warn!("Ignoring preferences.format: {}", e);
                OutputFormat::default()
            }
            None => OutputFormat::default(),
        }
    }
}
