//! Configuration management for Syntexa

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default API host (production)
pub const DEFAULT_API_HOST: &str = "https://syntexa-api.onrender.com";

/// Default client-side request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Directory under the home directory holding config and session files
const APP_DIR: &str = ".syntexa";

const CONFIG_FILE: &str = "config.yaml";
const SESSION_FILE: &str = "session.json";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API host, e.g. `https://syntexa-api.onrender.com`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Client-side timeout applied to every remote call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Where the session credential is stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_path: Option<PathBuf>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Concurrent requests used by `problem import`
    #[serde(default = "default_import_concurrency")]
    pub import_concurrency: usize,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_import_concurrency() -> usize {
    4
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            import_concurrency: default_import_concurrency(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: None,
            timeout_secs: default_timeout_secs(),
            session_path: None,
            preferences: Preferences::default(),
        }
    }
}

impl Config {
    /// Directory holding config and session files (`~/.syntexa`)
    pub fn app_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;
        Ok(home.join(APP_DIR))
    }

    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join(CONFIG_FILE))
    }

    /// Resolve the config path from an optional override
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Reject values that would make every request fail
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be greater than 0".to_string()).into());
        }
        if self.preferences.import_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "preferences.import_concurrency must be greater than 0".to_string(),
            )
            .into());
        }
        if let Some(ref host) = self.api_host
            && !(host.starts_with("http://") || host.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "api_host must start with http:// or https:// (got {})",
                host
            ))
            .into());
        }
        Ok(())
    }

    /// API host with any trailing slash removed
    pub fn api_host(&self) -> String {
        self.api_host
            .as_deref()
            .unwrap_or(DEFAULT_API_HOST)
            .trim_end_matches('/')
            .to_string()
    }

    /// Base URL for data endpoints (`<host>/api/v1`)
    pub fn api_base_url(&self) -> String {
        format!("{}/api/v1", self.api_host())
    }

    /// Base URL for auth endpoints (`<host>/api/v1/auth`)
    pub fn auth_base_url(&self) -> String {
        format!("{}/api/v1/auth", self.api_host())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Session credential file, defaulting to `~/.syntexa/session.json`
    pub fn session_path(&self) -> Result<PathBuf> {
        match self.session_path {
            Some(ref p) => Ok(p.clone()),
            None => Ok(Self::app_dir()?.join(SESSION_FILE)),
        }
    }
}
