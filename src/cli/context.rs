//! Command execution context
//!
//! Loads configuration once and wires the API client, response cache and
//! session manager together for the command handlers.

use std::sync::Arc;

use crate::cache::CachedClient;
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::SyntexaClient;
use crate::config::Config;
use crate::error::Result;
use crate::session::{AuthHeader, FileStore, SessionManager};

/// API client used by every command
pub type Client = CachedClient<SyntexaClient>;

/// Session manager used by every command
pub type Session = SessionManager<Client, FileStore>;

/// Context for command execution containing config, client, session and
/// output preferences.
pub struct CommandContext {
    /// Loaded configuration with command-line overrides applied
    pub config: Config,
    /// API client with caching (Arc-wrapped; the session shares it)
    pub client: Arc<Client>,
    /// Owner of the stored credential
    pub session: Arc<Session>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Build the context from global options.
    ///
    /// Nothing here talks to the network; authenticated commands ask for a
    /// header through [`auth`](Self::auth).
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = opts.load_config()?;
        let format = opts.output_format(&config);

        let raw_client = SyntexaClient::new(&config)?;
        let client = Arc::new(CachedClient::new(raw_client, config.api_host(), !opts.no_cache));

        let store = FileStore::new(config.session_path()?);
        let session = Arc::new(SessionManager::new(Arc::clone(&client), store));

        Ok(Self {
            config,
            client,
            session,
            format,
        })
    }

    /// Authorization header for the current session, refreshed when close
    /// to expiry
    pub async fn auth(&self) -> Result<AuthHeader> {
        self.session.smart_auth_header().await
    }

    /// Pass an authenticated call's result through the session, which
    /// clears itself on a `401`
    pub fn checked<T>(&self, result: Result<T>) -> Result<T> {
        self.session.handle_unauthorized(result)
    }

    /// Absolute URL for a server-relative path
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.config.api_host(),
            path.trim_start_matches('/')
        )
    }
}
