//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod note;
pub mod problem;

pub use args::{NoteBodyArgs, NoteSort, OutputFormat};
pub use context::CommandContext;

/// Syntexa CLI - your coding-problem approaches, from the terminal
#[derive(Parser, Debug)]
#[command(name = "syntexa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "SYNTEXA_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "SYNTEXA_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override session file location
    #[arg(long, global = true, env = "SYNTEXA_SESSION", hide_env = true)]
    pub session: Option<PathBuf>,

    /// Override the API host
    #[arg(long, global = true, env = "SYNTEXA_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "SYNTEXA_TIMEOUT", hide_env = true)]
    pub timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long, global = true, env = "SYNTEXA_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass cache, fetch fresh data from API
    #[arg(long, global = true, env = "SYNTEXA_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account (does not log in)
    Signup {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, env = "SYNTEXA_PASSWORD", hide = true, hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in and store the session
    Login {
        #[arg(long)]
        username: Option<String>,

        #[arg(long, env = "SYNTEXA_PASSWORD", hide = true, hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove the stored session
    Logout,

    /// Show configuration and session status
    Status,

    /// Show the logged-in user
    Whoami,

    /// Exchange the session token for a fresh one
    Refresh,

    /// Browse and create problems
    #[command(subcommand)]
    Problem(ProblemCommands),

    /// Manage your approach notes
    #[command(subcommand)]
    Note(NoteCommands),

    /// Manage the local response cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Problem subcommands
#[derive(Subcommand, Debug)]
pub enum ProblemCommands {
    /// List problems
    List {
        /// Only problems whose title or description contains TEXT
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        /// Maximum number of problems to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Show a problem and its notes
    Get {
        /// Problem ID
        id: i64,
    },

    /// Create a problem
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Create problems with a first note from a YAML file
    Import {
        /// YAML list of {title, description, note, language}
        file: PathBuf,
    },
}

/// Note subcommands
#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Add a note to a problem
    Add {
        /// Problem ID
        problem_id: i64,

        #[command(flatten)]
        body: NoteBodyArgs,
    },

    /// Replace a note
    Update {
        problem_id: i64,

        note_id: i64,

        #[command(flatten)]
        body: NoteBodyArgs,
    },

    /// Delete a note
    Delete {
        problem_id: i64,

        note_id: i64,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Create a public link to a note
    Share { problem_id: i64, note_id: i64 },

    /// List your notes
    Mine {
        /// Only notes whose title or content contains TEXT
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,

        #[arg(long, value_enum, default_value_t = NoteSort::Newest)]
        sort: NoteSort,

        /// Only notes on the problem with this title
        #[arg(long, value_name = "TITLE")]
        problem: Option<String>,

        /// Re-fetch every SECS seconds until interrupted
        #[arg(long, value_name = "SECS", num_args = 0..=1, default_missing_value = "30")]
        watch: Option<u64>,
    },
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Remove all cached responses
    Clear,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Change values in the config file
    Set {
        /// API host, e.g. https://syntexa-api.onrender.com
        #[arg(long = "host", value_name = "URL")]
        api_host: Option<String>,

        /// Request timeout in seconds
        #[arg(long = "request-timeout", value_name = "SECS")]
        timeout: Option<u64>,

        /// Default output format
        #[arg(long = "default-format", value_enum)]
        format: Option<OutputFormat>,

        /// Concurrent requests used by `problem import`
        #[arg(long)]
        import_concurrency: Option<usize>,
    },
}
