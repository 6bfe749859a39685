//! Common CLI types shared across commands

use std::str::FromStr;

pub use crate::models::NoteSort;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting (default)
    #[default]
    Pretty,
    /// Table format - plain rows, one per entry
    Table,
    /// JSON format - structured for scripts
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    /// Parse the `preferences.format` config value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as clap::ValueEnum>::from_str(s, true)
    }
}
