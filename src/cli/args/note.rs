//! Arguments describing a note body

use std::path::PathBuf;

use clap::Args;

use crate::client::NoteRequest;
use crate::error::{Error, Result};

/// Title, content and language of a note
#[derive(Debug, Clone, Args)]
pub struct NoteBodyArgs {
    /// Approach title, e.g. "Two pointers"
    #[arg(long)]
    pub title: String,

    /// Note content
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub content: Option<String>,

    /// Read note content from a file ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Solution language, e.g. rust or python
    #[arg(long)]
    pub language: Option<String>,
}

impl NoteBodyArgs {
    /// Build the request body; title and content must not be blank
    pub fn to_request(&self) -> Result<NoteRequest> {
        let content = match (&self.content, &self.file) {
            (Some(content), _) => content.clone(),
            (None, Some(path)) if path.as_os_str() == "-" => std::io::read_to_string(std::io::stdin())?,
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => String::new(),
        };

        build_request(&self.title, &content, self.language.as_deref())
    }
}

pub fn build_request(title: &str, content: &str, language: Option<&str>) -> Result<NoteRequest> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("Note title must not be empty".to_string()));
    }
    if content.trim().is_empty() {
        return Err(Error::InvalidInput("Note content must not be empty".to_string()));
    }

    Ok(NoteRequest {
        approach_title: title.trim().to_string(),
        content: content.to_string(),
        language: language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    })
}
