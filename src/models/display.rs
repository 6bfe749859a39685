//! Display model implementations for table and JSON output

use serde::Serialize;
use tabled::Tabled;

use crate::client::{Note, Problem};

/// Longest description shown in a table cell
const DESCRIPTION_WIDTH: usize = 60;

/// Cut `text` to `width` characters on one line, marking the cut
fn truncate(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= width && !text.trim().contains('\n') {
        return line.to_string();
    }
    let cut: String = line.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Problem row for table/JSON output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ProblemDisplay {
    #[tabled(rename = "ID")]
    pub id: i64,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "NOTES")]
    pub notes: usize,

    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
}

impl From<&Problem> for ProblemDisplay {
    fn from(problem: &Problem) -> Self {
        Self {
            id: problem.id,
            title: problem.title.clone(),
            notes: problem.notes.len(),
            description: problem
                .description
                .as_deref()
                .map(|d| truncate(d, DESCRIPTION_WIDTH))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Note row for table/JSON output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct NoteDisplay {
    #[tabled(rename = "ID")]
    pub id: i64,

    #[tabled(rename = "PROBLEM")]
    pub problem: String,

    #[tabled(rename = "APPROACH")]
    pub approach: String,

    #[tabled(rename = "LANGUAGE")]
    pub language: String,

    #[tabled(rename = "AUTHOR")]
    pub author: String,
}

impl From<&Note> for NoteDisplay {
    fn from(note: &Note) -> Self {
        let problem = match (note.problem_id(), note.problem_title()) {
            (Some(id), Some(title)) => format!("{} (#{})", title, id),
            (None, Some(title)) => title.to_string(),
            (Some(id), None) => format!("#{}", id),
            (None, None) => "-".to_string(),
        };

        Self {
            id: note.id,
            problem,
            approach: note.approach_title.clone(),
            language: note.language.clone().unwrap_or_else(|| "-".to_string()),
            author: note.author_name().unwrap_or("-").to_string(),
        }
    }
}
