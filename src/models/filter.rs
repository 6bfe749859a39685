//! Client-side filtering and sorting for list commands

use crate::client::{Note, Problem};

/// Sort order for `note mine`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum NoteSort {
    /// Most recently created first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Alphabetical by approach title
    Title,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Normalized search term, `None` when blank
fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Filter for `problem list`
#[derive(Debug, Clone, Default)]
pub struct ProblemQuery {
    /// Case-insensitive match on title or description
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ProblemQuery {
    pub fn apply(&self, problems: Vec<Problem>) -> Vec<Problem> {
        let term = search_term(self.search.as_deref());

        let mut matched: Vec<Problem> = problems
            .into_iter()
            .filter(|p| match &term {
                Some(term) => {
                    contains_ignore_case(&p.title, term)
                        || p.description
                            .as_deref()
                            .is_some_and(|d| contains_ignore_case(d, term))
                }
                None => true,
            })
            .collect();

        matched.sort_by_key(|p| p.id);
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

/// Filter and sort for `note mine`
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    /// Case-insensitive match on approach title or content
    pub search: Option<String>,
    pub sort: NoteSort,
    /// Only notes on the problem with this title (case-insensitive)
    pub problem: Option<String>,
}

impl NoteQuery {
    pub fn apply(&self, notes: Vec<Note>) -> Vec<Note> {
        let term = search_term(self.search.as_deref());
        let problem = search_term(self.problem.as_deref());

        let mut matched: Vec<Note> = notes
            .into_iter()
            .filter(|n| match &term {
                Some(term) => {
                    contains_ignore_case(&n.approach_title, term)
                        || contains_ignore_case(&n.content, term)
                }
                None => true,
            })
            .filter(|n| match &problem {
                Some(problem) => n
                    .problem_title()
                    .is_some_and(|t| t.trim().to_lowercase() == *problem),
                None => true,
            })
            .collect();

        match self.sort {
            // Ids are assigned in creation order
            NoteSort::Newest => matched.sort_by(|a, b| b.id.cmp(&a.id)),
            NoteSort::Oldest => matched.sort_by_key(|n| n.id),
            NoteSort::Title => matched.sort_by(|a, b| {
                a.approach_title
                    .to_lowercase()
                    .cmp(&b.approach_title.to_lowercase())
                    .then(a.id.cmp(&b.id))
            }),
        }
        matched
    }
}
