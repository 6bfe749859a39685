//! Problem commands: list, get, create and import

use std::path::Path;

use colored::Colorize;
use futures::stream::{self, StreamExt};
use log::debug;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::cli::args::{GlobalOptions, build_request};
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{Problem, ProblemApi, ProblemRequest};
use crate::error::{ApiError, Error, Result};
use crate::models::{NoteDisplay, ProblemDisplay, ProblemQuery};
use crate::output::Formattable;
use crate::output::json::format_json;
use crate::output::progress::{bar, with_spinner};
use crate::session::AuthHeader;

/// Approach title given to the note created for each imported row
const IMPORTED_NOTE_TITLE: &str = "My Approach";

/// List problems
pub async fn list(opts: &GlobalOptions, query: ProblemQuery) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let problems = with_spinner("Loading problems...", ctx.client.list_problems()).await?;
    debug!("Fetched {} problems", problems.len());

    let display: Vec<ProblemDisplay> = query.apply(problems).iter().map(ProblemDisplay::from).collect();
    display.print(ctx.format)
}

/// Show one problem with its notes
pub async fn get(opts: &GlobalOptions, id: i64) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let problem = with_spinner("Loading problem...", ctx.client.get_problem(id)).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&problem)?),
        format => {
            println!("{} {}", format!("#{}", problem.id).dimmed(), problem.title.bold());
            if let Some(ref description) = problem.description {
                println!("\n{}", description);
            }
            println!();
            let notes: Vec<NoteDisplay> = problem.notes.iter().map(NoteDisplay::from).collect();
            notes.print(format)?;
        }
    }
    Ok(())
}

/// Create a problem
pub async fn create(opts: &GlobalOptions, title: String, description: Option<String>) -> Result<()> {
    let request = problem_request(&title, description.as_deref())?;
    let ctx = CommandContext::new(opts)?;
    let auth = ctx.auth().await?;

    let created = with_spinner(
        "Creating problem...",
        ctx.client.create_problem(&auth, &request),
    )
    .await;
    let problem = ctx.checked(created)?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&problem)?),
        _ => println!(
            "{} Created problem {} {}",
            "✓".green(),
            format!("#{}", problem.id).bold(),
            problem.title
        ),
    }
    Ok(())
}

fn problem_request(title: &str, description: Option<&str>) -> Result<ProblemRequest> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("Problem title must not be empty".to_string()));
    }
    Ok(ProblemRequest {
        title: title.to_string(),
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    })
}

/// One row of an import file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRow {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Content of the "My Approach" note
    #[serde(default)]
    pub note: Option<String>,

    #[serde(default)]
    pub language: Option<String>,
}

impl ImportRow {
    fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.title) && filled(&self.note)
    }
}

/// Result of importing one row
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub row: usize,
    pub title: String,
    pub problem_id: Option<i64>,
    pub note_id: Option<i64>,
    pub status: String,

    #[serde(skip)]
    unauthenticated: bool,
}

/// Import outcome row for table output
#[derive(Debug, Clone, Tabled, Serialize)]
struct ImportDisplay {
    #[tabled(rename = "ROW")]
    row: usize,

    #[tabled(rename = "TITLE")]
    title: String,

    #[tabled(rename = "PROBLEM")]
    problem: String,

    #[tabled(rename = "NOTE")]
    note: String,

    #[tabled(rename = "STATUS")]
    status: String,
}

impl From<&ImportOutcome> for ImportDisplay {
    fn from(outcome: &ImportOutcome) -> Self {
        let id = |id: Option<i64>| id.map(|id| format!("#{}", id)).unwrap_or_else(|| "-".to_string());
        Self {
            row: outcome.row,
            title: outcome.title.clone(),
            problem: id(outcome.problem_id),
            note: id(outcome.note_id),
            status: outcome.status.clone(),
        }
    }
}

impl ImportOutcome {
    fn new(row: usize, title: &str) -> Self {
        Self {
            row,
            title: title.to_string(),
            problem_id: None,
            note_id: None,
            status: String::new(),
            unauthenticated: false,
        }
    }

    fn failed(mut self, err: &Error) -> Self {
        self.unauthenticated = matches!(err, Error::Api(ApiError::Unauthenticated));
        self.status = format!("failed: {}", err);
        self
    }

    pub fn succeeded(&self) -> bool {
        self.note_id.is_some()
    }
}

/// Parse an import file
pub fn read_import_file(path: &Path) -> Result<Vec<ImportRow>> {
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| {
        Error::InvalidInput(format!("Failed to parse {}: {}", path.display(), e))
    })
}

async fn import_row<C: ProblemApi + ?Sized>(
    client: &C,
    auth: &AuthHeader,
    index: usize,
    row: ImportRow,
) -> ImportOutcome {
    let title = row.title.clone().unwrap_or_default();
    let outcome = ImportOutcome::new(index + 1, title.trim());

    if !row.is_complete() {
        return ImportOutcome {
            status: "skipped: title and note are required".to_string(),
            ..outcome
        };
    }

    let problem_request = match problem_request(&title, row.description.as_deref()) {
        Ok(request) => request,
        Err(e) => return outcome.failed(&e),
    };
    let note_request = match build_request(
        IMPORTED_NOTE_TITLE,
        row.note.as_deref().unwrap_or_default(),
        row.language.as_deref(),
    ) {
        Ok(request) => request,
        Err(e) => return outcome.failed(&e),
    };

    let problem: Problem = match client.create_problem(auth, &problem_request).await {
        Ok(problem) => problem,
        Err(e) => return outcome.failed(&e),
    };
    let outcome = ImportOutcome {
        problem_id: Some(problem.id),
        ..outcome
    };

    match client.add_note(auth, problem.id, &note_request).await {
        Ok(note) => ImportOutcome {
            note_id: Some(note.id),
            status: "created".to_string(),
            ..outcome
        },
        Err(e) => outcome.failed(&e),
    }
}

/// Import rows with at most `concurrency` rows in flight.
///
/// Outcomes come back in input order regardless of completion order.
pub async fn import_rows<C: ProblemApi + ?Sized>(
    client: &C,
    auth: &AuthHeader,
    rows: Vec<ImportRow>,
    concurrency: usize,
    on_done: impl Fn(&ImportOutcome),
) -> Vec<ImportOutcome> {
    stream::iter(rows.into_iter().enumerate())
        .map(|(index, row)| import_row(client, auth, index, row))
        .buffered(concurrency.max(1))
        .inspect(|outcome| on_done(outcome))
        .collect()
        .await
}

/// Create a problem plus a "My Approach" note for each complete row
pub async fn import(opts: &GlobalOptions, file: &Path) -> Result<()> {
    let rows = read_import_file(file)?;
    let ctx = CommandContext::new(opts)?;
    let auth = ctx.auth().await?;

    let concurrency = ctx.config.preferences.import_concurrency;
    debug!("Importing {} rows, {} at a time", rows.len(), concurrency);

    let pb = bar(rows.len() as u64, "Importing");
    let outcomes = import_rows(ctx.client.as_ref(), &auth, rows, concurrency, |_| pb.inc(1)).await;
    pb.finish_and_clear();

    if outcomes.iter().any(|o| o.unauthenticated) {
        return ctx.checked(Err(ApiError::Unauthenticated.into()));
    }

    let created = outcomes.iter().filter(|o| o.succeeded()).count();
    let total = outcomes.len();
    let failed = outcomes.iter().any(|o| o.status.starts_with("failed"));

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&outcomes)?),
        format => {
            let display: Vec<ImportDisplay> = outcomes.iter().map(ImportDisplay::from).collect();
            display.print(format)?;
            let glyph = if failed { "⚠".yellow() } else { "✓".green() };
            println!("\n{} Imported {} of {} rows", glyph, created, total);
        }
    }
    Ok(())
}
