//! Note commands: add, update, delete, share and mine

use std::time::Duration;

use chrono::Local;
use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use log::debug;
use serde_json::json;

use crate::cli::args::{GlobalOptions, NoteBodyArgs};
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{Note, ProblemApi};
use crate::error::Result;
use crate::models::{NoteDisplay, NoteQuery};
use crate::output::Formattable;
use crate::output::json::format_json;
use crate::output::progress::with_spinner;

fn print_note(format: OutputFormat, verb: &str, note: &Note) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", format_json(note)?),
        _ => println!(
            "{} {} note {} {}",
            "✓".green(),
            verb,
            format!("#{}", note.id).bold(),
            note.approach_title
        ),
    }
    Ok(())
}

/// Add a note to a problem
pub async fn add(opts: &GlobalOptions, problem_id: i64, body: &NoteBodyArgs) -> Result<()> {
    let request = body.to_request()?;
    let ctx = CommandContext::new(opts)?;
    let auth = ctx.auth().await?;

    let added = with_spinner(
        "Saving note...",
        ctx.client.add_note(&auth, problem_id, &request),
    )
    .await;
    let note = ctx.checked(added)?;
    print_note(ctx.format, "Added", &note)
}

/// Replace the title, content and language of a note
pub async fn update(
    opts: &GlobalOptions,
    problem_id: i64,
    note_id: i64,
    body: &NoteBodyArgs,
) -> Result<()> {
    let request = body.to_request()?;
    let ctx = CommandContext::new(opts)?;
    let auth = ctx.auth().await?;

    let updated = with_spinner(
        "Saving note...",
        ctx.client.update_note(&auth, problem_id, note_id, &request),
    )
    .await;
    let note = ctx.checked(updated)?;
    print_note(ctx.format, "Updated", &note)
}

/// Delete a note, asking first unless `yes`
pub async fn delete(opts: &GlobalOptions, problem_id: i64, note_id: i64, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let auth = ctx.auth().await?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete note #{} from problem #{}?", note_id, problem_id))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = with_spinner(
        "Deleting note...",
        ctx.client.delete_note(&auth, problem_id, note_id),
    )
    .await;
    ctx.checked(deleted)?;

    match ctx.format {
        OutputFormat::Json => {
            let result = json!({ "deleted": true, "problem_id": problem_id, "note_id": note_id });
            println!("{}", format_json(&result)?);
        }
        _ => println!("{} Deleted note #{}", "✓".green(), note_id),
    }
    Ok(())
}

/// Create a public link to a note
pub async fn share(opts: &GlobalOptions, problem_id: i64, note_id: i64) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let auth = ctx.auth().await?;

    let shared = with_spinner(
        "Creating share link...",
        ctx.client.share_note(&auth, problem_id, note_id),
    )
    .await;
    let url = ctx.absolute_url(&ctx.checked(shared)?);

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&json!({ "url": url }))?),
        _ => {
            println!("{} Share link created", "✓".green());
            println!("  {}", url.cyan());
        }
    }
    Ok(())
}

async fn fetch_mine(ctx: &CommandContext, query: &NoteQuery) -> Result<Vec<NoteDisplay>> {
    let auth = ctx.auth().await?;
    let fetched = with_spinner("Loading notes...", ctx.client.my_notes(&auth)).await;
    let notes = ctx.checked(fetched)?;
    debug!("Fetched {} notes", notes.len());

    Ok(query.apply(notes).iter().map(NoteDisplay::from).collect())
}

/// List the session user's notes.
///
/// With `watch`, the list is re-fetched every `watch` seconds until Ctrl-C
/// while a background task keeps the session token fresh.
pub async fn mine(opts: &GlobalOptions, query: NoteQuery, watch: Option<u64>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let Some(secs) = watch else {
        return fetch_mine(&ctx, &query).await?.print(ctx.format);
    };

    let interval = Duration::from_secs(secs.max(1));
    let refresher = ctx.session.spawn_refresh();

    let outcome = loop {
        let notes = match fetch_mine(&ctx, &query).await {
            Ok(notes) => notes,
            Err(e) => break Err(e),
        };

        if ctx.format != OutputFormat::Json {
            println!(
                "{}",
                format!(
                    "Updated {} (every {}s, Ctrl-C to stop)",
                    Local::now().format("%H:%M:%S"),
                    interval.as_secs()
                )
                .dimmed()
            );
        }
        if let Err(e) = notes.print(ctx.format) {
            break Err(e);
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            _ = tokio::time::sleep(interval) => {}
        }
    };

    refresher.stop().await;
    outcome
}
