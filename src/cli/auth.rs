//! Session commands: signup, login, logout, status, whoami and refresh

use chrono::Utc;
use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};
use serde_json::json;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{ProblemApi, UserProfile};
use crate::config::Config;
use crate::error::{ApiError, Error, Result};
use crate::output::json::format_json;
use crate::output::progress::with_spinner;
use crate::session::{SessionState, token};

fn prompt_username(username: Option<String>) -> Result<String> {
    let username = match username {
        Some(name) => name,
        None => Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Username")
            .interact_text()?,
    };
    non_blank("Username", username)
}

fn non_blank(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Human-readable remaining time, e.g. `2h 15m` or `42s`
pub fn format_remaining(remaining: chrono::Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    let (hours, mins) = (secs / 3600, (secs % 3600) / 60);
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

/// Register an account. The new account is not logged in.
pub async fn signup(
    opts: &GlobalOptions,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let theme = ColorfulTheme::default();

    let username = prompt_username(username)?;
    let email = match email {
        Some(email) => email,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Email")
            .interact_text()?,
    };
    let email = non_blank("Email", email)?;
    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let message = with_spinner(
        "Creating account...",
        ctx.session.signup(&username, &email, &password),
    )
    .await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&message)?),
        _ => {
            let text = message
                .message
                .unwrap_or_else(|| format!("Account {} created", username));
            println!("{} {}", "✓".green(), text);
            println!("  → Run 'syntexa login' to sign in");
        }
    }
    Ok(())
}

/// Log in and store the session credential
pub async fn login(
    opts: &GlobalOptions,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let username = prompt_username(username)?;
    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Password")
            .interact()?,
    };

    let credential = with_spinner("Logging in...", ctx.session.login(&username, &password)).await?;

    match ctx.format {
        OutputFormat::Json => {
            let summary = json!({
                "username": credential.username,
                "email": credential.email,
                "expires_at": token::decode_claims(&credential.token).ok().and_then(|c| c.expires_at()),
            });
            println!("{}", format_json(&summary)?);
        }
        _ => {
            let name = if credential.username.is_empty() {
                username.as_str()
            } else {
                credential.username.as_str()
            };
            println!("{} Logged in as {}", "✓".green(), name.bold());
        }
    }
    Ok(())
}

/// Remove the stored session. No server call is made.
pub fn logout(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let had_session = ctx.session.current_user().is_some();
    ctx.session.logout()?;

    if had_session {
        println!("{} Logged out", "✓".green());
    } else {
        println!("{} No session to log out of", "○".dimmed());
    }
    Ok(())
}

/// Show configuration and session state
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let config_path = Config::resolve_path(opts.config_ref())?;
    let session_path = ctx.config.session_path()?;
    let state = ctx.session.state();

    if ctx.format == OutputFormat::Json {
        let (name, username, expires_at) = match &state {
            SessionState::Absent => ("absent", None, None),
            SessionState::Expired => ("expired", None, None),
            SessionState::Valid(c) => (
                "valid",
                Some(c.username.clone()),
                token::decode_claims(&c.token).ok().and_then(|c| c.expires_at()),
            ),
        };
        let status = json!({
            "config_path": config_path.display().to_string(),
            "session_path": session_path.display().to_string(),
            "api_host": ctx.config.api_host(),
            "session": name,
            "username": username,
            "expires_at": expires_at,
        });
        println!("{}", format_json(&status)?);
        return Ok(());
    }

    println!("{}\n", "Syntexa Status".bold());
    println!("Config file: {}", config_path.display().to_string().cyan());
    println!("Session file: {}", session_path.display().to_string().cyan());
    println!("API host: {}", ctx.config.api_host().cyan());
    println!();

    match state {
        SessionState::Valid(credential) => {
            let remaining = token::time_until_expiry(&credential.token, Utc::now())
                .map(format_remaining)
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "{} Logged in as {} (expires in {})",
                "✓".green(),
                credential.username.bold(),
                remaining
            );
            if token::should_refresh_at(&credential.token, Utc::now()) {
                println!("  → Token expires soon; run 'syntexa refresh'");
            }
        }
        SessionState::Expired => {
            println!("{} Session expired and was cleared", "⚠".yellow());
            println!("  → Run 'syntexa login' to sign in again");
        }
        SessionState::Absent => {
            println!("{} Not logged in", "✗".red());
            println!("  → Run 'syntexa login' to sign in");
        }
    }
    Ok(())
}

/// Show the logged-in user, preferring the server's view of the profile
pub async fn whoami(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let auth = ctx.auth().await?;

    let fetched = with_spinner("Fetching profile...", ctx.client.profile(&auth)).await;

    let profile = match ctx.checked(fetched) {
        Ok(profile) => profile,
        Err(e @ Error::Api(ApiError::Unauthenticated)) => return Err(e),
        Err(e) => {
            log::warn!("Profile lookup failed, using stored session: {}", e);
            let credential = ctx.session.current_user().ok_or(ApiError::Unauthenticated)?;
            UserProfile {
                id: credential.id,
                username: credential.username,
                email: credential.email,
            }
        }
    };

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&profile)?),
        _ => {
            println!("{}", profile.username.bold());
            if let Some(email) = profile.email {
                println!("Email: {}", email);
            }
            if let Some(id) = profile.id {
                println!("ID: {}", id);
            }
        }
    }
    Ok(())
}

/// Exchange the session token for a fresh one
pub async fn refresh(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let credential = with_spinner("Refreshing session...", ctx.session.refresh_now()).await?;

    let remaining = token::time_until_expiry(&credential.token, Utc::now())
        .map(format_remaining)
        .unwrap_or_else(|| "unknown".to_string());

    match ctx.format {
        OutputFormat::Json => {
            let summary = json!({
                "username": credential.username,
                "expires_at": token::decode_claims(&credential.token).ok().and_then(|c| c.expires_at()),
            });
            println!("{}", format_json(&summary)?);
        }
        _ => println!("{} Session refreshed (expires in {})", "✓".green(), remaining),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(chrono::Duration::seconds(42)), "42s");
        assert_eq!(format_remaining(chrono::Duration::seconds(125)), "2m 5s");
        assert_eq!(format_remaining(chrono::Duration::seconds(8100)), "2h 15m");
        assert_eq!(format_remaining(chrono::Duration::seconds(-5)), "0s");
    }

    #[test]
    fn test_non_blank_trims() {
        assert_eq!(non_blank("Username", "  alice ".to_string()).unwrap(), "alice");
        assert!(non_blank("Email", "   ".to_string()).is_err());
    }
}
