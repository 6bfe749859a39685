//! Cache management commands

use chrono::{DateTime, Local};
use colored::Colorize;

use crate::cache::CacheStorage;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::json::format_json;

fn cache_location() -> String {
    CacheStorage::cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Show cache statistics
pub fn status(format: OutputFormat) -> Result<()> {
    let stats = CacheStorage::open()?.stats()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": cache_location(),
                "total_entries": stats.total_entries,
                "valid_entries": stats.valid_entries,
                "expired_entries": stats.expired_entries,
                "total_size_bytes": stats.total_size_bytes,
                "total_size_human": format_size(stats.total_size_bytes),
                "oldest_entry_timestamp": stats.oldest_entry,
                "newest_entry_timestamp": stats.newest_entry,
            });
            println!("{}", format_json(&json)?);
        }
        _ => {
            println!("{}", "Cache Status".bold());
            println!("────────────────────────────────────────");
            println!("Location:       {}", cache_location());
            println!("Valid entries:  {}", stats.valid_entries);
            println!("Expired:        {}", stats.expired_entries);
            println!("Total size:     {}", format_size(stats.total_size_bytes));
            if let Some(oldest) = stats.oldest_entry {
                println!("Oldest entry:   {}", format_timestamp(oldest));
            }
            if let Some(newest) = stats.newest_entry {
                println!("Newest entry:   {}", format_timestamp(newest));
            }
        }
    }

    Ok(())
}

/// Remove every cached response
pub fn clear(format: OutputFormat) -> Result<()> {
    let removed = CacheStorage::open()?.clear_all()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "entries_removed": removed, "success": true });
            println!("{}", format_json(&json)?);
        }
        _ if removed > 0 => println!("{} Cleared {} cache entries", "✓".green(), removed),
        _ => println!("{} Cache was already empty", "○".dimmed()),
    }

    Ok(())
}

/// Format bytes as human-readable size
fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert_eq!(format_timestamp(i64::MAX), "unknown");
        assert_ne!(format_timestamp(1_700_000_000), "unknown");
    }
}
