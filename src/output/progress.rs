//! Progress indicators on stderr
//!
//! Indicators are hidden when stderr is not a terminal so piped output and
//! test harnesses see nothing.

use std::future::Future;
use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

fn interactive() -> bool {
    std::io::stderr().is_terminal()
}

/// Spinner with `message`, ticking until finished
pub fn spinner(message: &str) -> ProgressBar {
    if !interactive() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar counting `len` units of work
pub fn bar(len: u64, message: &str) -> ProgressBar {
    if !interactive() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(message.to_string());
    pb
}

/// Await `future` while a spinner shows `message`
pub async fn with_spinner<T, F>(message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let pb = spinner(message);
    let output = future.await;
    pb.finish_and_clear();
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_spinner_returns_output() {
        let value = with_spinner("Loading problems...", async { 42 }).await;
        assert_eq!(value, 42);
    }

    #[test]
    fn test_bar_tracks_position() {
        let pb = bar(3, "Importing");
        pb.inc(2);
        if !pb.is_hidden() {
            assert_eq!(pb.position(), 2);
        }
        pb.finish_and_clear();
    }
}
