//! Background token refresh.
//!
//! The task sleeps until the token enters the refresh horizon, refreshes it,
//! and repeats. It ends when the session ends: on logout, on an expired
//! token, or when the [`RefreshTask`] handle is stopped or dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::manager::SessionManager;
use super::store::SessionStore;
use super::token::{self, REFRESH_HORIZON_SECS};
use crate::client::AuthApi;

/// Wait after a failed refresh before trying again
pub const RETRY_DELAY: Duration = Duration::from_secs(30);

/// Handle to a running refresh task; dropping it cancels the task
pub struct RefreshTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    /// Cancel the task and wait for it to finish
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!("Refresh task ended abnormally: {}", e);
        }
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Time to sleep before the next refresh of `token`
fn delay_before_refresh(token: &str) -> Duration {
    token::time_until_expiry(token, Utc::now())
        .map(|left| left - chrono::Duration::seconds(REFRESH_HORIZON_SECS))
        .and_then(|wait| wait.to_std().ok())
        .unwrap_or(Duration::ZERO)
}

impl<A, S> SessionManager<A, S>
where
    A: AuthApi + 'static,
    S: SessionStore + 'static,
{
    /// Start refreshing the session token in the background.
    ///
    /// Only one task runs per session; starting another cancels the previous.
    pub fn spawn_refresh(self: &Arc<Self>) -> RefreshTask {
        let cancel = CancellationToken::new();
        self.register_refresh(cancel.clone());

        let session = Arc::clone(self);
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move { session.run_refresh(task_cancel).await });

        RefreshTask {
            cancel,
            handle: Some(handle),
        }
    }

    async fn run_refresh(&self, cancel: CancellationToken) {
        loop {
            let Some(current) = self.valid_token() else {
                debug!("No live session, refresh task exiting");
                break;
            };

            let delay = delay_before_refresh(&current);
            debug!("Next token refresh in {}s", delay.as_secs());
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = self.refresh_now() => outcome,
            };

            let backoff = match outcome {
                Ok(credential) => token::should_refresh_at(&credential.token, Utc::now()),
                Err(e) => {
                    warn!("Background token refresh failed: {}", e);
                    true
                }
            };

            if backoff {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }
    }
}
