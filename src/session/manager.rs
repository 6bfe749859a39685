//! Session lifecycle: login, signup, logout and token validity

use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::credential::Credential;
use super::dispatch::AuthHeader;
use super::store::{FileStore, SessionStore};
use super::token;
use crate::client::{ApiMessage, AuthApi, LoginRequest, SignupRequest};
use crate::error::{ApiError, Error, Result};

/// Observable state of the persisted credential
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing stored, or the stored record is unreadable
    Absent,
    /// Token present and not yet expired
    Valid(Credential),
    /// Token was expired; the credential has been cleared
    Expired,
}

/// Owns the persisted credential.
///
/// Nothing else reads or writes the session store; callers go through these
/// accessors and obtain request headers via [`auth_header`](Self::auth_header).
pub struct SessionManager<A, S = FileStore> {
    auth: Arc<A>,
    store: S,
    refresh_guard: Mutex<Option<CancellationToken>>,
}

impl<A: AuthApi, S: SessionStore> SessionManager<A, S> {
    pub fn new(auth: Arc<A>, store: S) -> Self {
        Self {
            auth,
            store,
            refresh_guard: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Log in and persist the full response body as the session credential
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let body = self.auth.login(&request).await?;

        let credential = Credential::from_response(body)?.ok_or_else(|| {
            ApiError::InvalidResponse("Login response did not include a token".to_string())
        })?;
        self.store.save(&credential.to_json()?)?;

        info!("Logged in as {}", username);
        Ok(credential)
    }

    /// Register a new account. The session is left untouched.
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Result<ApiMessage> {
        let request = SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.auth.signup(&request).await
    }

    /// Drop the stored credential and stop any background refresh
    pub fn logout(&self) -> Result<()> {
        if let Some(cancel) = self.refresh_guard.lock().ok().and_then(|mut g| g.take()) {
            cancel.cancel();
        }
        self.store.clear()?;
        debug!("Session cleared");
        Ok(())
    }

    /// Stored credential, `None` if absent or unreadable
    pub fn current_user(&self) -> Option<Credential> {
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read session: {}", e);
                return None;
            }
        };

        match Credential::parse(&raw) {
            Ok(credential) => Some(credential),
            Err(e) => {
                debug!("Ignoring stored session: {}", e);
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.current_user().map(|c| c.token)
    }

    pub fn is_token_expired(&self, token: &str) -> bool {
        token::is_token_expired(token)
    }

    /// Token of a live session. An expired credential is cleared first.
    pub fn valid_token(&self) -> Option<String> {
        let token = self.token()?;
        if self.is_token_expired(&token) {
            info!("Session token has expired; logging out");
            self.clear_quietly();
            return None;
        }
        Some(token)
    }

    /// Classify the stored credential, clearing it when expired
    pub fn state(&self) -> SessionState {
        let Some(credential) = self.current_user() else {
            return SessionState::Absent;
        };
        if self.is_token_expired(&credential.token) {
            self.clear_quietly();
            return SessionState::Expired;
        }
        SessionState::Valid(credential)
    }

    /// Valid token, refreshed first when it is inside the refresh horizon.
    ///
    /// Refresh is best effort: on failure the current token is returned.
    pub async fn smart_token(&self) -> Option<String> {
        let token = self.valid_token()?;
        if !token::should_refresh_at(&token, Utc::now()) {
            return Some(token);
        }

        match self.refresh_now().await {
            Ok(credential) => Some(credential.token),
            Err(e) => {
                warn!("Token refresh failed, using current token: {}", e);
                Some(token)
            }
        }
    }

    /// Exchange the current token for a fresh one and persist it
    pub async fn refresh_now(&self) -> Result<Credential> {
        let token = self.valid_token().ok_or(ApiError::Unauthenticated)?;
        let header = AuthHeader::bearer(&token)?;
        let body = self.auth.refresh(&header).await?;

        let fresh = Credential::from_response(body)?.ok_or_else(|| {
            ApiError::InvalidResponse("Refresh response did not include a token".to_string())
        })?;

        // Only replace the credential that was refreshed
        let current = match self.current_user() {
            Some(current) if current.token == token => current,
            Some(current) => return Ok(current),
            None => return Err(ApiError::Unauthenticated.into()),
        };

        let credential = merge_profile(fresh, current);
        self.store.save(&credential.to_json()?)?;
        debug!("Session token refreshed");
        Ok(credential)
    }

    /// Map a server `401` on an authenticated call to a cleared session
    pub fn handle_unauthorized<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Err(Error::Api(ApiError::Rejected { status: 401, .. })) => {
                info!("Server rejected the session token; logging out");
                self.clear_quietly();
                Err(ApiError::Unauthenticated.into())
            }
            other => other,
        }
    }

    /// Tie a background task's cancellation to this session
    pub(crate) fn register_refresh(&self, cancel: CancellationToken) {
        if let Ok(mut guard) = self.refresh_guard.lock()
            && let Some(previous) = guard.replace(cancel)
        {
            previous.cancel();
        }
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.logout() {
            warn!("Failed to clear session: {}", e);
        }
    }
}

/// Refresh responses may omit profile fields; keep the ones already stored
fn merge_profile(mut fresh: Credential, previous: Credential) -> Credential {
    if fresh.username.is_empty() {
        fresh.username = previous.username;
    }
    fresh.id = fresh.id.or(previous.id);
    fresh.email = fresh.email.or(previous.email);
    fresh.token_type = fresh.token_type.or(previous.token_type);
    for (key, value) in previous.extra {
        fresh.extra.entry(key).or_insert(value);
    }
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockSyntexaClient;
    use crate::session::store::MemoryStore;
    use crate::session::token::testing::{token_expiring_in, token_with_payload};
    use serde_json::json;

    async fn session_with(
        mock: MockSyntexaClient,
        store: MemoryStore,
    ) -> (Arc<MockSyntexaClient>, SessionManager<MockSyntexaClient, MemoryStore>) {
        let mock = Arc::new(mock);
        (Arc::clone(&mock), SessionManager::new(mock, store))
    }

    fn record(token: &str) -> String {
        format!(r#"{{"token":"{}","username":"alice","email":"a@x.io"}}"#, token)
    }

    #[tokio::test]
    async fn test_absent_or_malformed_credential_is_none() {
        let (_, session) = session_with(MockSyntexaClient::new(), MemoryStore::default()).await;
        assert!(session.current_user().is_none());
        assert!(session.token().is_none());

        for raw in ["", "{garbage", "[]", r#"{"username":"alice"}"#] {
            let (_, session) =
                session_with(MockSyntexaClient::new(), MemoryStore::with_record(raw)).await;
            assert!(session.current_user().is_none(), "record {:?}", raw);
            assert_eq!(session.state(), SessionState::Absent);
        }
    }

    #[tokio::test]
    async fn test_login_persists_whole_body() {
        let mock = MockSyntexaClient::new()
            .with_login_response(json!({"token": "t", "type": "Bearer", "id": 3, "username": "u"}))
            .await;
        let (mock, session) = session_with(mock, MemoryStore::default()).await;

        let credential = session.login("u", "p").await.unwrap();
        assert_eq!(credential.token, "t");
        assert_eq!(session.current_user().unwrap().token, "t");
        assert_eq!(session.current_user().unwrap().id, Some(3));
        assert_eq!(mock.call_counts().await.login, 1);
    }

    #[tokio::test]
    async fn test_login_with_null_profile_fields_persists_token() {
        let token = token_expiring_in(3600);
        let mock = MockSyntexaClient::new()
            .with_login_response(json!({
                "token": token,
                "type": "Bearer",
                "id": 1,
                "username": null,
                "email": null
            }))
            .await;
        let (_, session) = session_with(mock, MemoryStore::default()).await;

        let credential = session.login("alice", "p").await.unwrap();
        assert_eq!(credential.token, token);
        assert_eq!(session.current_user().unwrap().token, token);
        assert_eq!(session.valid_token(), Some(token));
    }

    #[tokio::test]
    async fn test_fractional_exp_keeps_session() {
        let exp = chrono::Utc::now().timestamp() + 600;
        let token = token_with_payload(&format!(r#"{{"sub":"alice","exp":{}.5}}"#, exp));
        let store = MemoryStore::with_record(&record(&token));
        let (_, session) = session_with(MockSyntexaClient::new(), store).await;

        assert!(!session.is_token_expired(&token));
        assert_eq!(session.valid_token(), Some(token));
        assert!(session.store().load().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_without_token_persists_nothing() {
        let mock = MockSyntexaClient::new()
            .with_login_response(json!({"success": true, "message": "hello"}))
            .await;
        let (_, session) = session_with(mock, MemoryStore::default()).await;

        let err = session.login("u", "p").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::InvalidResponse(_))));
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_login_rejection_message_is_surfaced() {
        let mock = MockSyntexaClient::new()
            .with_error(ApiError::Rejected {
                status: 401,
                message: "Invalid username or password.".to_string(),
            })
            .await;
        let (_, session) = session_with(mock, MemoryStore::default()).await;

        let err = session.login("u", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password.");
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_login_timeout_message() {
        let mock = MockSyntexaClient::new().with_error(ApiError::Timeout).await;
        let (_, session) = session_with(mock, MemoryStore::default()).await;

        let err = session.login("u", "p").await.unwrap_err();
        assert_eq!(err.to_string(), "Request timed out. Please try again.");
    }

    #[tokio::test]
    async fn test_signup_does_not_log_in() {
        let (mock, session) = session_with(MockSyntexaClient::new(), MemoryStore::default()).await;

        let message = session.signup("bob", "b@x.io", "hunter22").await.unwrap();
        assert_eq!(message.success, Some(true));
        assert!(session.current_user().is_none());
        assert_eq!(mock.call_counts().await.signup, 1);
    }

    #[tokio::test]
    async fn test_logout_clears_credential() {
        let store = MemoryStore::with_record(&record(&token_expiring_in(600)));
        let (mock, session) = session_with(MockSyntexaClient::new(), store).await;

        session.logout().unwrap();
        assert!(session.current_user().is_none());
        session.logout().unwrap();
        assert_eq!(mock.call_counts().await.total(), 0);
    }

    #[tokio::test]
    async fn test_valid_token_clears_expired_credential() {
        let store = MemoryStore::with_record(&record(&token_expiring_in(-10)));
        let (_, session) = session_with(MockSyntexaClient::new(), store).await;

        assert!(session.valid_token().is_none());
        assert!(session.store().load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_valid_token_clears_undecodable_token() {
        let store = MemoryStore::with_record(&record("opaque"));
        let (_, session) = session_with(MockSyntexaClient::new(), store).await;

        assert!(session.current_user().is_some());
        assert!(session.valid_token().is_none());
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let token = token_expiring_in(600);
        let (_, session) =
            session_with(MockSyntexaClient::new(), MemoryStore::with_record(&record(&token)))
                .await;
        match session.state() {
            SessionState::Valid(credential) => assert_eq!(credential.token, token),
            other => panic!("expected valid session, got {:?}", other),
        }

        let expired = token_with_payload(r#"{"exp":1000}"#);
        let (_, session) =
            session_with(MockSyntexaClient::new(), MemoryStore::with_record(&record(&expired)))
                .await;
        assert_eq!(session.state(), SessionState::Expired);
        assert_eq!(session.state(), SessionState::Absent);
    }

    #[tokio::test]
    async fn test_smart_token_refreshes_inside_horizon() {
        let fresh = token_expiring_in(3600);
        let mock = MockSyntexaClient::new()
            .with_refresh_response(json!({"token": fresh, "type": "Bearer"}))
            .await;
        let store = MemoryStore::with_record(&record(&token_expiring_in(120)));
        let (mock, session) = session_with(mock, store).await;

        assert_eq!(session.smart_token().await.as_deref(), Some(fresh.as_str()));

        let stored = session.current_user().unwrap();
        assert_eq!(stored.token, fresh);
        assert_eq!(stored.username, "alice");
        assert_eq!(stored.email.as_deref(), Some("a@x.io"));
        assert_eq!(mock.call_counts().await.refresh, 1);
    }

    #[tokio::test]
    async fn test_smart_token_falls_back_when_refresh_fails() {
        let old = token_expiring_in(120);
        let store = MemoryStore::with_record(&record(&old));
        let (mock, session) = session_with(MockSyntexaClient::new(), store).await;

        assert_eq!(session.smart_token().await.as_deref(), Some(old.as_str()));
        assert_eq!(session.token().as_deref(), Some(old.as_str()));
        assert_eq!(mock.call_counts().await.refresh, 1);
    }

    #[tokio::test]
    async fn test_smart_token_skips_refresh_far_from_expiry() {
        let token = token_expiring_in(3600);
        let store = MemoryStore::with_record(&record(&token));
        let (mock, session) = session_with(MockSyntexaClient::new(), store).await;

        assert_eq!(session.smart_token().await.as_deref(), Some(token.as_str()));
        assert_eq!(mock.call_counts().await.refresh, 0);
    }

    #[tokio::test]
    async fn test_refresh_now_requires_session() {
        let (mock, session) = session_with(MockSyntexaClient::new(), MemoryStore::default()).await;

        let err = session.refresh_now().await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Unauthenticated)));
        assert_eq!(mock.call_counts().await.refresh, 0);
    }

    #[tokio::test]
    async fn test_refresh_sends_current_token() {
        let old = token_expiring_in(600);
        let mock = MockSyntexaClient::new()
            .with_refresh_response(json!({"token": token_expiring_in(3600)}))
            .await;
        let (mock, session) =
            session_with(mock, MemoryStore::with_record(&record(&old))).await;

        session.refresh_now().await.unwrap();
        assert_eq!(mock.auth_headers().await, vec![format!("Bearer {}", old)]);
    }

    #[tokio::test]
    async fn test_unauthorized_response_clears_session() {
        let store = MemoryStore::with_record(&record(&token_expiring_in(600)));
        let (_, session) = session_with(MockSyntexaClient::new(), store).await;

        let rejected: Result<()> = Err(ApiError::Rejected {
            status: 401,
            message: "Unauthorized".to_string(),
        }
        .into());
        let err = session.handle_unauthorized(rejected).unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Unauthenticated)));
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_other_errors_keep_session() {
        let store = MemoryStore::with_record(&record(&token_expiring_in(600)));
        let (_, session) = session_with(MockSyntexaClient::new(), store).await;

        let forbidden: Result<()> = Err(ApiError::Rejected {
            status: 403,
            message: "Forbidden".to_string(),
        }
        .into());
        assert!(session.handle_unauthorized(forbidden).is_err());
        assert!(session.current_user().is_some());
        assert_eq!(session.handle_unauthorized(Ok(7)).unwrap(), 7);
    }

    #[tokio::test]
    async fn test_file_backed_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let token = token_expiring_in(600);

        let mock = MockSyntexaClient::new()
            .with_login_response(json!({"token": token, "username": "alice"}))
            .await;
        let session = SessionManager::new(Arc::new(mock), FileStore::new(&path));
        session.login("alice", "pw").await.unwrap();

        let reopened = SessionManager::new(Arc::new(MockSyntexaClient::new()), FileStore::new(&path));
        assert_eq!(reopened.valid_token().as_deref(), Some(token.as_str()));

        reopened.logout().unwrap();
        assert!(!path.exists());
    }
}
