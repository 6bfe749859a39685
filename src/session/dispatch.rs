//! Authorization header construction for authenticated API calls.
//!
//! An [`AuthHeader`] can only be built from a live session, so any call that
//! takes one has already passed the validity check.

use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use super::manager::SessionManager;
use super::store::SessionStore;
use crate::client::AuthApi;
use crate::error::{ApiError, Result, SessionError};

/// `Authorization: Bearer <token>` for one request
#[derive(Clone)]
pub struct AuthHeader {
    value: HeaderValue,
}

impl AuthHeader {
    pub(crate) fn bearer(token: &str) -> std::result::Result<Self, SessionError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        value.set_sensitive(true);
        Ok(Self { value })
    }

    #[cfg(test)]
    pub fn value(&self) -> &str {
        self.value.to_str().unwrap_or_default()
    }

    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.value.clone());
        headers
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthHeader(Bearer <redacted>)")
    }
}

impl<A: AuthApi, S: SessionStore> SessionManager<A, S> {
    /// Header for an authenticated call.
    ///
    /// Fails with [`ApiError::Unauthenticated`] when there is no valid token;
    /// an expired credential is cleared on the way.
    pub fn auth_header(&self) -> Result<AuthHeader> {
        let token = self.valid_token().ok_or(ApiError::Unauthenticated)?;
        Ok(AuthHeader::bearer(&token)?)
    }

    /// Like [`auth_header`](Self::auth_header), but refreshes a token that is
    /// about to expire first. A failed refresh falls back to the current token.
    pub async fn smart_auth_header(&self) -> Result<AuthHeader> {
        self.smart_token().await;
        self.auth_header()
    }
}
