//! Syntexa API client
//!
//! The API surface is split into two traits:
//! - [`AuthApi`] - signup, login and token refresh
//! - [`ProblemApi`] - problem catalog and notes
//!
//! [`SyntexaApi`] combines both and is what the CLI and the cache layer are
//! generic over.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::AuthHeader;

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod syntexa;

#[cfg(test)]
pub use mock::MockSyntexaClient;
pub use models::{
    ApiMessage, LoginRequest, Note, NoteRequest, Problem, ProblemRequest, SignupRequest,
    UserProfile,
};
pub use syntexa::SyntexaClient;

/// Authentication endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Register a new account. Does not log in.
    async fn signup(&self, request: &SignupRequest) -> Result<ApiMessage>;

    /// Exchange username/password for a token.
    ///
    /// Returns the raw response body so the caller can persist all of it.
    async fn login(&self, request: &LoginRequest) -> Result<serde_json::Value>;

    /// Exchange a still-valid token for a fresh one
    async fn refresh(&self, auth: &AuthHeader) -> Result<serde_json::Value>;
}

/// Problem catalog and note endpoints.
///
/// Calls that take an [`AuthHeader`] require a live session; the header can
/// only be obtained from the session manager.
#[async_trait]
pub trait ProblemApi: Send + Sync {
    async fn list_problems(&self) -> Result<Vec<Problem>>;

    async fn get_problem(&self, id: i64) -> Result<Problem>;

    async fn create_problem(&self, auth: &AuthHeader, request: &ProblemRequest) -> Result<Problem>;

    async fn add_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        request: &NoteRequest,
    ) -> Result<Note>;

    async fn update_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        note_id: i64,
        request: &NoteRequest,
    ) -> Result<Note>;

    async fn delete_note(&self, auth: &AuthHeader, problem_id: i64, note_id: i64) -> Result<()>;

    /// Create a public share link; returns the server-relative share path
    async fn share_note(&self, auth: &AuthHeader, problem_id: i64, note_id: i64)
    -> Result<String>;

    /// Notes authored by the session user
    async fn my_notes(&self, auth: &AuthHeader) -> Result<Vec<Note>>;

    /// Profile of the session user
    async fn profile(&self, auth: &AuthHeader) -> Result<UserProfile>;
}

/// Full Syntexa API
pub trait SyntexaApi: AuthApi + ProblemApi {}

impl<T: AuthApi + ProblemApi> SyntexaApi for T {}
