//! Mock Syntexa API client for testing
//!
//! Keeps problems and notes in memory and answers like the real server, so
//! session and command logic can be exercised without network access.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::models::{
    ApiMessage, LoginRequest, Note, NoteAuthor, NoteRequest, Problem, ProblemRef, ProblemRequest,
    SignupRequest, UserProfile,
};
use super::{AuthApi, ProblemApi};
use crate::error::{ApiError, Result};
use crate::session::AuthHeader;

/// Mock API client for testing.
///
/// Configure responses via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockSyntexaClient::new()
///     .with_login_response(json!({"token": token, "username": "alice"}))
///     .await;
/// ```
pub struct MockSyntexaClient {
    /// Problem catalog, notes nested inside each problem
    problems: Arc<Mutex<Vec<Problem>>>,
    /// Body returned from login
    login_response: Arc<Mutex<Value>>,
    /// Body returned from refresh; `None` makes refresh fail with a 500
    refresh_response: Arc<Mutex<Option<Value>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Authorization header values seen, in call order
    auth_headers: Arc<Mutex<Vec<String>>>,
    next_id: Arc<Mutex<i64>>,
}

impl Default for MockSyntexaClient {
    fn default() -> Self {
        Self {
            problems: Arc::new(Mutex::new(Vec::new())),
            login_response: Arc::new(Mutex::new(json!({"success": false}))),
            refresh_response: Arc::new(Mutex::new(None)),
            error: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            auth_headers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(100)),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub signup: usize,
    pub login: usize,
    pub refresh: usize,
    pub list_problems: usize,
    pub get_problem: usize,
    pub create_problem: usize,
    pub add_note: usize,
    pub update_note: usize,
    pub delete_note: usize,
    pub share_note: usize,
    pub my_notes: usize,
    pub profile: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.signup
            + self.login
            + self.refresh
            + self.list_problems
            + self.get_problem
            + self.create_problem
            + self.add_note
            + self.update_note
            + self.delete_note
            + self.share_note
            + self.my_notes
            + self.profile
    }
}

impl MockSyntexaClient {
    /// Create a new mock client with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the problem catalog.
    pub async fn with_problems(self, problems: Vec<Problem>) -> Self {
        *self.problems.lock().await = problems;
        self
    }

    /// Configure the body returned from login.
    pub async fn with_login_response(self, body: Value) -> Self {
        *self.login_response.lock().await = body;
        self
    }

    /// Configure the body returned from refresh.
    pub async fn with_refresh_response(self, body: Value) -> Self {
        *self.refresh_response.lock().await = Some(body);
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Queue an error on an already-built client.
    pub async fn fail_next(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    /// Get the call counts for verification.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Authorization header values seen so far.
    pub async fn auth_headers(&self) -> Vec<String> {
        self.auth_headers.lock().await.clone()
    }

    pub async fn problems(&self) -> Vec<Problem> {
        self.problems.lock().await.clone()
    }

    /// Check if there's a pending error and consume it.
    async fn check_error(&self) -> Result<()> {
        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }
        Ok(())
    }

    async fn record_auth(&self, auth: &AuthHeader) {
        self.auth_headers
            .lock()
            .await
            .push(auth.value().to_string());
    }

    async fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().await;
        *id += 1;
        *id
    }

    fn bearer_name(auth: &AuthHeader) -> String {
        auth.value()
            .strip_prefix("Bearer ")
            .and_then(|t| crate::session::token::decode_claims(t).ok())
            .and_then(|c| c.sub)
            .unwrap_or_else(|| "mock-user".to_string())
    }
}

fn problem_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Problem {} not found", id))
}

fn note_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Note {} not found", id))
}

// ============================================================================
// AuthApi Implementation
// ============================================================================

#[async_trait]
impl AuthApi for MockSyntexaClient {
    async fn signup(&self, request: &SignupRequest) -> Result<ApiMessage> {
        self.check_error().await?;
        self.call_count.lock().await.signup += 1;

        Ok(ApiMessage {
            success: Some(true),
            message: Some(format!("User {} registered successfully!", request.username)),
        })
    }

    async fn login(&self, _request: &LoginRequest) -> Result<Value> {
        self.check_error().await?;
        self.call_count.lock().await.login += 1;

        Ok(self.login_response.lock().await.clone())
    }

    async fn refresh(&self, auth: &AuthHeader) -> Result<Value> {
        self.record_auth(auth).await;
        self.check_error().await?;
        self.call_count.lock().await.refresh += 1;

        match self.refresh_response.lock().await.clone() {
            Some(body) => Ok(body),
            None => Err(ApiError::Rejected {
                status: 500,
                message: "Request failed with status code 500".to_string(),
            }
            .into()),
        }
    }
}

// ============================================================================
// ProblemApi Implementation
// ============================================================================

#[async_trait]
impl ProblemApi for MockSyntexaClient {
    async fn list_problems(&self) -> Result<Vec<Problem>> {
        self.check_error().await?;
        self.call_count.lock().await.list_problems += 1;

        Ok(self.problems.lock().await.clone())
    }

    async fn get_problem(&self, id: i64) -> Result<Problem> {
        self.check_error().await?;
        self.call_count.lock().await.get_problem += 1;

        self.problems
            .lock()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| problem_not_found(id).into())
    }

    async fn create_problem(&self, auth: &AuthHeader, request: &ProblemRequest) -> Result<Problem> {
        self.record_auth(auth).await;
        self.check_error().await?;
        self.call_count.lock().await.create_problem += 1;

        let problem = Problem {
            id: self.next_id().await,
            title: request.title.clone(),
            description: request.description.clone(),
            notes: Vec::new(),
        };
        self.problems.lock().await.push(problem.clone());
        Ok(problem)
    }

    async fn add_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        request: &NoteRequest,
    ) -> Result<Note> {
        self.record_auth(auth).await;
        self.check_error().await?;
        self.call_count.lock().await.add_note += 1;

        let id = self.next_id().await;
        let mut problems = self.problems.lock().await;
        let problem = problems
            .iter_mut()
            .find(|p| p.id == problem_id)
            .ok_or_else(|| problem_not_found(problem_id))?;

        let note = Note {
            id,
            approach_title: request.approach_title.clone(),
            content: request.content.clone(),
            language: request.language.clone(),
            author: Some(NoteAuthor {
                id: Some(1),
                username: Some(Self::bearer_name(auth)),
            }),
            problem: Some(ProblemRef {
                id: problem.id,
                title: Some(problem.title.clone()),
            }),
            problem_id: None,
            problem_title: None,
            share_token: None,
            created_at: None,
        };
        problem.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        note_id: i64,
        request: &NoteRequest,
    ) -> Result<Note> {
        self.record_auth(auth).await;
        self.check_error().await?;
        self.call_count.lock().await.update_note += 1;

        let mut problems = self.problems.lock().await;
        let note = problems
            .iter_mut()
            .find(|p| p.id == problem_id)
            .and_then(|p| p.notes.iter_mut().find(|n| n.id == note_id))
            .ok_or_else(|| note_not_found(note_id))?;

        note.approach_title = request.approach_title.clone();
        note.content = request.content.clone();
        note.language = request.language.clone();
        Ok(note.clone())
    }

    async fn delete_note(&self, auth: &AuthHeader, problem_id: i64, note_id: i64) -> Result<()> {
        self.record_auth(auth).await;
        self.check_error().await?;
        self.call_count.lock().await.delete_note += 1;

        let mut problems = self.problems.lock().await;
        let problem = problems
            .iter_mut()
            .find(|p| p.id == problem_id)
            .ok_or_else(|| problem_not_found(problem_id))?;
        let before = problem.notes.len();
        problem.notes.retain(|n| n.id != note_id);
        if problem.notes.len() == before {
            return Err(note_not_found(note_id).into());
        }
        Ok(())
    }

    async fn share_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        note_id: i64,
    ) -> Result<String> {
        self.record_auth(auth).await;
        self.check_error().await?;
        self.call_count.lock().await.share_note += 1;

        let token = format!("share-{}-{}", problem_id, note_id);
        Ok(format!("/api/v1/notes/shared/{}", token))
    }

    async fn my_notes(&self, auth: &AuthHeader) -> Result<Vec<Note>> {
        self.record_auth(auth).await;
        self.check_error().await?;
        self.call_count.lock().await.my_notes += 1;

        let me = Self::bearer_name(auth);
        Ok(self
            .problems
            .lock()
            .await
            .iter()
            .flat_map(|p| p.notes.iter())
            .filter(|n| n.author_name() == Some(me.as_str()))
            .cloned()
            .collect())
    }

    async fn profile(&self, auth: &AuthHeader) -> Result<UserProfile> {
        self.record_auth(auth).await;
        self.check_error().await?;
        self.call_count.lock().await.profile += 1;

        Ok(UserProfile {
            id: Some(1),
            username: Self::bearer_name(auth),
            email: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> AuthHeader {
        AuthHeader::bearer("not-a-jwt").unwrap()
    }

    #[tokio::test]
    async fn test_mock_one_shot_error() {
        let mock = MockSyntexaClient::new()
            .with_error(ApiError::Timeout)
            .await;

        assert!(mock.list_problems().await.is_err());
        assert!(mock.list_problems().await.is_ok());
        assert_eq!(mock.call_counts().await.list_problems, 1);
    }

    #[tokio::test]
    async fn test_mock_note_lifecycle() {
        let mock = MockSyntexaClient::new();
        let auth = header();

        let problem = mock
            .create_problem(
                &auth,
                &ProblemRequest {
                    title: "Two Sum".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let note = mock
            .add_note(
                &auth,
                problem.id,
                &NoteRequest {
                    approach_title: "Hash map".to_string(),
                    content: "complements".to_string(),
                    language: Some("rust".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(note.problem_title(), Some("Two Sum"));
        assert_eq!(mock.my_notes(&auth).await.unwrap().len(), 1);

        mock.delete_note(&auth, problem.id, note.id).await.unwrap();
        assert!(mock.delete_note(&auth, problem.id, note.id).await.is_err());
        assert_eq!(mock.auth_headers().await[0], "Bearer not-a-jwt");
    }
}
