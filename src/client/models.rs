//! Request and response models for the Syntexa REST API

use serde::{Deserialize, Serialize};

/// Body of `POST /auth/signup`
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Generic `{success, message}` envelope used by the auth endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default)]
    pub message: Option<String>,
}

/// A coding problem with its attached notes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Problem reference embedded in a note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemRef {
    pub id: i64,

    #[serde(default)]
    pub title: Option<String>,
}

/// Public part of a note's author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteAuthor {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub username: Option<String>,
}

/// An "approach" note attached to a problem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,

    pub approach_title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub author: Option<NoteAuthor>,

    #[serde(default)]
    pub problem: Option<ProblemRef>,

    #[serde(default)]
    pub problem_id: Option<i64>,

    #[serde(default)]
    pub problem_title: Option<String>,

    #[serde(default)]
    pub share_token: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,
}

impl Note {
    /// Title of the problem this note belongs to, from whichever field the
    /// endpoint populated
    pub fn problem_title(&self) -> Option<&str> {
        self.problem_title
            .as_deref()
            .or_else(|| self.problem.as_ref().and_then(|p| p.title.as_deref()))
    }

    pub fn problem_id(&self) -> Option<i64> {
        self.problem_id.or_else(|| self.problem.as_ref().map(|p| p.id))
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.username.as_deref())
    }
}

/// Body of `POST /problems`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemRequest {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of note create/update requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    pub approach_title: String,

    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Profile returned by `GET /notes/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,

    pub username: String,

    #[serde(default)]
    pub email: Option<String>,
}
