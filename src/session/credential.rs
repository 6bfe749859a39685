//! The persisted session credential

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, SessionError};

/// Session credential as returned by `POST /auth/login`.
///
/// The whole login response is kept; fields the client does not model are
/// preserved in `extra` so the stored record matches what the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Compact-serialized JWT
    pub token: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,

    /// Token type, `Bearer` for Syntexa
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Profile fields read as absent when null or not of the modeled type

fn lenient_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    lenient_opt_string(de).map(Option::unwrap_or_default)
}

fn lenient_id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl Credential {
    /// Parse a stored record, rejecting anything without a usable token
    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        let credential: Credential =
            serde_json::from_str(raw).map_err(|e| SessionError::Malformed(e.to_string()))?;
        if credential.token.trim().is_empty() {
            return Err(SessionError::Malformed("token is empty".to_string()));
        }
        Ok(credential)
    }

    /// Build a credential from a login/refresh response body.
    ///
    /// `Ok(None)` when the body carries no token; an error when it does but
    /// cannot be read as a credential.
    pub fn from_response(body: Value) -> Result<Option<Self>, ApiError> {
        let has_token = body
            .get("token")
            .and_then(Value::as_str)
            .is_some_and(|t| !t.trim().is_empty());
        if !has_token {
            return Ok(None);
        }
        serde_json::from_value(body)
            .map(Some)
            .map_err(|e| ApiError::InvalidResponse(format!("Unreadable session response: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
