//! Syntexa API client implementation

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{
    ApiMessage, LoginRequest, Note, NoteRequest, Problem, ProblemRequest, SignupRequest,
    UserProfile,
};
use super::{AuthApi, ProblemApi};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::session::AuthHeader;

/// Client-side request budget: 10 requests per second
const RATE_LIMIT_PER_SECOND: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Race `future` against a timer; the loser is dropped.
pub async fn with_timeout<T, F>(future: F, timeout: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout.into()),
    }
}

/// Syntexa API client
pub struct SyntexaClient {
    http: HttpClient,
    api_base: String,
    auth_base: String,
    timeout: Duration,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl SyntexaClient {
    /// Create a client for the hosts and timeout in `config`
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_urls(config.api_base_url(), config.auth_base_url(), config.timeout())
    }

    /// Create a client with explicit base URLs
    pub fn with_urls(
        api_base: impl Into<String>,
        auth_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(concat!("syntexa-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(RATE_LIMIT_PER_SECOND)));

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            auth_base: auth_base.into().trim_end_matches('/').to_string(),
            timeout,
            rate_limiter,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}{}", self.auth_base, path)
    }

    fn request(&self, method: Method, url: &str, auth: Option<&AuthHeader>) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match auth {
            Some(header) => builder.headers(header.to_header_map()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    ///
    /// The whole exchange, including reading the body, races the client
    /// timeout. Non-2xx statuses become [`ApiError::Rejected`] with the
    /// server's message when it sent one.
    async fn execute(&self, request: RequestBuilder) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let exchange = async {
            let response = request.send().await.map_err(ApiError::from)?;
            let status = response.status();
            let body = response.text().await.map_err(ApiError::from)?;
            Ok((status, body))
        };
        let (status, body): (StatusCode, String) = with_timeout(exchange, self.timeout).await?;

        debug!("-> {}", status);
        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
        })
    }
}

/// Share endpoints answer with a bare path; tolerate a JSON-quoted string too
fn parse_share_path(body: &str) -> Result<String> {
    let trimmed = body.trim();
    let path = serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string());
    if path.is_empty() {
        return Err(ApiError::InvalidResponse("Empty share link".to_string()).into());
    }
    Ok(path)
}

#[async_trait]
impl AuthApi for SyntexaClient {
    async fn signup(&self, request: &SignupRequest) -> Result<ApiMessage> {
        let url = self.auth_url("/signup");
        let body = self
            .execute(self.request(Method::POST, &url, None).json(request))
            .await?;
        // The server may answer 201 with an envelope or with nothing at all
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn login(&self, request: &LoginRequest) -> Result<serde_json::Value> {
        let url = self.auth_url("/login");
        self.execute_json(self.request(Method::POST, &url, None).json(request))
            .await
    }

    async fn refresh(&self, auth: &AuthHeader) -> Result<serde_json::Value> {
        let url = self.auth_url("/refresh");
        self.execute_json(self.request(Method::POST, &url, Some(auth)))
            .await
    }
}

#[async_trait]
impl ProblemApi for SyntexaClient {
    async fn list_problems(&self) -> Result<Vec<Problem>> {
        let url = self.api_url("/problems");
        self.execute_json(self.request(Method::GET, &url, None))
            .await
    }

    async fn get_problem(&self, id: i64) -> Result<Problem> {
        let url = self.api_url(&format!("/problems/{}", id));
        self.execute_json(self.request(Method::GET, &url, None))
            .await
            .map_err(|e| match e {
                crate::error::Error::Api(ApiError::NotFound(_)) => {
                    ApiError::NotFound(format!("Problem {} not found", id)).into()
                }
                other => other,
            })
    }

    async fn create_problem(&self, auth: &AuthHeader, request: &ProblemRequest) -> Result<Problem> {
        let url = self.api_url("/problems");
        self.execute_json(self.request(Method::POST, &url, Some(auth)).json(request))
            .await
    }

    async fn add_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        request: &NoteRequest,
    ) -> Result<Note> {
        let url = self.api_url(&format!("/problems/{}/notes", problem_id));
        self.execute_json(self.request(Method::POST, &url, Some(auth)).json(request))
            .await
    }

    async fn update_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        note_id: i64,
        request: &NoteRequest,
    ) -> Result<Note> {
        let url = self.api_url(&format!("/problems/{}/notes/{}", problem_id, note_id));
        self.execute_json(self.request(Method::PUT, &url, Some(auth)).json(request))
            .await
    }

    async fn delete_note(&self, auth: &AuthHeader, problem_id: i64, note_id: i64) -> Result<()> {
        let url = self.api_url(&format!("/problems/{}/notes/{}", problem_id, note_id));
        self.execute(self.request(Method::DELETE, &url, Some(auth)))
            .await?;
        Ok(())
    }

    async fn share_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        note_id: i64,
    ) -> Result<String> {
        let url = self.api_url(&format!("/problems/{}/notes/{}/share", problem_id, note_id));
        let body = self
            .execute(self.request(Method::POST, &url, Some(auth)))
            .await?;
        parse_share_path(&body)
    }

    async fn my_notes(&self, auth: &AuthHeader) -> Result<Vec<Note>> {
        let url = self.api_url("/notes/mine");
        self.execute_json(self.request(Method::GET, &url, Some(auth)))
            .await
    }

    async fn profile(&self, auth: &AuthHeader) -> Result<UserProfile> {
        let url = self.api_url("/notes/me");
        self.execute_json(self.request(Method::GET, &url, Some(auth)))
            .await
    }
}
