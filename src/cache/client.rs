//! Cached wrapper for the Syntexa API client
//!
//! Public problem reads are served from SQLite when fresh; every successful
//! write drops the entries it could have made stale.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::{CacheStorage, CacheTtl, cache_key, endpoint};
use crate::client::models::{
    ApiMessage, LoginRequest, Note, NoteRequest, Problem, ProblemRequest, SignupRequest,
    UserProfile,
};
use crate::client::{AuthApi, ProblemApi, SyntexaApi};
use crate::error::Result;
use crate::session::AuthHeader;

/// Cached wrapper for any [`SyntexaApi`] implementation.
///
/// Disabled (`--no-cache`, or the cache could not be opened) means every call
/// goes straight to the inner client.
pub struct CachedClient<C: SyntexaApi> {
    inner: Arc<C>,
    host: String,
    cache: Option<Mutex<CacheStorage>>,
}

impl<C: SyntexaApi> CachedClient<C> {
    /// Wrap `inner`; `host` scopes cache entries to one API server
    pub fn new(inner: C, host: impl Into<String>, enabled: bool) -> Self {
        let storage = if enabled {
            match CacheStorage::open() {
                Ok(storage) => Some(storage),
                Err(e) => {
                    log::warn!("Response cache unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };
        Self::with_storage(inner, host, storage)
    }

    /// Wrap `inner` with an explicit storage
    pub fn with_storage(inner: C, host: impl Into<String>, storage: Option<CacheStorage>) -> Self {
        Self {
            inner: Arc::new(inner),
            host: host.into(),
            cache: storage.map(Mutex::new),
        }
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        let guard = cache.lock().ok()?;
        guard
            .get(key)
            .ok()
            .flatten()
            .and_then(|body| serde_json::from_str(&body).ok())
    }

    fn set_cached<T: Serialize>(&self, key: &str, data: &T, endpoint: &str, ttl: Duration) {
        if let Some(ref cache) = self.cache
            && let Ok(guard) = cache.lock()
            && let Ok(body) = serde_json::to_string(data)
            && let Err(e) = guard.put(key, &body, &self.host, endpoint, ttl)
        {
            log::debug!("Failed to cache {}: {}", endpoint, e);
        }
    }

    fn invalidate(&self, endpoints: &[&str]) {
        let Some(ref cache) = self.cache else {
            return;
        };
        let Ok(guard) = cache.lock() else {
            return;
        };
        for endpoint in endpoints {
            match guard.delete_by_endpoint(&self.host, endpoint) {
                Ok(n) if n > 0 => log::debug!("Invalidated {} cached {} entries", n, endpoint),
                Ok(_) => {}
                Err(e) => log::warn!("Failed to invalidate {}: {}", endpoint, e),
            }
        }
    }

    fn invalidate_problems(&self) {
        self.invalidate(&[endpoint::LIST_PROBLEMS, endpoint::GET_PROBLEM]);
    }
}

/// Auth calls are never cached
#[async_trait]
impl<C: SyntexaApi + 'static> AuthApi for CachedClient<C> {
    async fn signup(&self, request: &SignupRequest) -> Result<ApiMessage> {
        self.inner.signup(request).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<serde_json::Value> {
        self.inner.login(request).await
    }

    async fn refresh(&self, auth: &AuthHeader) -> Result<serde_json::Value> {
        self.inner.refresh(auth).await
    }
}

#[async_trait]
impl<C: SyntexaApi + 'static> ProblemApi for CachedClient<C> {
    async fn list_problems(&self) -> Result<Vec<Problem>> {
        let key = cache_key(endpoint::LIST_PROBLEMS, &self.host, &[]);

        if let Some(cached) = self.get_cached(&key) {
            log::debug!("Cache hit: list_problems");
            return Ok(cached);
        }

        let result = self.inner.list_problems().await?;
        self.set_cached(&key, &result, endpoint::LIST_PROBLEMS, CacheTtl::PROBLEMS);
        Ok(result)
    }

    async fn get_problem(&self, id: i64) -> Result<Problem> {
        let id_param = id.to_string();
        let key = cache_key(endpoint::GET_PROBLEM, &self.host, &[("id", id_param.as_str())]);

        if let Some(cached) = self.get_cached(&key) {
            log::debug!("Cache hit: get_problem {}", id);
            return Ok(cached);
        }

        let result = self.inner.get_problem(id).await?;
        self.set_cached(&key, &result, endpoint::GET_PROBLEM, CacheTtl::PROBLEM);
        Ok(result)
    }

    async fn create_problem(&self, auth: &AuthHeader, request: &ProblemRequest) -> Result<Problem> {
        let result = self.inner.create_problem(auth, request).await?;
        self.invalidate(&[endpoint::LIST_PROBLEMS]);
        Ok(result)
    }

    async fn add_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        request: &NoteRequest,
    ) -> Result<Note> {
        let result = self.inner.add_note(auth, problem_id, request).await?;
        self.invalidate_problems();
        Ok(result)
    }

    async fn update_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        note_id: i64,
        request: &NoteRequest,
    ) -> Result<Note> {
        let result = self
            .inner
            .update_note(auth, problem_id, note_id, request)
            .await?;
        self.invalidate_problems();
        Ok(result)
    }

    async fn delete_note(&self, auth: &AuthHeader, problem_id: i64, note_id: i64) -> Result<()> {
        self.inner.delete_note(auth, problem_id, note_id).await?;
        self.invalidate_problems();
        Ok(())
    }

    async fn share_note(
        &self,
        auth: &AuthHeader,
        problem_id: i64,
        note_id: i64,
    ) -> Result<String> {
        self.inner.share_note(auth, problem_id, note_id).await
    }

    async fn my_notes(&self, auth: &AuthHeader) -> Result<Vec<Note>> {
        self.inner.my_notes(auth).await
    }

    async fn profile(&self, auth: &AuthHeader) -> Result<UserProfile> {
        self.inner.profile(auth).await
    }
}
