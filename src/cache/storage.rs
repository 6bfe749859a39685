//! SQLite-backed cache storage

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CacheError;

/// Schema version - increment to drop and rebuild the database
const SCHEMA_VERSION: i32 = 1;

const DB_FILE: &str = "cache.db";

type Result<T> = std::result::Result<T, CacheError>;

/// Cached API responses, one row per key
pub struct CacheStorage {
    conn: Connection,
}

impl CacheStorage {
    /// Open or create the cache at the platform cache location
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::cache_dir()?)
    }

    /// Cache directory (`~/.cache/syntexa` on Linux)
    pub fn cache_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(base.join("syntexa"))
    }

    /// Open cache storage in `cache_dir`
    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = cache_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)?;

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);
        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            std::fs::remove_file(&db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
            return Self::open_at(cache_dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                cache_key TEXT PRIMARY KEY NOT NULL,
                host TEXT NOT NULL,
                endpoint TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_responses_expires ON responses(expires_at);
            CREATE INDEX IF NOT EXISTS idx_responses_endpoint ON responses(host, endpoint);
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self { conn })
    }

    /// Cached body for `key`, unless expired
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM responses WHERE cache_key = ?1 AND expires_at > ?2",
                params![key, Utc::now().timestamp()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(body)
    }

    /// Store `body` under `key` for `ttl`
    pub fn put(&self, key: &str, body: &str, host: &str, endpoint: &str, ttl: Duration) -> Result<()> {
        let now = Utc::now().timestamp();
        let expires = now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));

        self.conn.execute(
            "INSERT OR REPLACE INTO responses
             (cache_key, host, endpoint, body, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![key, host, endpoint, body, now, expires],
        )?;
        Ok(())
    }

    /// Remove every entry
    pub fn clear_all(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM responses", [])?)
    }

    /// Remove all entries of one endpoint for `host`; returns how many
    pub fn delete_by_endpoint(&self, host: &str, endpoint: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM responses WHERE host = ?1 AND endpoint = ?2",
            params![host, endpoint],
        )?;
        Ok(deleted)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now().timestamp();

        let (total, valid, size, oldest, newest): (i64, i64, i64, Option<i64>, Option<i64>) =
            self.conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(expires_at > ?1), 0),
                        COALESCE(SUM(LENGTH(body)), 0),
                        MIN(CASE WHEN expires_at > ?1 THEN created_at END),
                        MAX(CASE WHEN expires_at > ?1 THEN created_at END)
                 FROM responses",
                [now],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )?;

        Ok(CacheStats {
            total_entries: total as usize,
            valid_entries: valid as usize,
            expired_entries: (total - valid) as usize,
            total_size_bytes: size as usize,
            oldest_entry: oldest,
            newest_entry: newest,
        })
    }
}

/// Snapshot of cache contents
#[derive(Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: usize,
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}
