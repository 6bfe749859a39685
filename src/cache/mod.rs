//! Local cache for public API reads
//!
//! Problem listings and details are cached in SQLite so repeated lookups
//! during a session don't hit the (slow to wake) API host. Anything that
//! needs a session is never cached.

pub mod client;
pub mod key;
pub mod storage;

use std::time::Duration;

/// Cache TTL per endpoint
pub struct CacheTtl;

impl CacheTtl {
    // New problems appear whenever anyone imports
    pub const PROBLEMS: Duration = Duration::from_secs(5 * 60); // 5 min

    // Notes hang off the problem detail and change more often
    pub const PROBLEM: Duration = Duration::from_secs(60); // 1 min
}

/// Endpoint labels stored alongside entries, used for invalidation
pub mod endpoint {
    pub const LIST_PROBLEMS: &str = "list_problems";
    pub const GET_PROBLEM: &str = "get_problem";
}

pub use client::CachedClient;
pub use key::cache_key;
pub use storage::CacheStorage;
