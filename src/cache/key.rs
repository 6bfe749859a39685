//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Deterministic cache key for a read against `host`.
///
/// Parameters are sorted first, so their order does not matter. The host is
/// part of the key so switching `--api-host` never serves another server's
/// data.
pub fn cache_key(endpoint: &str, host: &str, params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(host.as_bytes());
    hasher.update(b"|");
    hasher.update(endpoint.as_bytes());
    hasher.update(b"|");
    for (k, v) in sorted {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}
