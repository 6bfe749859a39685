//! Compact JWT payload inspection.
//!
//! Tokens are never verified here (the server owns the signing key); the
//! client only reads the `exp` claim to decide whether a token is still worth
//! sending.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Refresh is attempted once a token is this close to expiring (5 minutes)
pub const REFRESH_HORIZON_SECS: i64 = 5 * 60;

/// Claims the client cares about
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch; may be fractional
    pub exp: f64,

    /// Subject (the username for Syntexa tokens)
    #[serde(default)]
    #[allow(dead_code)]
    pub sub: Option<String>,
}

impl TokenClaims {
    /// Expiry in milliseconds since the Unix epoch
    pub fn exp_millis(&self) -> i64 {
        (self.exp * 1000.0) as i64
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.exp_millis())
    }
}

/// Decode base64url (URL-safe base64, padding optional)
fn base64_decode_url(input: &str) -> std::result::Result<Vec<u8>, String> {
    // Accept both alphabets; some issuers emit standard base64 segments
    let standard_b64 = input.replace('-', "+").replace('_', "/");
    let trimmed = standard_b64.trim_end_matches('=');

    let padding = match trimmed.len() % 4 {
        0 => "",
        2 => "==",
        3 => "=",
        _ => return Err("Invalid base64url length".to_string()),
    };

    general_purpose::STANDARD
        .decode(format!("{}{}", trimmed, padding))
        .map_err(|e| e.to_string())
}

/// Decode the payload (middle) segment of a compact JWT.
pub fn decode_claims(token: &str) -> std::result::Result<TokenClaims, String> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next()) {
        (Some(_), Some(payload)) if !payload.is_empty() => payload,
        _ => return Err("Token is not in compact JWT form".to_string()),
    };

    let bytes = base64_decode_url(payload)?;
    serde_json::from_slice(&bytes).map_err(|e| format!("Failed to parse token payload: {}", e))
}

/// Whether `token` is expired at `now`.
///
/// A token is live only while `exp` (converted to milliseconds) is strictly
/// after `now`. Anything that cannot be decoded counts as expired.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp * 1000.0 <= now.timestamp_millis() as f64,
        Err(e) => {
            log::debug!("Treating undecodable token as expired: {}", e);
            true
        }
    }
}

/// Whether `token` is expired right now
pub fn is_token_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// Time left before `token` expires, `None` if undecodable or already expired
pub fn time_until_expiry(token: &str, now: DateTime<Utc>) -> Option<Duration> {
    let claims = decode_claims(token).ok()?;
    let remaining =
        Duration::milliseconds(claims.exp_millis().saturating_sub(now.timestamp_millis()));
    (remaining > Duration::zero()).then_some(remaining)
}

/// Whether `token` is live but inside the refresh horizon
pub fn should_refresh_at(token: &str, now: DateTime<Utc>) -> bool {
    time_until_expiry(token, now).is_some_and(|left| left < Duration::seconds(REFRESH_HORIZON_SECS))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_past_exp_is_expired() {
        assert!(is_token_expired(&token_expiring_in(-10)));
    }

    #[test]
    fn test_future_exp_is_not_expired() {
        assert!(!is_token_expired(&token_expiring_in(600)));
    }

    #[test]
    fn test_exp_equal_to_now_is_expired() {
        let now = Utc::now();
        let token = token_with_payload(&format!(r#"{{"exp":{}}}"#, now.timestamp()));
        let at_exp = DateTime::from_timestamp(now.timestamp(), 0).unwrap();
        assert!(is_expired_at(&token, at_exp));
    }

    #[test]
    fn test_fractional_exp() {
        let now = Utc::now();
        let live = token_with_payload(&format!(r#"{{"exp":{}.5}}"#, now.timestamp() + 600));
        assert!(!is_expired_at(&live, now));
        assert!(time_until_expiry(&live, now).is_some_and(|left| left > Duration::seconds(600)));

        let at = DateTime::from_timestamp(now.timestamp(), 0).unwrap();
        let half_past = token_with_payload(&format!(r#"{{"exp":{}.5}}"#, now.timestamp()));
        assert!(!is_expired_at(&half_past, at));
        assert!(is_expired_at(&half_past, at + Duration::milliseconds(500)));
    }

    #[test]
    fn test_undecodable_tokens_are_expired() {
        assert!(is_token_expired(""));
        assert!(is_token_expired("not-a-jwt"));
        assert!(is_token_expired("a.!!!.c"));
        assert!(is_token_expired(&token_with_payload("not json")));
        assert!(is_token_expired(&token_with_payload(r#"{"sub":"no-exp"}"#)));
    }

    #[test]
    fn test_padded_standard_alphabet_payload_decodes() {
        use base64::engine::general_purpose::STANDARD;
        let exp = Utc::now().timestamp() + 600;
        let payload = STANDARD.encode(format!(r#"{{"exp":{}}}"#, exp));
        let token = format!("h.{}.s", payload);
        assert!(!is_token_expired(&token));
    }

    #[test]
    fn test_claims_carry_subject() {
        let claims = decode_claims(&token_expiring_in(60)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));
        assert!(claims.expires_at().is_some());
    }

    #[test]
    fn test_should_refresh_inside_horizon_only() {
        let now = Utc::now();
        assert!(should_refresh_at(&token_expiring_in(120), now));
        assert!(!should_refresh_at(&token_expiring_in(3600), now));
        assert!(!should_refresh_at(&token_expiring_in(-5), now));
        assert!(!should_refresh_at("garbage", now));
    }

    #[test]
    fn test_time_until_expiry() {
        let now = Utc::now();
        let left = time_until_expiry(&token_expiring_in(600), now).unwrap();
        assert!(left <= Duration::seconds(601));
        assert!(left > Duration::seconds(590));
        assert!(time_until_expiry(&token_expiring_in(-1), now).is_none());
    }
}
