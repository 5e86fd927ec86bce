//! HS256 JWT encode/decode, built on `hmac` + `sha2` + `base64`. Claims carried:
//! `sub`, `iss`, `iat`, `exp`. When `JwtEnabled=0` both directions
//! degrade to a pass-through mock token (bare username), matching the
//! original's mock-mode branch.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

const ISSUER: &str = "my-web-server";
const TTL_SECONDS: u64 = 15 * 60;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    MalformedToken,
    BadSignature,
    Expired,
    MissingSubject,
}

/// Issues a token for `username`. Mock mode returns the username itself
/// (the original's `strdup(username)` fallback).
pub fn encode(username: &str, secret: &str, enabled: bool) -> String {
    if !enabled {
        return username.to_string();
    }
    let now = now_unix();
    let header = r#"{"alg":"HS256","typ":"JWT"}"#;
    let claims = format!(
        r#"{{"sub":"{}","iss":"{}","iat":{},"exp":{}}}"#,
        escape(username),
        ISSUER,
        now,
        now + TTL_SECONDS
    );
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(&claims)
    );
    let signature = sign(&signing_input, secret);
    format!("{signing_input}.{signature}")
}

/// Validates a bearer token and returns the `sub` claim. Mock mode
/// accepts any non-empty token as the username, per the original's
/// `strlen(token) > 0` mock branch.
pub fn decode(token: &str, secret: &str, enabled: bool) -> Result<String, JwtError> {
    if !enabled {
        return if token.is_empty() {
            Err(JwtError::MalformedToken)
        } else {
            Ok(token.to_string())
        };
    }

    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(JwtError::MalformedToken)?;
    let claims_b64 = parts.next().ok_or(JwtError::MalformedToken)?;
    let signature_b64 = parts.next().ok_or(JwtError::MalformedToken)?;
    if parts.next().is_some() {
        return Err(JwtError::MalformedToken);
    }

    let signing_input = format!("{header_b64}.{claims_b64}");
    let expected = sign(&signing_input, secret);
    if !constant_time_eq(expected.as_bytes(), signature_b64.as_bytes()) {
        return Err(JwtError::BadSignature);
    }

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| JwtError::MalformedToken)?;
    let claims = crate::json::Value::parse(&claims_bytes).map_err(|_| JwtError::MalformedToken)?;

    if let Some(exp) = claims.get("exp").and_then(number_as_u64) {
        if now_unix() > exp {
            return Err(JwtError::Expired);
        }
    }

    claims
        .get("sub")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or(JwtError::MissingSubject)
}

fn number_as_u64(value: &crate::json::Value) -> Option<u64> {
    match value {
        crate::json::Value::Number(n) => Some(*n as u64),
        _ => None,
    }
}

fn sign(signing_input: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts a key of any length");
    mac.update(signing_input.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the epoch")
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_mode_round_trips_username() {
        let token = encode("alice", "unused", false);
        assert_eq!(token, "alice");
        assert_eq!(decode(&token, "unused", false), Ok("alice".to_string()));
    }

    #[test]
    fn mock_mode_rejects_empty_token() {
        assert_eq!(decode("", "unused", false), Err(JwtError::MalformedToken));
    }

    #[test]
    fn real_mode_round_trips_subject() {
        let token = encode("bob", "a-very-secret-and-long-key", true);
        assert_eq!(
            decode(&token, "a-very-secret-and-long-key", true),
            Ok("bob".to_string())
        );
    }

    #[test]
    fn real_mode_rejects_wrong_secret() {
        let token = encode("bob", "correct-secret-correct-secret", true);
        assert_eq!(
            decode(&token, "wrong-secret-wrong-secret-wr", true),
            Err(JwtError::BadSignature)
        );
    }

    #[test]
    fn real_mode_rejects_garbage_token() {
        assert_eq!(
            decode("not-a-jwt", "some-secret-some-secret-some", true),
            Err(JwtError::MalformedToken)
        );
    }
}
