//! Shared-password gate for the dashboard.
//!
//! Only the SHA-256 digest of the secret is kept. A correct password mints a
//! random session token, stored in memory and handed out as an `HttpOnly`
//! cookie; sessions last until logout or server restart. At most
//! `MAX_SESSIONS` are kept, the oldest is dropped when a new one would
//! exceed it.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "pico_session";

/// Default cap on concurrently remembered sessions.
pub const MAX_SESSIONS: usize = 1024;

/// Hex-encoded SHA-256 of some bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Live session tokens, oldest first.
#[derive(Debug, Default)]
struct Sessions {
    tokens: HashSet<String>,
    order: VecDeque<String>,
}

impl Sessions {
    fn insert(&mut self, token: String, limit: usize) {
        while self.order.len() >= limit.max(1) {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.tokens.remove(&oldest);
                    debug!("Dropped oldest dashboard session");
                }
                None => break,
            }
        }
        self.tokens.insert(token.clone());
        self.order.push_back(token);
    }

    fn remove(&mut self, token: &str) -> bool {
        if !self.tokens.remove(token) {
            return false;
        }
        self.order.retain(|t| t != token);
        true
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }
}

/// Password gate state.
#[derive(Debug)]
pub struct PasswordGate {
    digest: Option<String>,
    sessions: Mutex<Sessions>,
    session_limit: usize,
}

impl Default for PasswordGate {
    fn default() -> Self {
        Self {
            digest: None,
            sessions: Mutex::new(Sessions::default()),
            session_limit: MAX_SESSIONS,
        }
    }
}

impl PasswordGate {
    /// A gate that lets everyone through.
    pub fn open() -> Self {
        Self::default()
    }

    /// Gate on a plain-text secret.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            digest: Some(sha256_hex(secret.as_bytes())),
            ..Self::default()
        }
    }

    /// Gate on a hex SHA-256 digest of the secret.
    pub fn from_digest(digest: &str) -> Self {
        Self {
            digest: Some(digest.trim().to_lowercase()),
            ..Self::default()
        }
    }

    /// Change how many sessions are remembered at once.
    pub fn with_session_limit(mut self, limit: usize) -> Self {
        self.session_limit = limit;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    /// Check a candidate password.
    pub fn verify(&self, candidate: &str) -> bool {
        match self.digest {
            None => true,
            Some(ref expected) => {
                let actual = sha256_hex(candidate.as_bytes());
                let ok = constant_time_eq(actual.as_bytes(), expected.as_bytes());
                if !ok {
                    warn!("Rejected dashboard password");
                }
                ok
            }
        }
    }

    /// Mint and remember a new session token.
    pub fn create_session(&self) -> String {
        let bytes: [u8; 32] = rand::random();
        let token = hex::encode(bytes);
        let active = {
            let mut sessions = self.lock_sessions();
            sessions.insert(token.clone(), self.session_limit);
            sessions.len()
        };
        info!("Dashboard session opened ({} active)", active);
        token
    }

    /// Whether a request may see the dashboard.
    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        if !self.is_enabled() {
            return true;
        }
        match session_token(headers) {
            Some(token) => self.lock_sessions().tokens.contains(token),
            None => false,
        }
    }

    /// Forget the session carried by a request, if any.
    pub fn end_session(&self, headers: &HeaderMap) {
        if let Some(token) = session_token(headers) {
            if self.lock_sessions().remove(token) {
                debug!("Dashboard session closed");
            }
        }
    }

    /// Number of sessions currently remembered.
    #[cfg(test)]
    pub fn session_count(&self) -> usize {
        self.lock_sessions().len()
    }

    fn lock_sessions(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `Set-Cookie` value for a session token.
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// `Set-Cookie` value that clears the session cookie.
pub fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Session token from the request's `Cookie` headers.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_open_gate_allows_everyone() {
        let gate = PasswordGate::open();
        assert!(!gate.is_enabled());
        assert!(gate.is_authorized(&HeaderMap::new()));
        assert!(gate.verify("anything"));
    }

    #[test]
    fn test_verify_secret() {
        let gate = PasswordGate::from_secret("s3cret");
        assert!(gate.is_enabled());
        assert!(gate.verify("s3cret"));
        assert!(!gate.verify("S3cret"));
        assert!(!gate.verify(""));
    }

    #[test]
    fn test_verify_digest() {
        let digest = sha256_hex(b"s3cret").to_uppercase();
        let gate = PasswordGate::from_digest(&digest);
        assert!(gate.verify("s3cret"));
        assert!(!gate.verify("wrong"));
    }

    #[test]
    fn test_session_lifecycle() {
        let gate = PasswordGate::from_secret("s3cret");
        assert!(!gate.is_authorized(&HeaderMap::new()));

        let token = gate.create_session();
        assert_eq!(token.len(), 64);

        let headers = headers_with_cookie(&format!("theme=dark; {}={}", SESSION_COOKIE, token));
        assert!(gate.is_authorized(&headers));
        // Repeated checks stay authorized.
        assert!(gate.is_authorized(&headers));

        gate.end_session(&headers);
        assert!(!gate.is_authorized(&headers));
    }

    #[test]
    fn test_session_limit_drops_oldest() {
        let gate = PasswordGate::from_secret("s3cret").with_session_limit(2);
        let first = gate.create_session();
        let second = gate.create_session();
        let third = gate.create_session();

        assert_eq!(gate.session_count(), 2);
        let cookie = |token: &str| headers_with_cookie(&format!("{}={}", SESSION_COOKIE, token));
        assert!(!gate.is_authorized(&cookie(&first)));
        assert!(gate.is_authorized(&cookie(&second)));
        assert!(gate.is_authorized(&cookie(&third)));

        gate.end_session(&cookie(&second));
        assert_eq!(gate.session_count(), 1);
        let fourth = gate.create_session();
        assert_eq!(gate.session_count(), 2);
        assert!(gate.is_authorized(&cookie(&third)));
        assert!(gate.is_authorized(&cookie(&fourth)));
    }

    #[test]
    fn test_default_session_limit() {
        let gate = PasswordGate::from_secret("s3cret");
        for _ in 0..MAX_SESSIONS + 5 {
            gate.create_session();
        }
        assert_eq!(gate.session_count(), MAX_SESSIONS);
    }

    #[test]
    fn test_unknown_token_rejected() {
        let gate = PasswordGate::from_secret("s3cret");
        gate.create_session();
        let headers = headers_with_cookie(&format!("{}=forged", SESSION_COOKIE));
        assert!(!gate.is_authorized(&headers));

        let headers = headers_with_cookie(&format!("{}=", SESSION_COOKIE));
        assert!(!gate.is_authorized(&headers));
    }

    #[test]
    fn test_cookie_values() {
        assert_eq!(
            session_cookie("abc"),
            "pico_session=abc; Path=/; HttpOnly; SameSite=Lax"
        );
        assert!(expired_cookie().contains("Max-Age=0"));
    }
}
