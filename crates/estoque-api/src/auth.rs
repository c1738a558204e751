//! Login against an injected credential check.
//!
//! The stock crates never see credentials. A front end holds an
//! `Arc<dyn Authenticator>` (normally inside [`crate::AppState`]) and calls
//! [`login`] before it opens a session.

use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};

/// Decides whether a username/password pair may log in.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> bool;
}

/// A single configured credential pair.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        StaticCredentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, username: &str, password: &str) -> bool {
        // Evaluate both comparisons so a wrong username costs the same as a wrong password
        let user_ok = constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let pass_ok = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        user_ok & pass_ok
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Who logged in. The front end stores this in its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub username: String,
}

/// Checks credentials and returns the session user.
pub fn login(
    authenticator: &dyn Authenticator,
    username: &str,
    password: &str,
) -> ApiResult<SessionUser> {
    let start = Instant::now();
    let username = username.trim();

    if username.is_empty() || !authenticator.authenticate(username, password) {
        warn!(username = %username, "Login rejected");
        return Err(ApiError::unauthorized());
    }

    info!(
        username = %username,
        elapsed_ms = start.elapsed().as_millis(),
        "Login accepted"
    );

    Ok(SessionUser {
        username: username.to_string(),
    })
}
