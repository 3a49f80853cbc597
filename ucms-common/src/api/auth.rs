//! Admin authorization via bearer token
//!
//! The admin panel sends `Authorization: Bearer <token>`. The presented token
//! is compared against the configured admin token through SHA-256 digests so
//! the comparison does not short-circuit on the first differing byte of the
//! secret itself.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies here; the axum middleware lives in the
//! service crate.

use sha2::{Digest, Sha256};

/// Authorization failure reasons
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or not a bearer credential
    MissingToken,
    /// Token present but does not match
    InvalidToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::InvalidToken => write!(f, "Invalid bearer token"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Extract the token from an `Authorization` header value
///
/// # Examples
///
/// ```
/// use ucms_common::api::bearer_token;
///
/// assert_eq!(bearer_token("Bearer abc"), Some("abc"));
/// assert_eq!(bearer_token("Basic abc"), None);
/// ```
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Check a presented `Authorization` header against the expected admin token
pub fn verify_admin_token(header_value: Option<&str>, expected: &str) -> Result<(), AuthError> {
    let presented = header_value
        .and_then(bearer_token)
        .ok_or(AuthError::MissingToken)?;

    let presented_digest = Sha256::digest(presented.as_bytes());
    let expected_digest = Sha256::digest(expected.as_bytes());

    let diff = presented_digest
        .iter()
        .zip(expected_digest.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    if diff == 0 {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}
