//! Staff credentials
//!
//! Staff status is proven by a cookie holding SHA-256 of
//! `"<staff_password>:<session_id>"`. The token is tied to one session and
//! becomes worthless when the password changes. With no password
//! configured nobody is staff.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies; cookie plumbing lives in the web crate.

use sha2::{Digest, Sha256};

/// Staff token for a session, as 64 hex characters
///
/// # Examples
///
/// ```
/// use quotebox_common::staff::calculate_staff_token;
///
/// let token = calculate_staff_token("hunter2", "session-a");
/// assert_eq!(token.len(), 64);
/// assert_ne!(token, calculate_staff_token("hunter2", "session-b"));
/// ```
pub fn calculate_staff_token(staff_password: &str, session_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(staff_password.as_bytes());
    hasher.update(b":");
    hasher.update(session_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a presented token against the configured password
pub fn validate_staff_token(
    staff_password: Option<&str>,
    session_id: &str,
    presented: &str,
) -> bool {
    match staff_password {
        Some(password) if !password.is_empty() && !session_id.is_empty() => {
            calculate_staff_token(password, session_id) == presented
        }
        _ => false,
    }
}

/// Check a login attempt
pub fn password_matches(staff_password: Option<&str>, attempt: &str) -> bool {
    match staff_password {
        Some(password) if !password.is_empty() => password == attempt,
        _ => false,
    }
}
