//! Visitor sessions and the staff cookie
//!
//! Every request passes through [`session_middleware`], which reads the
//! `qb_session` cookie (issuing a fresh UUIDv4 when absent or malformed)
//! and checks `qb_staff` against the configured password. Handlers read
//! the result with `Extension<Session>`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use quotebox_common::staff::{calculate_staff_token, validate_staff_token};
use tracing::debug;
use uuid::Uuid;

use crate::AppState;

pub const SESSION_COOKIE: &str = "qb_session";
pub const STAFF_COOKIE: &str = "qb_staff";

const MAX_SESSION_LEN: usize = 64;

/// Per-request view of the visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub is_staff: bool,
    /// Cookie was issued on this request
    pub is_new: bool,
}

/// Value of one cookie from the `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

fn valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Resolve the session and staff status, issuing a session cookie if needed
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = cookie_value(request.headers(), SESSION_COOKIE).filter(|id| valid_session_id(id));

    let (id, is_new) = match existing {
        Some(id) => (id, false),
        None => {
            let id = Uuid::new_v4().to_string();
            debug!("Issuing session {}", id);
            (id, true)
        }
    };

    let is_staff = cookie_value(request.headers(), STAFF_COOKIE)
        .map(|token| validate_staff_token(state.staff_password.as_deref(), &id, &token))
        .unwrap_or(false);

    let session = Session {
        id: id.clone(),
        is_staff,
        is_new,
    };
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;

    if is_new {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(&id)) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// `Set-Cookie` value granting staff status to `session_id`
pub fn staff_cookie(staff_password: &str, session_id: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        STAFF_COOKIE,
        calculate_staff_token(staff_password, session_id)
    )
}

/// `Set-Cookie` value removing the staff cookie
pub fn clear_staff_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", STAFF_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; qb_session=abc-123 ; qb_staff=ff"),
        );

        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("abc-123"));
        assert_eq!(cookie_value(&headers, STAFF_COOKIE).as_deref(), Some("ff"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_session_id_shape() {
        assert!(valid_session_id(&Uuid::new_v4().to_string()));
        assert!(!valid_session_id(""));
        assert!(!valid_session_id("a;b"));
        assert!(!valid_session_id(&"x".repeat(65)));
    }
}
