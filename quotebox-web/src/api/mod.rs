//! HTTP handlers for quotebox-web

pub mod add;
pub mod admin;
pub mod health;
pub mod json;
pub mod pages;
pub mod vote;

pub use add::{add_quote, add_quote_form};
pub use admin::{get_settings, login, login_form, logout, require_staff, update_settings};
pub use health::health_routes;
pub use json::{api_random, api_top};
pub use pages::{dashboard, home, quote_detail, random_partial, top};
pub use vote::vote;

use axum::http::{header, HeaderMap};

use crate::error::ApiResult;
use crate::session::Session;
use crate::ui::Chrome;
use crate::AppState;

/// Navigation state for this visitor, from the cached settings
pub(crate) async fn chrome(state: &AppState, session: &Session) -> ApiResult<Chrome> {
    let settings = state.settings.get(&state.db).await?;
    Ok(Chrome {
        can_add: settings.can_add_quotes(session.is_staff),
        is_staff: session.is_staff,
    })
}

/// Absolute permalink for a quote
///
/// Uses the configured public base URL, else the request's Host header,
/// else a site-relative path.
pub(crate) fn permalink(state: &AppState, headers: &HeaderMap, quote_id: i64) -> String {
    let path = format!("/q/{}/", quote_id);
    if let Some(base) = &state.public_base_url {
        return format!("{}{}", base, path);
    }
    match headers.get(header::HOST).and_then(|h| h.to_str().ok()) {
        Some(host) if !host.is_empty() => format!("http://{}{}", host, path),
        _ => path,
    }
}

/// `?exclude=` accepts digits only; anything else means no exclusion
pub(crate) fn parse_exclude(raw: Option<&str>) -> Option<i64> {
    raw.filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
}
