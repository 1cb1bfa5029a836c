//! Staff login and the settings admin API
//!
//! Staff status is a cookie bound to the visitor's session (see
//! [`crate::session`]). `/api/settings` sits behind [`require_staff`].

use axum::{
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use quotebox_common::staff::password_matches;
use quotebox_common::settings::SettingsPatch;
use quotebox_common::AppSettings;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::chrome;
use crate::error::{ApiError, ApiResult};
use crate::session::{clear_staff_cookie, staff_cookie, Session};
use crate::ui;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub password: Option<String>,
    pub next: Option<String>,
}

/// Only same-site paths are followed after login
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// GET /admin/login/
pub async fn login_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<NextQuery>,
) -> ApiResult<Response> {
    let next = safe_next(query.next.as_deref());
    if session.is_staff {
        return Ok(Redirect::to(&next).into_response());
    }

    let chrome = chrome(&state, &session).await?;
    let notice = state
        .staff_password
        .is_none()
        .then_some("Staff login is not configured on this server.");
    Ok(ui::page("Staff login", chrome, &ui::login_form(&next, notice)).into_response())
}

/// POST /admin/login/
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let next = safe_next(form.next.as_deref());
    let attempt = form.password.unwrap_or_default();

    match state.staff_password.as_deref() {
        Some(password) if password_matches(Some(password), &attempt) => {
            info!("Staff login for session {}", session.id);
            Ok((
                AppendHeaders([(header::SET_COOKIE, staff_cookie(password, &session.id))]),
                Redirect::to(&next),
            )
                .into_response())
        }
        _ => {
            warn!("Failed staff login for session {}", session.id);
            let chrome = chrome(&state, &session).await?;
            let html = ui::page(
                "Staff login",
                chrome,
                &ui::login_form(&next, Some("Incorrect password.")),
            );
            Ok((StatusCode::UNAUTHORIZED, html).into_response())
        }
    }
}

/// POST /admin/logout/
pub async fn logout(Extension(session): Extension<Session>) -> Response {
    if session.is_staff {
        info!("Staff logout for session {}", session.id);
    }
    (
        AppendHeaders([(header::SET_COOKIE, clear_staff_cookie())]),
        Redirect::to("/"),
    )
        .into_response()
}

/// Reject non-staff requests with 403
pub async fn require_staff(
    Extension(session): Extension<Session>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !session.is_staff {
        return Err(ApiError::Forbidden("Staff login required".to_string()));
    }
    Ok(next.run(request).await)
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub ok: bool,
    pub data: AppSettings,
    pub mode: String,
}

impl From<AppSettings> for SettingsResponse {
    fn from(settings: AppSettings) -> Self {
        Self {
            ok: true,
            mode: settings.current_mode().to_string(),
            data: settings,
        }
    }
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SettingsResponse>> {
    let settings = state.settings.reload(&state.db).await?;
    Ok(Json(settings.into()))
}

/// PUT /api/settings
///
/// Omitted fields keep their stored value. The cache is reloaded so every
/// page sees the change.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Json<SettingsResponse>> {
    let saved = state.settings.patch(&state.db, &patch).await?;
    info!("Settings changed: {}", saved.current_mode());
    Ok(Json(saved.into()))
}
