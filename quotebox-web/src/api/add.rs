//! Quote submission form

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use quotebox_common::submission::{self, SourceChoice, SubmissionRequest, WeightInput};
use quotebox_common::{catalog, Error, ValidationErrors};
use serde::Deserialize;
use tracing::info;

use super::chrome;
use crate::error::ApiResult;
use crate::session::Session;
use crate::ui::{self, AddFormValues};
use crate::AppState;

const LOGIN_REDIRECT: &str = "/admin/login/?next=/add/";

#[derive(Debug, Default, Deserialize)]
pub struct AddQuoteForm {
    pub text: Option<String>,
    pub source_id: Option<String>,
    pub new_source_title: Option<String>,
    pub new_source_kind: Option<String>,
    pub weight: Option<String>,
}

impl AddQuoteForm {
    fn values(&self) -> AddFormValues {
        AddFormValues {
            text: self.text.clone().unwrap_or_default(),
            source_id: self.source_id.clone().unwrap_or_default(),
            new_source_title: self.new_source_title.clone().unwrap_or_default(),
            new_source_kind: self.new_source_kind.clone().unwrap_or_default(),
            weight: self.weight.clone().unwrap_or_default(),
        }
    }

    fn to_request(&self) -> SubmissionRequest {
        SubmissionRequest {
            text: self.text.clone().unwrap_or_default(),
            source: SourceChoice::from_form(
                self.source_id.as_deref(),
                self.new_source_title.as_deref(),
                self.new_source_kind.as_deref(),
            ),
            weight: WeightInput::parse(self.weight.as_deref()),
        }
    }
}

/// Redirect to the staff login when submissions are staff-only
async fn login_gate(state: &AppState, session: &Session) -> ApiResult<Option<Response>> {
    let settings = state.settings.get(&state.db).await?;
    if settings.submission_requires_staff(session.is_staff) {
        return Ok(Some(Redirect::to(LOGIN_REDIRECT).into_response()));
    }
    Ok(None)
}

async fn render_form(
    state: &AppState,
    session: &Session,
    values: &AddFormValues,
    errors: Option<&ValidationErrors>,
) -> ApiResult<String> {
    let chrome = chrome(state, session).await?;
    let sources = catalog::list_sources(&state.db).await?;
    Ok(ui::page("Add a quote", chrome, &ui::add_form(&sources, values, errors)).0)
}

/// GET /add/
pub async fn add_quote_form(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Response> {
    if let Some(redirect) = login_gate(&state, &session).await? {
        return Ok(redirect);
    }

    let html = render_form(&state, &session, &AddFormValues::default(), None).await?;
    Ok(Html(html).into_response())
}

/// POST /add/
///
/// 303 to the new quote's permalink, or 422 with the form and its errors.
pub async fn add_quote(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<AddQuoteForm>,
) -> ApiResult<Response> {
    if let Some(redirect) = login_gate(&state, &session).await? {
        return Ok(redirect);
    }

    match submission::submit_quote(&state.db, form.to_request()).await {
        Ok(quote) => {
            info!("Quote {} submitted by session {}", quote.id, session.id);
            Ok(Redirect::to(&format!("/q/{}/", quote.id)).into_response())
        }
        Err(Error::Validation(errors)) => {
            let html = render_form(&state, &session, &form.values(), Some(&errors)).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
