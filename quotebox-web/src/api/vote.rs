//! Like / dislike

use axum::{
    extract::State,
    response::Redirect,
    Extension, Form,
};
use quotebox_common::votes::{self, VoteOutcome};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VoteForm {
    pub quote_id: Option<String>,
    pub action: Option<String>,
}

/// POST /vote/
///
/// One vote per quote per session; voting again with the other action
/// flips it. Redirects home (303) on success.
pub async fn vote(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<VoteForm>,
) -> ApiResult<Redirect> {
    let quote_id = form
        .quote_id
        .as_deref()
        .map(str::trim)
        .and_then(|id| id.parse::<i64>().ok());
    let action = form.action.as_deref().map(str::trim);

    let (Some(quote_id), Some(action)) = (quote_id, action) else {
        return Err(ApiError::BadRequest("invalid data".to_string()));
    };

    let outcome = votes::cast_vote(&state.db, quote_id, &session.id, action).await?;
    if outcome == VoteOutcome::Unchanged {
        debug!("Repeat vote on quote {} ignored", quote_id);
    }

    Ok(Redirect::to("/"))
}
