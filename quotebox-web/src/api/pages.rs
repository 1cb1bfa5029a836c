//! Public HTML pages: random quote, fragment, permalink, top and dashboard

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Html,
    Extension,
};
use quotebox_common::ranking::{self, DEFAULT_LIMIT};
use quotebox_common::selection;
use quotebox_common::SourceKind;
use serde::Deserialize;

use super::{chrome, parse_exclude, permalink};
use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::ui;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExcludeQuery {
    pub exclude: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KindQuery {
    pub kind: Option<String>,
}

/// GET /
///
/// Weighted random quote, avoiding `?exclude=` when possible. Counts a view.
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(query): Query<ExcludeQuery>,
) -> ApiResult<Html<String>> {
    let chrome = chrome(&state, &session).await?;
    let exclude = parse_exclude(query.exclude.as_deref());

    let body = match selection::serve_random(&state.db, exclude).await? {
        Some(served) => {
            let share_url = permalink(&state, &headers, served.quote.quote.id);
            ui::quote_card(&served, &share_url)
        }
        None => ui::empty_catalog(chrome.can_add),
    };

    Ok(ui::page("Random quote", chrome, &body))
}

/// GET /random/
///
/// The quote card alone, for in-place refresh.
pub async fn random_partial(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Query(query): Query<ExcludeQuery>,
) -> ApiResult<Html<String>> {
    let exclude = parse_exclude(query.exclude.as_deref());

    match selection::serve_random(&state.db, exclude).await? {
        Some(served) => {
            let share_url = permalink(&state, &headers, served.quote.quote.id);
            Ok(Html(ui::quote_card(&served, &share_url)))
        }
        None => {
            let chrome = chrome(&state, &session).await?;
            Ok(Html(ui::empty_catalog(chrome.can_add)))
        }
    }
}

/// GET /q/:id/
pub async fn quote_detail(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    // Non-numeric ids are simply unknown pages
    let quote_id: i64 = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Quote {}", id)))?;

    let served = selection::serve_quote(&state.db, quote_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Quote {}", quote_id)))?;

    let chrome = chrome(&state, &session).await?;
    let share_url = permalink(&state, &headers, quote_id);
    Ok(ui::page(
        &format!("Quote #{}", quote_id),
        chrome,
        &ui::quote_card(&served, &share_url),
    ))
}

/// GET /top/
pub async fn top(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Html<String>> {
    let chrome = chrome(&state, &session).await?;
    let quotes = ranking::top_quotes(&state.db, DEFAULT_LIMIT).await?;

    Ok(ui::page(
        "Top 10",
        chrome,
        &ui::ranked_table("Top 10 quotes", &quotes),
    ))
}

/// GET /dashboard/
///
/// An unrecognized `kind` shows every kind.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<KindQuery>,
) -> ApiResult<Html<String>> {
    let chrome = chrome(&state, &session).await?;
    let kind = query
        .kind
        .as_deref()
        .and_then(|k| k.parse::<SourceKind>().ok());

    let board = ranking::dashboard_breakdown(&state.db, kind).await?;

    let body = format!(
        "<h1>Dashboard</h1>\n{}\n{}\n{}\n{}",
        ui::kind_filter(board.kind),
        ui::ranked_table("Most viewed", &board.most_viewed),
        ui::ranked_table("Most liked", &board.most_liked),
        ui::ranked_table("Most disliked", &board.most_disliked),
    );
    Ok(ui::page("Dashboard", chrome, &body))
}
