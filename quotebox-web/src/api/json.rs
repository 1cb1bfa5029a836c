//! JSON API: random quote and top list
//!
//! Both responses carry `ok: true`; errors use the shared `ApiError` body.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use quotebox_common::ranking;
use quotebox_common::selection;
use quotebox_common::{Source, SourceKind};
use serde::{Deserialize, Serialize};

use super::pages::ExcludeQuery;
use super::{parse_exclude, permalink};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub id: i64,
    pub title: String,
    pub kind: SourceKind,
}

impl From<&Source> for SourceRef {
    fn from(source: &Source) -> Self {
        Self {
            id: source.id,
            title: source.title.clone(),
            kind: source.kind,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RandomQuoteData {
    pub id: i64,
    pub text: String,
    pub source: SourceRef,
    pub weight: i64,
    /// Already includes this view
    pub views: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub permalink: String,
}

#[derive(Debug, Serialize)]
pub struct RandomResponse {
    pub ok: bool,
    pub data: Option<RandomQuoteData>,
}

#[derive(Debug, Serialize)]
pub struct TopQuoteData {
    pub id: i64,
    pub text: String,
    pub source: SourceRef,
    pub weight: i64,
    pub views: i64,
    pub likes: i64,
    pub permalink: String,
}

#[derive(Debug, Serialize)]
pub struct TopResponse {
    pub ok: bool,
    pub count: usize,
    pub data: Vec<TopQuoteData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

/// GET /api/random/
///
/// `data` is null on an empty catalog.
pub async fn api_random(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ExcludeQuery>,
) -> ApiResult<Json<RandomResponse>> {
    let exclude = parse_exclude(query.exclude.as_deref());

    let data = selection::serve_random(&state.db, exclude)
        .await?
        .map(|served| {
            let quote = served.quote.quote;
            RandomQuoteData {
                permalink: permalink(&state, &headers, quote.id),
                id: quote.id,
                text: quote.text,
                source: SourceRef::from(&served.quote.source),
                weight: quote.weight,
                views: quote.views,
                likes: served.likes,
                dislikes: served.dislikes,
            }
        });

    Ok(Json(RandomResponse { ok: true, data }))
}

/// GET /api/top/?limit=
///
/// `limit` defaults to 10 and is clamped to [1, 50].
pub async fn api_top(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<TopResponse>> {
    let limit = ranking::parse_limit(query.limit.as_deref());

    let data: Vec<TopQuoteData> = ranking::top_quotes(&state.db, limit)
        .await?
        .into_iter()
        .map(|ranked| {
            let quote = ranked.quote.quote;
            TopQuoteData {
                permalink: permalink(&state, &headers, quote.id),
                id: quote.id,
                text: quote.text,
                source: SourceRef::from(&ranked.quote.source),
                weight: quote.weight,
                views: quote.views,
                likes: ranked.likes,
            }
        })
        .collect();

    Ok(Json(TopResponse {
        ok: true,
        count: data.len(),
        data,
    }))
}
