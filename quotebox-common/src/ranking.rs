//! Leaderboards
//!
//! The top list orders by likes, then views, then newest first; id breaks
//! any remaining tie so one snapshot always ranks the same way.

use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::db::models::{QuoteWithSource, SourceKind, QUOTE_WITH_SOURCE_COLUMNS};
use crate::Result;

/// Size of each dashboard list and of the top page
pub const DEFAULT_LIMIT: i64 = 10;
/// Upper bound for the ranking API
pub const MAX_LIMIT: i64 = 50;

/// A quote with its vote totals
#[derive(Debug, Clone, Serialize)]
pub struct RankedQuote {
    #[serde(flatten)]
    pub quote: QuoteWithSource,
    pub likes: i64,
    pub dislikes: i64,
}

/// The three dashboard lists
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub kind: Option<SourceKind>,
    pub most_viewed: Vec<RankedQuote>,
    pub most_liked: Vec<RankedQuote>,
    pub most_disliked: Vec<RankedQuote>,
}

#[derive(Debug, Clone, Copy)]
enum Order {
    Top,
    MostViewed,
    MostLiked,
    MostDisliked,
}

impl Order {
    fn clause(&self) -> &'static str {
        match self {
            Order::Top => "likes DESC, q.views DESC, q.created_at DESC, q.id DESC",
            Order::MostViewed => "q.views DESC, q.created_at DESC, q.id DESC",
            Order::MostLiked => "likes DESC, q.created_at DESC, q.id DESC",
            Order::MostDisliked => "dislikes DESC, q.created_at DESC, q.id DESC",
        }
    }
}

/// Ranking API limit: absent or non-numeric → 10, otherwise clamped to [1, 50]
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT)
}

/// Most liked quotes (likes, views, newest)
pub async fn top_quotes(pool: &SqlitePool, limit: i64) -> Result<Vec<RankedQuote>> {
    ranked(pool, Order::Top, None, limit).await
}

/// Most viewed, most liked and most disliked, optionally for one kind
pub async fn dashboard_breakdown(
    pool: &SqlitePool,
    kind: Option<SourceKind>,
) -> Result<Dashboard> {
    Ok(Dashboard {
        kind,
        most_viewed: ranked(pool, Order::MostViewed, kind, DEFAULT_LIMIT).await?,
        most_liked: ranked(pool, Order::MostLiked, kind, DEFAULT_LIMIT).await?,
        most_disliked: ranked(pool, Order::MostDisliked, kind, DEFAULT_LIMIT).await?,
    })
}

async fn ranked(
    pool: &SqlitePool,
    order: Order,
    kind: Option<SourceKind>,
    limit: i64,
) -> Result<Vec<RankedQuote>> {
    let sql = format!(
        r#"
        SELECT {columns},
            COALESCE(SUM(CASE WHEN v.value = 1 THEN 1 ELSE 0 END), 0) AS likes,
            COALESCE(SUM(CASE WHEN v.value = -1 THEN 1 ELSE 0 END), 0) AS dislikes
        FROM quotes q
        JOIN sources s ON s.id = q.source_id
        LEFT JOIN votes v ON v.quote_id = q.id
        WHERE (? IS NULL OR s.kind = ?)
        GROUP BY q.id
        ORDER BY {order}
        LIMIT ?
        "#,
        columns = QUOTE_WITH_SOURCE_COLUMNS,
        order = order.clause(),
    );

    let kind = kind.map(|k| k.as_str());
    let rows = sqlx::query(&sql)
        .bind(kind)
        .bind(kind)
        .bind(limit.max(0))
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(RankedQuote {
                quote: QuoteWithSource::from_row(row)?,
                likes: row.try_get("likes")?,
                dislikes: row.try_get("dislikes")?,
            })
        })
        .collect()
}
