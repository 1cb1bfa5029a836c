//! Weighted random quote selection
//!
//! A quote with weight w is w times as likely to be drawn as a weight-1
//! quote. Serving a quote counts a view with an atomic relative update.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::catalog;
use crate::db::models::QuoteWithSource;
use crate::votes;
use crate::Result;

/// A quote as shown to a viewer, after its view was counted
#[derive(Debug, Clone, Serialize)]
pub struct ServedQuote {
    #[serde(flatten)]
    pub quote: QuoteWithSource,
    pub likes: i64,
    pub dislikes: i64,
}

/// Draw one id from (id, weight) pairs
///
/// The exclusion is honoured only while it leaves something to draw from;
/// otherwise the full list is used. Non-positive weights never win.
pub fn choose_weighted_id<R: Rng + ?Sized>(
    pairs: &[(i64, i64)],
    exclude_id: Option<i64>,
    rng: &mut R,
) -> Option<i64> {
    if pairs.is_empty() {
        return None;
    }

    let filtered: Vec<(i64, i64)> = match exclude_id {
        Some(excluded) if pairs.len() > 1 => pairs
            .iter()
            .copied()
            .filter(|(id, _)| *id != excluded)
            .collect(),
        _ => Vec::new(),
    };
    let candidates: &[(i64, i64)] = if filtered.is_empty() { pairs } else { &filtered };

    // Summed in u128 so any number of i64 weights fits
    let weights = candidates.iter().map(|(_, w)| (*w).max(0) as u128);
    let index = WeightedIndex::<u128>::new(weights).ok()?;
    Some(candidates[index.sample(rng)].0)
}

/// Pick a quote at random, weighted, optionally avoiding `exclude_id`
pub async fn pick_weighted(
    pool: &SqlitePool,
    exclude_id: Option<i64>,
) -> Result<Option<QuoteWithSource>> {
    let pairs = catalog::quote_ids_and_weights(pool).await?;

    // thread_rng is not Send; keep it out of scope across awaits
    let chosen = {
        let mut rng = rand::thread_rng();
        choose_weighted_id(&pairs, exclude_id, &mut rng)
    };

    let Some(id) = chosen else {
        return Ok(None);
    };
    debug!("Weighted pick: quote {} of {} candidates", id, pairs.len());

    let quote = catalog::get_quote(pool, id).await?;
    if quote.is_none() {
        warn!("Quote {} vanished between draw and fetch", id);
    }
    Ok(quote)
}

/// Weighted pick, then count the view and attach vote totals
pub async fn serve_random(pool: &SqlitePool, exclude_id: Option<i64>) -> Result<Option<ServedQuote>> {
    match pick_weighted(pool, exclude_id).await? {
        Some(quote) => present(pool, quote).await,
        None => Ok(None),
    }
}

/// Serve a specific quote (permalink), counting the view
pub async fn serve_quote(pool: &SqlitePool, quote_id: i64) -> Result<Option<ServedQuote>> {
    match catalog::get_quote(pool, quote_id).await? {
        Some(quote) => present(pool, quote).await,
        None => Ok(None),
    }
}

async fn present(pool: &SqlitePool, mut quote: QuoteWithSource) -> Result<Option<ServedQuote>> {
    let Some(views) = catalog::record_view(pool, quote.quote.id).await? else {
        return Ok(None);
    };
    quote.quote.views = views;

    let (likes, dislikes) = votes::count_likes_dislikes(pool, quote.quote.id).await?;
    Ok(Some(ServedQuote {
        quote,
        likes,
        dislikes,
    }))
}
