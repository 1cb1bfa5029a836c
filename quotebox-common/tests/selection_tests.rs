//! Integration tests for weighted selection against a real catalog

use quotebox_common::catalog;
use quotebox_common::db::init_in_memory;
use quotebox_common::selection::{pick_weighted, serve_quote, serve_random};
use quotebox_common::submission::{submit_quote, SourceChoice, SubmissionRequest, WeightInput};
use quotebox_common::votes;
use quotebox_common::SourceKind;
use sqlx::SqlitePool;
use std::collections::HashMap;

async fn seed(pool: &SqlitePool, title: &str, text: &str, weight: i64) -> i64 {
    submit_quote(
        pool,
        SubmissionRequest {
            text: text.to_string(),
            source: SourceChoice::New {
                title: title.to_string(),
                kind: Some(SourceKind::Book),
            },
            weight: WeightInput::Value(weight),
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_empty_catalog_serves_nothing() {
    let pool = init_in_memory().await.unwrap();
    assert!(pick_weighted(&pool, None).await.unwrap().is_none());
    assert!(serve_random(&pool, Some(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_single_quote_served_even_when_excluded() {
    let pool = init_in_memory().await.unwrap();
    let id = seed(&pool, "Walden", "Simplify, simplify.", 1).await;

    let served = serve_random(&pool, Some(id)).await.unwrap().unwrap();
    assert_eq!(served.quote.quote.id, id);
    assert_eq!(served.quote.quote.views, 1);
    assert_eq!(served.quote.source.title, "Walden");
}

#[tokio::test]
async fn test_exclusion_avoids_previous_quote() {
    let pool = init_in_memory().await.unwrap();
    let a = seed(&pool, "Emma", "first", 1).await;
    let b = seed(&pool, "Persuasion", "second", 1).await;

    for _ in 0..50 {
        let picked = pick_weighted(&pool, Some(a)).await.unwrap().unwrap();
        assert_eq!(picked.quote.id, b);
    }
}

#[tokio::test]
async fn test_heavier_quote_drawn_more_often() {
    let pool = init_in_memory().await.unwrap();
    let light = seed(&pool, "Light", "light", 1).await;
    let heavy = seed(&pool, "Heavy", "heavy", 9).await;

    let mut counts: HashMap<i64, u32> = HashMap::new();
    for _ in 0..1000 {
        let picked = pick_weighted(&pool, None).await.unwrap().unwrap();
        *counts.entry(picked.quote.id).or_default() += 1;
    }

    let heavy_hits = counts.get(&heavy).copied().unwrap_or(0);
    let light_hits = counts.get(&light).copied().unwrap_or(0);
    assert_eq!(heavy_hits + light_hits, 1000);
    // Expected 900; far outside any plausible variance if weighting were off
    assert!(heavy_hits > 800, "heavy drawn {} times", heavy_hits);
}

#[tokio::test]
async fn test_serve_quote_counts_view_and_reports_votes() {
    let pool = init_in_memory().await.unwrap();
    let id = seed(&pool, "Dracula", "Listen to them.", 1).await;
    votes::cast_vote(&pool, id, "x", "like").await.unwrap();
    votes::cast_vote(&pool, id, "y", "dislike").await.unwrap();

    serve_quote(&pool, id).await.unwrap().unwrap();
    let served = serve_quote(&pool, id).await.unwrap().unwrap();

    assert_eq!(served.quote.quote.views, 2);
    assert_eq!((served.likes, served.dislikes), (1, 1));

    let stored = catalog::get_quote(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.quote.views, 2);
}

#[tokio::test]
async fn test_serve_missing_quote() {
    let pool = init_in_memory().await.unwrap();
    assert!(serve_quote(&pool, 12).await.unwrap().is_none());
}

#[tokio::test]
async fn test_largest_weights_still_served() {
    let pool = init_in_memory().await.unwrap();
    let weight = WeightInput::parse(Some("9223372036854775807"));
    assert_eq!(weight, WeightInput::Value(i64::MAX));

    let mut ids = Vec::new();
    for title in ["Ulysses", "Moby-Dick", "Middlemarch"] {
        let quote = submit_quote(
            &pool,
            SubmissionRequest {
                text: format!("A line from {}", title),
                source: SourceChoice::New {
                    title: title.to_string(),
                    kind: Some(SourceKind::Book),
                },
                weight: weight.clone(),
            },
        )
        .await
        .unwrap();
        ids.push(quote.id);
    }

    for _ in 0..20 {
        let served = serve_random(&pool, None).await.unwrap().unwrap();
        assert!(ids.contains(&served.quote.quote.id));
    }
}
