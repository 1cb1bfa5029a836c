//! Integration tests for leaderboards and the dashboard breakdown

use quotebox_common::catalog;
use quotebox_common::db::init_in_memory;
use quotebox_common::ranking::{dashboard_breakdown, top_quotes, RankedQuote};
use quotebox_common::submission::{submit_quote, SourceChoice, SubmissionRequest, WeightInput};
use quotebox_common::votes;
use quotebox_common::SourceKind;
use sqlx::SqlitePool;

async fn seed(pool: &SqlitePool, title: &str, kind: SourceKind, text: &str) -> i64 {
    submit_quote(
        pool,
        SubmissionRequest {
            text: text.to_string(),
            source: SourceChoice::New {
                title: title.to_string(),
                kind: Some(kind),
            },
            weight: WeightInput::Default,
        },
    )
    .await
    .unwrap()
    .id
}

async fn likes(pool: &SqlitePool, quote_id: i64, n: usize) {
    for i in 0..n {
        votes::cast_vote(pool, quote_id, &format!("like-{}", i), "like")
            .await
            .unwrap();
    }
}

async fn dislikes(pool: &SqlitePool, quote_id: i64, n: usize) {
    for i in 0..n {
        votes::cast_vote(pool, quote_id, &format!("dislike-{}", i), "dislike")
            .await
            .unwrap();
    }
}

async fn views(pool: &SqlitePool, quote_id: i64, n: usize) {
    for _ in 0..n {
        catalog::record_view(pool, quote_id).await.unwrap();
    }
}

fn ids(list: &[RankedQuote]) -> Vec<i64> {
    list.iter().map(|r| r.quote.quote.id).collect()
}

// ============================================================================
// Top list
// ============================================================================

#[tokio::test]
async fn test_top_orders_by_likes_then_views_then_newest() {
    let pool = init_in_memory().await.unwrap();
    let oldest = seed(&pool, "A", SourceKind::Book, "oldest").await;
    let middle = seed(&pool, "B", SourceKind::Book, "middle").await;
    let newest = seed(&pool, "C", SourceKind::Book, "newest").await;
    let popular = seed(&pool, "D", SourceKind::Book, "popular").await;

    likes(&pool, popular, 3).await;
    likes(&pool, oldest, 1).await;
    likes(&pool, middle, 1).await;
    views(&pool, middle, 5).await;
    likes(&pool, newest, 1).await;

    let top = top_quotes(&pool, 10).await.unwrap();
    // popular by likes; middle by views; newest beats oldest on recency
    assert_eq!(ids(&top), vec![popular, middle, newest, oldest]);
    assert_eq!(top[0].likes, 3);
    assert_eq!(top[0].dislikes, 0);
}

#[tokio::test]
async fn test_top_respects_limit_and_includes_unvoted() {
    let pool = init_in_memory().await.unwrap();
    for i in 0..5 {
        seed(&pool, &format!("S{}", i), SourceKind::Other, &format!("q{}", i)).await;
    }

    assert_eq!(top_quotes(&pool, 3).await.unwrap().len(), 3);
    let all = top_quotes(&pool, 50).await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.iter().all(|r| r.likes == 0 && r.dislikes == 0));
}

#[tokio::test]
async fn test_top_empty_catalog() {
    let pool = init_in_memory().await.unwrap();
    assert!(top_quotes(&pool, 10).await.unwrap().is_empty());
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_lists() {
    let pool = init_in_memory().await.unwrap();
    let watched = seed(&pool, "Watched", SourceKind::Movie, "watched").await;
    let loved = seed(&pool, "Loved", SourceKind::Book, "loved").await;
    let hated = seed(&pool, "Hated", SourceKind::Other, "hated").await;

    views(&pool, watched, 4).await;
    likes(&pool, loved, 2).await;
    dislikes(&pool, hated, 2).await;

    let board = dashboard_breakdown(&pool, None).await.unwrap();
    assert_eq!(board.kind, None);
    assert_eq!(board.most_viewed[0].quote.quote.id, watched);
    assert_eq!(board.most_liked[0].quote.quote.id, loved);
    assert_eq!(board.most_disliked[0].quote.quote.id, hated);
    assert_eq!(board.most_disliked[0].dislikes, 2);
}

#[tokio::test]
async fn test_dashboard_kind_filter() {
    let pool = init_in_memory().await.unwrap();
    let movie = seed(&pool, "Jaws", SourceKind::Movie, "boat").await;
    seed(&pool, "Moby Dick", SourceKind::Book, "whale").await;

    let board = dashboard_breakdown(&pool, Some(SourceKind::Movie)).await.unwrap();
    assert_eq!(board.kind, Some(SourceKind::Movie));
    assert_eq!(ids(&board.most_viewed), vec![movie]);
    assert_eq!(ids(&board.most_liked), vec![movie]);
    assert_eq!(ids(&board.most_disliked), vec![movie]);
}

#[tokio::test]
async fn test_dashboard_caps_each_list_at_ten() {
    let pool = init_in_memory().await.unwrap();
    for i in 0..12 {
        seed(&pool, &format!("Book {}", i), SourceKind::Book, "same line").await;
    }

    let board = dashboard_breakdown(&pool, Some(SourceKind::Book)).await.unwrap();
    assert_eq!(board.most_viewed.len(), 10);
    assert_eq!(board.most_liked.len(), 10);
    assert_eq!(board.most_disliked.len(), 10);
}
