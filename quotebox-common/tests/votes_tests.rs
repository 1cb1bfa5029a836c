//! Integration tests for the vote ledger

use quotebox_common::catalog;
use quotebox_common::db::init_in_memory;
use quotebox_common::submission::{submit_quote, SourceChoice, SubmissionRequest, WeightInput};
use quotebox_common::votes::{self, VoteOutcome};
use quotebox_common::{Error, SourceKind, VoteValue};
use sqlx::SqlitePool;

async fn seed_quote(pool: &SqlitePool) -> i64 {
    let source = catalog::create_source(pool, "The Godfather", SourceKind::Movie)
        .await
        .unwrap();
    submit_quote(
        pool,
        SubmissionRequest {
            text: "I'm gonna make him an offer he can't refuse.".to_string(),
            source: SourceChoice::Existing(source.id),
            weight: WeightInput::Default,
        },
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_like_then_dislike_flips_single_vote() {
    let pool = init_in_memory().await.unwrap();
    let quote_id = seed_quote(&pool).await;

    let first = votes::cast_vote(&pool, quote_id, "session-a", "like").await.unwrap();
    assert_eq!(first, VoteOutcome::Created);
    assert_eq!(votes::count_likes_dislikes(&pool, quote_id).await.unwrap(), (1, 0));

    let flip = votes::cast_vote(&pool, quote_id, "session-a", "dislike").await.unwrap();
    assert_eq!(flip, VoteOutcome::Changed);
    assert_eq!(votes::count_likes_dislikes(&pool, quote_id).await.unwrap(), (0, 1));

    let vote = votes::get_vote(&pool, quote_id, "session-a").await.unwrap().unwrap();
    assert_eq!(vote.value, VoteValue::Dislike);
}

#[tokio::test]
async fn test_repeated_vote_is_unchanged() {
    let pool = init_in_memory().await.unwrap();
    let quote_id = seed_quote(&pool).await;

    votes::cast_vote(&pool, quote_id, "s", "like").await.unwrap();
    let again = votes::cast_vote(&pool, quote_id, "s", "like").await.unwrap();

    assert_eq!(again, VoteOutcome::Unchanged);
    assert_eq!(votes::count_likes_dislikes(&pool, quote_id).await.unwrap(), (1, 0));
}

#[tokio::test]
async fn test_sessions_vote_independently() {
    let pool = init_in_memory().await.unwrap();
    let quote_id = seed_quote(&pool).await;

    votes::cast_vote(&pool, quote_id, "a", "like").await.unwrap();
    votes::cast_vote(&pool, quote_id, "b", "like").await.unwrap();
    votes::cast_vote(&pool, quote_id, "c", "dislike").await.unwrap();

    assert_eq!(votes::count_likes_dislikes(&pool, quote_id).await.unwrap(), (2, 1));
    assert!(votes::get_vote(&pool, quote_id, "d").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_action_rejected_without_write() {
    let pool = init_in_memory().await.unwrap();
    let quote_id = seed_quote(&pool).await;

    let result = votes::cast_vote(&pool, quote_id, "s", "love").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(votes::count_likes_dislikes(&pool, quote_id).await.unwrap(), (0, 0));
}

#[tokio::test]
async fn test_vote_on_missing_quote_is_not_found() {
    let pool = init_in_memory().await.unwrap();

    let result = votes::cast_vote(&pool, 404, "s", "like").await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    let direct = votes::record_vote(&pool, 404, "s", VoteValue::Like).await;
    assert!(matches!(direct, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_empty_session_rejected() {
    let pool = init_in_memory().await.unwrap();
    let quote_id = seed_quote(&pool).await;

    let result = votes::cast_vote(&pool, quote_id, "", "like").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}
