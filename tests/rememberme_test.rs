// ABOUTME: Integration tests for the document-store remember-me token manager
// ABOUTME: Exercises add, validate, revoke, delete and purge against the in-memory store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use webapp::datastore::memory::InMemoryStore;
use webapp::errors::ErrorCode;
use webapp::models::Token;
use webapp::config::WebappConfig;
use webapp::rememberme::{DatastoreTokenManager, TokenManager};

use common::{create_token_manager, test_ctx, TOKEN_COLLECTION};

/// Store a token document directly, bypassing the manager
async fn seed_token(
    store: &InMemoryStore,
    id: &str,
    username: &str,
    identifier: &str,
    last_used: i64,
    revoked: bool,
) {
    store
        .insert_raw(
            TOKEN_COLLECTION,
            id,
            json!({
                "Username": username,
                "Identifier": identifier,
                "Revoked": revoked,
                "UserAgent": "",
                "Created": last_used,
                "LastUsed": last_used,
            }),
        )
        .await;
}

async fn stored_ids(store: &InMemoryStore) -> Vec<String> {
    store
        .snapshot(TOKEN_COLLECTION)
        .await
        .iter()
        .map(|doc| doc.id().to_owned())
        .collect()
}

#[tokio::test]
async fn test_token_lifecycle() -> Result<()> {
    let (store, manager) = create_token_manager();
    let ctx = test_ctx();

    let added = manager
        .add(&ctx, Token::new("alice", "laptop").with_user_agent("Firefox"))
        .await?;
    assert!(!added.revoked);
    assert_eq!(added.created, added.last_used);
    assert_eq!(added.user_agent, "Firefox");

    let validated = manager.validate(&ctx, &added).await?;
    assert_eq!(validated.username, "alice");
    assert!(validated.last_used >= validated.created);

    let revoked = manager.revoke(&ctx, &added).await?;
    assert!(revoked.revoked);

    let err = manager.validate(&ctx, &added).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);

    manager.delete(&ctx, &added).await?;
    assert!(store.snapshot(TOKEN_COLLECTION).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_add_overrides_caller_supplied_state() -> Result<()> {
    let (store, manager) = create_token_manager();
    let ctx = test_ctx();

    let mut token = Token::new("bob", "phone");
    token.revoked = true;
    token.created = 1;
    token.last_used = 2;
    let added = manager.add(&ctx, token).await?;

    assert!(!added.revoked);
    assert!(added.created > 2);
    let stored = store.snapshot(TOKEN_COLLECTION).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].data["Revoked"], json!(false));
    assert_eq!(stored[0].data["Username"], json!("bob"));
    Ok(())
}

#[tokio::test]
async fn test_add_rejects_duplicate_identity() -> Result<()> {
    let (store, manager) = create_token_manager();
    let ctx = test_ctx();

    manager.add(&ctx, Token::new("alice", "laptop")).await?;
    let err = manager
        .add(&ctx, Token::new("alice", "laptop"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);

    // Same identifier for another user is fine
    manager.add(&ctx, Token::new("bob", "laptop")).await?;
    assert_eq!(store.snapshot(TOKEN_COLLECTION).await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_validate_unknown_token_is_invalid() -> Result<()> {
    let (_store, manager) = create_token_manager();
    let err = manager
        .validate(&test_ctx(), &Token::new("nobody", "nowhere"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
    Ok(())
}

#[tokio::test]
async fn test_validate_never_moves_last_used_before_created() -> Result<()> {
    let (store, manager) = create_token_manager();
    let future = Utc::now().timestamp() + 3_600;
    store
        .insert_raw(
            TOKEN_COLLECTION,
            "skewed",
            json!({
                "Username": "carol",
                "Identifier": "tablet",
                "Revoked": false,
                "UserAgent": "",
                "Created": future,
                "LastUsed": future,
            }),
        )
        .await;

    let validated = manager
        .validate(&test_ctx(), &Token::new("carol", "tablet"))
        .await?;
    assert_eq!(validated.last_used, future);
    Ok(())
}

#[tokio::test]
async fn test_revoke_unknown_token_is_not_found() -> Result<()> {
    let (_store, manager) = create_token_manager();
    let err = manager
        .revoke(&test_ctx(), &Token::new("nobody", "nowhere"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_delete_absent_token_succeeds() -> Result<()> {
    let (_store, manager) = create_token_manager();
    manager
        .delete(&test_ctx(), &Token::new("nobody", "nowhere"))
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_purge_removes_tokens_last_used_before_cutoff() -> Result<()> {
    let (store, manager) = create_token_manager();
    let now = Utc::now().timestamp();
    for (id, username, last_used) in [
        ("old-1", "alice", now - 7_200),
        ("old-2", "alice", now - 3_600),
        ("fresh", "alice", now + 60),
        ("other", "bob", now - 7_200),
    ] {
        store
            .insert_raw(
                TOKEN_COLLECTION,
                id,
                json!({
                    "Username": username,
                    "Identifier": id,
                    "Revoked": false,
                    "UserAgent": "",
                    "Created": last_used,
                    "LastUsed": last_used,
                }),
            )
            .await;
    }

    let purged = manager
        .purge(&test_ctx(), "alice", Utc::now() - Duration::minutes(30))
        .await?;
    assert_eq!(purged, 2);

    let remaining: Vec<String> = store
        .snapshot(TOKEN_COLLECTION)
        .await
        .iter()
        .map(|doc| doc.id().to_owned())
        .collect();
    assert_eq!(remaining, vec!["fresh", "other"]);
    Ok(())
}

#[tokio::test]
async fn test_operations_fail_when_cancelled() -> Result<()> {
    let (store, manager) = create_token_manager();
    let ctx = test_ctx();
    ctx.cancel();

    let err = manager
        .add(&ctx, Token::new("alice", "laptop"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OperationCancelled);
    assert!(store.snapshot(TOKEN_COLLECTION).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_revoke_twice_succeeds() -> Result<()> {
    let (store, manager) = create_token_manager();
    let ctx = test_ctx();
    let added = manager.add(&ctx, Token::new("alice", "laptop")).await?;

    assert!(manager.revoke(&ctx, &added).await?.revoked);
    let again = manager.revoke(&ctx, &added).await?;
    assert!(again.revoked);

    let stored = store.snapshot(TOKEN_COLLECTION).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].data["Revoked"], json!(true));
    Ok(())
}

#[tokio::test]
async fn test_purge_user_without_tokens_removes_nothing() -> Result<()> {
    let (store, manager) = create_token_manager();
    seed_token(&store, "bob-1", "bob", "phone", 0, false).await;

    let purged = manager.purge(&test_ctx(), "alice", Utc::now()).await?;
    assert_eq!(purged, 0);
    assert_eq!(stored_ids(&store).await, vec!["bob-1"]);
    Ok(())
}

#[tokio::test]
async fn test_purge_removes_revoked_tokens() -> Result<()> {
    let (store, manager) = create_token_manager();
    let old = Utc::now().timestamp() - 7_200;
    seed_token(&store, "revoked", "alice", "laptop", old, true).await;
    seed_token(&store, "active", "alice", "phone", old, false).await;

    let purged = manager
        .purge(&test_ctx(), "alice", Utc::now() - Duration::hours(1))
        .await?;
    assert_eq!(purged, 2);
    assert!(store.snapshot(TOKEN_COLLECTION).await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_purge_includes_tokens_last_used_at_cutoff() -> Result<()> {
    let (store, manager) = create_token_manager();
    let cutoff = DateTime::from_timestamp(Utc::now().timestamp() - 600, 0).unwrap();
    seed_token(&store, "at-cutoff", "alice", "laptop", cutoff.timestamp(), false).await;
    seed_token(&store, "after-cutoff", "alice", "phone", cutoff.timestamp() + 1, false).await;

    let purged = manager.purge(&test_ctx(), "alice", cutoff).await?;
    assert_eq!(purged, 1);
    assert_eq!(stored_ids(&store).await, vec!["after-cutoff"]);
    Ok(())
}

#[tokio::test]
async fn test_tokens_surviving_purge_still_validate() -> Result<()> {
    let (store, manager) = create_token_manager();
    let ctx = test_ctx();
    seed_token(&store, "stale", "alice", "old-laptop", 0, false).await;
    let kept = manager.add(&ctx, Token::new("alice", "phone")).await?;

    let purged = manager
        .purge(&ctx, "alice", Utc::now() - Duration::hours(1))
        .await?;
    assert_eq!(purged, 1);

    let validated = manager.validate(&ctx, &kept).await?;
    assert_eq!(validated.identifier, "phone");
    assert!(validated.last_used_at() >= kept.created_at());

    let err = manager
        .validate(&ctx, &Token::new("alice", "old-laptop"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
    Ok(())
}

#[tokio::test]
async fn test_delete_removes_duplicate_rows() -> Result<()> {
    let (store, manager) = create_token_manager();
    let now = Utc::now().timestamp();
    seed_token(&store, "copy-1", "alice", "laptop", now, false).await;
    seed_token(&store, "copy-2", "alice", "laptop", now, true).await;
    seed_token(&store, "other", "alice", "phone", now, false).await;

    manager
        .delete(&test_ctx(), &Token::new("alice", "laptop"))
        .await?;
    assert_eq!(stored_ids(&store).await, vec!["other"]);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_adds_of_same_identity_store_one_token() -> Result<()> {
    let (store, manager) = create_token_manager();
    let ctx = test_ctx();

    let (first, second) = tokio::join!(
        manager.add(&ctx, Token::new("alice", "laptop")),
        manager.add(&ctx, Token::new("alice", "laptop")),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    let failure = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .expect("one add must fail");
    assert_eq!(failure.code, ErrorCode::ResourceAlreadyExists);
    assert_eq!(store.snapshot(TOKEN_COLLECTION).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_manager_uses_configured_collection() -> Result<()> {
    let store = common::create_test_store();
    let mut config = WebappConfig::default();
    config.collections.tokens = "sessions".to_owned();
    let manager = DatastoreTokenManager::from_config(store.clone(), &config);
    assert_eq!(manager.collection().name(), "sessions");

    manager
        .add(&test_ctx(), Token::new("alice", "laptop"))
        .await?;
    assert_eq!(store.snapshot("sessions").await.len(), 1);
    assert!(store.snapshot(TOKEN_COLLECTION).await.is_empty());
    Ok(())
}
