// ABOUTME: Unit tests for the in-memory claims cache
// ABOUTME: Tests LRU capacity, expiry-aware lookups, default TTL and background cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::sleep;
use webapp::cache::{ClaimsCache, ClaimsCacheConfig, Lookup};
use webapp::models::Claims;

/// Helper: Create cache with custom config
fn create_test_cache(max_entries: usize, default_ttl_secs: u64) -> ClaimsCache<String> {
    ClaimsCache::new(&ClaimsCacheConfig {
        max_entries,
        cleanup_interval: Duration::from_secs(300),
        enable_background_cleanup: false, // Sweeps are triggered explicitly
        default_ttl: Duration::from_secs(default_ttl_secs),
    })
}

fn claims_expiring_in(seconds: i64) -> Claims<String> {
    Claims::new()
        .with_dat("payload".to_owned())
        .with_expiry(Utc::now() + ChronoDuration::seconds(seconds))
}

#[tokio::test]
async fn test_put_and_lookup() {
    let cache = create_test_cache(10, 60);
    let claims = claims_expiring_in(60);

    cache.put("token-a".to_owned(), claims.clone()).await;

    assert_eq!(cache.lookup("token-a").await, Lookup::Fresh(claims.clone()));
    assert_eq!(cache.get("token-a").await, Some(claims));
    assert_eq!(cache.lookup("token-b").await, Lookup::Miss);
}

#[tokio::test]
async fn test_capacity_evicts_least_recently_used() {
    let cache = create_test_cache(2, 60);
    cache.put("first".to_owned(), claims_expiring_in(60)).await;
    cache.put("second".to_owned(), claims_expiring_in(60)).await;

    // Touch "first" so "second" becomes least recently used
    assert!(cache.get("first").await.is_some());
    cache.put("third".to_owned(), claims_expiring_in(60)).await;

    assert_eq!(cache.len().await, 2);
    assert!(cache.get("first").await.is_some());
    assert!(cache.get("second").await.is_none());
    assert!(cache.get("third").await.is_some());
}

#[tokio::test]
async fn test_expired_entry_is_reported_and_evicted() {
    let cache = create_test_cache(10, 60);
    cache.put("old".to_owned(), claims_expiring_in(-5)).await;
    assert_eq!(cache.len().await, 1);

    assert_eq!(cache.lookup("old").await, Lookup::Expired);
    assert!(cache.is_empty().await);
    assert_eq!(cache.lookup("old").await, Lookup::Miss);
}

#[tokio::test]
async fn test_default_ttl_lapse_is_a_miss() {
    let cache = create_test_cache(10, 0);
    let claims: Claims<String> = Claims::new().with_subject("no-expiry");
    cache.put("no-exp".to_owned(), claims).await;

    sleep(Duration::from_millis(1_100)).await;

    assert_eq!(cache.lookup("no-exp").await, Lookup::Miss);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_purge_expired_keeps_fresh_entries() {
    let cache = create_test_cache(10, 60);
    cache.put("stale-1".to_owned(), claims_expiring_in(-10)).await;
    cache.put("stale-2".to_owned(), claims_expiring_in(-10)).await;
    cache.put("fresh".to_owned(), claims_expiring_in(60)).await;

    assert_eq!(cache.purge_expired().await, 2);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn test_evict_and_clear() {
    let cache = create_test_cache(10, 60);
    cache.put("a".to_owned(), claims_expiring_in(60)).await;
    cache.put("b".to_owned(), claims_expiring_in(60)).await;

    assert!(cache.evict("a").await);
    assert!(!cache.evict("a").await);
    cache.clear().await;
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_background_cleanup_sweeps_expired_entries() {
    let cache: ClaimsCache<String> = ClaimsCache::new(&ClaimsCacheConfig {
        max_entries: 10,
        cleanup_interval: Duration::from_millis(50),
        enable_background_cleanup: true,
        default_ttl: Duration::from_secs(60),
    });
    cache.put("stale".to_owned(), claims_expiring_in(-10)).await;

    sleep(Duration::from_millis(200)).await;
    assert!(cache.is_empty().await);
}

#[test]
fn test_construction_outside_runtime_disables_sweeper() {
    let cache: ClaimsCache<String> = ClaimsCache::new(&ClaimsCacheConfig::default());
    drop(cache);
}
