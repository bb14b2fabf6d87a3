//! Tests for the capability registry.

use super::{CapabilityRegistry, ModelCapabilitiesCache};
use crate::provider::ModelCapability;
use crate::provider::testing::ScriptedSource;
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn models() -> Vec<ModelCapability> {
    vec![
        ModelCapability::new("llama-summary", &["summarization", "general"]),
        ModelCapability::new("qwen-coder", &["code"]),
        ModelCapability::new("qwen-coder-large", &["code", "reasoning"]),
    ]
}

#[test]
fn test_find_by_capability_first_match() {
    let cache = ModelCapabilitiesCache::new(models(), 300);
    assert_eq!(cache.find_by_capability("code"), Some("qwen-coder"));
    assert_eq!(cache.find_by_capability("reasoning"), Some("qwen-coder-large"));
    assert_eq!(cache.find_by_capability("vision"), None);
}

#[test]
fn test_cache_expiry() {
    let mut cache = ModelCapabilitiesCache::new(models(), 300);
    assert!(!cache.is_expired());

    let now = Utc::now();
    cache.fetched_at = now - TimeDelta::seconds(400);
    assert!(cache.is_expired_at(now));

    cache.fetched_at = now - TimeDelta::seconds(100);
    assert!(!cache.is_expired_at(now));
}

#[tokio::test]
async fn test_get_fetches_once_within_ttl() {
    let source = Arc::new(ScriptedSource::with_models(models()));
    let registry = CapabilityRegistry::new(source.clone(), 300);

    let first = registry.get(false).await.unwrap();
    let second = registry.get(false).await.unwrap();
    assert_eq!(first.models.len(), 3);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.capability_calls(), 1);
}

#[tokio::test]
async fn test_force_refresh_bypasses_fresh_cache() {
    let source = Arc::new(ScriptedSource::with_models(models()));
    let registry = CapabilityRegistry::new(source.clone(), 300);

    registry.get(false).await.unwrap();
    source.set_models(vec![ModelCapability::new("new-model", &["code"])]);
    let refreshed = registry.get(true).await.unwrap();
    assert_eq!(refreshed.find_by_capability("code"), Some("new-model"));
    assert_eq!(source.capability_calls(), 2);
}

#[tokio::test]
async fn test_expired_snapshot_is_refetched() {
    let source = Arc::new(ScriptedSource::with_models(models()));
    let registry = CapabilityRegistry::new(source.clone(), 300);

    let mut old = ModelCapabilitiesCache::new(vec![], 300);
    old.fetched_at = Utc::now() - TimeDelta::seconds(3600);
    registry.set_snapshot(old);

    let cache = registry.get(false).await.unwrap();
    assert_eq!(cache.models.len(), 3);
    assert_eq!(source.capability_calls(), 1);
}

#[tokio::test]
async fn test_failed_refresh_serves_stale_snapshot() {
    let source = Arc::new(ScriptedSource::with_models(models()));
    let registry = CapabilityRegistry::new(source.clone(), 300);
    registry.get(false).await.unwrap();

    source.fail_capabilities.store(true, Ordering::SeqCst);
    let stale = registry.get(true).await.unwrap();
    assert_eq!(stale.models.len(), 3);
}

#[tokio::test]
async fn test_failed_fetch_without_snapshot_is_none() {
    let registry = CapabilityRegistry::new(Arc::new(ScriptedSource::failing()), 300);
    assert!(registry.get(false).await.is_none());
    assert!(registry.find_by_capability("code").is_none());
}

#[tokio::test]
async fn test_find_by_capability_never_fetches() {
    let source = Arc::new(ScriptedSource::with_models(models()));
    let registry = CapabilityRegistry::new(source.clone(), 300);

    assert!(registry.find_by_capability("code").is_none());
    assert_eq!(source.capability_calls(), 0);

    registry.get(false).await;
    assert_eq!(registry.find_by_capability("code").as_deref(), Some("qwen-coder"));
    assert_eq!(source.capability_calls(), 1);
}
