//! Capability cache snapshot.

use crate::provider::ModelCapability;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Model capabilities as fetched at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCapabilitiesCache {
    pub models: Vec<ModelCapability>,
    pub fetched_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl ModelCapabilitiesCache {
    pub fn new(models: Vec<ModelCapability>, ttl_seconds: u64) -> Self {
        Self {
            models,
            fetched_at: Utc::now(),
            ttl_seconds,
        }
    }

    /// Whether the snapshot is older than its TTL.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expiry check against an explicit clock reading.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .is_some_and(|ttl| age > ttl)
    }

    /// First model, in gateway order, advertising `capability`.
    pub fn find_by_capability(&self, capability: &str) -> Option<&str> {
        self.models
            .iter()
            .find(|m| m.supports(capability))
            .map(|m| m.model_id.as_str())
    }
}
