//! Capability registry: a TTL cache over a gateway's model capability list.
//!
//! Fetch failures never surface to callers. A failed refresh keeps serving the
//! previous snapshot; with no snapshot at all the registry reports `None`.

#[cfg(test)]
mod tests;
mod types;

use super::CapabilitySource;
use std::sync::{Arc, RwLock};

pub use types::ModelCapabilitiesCache;

/// Default snapshot lifetime in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Caches the capability list reported by a [`CapabilitySource`].
pub struct CapabilityRegistry {
    source: Arc<dyn CapabilitySource>,
    cache: RwLock<Option<Arc<ModelCapabilitiesCache>>>,
    ttl_secs: u64,
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new(source: Arc<dyn CapabilitySource>, ttl_secs: u64) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
            ttl_secs,
        }
    }

    pub fn source(&self) -> &Arc<dyn CapabilitySource> {
        &self.source
    }

    /// Current snapshot without fetching, expired or not.
    pub fn snapshot(&self) -> Option<Arc<ModelCapabilitiesCache>> {
        self.cache
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Return a fresh snapshot, fetching when empty, expired or forced.
    pub async fn get(&self, force_refresh: bool) -> Option<Arc<ModelCapabilitiesCache>> {
        if !force_refresh
            && let Some(cache) = self.snapshot()
            && !cache.is_expired()
        {
            return Some(cache);
        }

        match self.source.get_capabilities(force_refresh).await {
            Ok(models) => {
                tracing::debug!(models = models.len(), "Model capabilities refreshed");
                let fresh = Arc::new(ModelCapabilitiesCache::new(models, self.ttl_secs));
                *self
                    .cache
                    .write()
                    .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Arc::clone(&fresh));
                Some(fresh)
            }
            Err(e) => {
                let stale = self.snapshot();
                tracing::warn!(
                    error = %e,
                    serving_stale = stale.is_some(),
                    "Failed to fetch model capabilities"
                );
                stale
            }
        }
    }

    /// First cached model advertising `capability`. Never fetches.
    pub fn find_by_capability(&self, capability: &str) -> Option<String> {
        self.snapshot()?
            .find_by_capability(capability)
            .map(str::to_string)
    }

    /// Replace the snapshot directly.
    #[cfg(test)]
    pub(crate) fn set_snapshot(&self, cache: ModelCapabilitiesCache) {
        *self
            .cache
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(Arc::new(cache));
    }
}
