use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::domain::ports::{SkuCache, StorefrontSource};
use crate::error::SyncError;

// ─────────────────────────────────────────────────────────────────────────────
// SkuCacheService
// ─────────────────────────────────────────────────────────────────────────────

/// Refreshes the cached set of SKUs the storefront sells.
///
/// The delta modes filter the supplier feed to this set so the baseline only
/// tracks products the shop actually lists. Run it before the first delta
/// sync and whenever the catalog changes.
pub struct SkuCacheService {
    storefront: Arc<dyn StorefrontSource>,
    cache: Arc<dyn SkuCache>,
}

impl SkuCacheService {
    pub fn new(storefront: Arc<dyn StorefrontSource>, cache: Arc<dyn SkuCache>) -> Self {
        Self { storefront, cache }
    }

    /// Fetch every variant SKU and replace the cache. Returns the SKU count.
    ///
    /// An empty result is treated as an upstream fault and leaves the
    /// existing cache untouched.
    pub async fn refresh(&self) -> Result<usize> {
        let skus = self
            .storefront
            .fetch_variant_skus()
            .await
            .context("fetching storefront variant SKUs")?;

        if skus.is_empty() {
            return Err(SyncError::upstream("shopify", "storefront returned no variant SKUs").into());
        }

        self.cache.save(&skus)?;
        info!(skus = skus.len(), "shop SKU cache refreshed");
        Ok(skus.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::in_memory::MemorySkuCache;
    use crate::domain::records::StorefrontRecord;
    use crate::domain::snapshot::Snapshot;
    use crate::domain::value_objects::{LocationId, ProductKey};
    use async_trait::async_trait;
    use std::collections::BTreeSet;

    struct Skus(Vec<&'static str>);

    #[async_trait]
    impl StorefrontSource for Skus {
        async fn resolve_location(&self, _name: &str) -> Result<LocationId, SyncError> {
            Ok(LocationId::new("1"))
        }

        async fn fetch_inventory(
            &self,
            _location: &LocationId,
            _cap: usize,
        ) -> Result<Snapshot<StorefrontRecord>, SyncError> {
            Ok(Snapshot::new("storefront"))
        }

        async fn fetch_variant_skus(&self) -> Result<BTreeSet<ProductKey>, SyncError> {
            Ok(self.0.iter().map(|s| ProductKey::from(*s)).collect())
        }
    }

    #[tokio::test]
    async fn refresh_replaces_the_cache() {
        let cache = Arc::new(MemorySkuCache::new([ProductKey::from("OLD")].into()));
        let svc = SkuCacheService::new(Arc::new(Skus(vec!["B", "A"])), cache.clone());

        assert_eq!(svc.refresh().await.unwrap(), 2);
        let stored: Vec<_> = cache.load().unwrap().into_iter().map(|k| k.0).collect();
        assert_eq!(stored, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn empty_storefront_keeps_previous_cache() {
        let cache = Arc::new(MemorySkuCache::new([ProductKey::from("OLD")].into()));
        let svc = SkuCacheService::new(Arc::new(Skus(vec![])), cache.clone());

        assert!(svc.refresh().await.is_err());
        assert_eq!(cache.load().unwrap().len(), 1);
    }
}
