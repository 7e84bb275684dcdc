use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{
    difference::DifferenceSet,
    reconciliation::Reconciliation,
    records::{StorefrontRecord, SupplierRecord},
    snapshot::{FieldSnapshot, Snapshot},
    value_objects::{LocationId, ProductKey, SyncField},
};
use crate::error::SyncError;

/// Port: live storefront state (implemented by ShopifyClient)
#[async_trait]
pub trait StorefrontSource: Send + Sync {
    /// Find a stocking location by name.
    async fn resolve_location(&self, name: &str) -> Result<LocationId, SyncError>;

    /// All inventory levels at `location`. `cap` > 0 stops after that many records.
    async fn fetch_inventory(
        &self,
        location: &LocationId,
        cap: usize,
    ) -> Result<Snapshot<StorefrontRecord>, SyncError>;

    /// Every non-blank variant SKU in the store.
    async fn fetch_variant_skus(&self) -> Result<BTreeSet<ProductKey>, SyncError>;
}

/// Port: supplier feed (implemented by HttpSupplierFeed)
#[async_trait]
pub trait SupplierSource: Send + Sync {
    /// Fetch and parse the whole feed. Prices are only parsed for `SyncField::Price`.
    async fn fetch_catalog(&self, field: SyncField) -> Result<Snapshot<SupplierRecord>, SyncError>;
}

/// Port: last-known supplier values (implemented by CsvBaselineStore)
pub trait BaselineStore: Send + Sync {
    /// Returns an empty snapshot when nothing was saved yet.
    fn load(&self, field: SyncField) -> Result<FieldSnapshot, SyncError>;
    fn save(&self, field: SyncField, snapshot: &FieldSnapshot) -> Result<(), SyncError>;
}

/// Port: cached storefront SKU set (implemented by JsonSkuCache)
pub trait SkuCache: Send + Sync {
    /// Returns an empty set when the cache was never written.
    fn load(&self) -> Result<BTreeSet<ProductKey>, SyncError>;
    fn save(&self, skus: &BTreeSet<ProductKey>) -> Result<(), SyncError>;
}

/// Port: join algorithm (implemented by KeyJoinReconciler)
pub trait Reconciler: Send + Sync {
    /// Differences for keys present on both sides whose values differ.
    /// `limit` > 0 caps the number returned; `truncated` is set only when a
    /// differing key was left out because of it.
    fn reconcile(&self, old: &FieldSnapshot, new: &FieldSnapshot, limit: usize) -> DifferenceSet;
}

/// Port: output formatting (implemented by ImportFileWriter, ReportWriter)
pub trait OutputWriter: Send + Sync {
    /// Serializes the reconciliation to the file body.
    fn format(&self, reconciliation: &Reconciliation) -> Result<String>;
    /// File name for runs over `field` (e.g. "inventory_updates.csv").
    fn file_name(&self, field: SyncField) -> &'static str;
}
