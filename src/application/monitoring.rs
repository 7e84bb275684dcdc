use crate::domain::ports::{Reconciler, StorefrontSource, SupplierSource};
use crate::domain::{
    difference::DifferenceSet,
    records::{StorefrontRecord, SupplierRecord},
    snapshot::{FieldSnapshot, Snapshot},
    value_objects::{LocationId, ProductKey, SyncField},
};
use crate::error::SyncError;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, instrument};

// ─── PerfReport ──────────────────────────────────────────────────────────────

/// A single timed operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpTiming {
    /// Operation name: "fetch_inventory", "fetch_variant_skus", "fetch_catalog" or "reconcile".
    pub operation: &'static str,
    /// What the operation ran against (location id, feed, field).
    pub subject: String,
    /// Elapsed wall time in milliseconds.
    pub duration_ms: u128,
    /// Number of records fetched or compared.
    pub records: usize,
}

/// Accumulated performance timings for a single run.
///
/// Shared across all decorator instances for one run via `Arc<Mutex<_>>`.
/// After the run, pass to [`crate::presentation::cli_summary::print_perf_summary`]
/// to render a human-readable table.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct PerfReport {
    pub timings: Vec<OpTiming>,
    pub total_records_fetched: usize,
    pub total_ms: u128,
}

impl PerfReport {
    pub fn new() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    fn record(report: &Arc<Mutex<Self>>, timing: OpTiming) {
        if let Ok(mut r) = report.lock() {
            r.total_ms += timing.duration_ms;
            if timing.operation.starts_with("fetch_") {
                r.total_records_fetched += timing.records;
            }
            r.timings.push(timing);
        }
    }
}

// ─── MonitoringStorefrontSource ──────────────────────────────────────────────

/// Decorator: wraps any `StorefrontSource`, measures wall time per fetch,
/// and appends the result to the shared `PerfReport`.
pub struct MonitoringStorefrontSource {
    inner: Arc<dyn StorefrontSource>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringStorefrontSource {
    pub fn new(inner: Arc<dyn StorefrontSource>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

#[async_trait]
impl StorefrontSource for MonitoringStorefrontSource {
    async fn resolve_location(&self, name: &str) -> Result<LocationId, SyncError> {
        self.inner.resolve_location(name).await
    }

    #[instrument(
        name = "fetch_inventory",
        skip(self, location),
        fields(shopify.location = %location),
        level = "info"
    )]
    async fn fetch_inventory(
        &self,
        location: &LocationId,
        cap: usize,
    ) -> Result<Snapshot<StorefrontRecord>, SyncError> {
        let start = Instant::now();
        let snapshot = self.inner.fetch_inventory(location, cap).await?;
        let duration_ms = start.elapsed().as_millis();

        info!(location = %location, records = snapshot.len(), duration_ms, "fetch_inventory completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "fetch_inventory",
                subject: location.to_string(),
                duration_ms,
                records: snapshot.len(),
            },
        );

        Ok(snapshot)
    }

    #[instrument(name = "fetch_variant_skus", skip(self), level = "info")]
    async fn fetch_variant_skus(&self) -> Result<BTreeSet<ProductKey>, SyncError> {
        let start = Instant::now();
        let skus = self.inner.fetch_variant_skus().await?;
        let duration_ms = start.elapsed().as_millis();

        info!(skus = skus.len(), duration_ms, "fetch_variant_skus completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "fetch_variant_skus",
                subject: "productVariants".to_string(),
                duration_ms,
                records: skus.len(),
            },
        );

        Ok(skus)
    }
}

// ─── MonitoringSupplierSource ────────────────────────────────────────────────

/// Decorator: wraps any `SupplierSource`, measures wall time per feed fetch,
/// and appends the result to the shared `PerfReport`.
pub struct MonitoringSupplierSource {
    inner: Arc<dyn SupplierSource>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringSupplierSource {
    pub fn new(inner: Arc<dyn SupplierSource>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

#[async_trait]
impl SupplierSource for MonitoringSupplierSource {
    #[instrument(name = "fetch_catalog", skip(self), fields(sync.field = %field), level = "info")]
    async fn fetch_catalog(&self, field: SyncField) -> Result<Snapshot<SupplierRecord>, SyncError> {
        let start = Instant::now();
        let snapshot = self.inner.fetch_catalog(field).await?;
        let duration_ms = start.elapsed().as_millis();

        info!(records = snapshot.len(), duration_ms, "fetch_catalog completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "fetch_catalog",
                subject: "supplier feed".to_string(),
                duration_ms,
                records: snapshot.len(),
            },
        );

        Ok(snapshot)
    }
}

// ─── MonitoringReconciler ────────────────────────────────────────────────────

/// Decorator: wraps any `Reconciler`, measures wall time per join,
/// and appends the result to the shared `PerfReport`.
pub struct MonitoringReconciler {
    inner: Arc<dyn Reconciler>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringReconciler {
    pub fn new(inner: Arc<dyn Reconciler>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

impl Reconciler for MonitoringReconciler {
    #[instrument(
        name = "reconcile",
        skip(self, old, new),
        fields(old.keys = old.len(), new.keys = new.len()),
        level = "info"
    )]
    fn reconcile(&self, old: &FieldSnapshot, new: &FieldSnapshot, limit: usize) -> DifferenceSet {
        let start = Instant::now();
        let result = self.inner.reconcile(old, new, limit);
        let duration_ms = start.elapsed().as_millis();

        info!(old_keys = old.len(), new_keys = new.len(), differences = result.len(), duration_ms, "reconcile completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                operation: "reconcile",
                subject: format!("{} vs {} keys", old.len(), new.len()),
                duration_ms,
                records: old.len() + new.len(),
            },
        );

        result
    }
}
