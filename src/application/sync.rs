use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{
    ports::{BaselineStore, OutputWriter, Reconciler, SkuCache, StorefrontSource, SupplierSource},
    reconciliation::Reconciliation,
    snapshot::FieldSnapshot,
    value_objects::{LocationId, SyncMode},
};
use crate::error::SyncError;
use crate::presentation::writers::write_to_file;

/// How the stocking location for live runs is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSelector {
    Id(LocationId),
    /// Looked up by name on the storefront at run time.
    Named(String),
}

/// Per-run switches, resolved from configuration and CLI flags.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub location: LocationSelector,
    /// Caps storefront records fetched and differences reported; 0 = unlimited.
    pub limit: usize,
    /// Compute and report only: no export files, no baseline write.
    pub dry_run: bool,
    /// Record the supplier values as the new baseline after a delta run.
    pub persist_baseline: bool,
    pub output_dir: PathBuf,
}

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub reconciliation: Reconciliation,
    /// Export files written, empty when in sync or on a dry run.
    pub written: Vec<PathBuf>,
    pub baseline_saved: bool,
}

// ─── Sync Service ───

/// Sequences one sync run: fetch old side, fetch new side, reconcile, export.
///
/// Nothing is written until both sides were fetched and reconciled, so a
/// failed fetch never leaves partial output behind. The baseline is saved
/// last.
pub struct SyncService {
    storefront: Arc<dyn StorefrontSource>,
    supplier: Arc<dyn SupplierSource>,
    baseline: Arc<dyn BaselineStore>,
    sku_cache: Arc<dyn SkuCache>,
    reconciler: Arc<dyn Reconciler>,
    writers: Vec<Box<dyn OutputWriter>>,
}

impl SyncService {
    pub fn new(
        storefront: Arc<dyn StorefrontSource>,
        supplier: Arc<dyn SupplierSource>,
        baseline: Arc<dyn BaselineStore>,
        sku_cache: Arc<dyn SkuCache>,
        reconciler: Arc<dyn Reconciler>,
        writers: Vec<Box<dyn OutputWriter>>,
    ) -> Self {
        Self {
            storefront,
            supplier,
            baseline,
            sku_cache,
            reconciler,
            writers,
        }
    }

    pub async fn execute(&self, mode: SyncMode, opts: &RunOptions) -> Result<RunOutcome> {
        let field = mode.field();
        info!(%mode, limit = opts.limit, dry_run = opts.dry_run, "sync run started");

        // Checked before any network call.
        let shop_skus = if mode.uses_baseline() {
            let skus = self.sku_cache.load()?;
            if skus.is_empty() {
                return Err(SyncError::Configuration(
                    "shop SKU cache is empty; run `shopsync refresh-skus` first".into(),
                )
                .into());
            }
            Some(skus)
        } else {
            None
        };

        let old = if mode.uses_baseline() {
            let baseline = self.baseline.load(field)?;
            if baseline.is_empty() {
                warn!(%field, "no baseline recorded yet; this run only establishes one");
            }
            baseline
        } else {
            let location = self.location(&opts.location).await?;
            self.storefront
                .fetch_inventory(&location, opts.limit)
                .await
                .with_context(|| format!("fetching storefront inventory at {location}"))?
                .project(field)
        };

        let mut catalog = self
            .supplier
            .fetch_catalog(field)
            .await
            .context("fetching supplier feed")?;
        if let Some(skus) = &shop_skus {
            let before = catalog.len();
            catalog.retain_keys(skus);
            info!(before, after = catalog.len(), "supplier feed filtered to shop SKUs");
        }
        let new = catalog.project(field);

        let joined = self.reconciler.reconcile(&old, &new, opts.limit);
        let reconciliation = Reconciliation::new(mode, &old, &new, joined);

        let mut written = Vec::new();
        if reconciliation.is_in_sync() {
            info!(%mode, "in sync, no update file produced");
        } else if !opts.dry_run {
            for writer in &self.writers {
                written.push(write_to_file(writer.as_ref(), &reconciliation, &opts.output_dir)?);
            }
        }

        let baseline_saved = mode.uses_baseline() && opts.persist_baseline && !opts.dry_run;
        if baseline_saved {
            self.save_baseline(mode, &new)?;
        }

        Ok(RunOutcome {
            reconciliation,
            written,
            baseline_saved,
        })
    }

    async fn location(&self, selector: &LocationSelector) -> Result<LocationId> {
        match selector {
            LocationSelector::Id(id) => Ok(id.clone()),
            LocationSelector::Named(name) => Ok(self
                .storefront
                .resolve_location(name)
                .await
                .with_context(|| format!("resolving location \"{name}\""))?),
        }
    }

    fn save_baseline(&self, mode: SyncMode, snapshot: &FieldSnapshot) -> Result<()> {
        self.baseline.save(mode.field(), snapshot)?;
        info!(records = snapshot.len(), field = %mode.field(), "baseline saved");
        Ok(())
    }
}
