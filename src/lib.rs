use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// ─── Log level ────────────────────────────────────────────────────────────────

/// Controls the verbosity of shopsync's internal tracing output.
///
/// Pass to [`init_tracing`] before calling any async entry point.
///
/// | Variant | `tracing` level | When to use                              |
/// |---------|-----------------|------------------------------------------|
/// | `Error` | `error`         | `--quiet` / scheduled runs               |
/// | `Info`  | `info`          | Default, shows per-fetch timings         |
/// | `Debug` | `debug`         | `--verbose`, shows pages and skipped rows |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

/// Initialise the global `tracing` subscriber.
///
/// Respects `RUST_LOG` when set, falling back to `level` otherwise. Call this
/// once at startup. Library consumers with their own subscriber skip it.
///
/// Only available with the `cli` feature (pulls in `tracing-subscriber`).
#[cfg(feature = "cli")]
pub fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;

    let default_filter = match level {
        LogLevel::Error => "shopsync=error",
        LogLevel::Info => "shopsync=info",
        LogLevel::Debug => "shopsync=debug",
    };

    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

// ─── Public API Facade ───

pub use application::monitoring::PerfReport;
pub use application::sync::{LocationSelector, RunOptions, RunOutcome};
pub use domain::difference::Difference;
pub use domain::pricing::RetailPricing;
pub use domain::reconciliation::{Reconciliation, Summary};
pub use domain::snapshot::{FieldSnapshot, Snapshot};
pub use domain::value_objects::{LocationId, ProductKey, SyncField, SyncMode};
pub use error::SyncError;
pub use infrastructure::config::{
    AppConfig, OutputConfig, PricingConfig, ShopifyConfig, StateConfig, SupplierConfig, SyncConfig,
};

use crate::application::monitoring::{
    MonitoringReconciler, MonitoringStorefrontSource, MonitoringSupplierSource,
};
use crate::application::reconcile::KeyJoinReconciler;
use crate::application::sku_cache::SkuCacheService;
use crate::application::sync::SyncService;
use crate::domain::ports::StorefrontSource;
use crate::infrastructure::shopify::ShopifyClient;
use crate::infrastructure::state::{CsvBaselineStore, JsonSkuCache};
use crate::infrastructure::supplier::HttpSupplierFeed;
use crate::presentation::writers::all_writers;

// ─── Public entry points ───

/// One sync run in `mode`. Use [`run_with_timing`] for a performance report.
pub async fn run(cfg: &AppConfig, mode: SyncMode, dry_run: bool) -> Result<RunOutcome> {
    let (outcome, _) = run_with_timing(cfg, mode, dry_run).await?;
    Ok(outcome)
}

/// One sync run plus a [`PerfReport`] with fetch and reconcile timings.
///
/// Configuration is validated before any network call. In test mode the
/// fetch and difference cap is `sync.test_limit` and the baseline is never
/// saved.
pub async fn run_with_timing(
    cfg: &AppConfig,
    mode: SyncMode,
    dry_run: bool,
) -> Result<(RunOutcome, PerfReport)> {
    cfg.validate(Some(mode))?;
    let report = PerfReport::new();

    let storefront = build_storefront(cfg, Arc::clone(&report))?;
    let supplier = Arc::new(MonitoringSupplierSource::new(
        Arc::new(HttpSupplierFeed::from_config(&cfg.supplier, &cfg.pricing)?),
        Arc::clone(&report),
    ));
    let reconciler = Arc::new(MonitoringReconciler::new(
        Arc::new(KeyJoinReconciler::new()),
        Arc::clone(&report),
    ));

    let service = SyncService::new(
        storefront,
        supplier,
        Arc::new(CsvBaselineStore::new(&cfg.state.dir)),
        Arc::new(JsonSkuCache::new(&cfg.state.sku_cache)),
        reconciler,
        all_writers(),
    );

    let outcome = service
        .execute(mode, &run_options(cfg, dry_run))
        .await
        .with_context(|| format!("{mode} sync failed"))?;

    let perf = report.lock().map(|r| r.clone()).unwrap_or_default();
    Ok((outcome, perf))
}

/// Per-run switches derived from configuration.
pub fn run_options(cfg: &AppConfig, dry_run: bool) -> RunOptions {
    RunOptions {
        location: cfg.location_selector(),
        limit: cfg.effective_limit(),
        dry_run,
        persist_baseline: !cfg.sync.test_mode,
        output_dir: cfg.output.dir.clone(),
    }
}

/// Re-fetch every storefront variant SKU into the SKU cache.
///
/// Returns the number of SKUs cached. An empty storefront result is an
/// error and keeps the previous cache.
pub async fn refresh_sku_cache(cfg: &AppConfig) -> Result<usize> {
    cfg.validate(None)?;
    let storefront = build_storefront(cfg, PerfReport::new())?;
    let service = SkuCacheService::new(
        storefront,
        Arc::new(JsonSkuCache::new(&cfg.state.sku_cache)),
    );

    let count = service.refresh().await?;
    info!(count, path = %cfg.state.sku_cache.display(), "SKU cache written");
    Ok(count)
}

// ─── Private helpers ───────────────────────────────────────────────────────────

/// Shopify client wrapped in the monitoring decorator.
fn build_storefront(
    cfg: &AppConfig,
    report: Arc<std::sync::Mutex<PerfReport>>,
) -> Result<Arc<dyn StorefrontSource>> {
    let client = Arc::new(ShopifyClient::from_config(&cfg.shopify)?);
    Ok(Arc::new(MonitoringStorefrontSource::new(client, report)))
}
