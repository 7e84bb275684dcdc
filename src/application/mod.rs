pub mod monitoring;
pub mod reconcile;
pub mod sku_cache;
pub mod sync;
