use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use crate::application::sync::LocationSelector;
use crate::domain::value_objects::{LocationId, SyncMode};
use crate::error::SyncError;

/// Minimum pause between storefront pages.
pub const MIN_PAGE_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub shopify: ShopifyConfig,
    #[serde(default)]
    pub supplier: SupplierConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ShopifyConfig {
    /// Store domain (`my-shop.myshopify.com`) or full origin.
    pub store_url: Option<String>,
    pub access_token: Option<String>,
    pub api_version: String,
    /// Takes precedence over `location_name` when set.
    pub location_id: Option<String>,
    pub location_name: String,
    pub timeout_secs: u64,
    pub page_delay_ms: u64,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            access_token: None,
            api_version: "2024-01".to_string(),
            location_id: None,
            location_name: "Shop location".to_string(),
            timeout_secs: 60,
            page_delay_ms: MIN_PAGE_DELAY_MS,
        }
    }
}

// Keeps the access token out of logs.
impl fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store_url", &self.store_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("api_version", &self.api_version)
            .field("location_id", &self.location_id)
            .field("location_name", &self.location_name)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_delay_ms", &self.page_delay_ms)
            .finish()
    }
}

impl ShopifyConfig {
    /// Admin GraphQL endpoint. A bare domain is assumed to be HTTPS.
    pub fn graphql_endpoint(&self) -> String {
        let store = self
            .store_url
            .as_deref()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/');
        let origin = if store.starts_with("http://") || store.starts_with("https://") {
            store.to_string()
        } else {
            format!("https://{store}")
        };
        format!("{}/admin/api/{}/graphql.json", origin, self.api_version)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SupplierConfig {
    pub feed_url: Option<String>,
    pub delimiter: char,
    pub sku_column: String,
    pub stock_column: String,
    /// Wholesale price column; retail is derived through `[pricing]`.
    pub price_column: String,
    pub timeout_secs: u64,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            delimiter: ',',
            sku_column: "SKU".to_string(),
            stock_column: "Stock".to_string(),
            price_column: "B2B price".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    pub test_mode: bool,
    pub test_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            test_mode: false,
            test_limit: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    pub markup: Decimal,
    /// Retail prices are rounded up to a multiple of this, minus one. 0 disables rounding.
    pub rounding_step: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            markup: Decimal::new(160, 2),
            rounding_step: Decimal::TEN,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StateConfig {
    /// Holds `last_inventory.csv` / `last_prices.csv`.
    pub dir: PathBuf,
    pub sku_cache: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("state"),
            sku_cache: PathBuf::from("state/shop_skus.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

/// Environment variables the scheduler injects, mapped onto config keys.
const WELL_KNOWN_ENV: &[(&str, &str)] = &[
    ("SHOPIFY_STORE_URL", "shopify.store_url"),
    ("SHOPIFY_ACCESS_TOKEN", "shopify.access_token"),
    ("SHOPIFY_LOCATION_ID", "shopify.location_id"),
    ("VIDAXL_FEED_URL", "supplier.feed_url"),
];

impl AppConfig {
    /// Load `path` (optional) layered with `SHOPSYNC_<SECTION>__<KEY>` and the
    /// well-known Shopify / VidaXL variables, which win.
    pub fn load(path: &str) -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("SHOPSYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        let builder = with_well_known_env(builder)?;

        let cfg = builder
            .build()
            .with_context(|| format!("Failed to load config: {}", path))?
            .try_deserialize()
            .with_context(|| "Failed to parse config")?;
        Ok(cfg)
    }

    /// Parse a TOML document on its own, without consulting the environment.
    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .with_context(|| "Failed to read config TOML")?
            .try_deserialize()
            .with_context(|| "Failed to parse config TOML")?;
        Ok(cfg)
    }

    /// Check everything a run of `mode` needs before any network call.
    /// `None` validates for the SKU cache refresh.
    pub fn validate(&self, mode: Option<SyncMode>) -> Result<(), SyncError> {
        let needs_storefront = mode.map_or(true, SyncMode::needs_storefront);

        if needs_storefront {
            if is_blank(&self.shopify.store_url) {
                return Err(SyncError::Configuration(
                    "shopify.store_url is not set (SHOPIFY_STORE_URL)".into(),
                ));
            }
            if is_blank(&self.shopify.access_token) {
                return Err(SyncError::Configuration(
                    "shopify.access_token is not set (SHOPIFY_ACCESS_TOKEN)".into(),
                ));
            }
            if self.shopify.page_delay_ms < MIN_PAGE_DELAY_MS {
                return Err(SyncError::Configuration(format!(
                    "shopify.page_delay_ms must be at least {MIN_PAGE_DELAY_MS}, got {}",
                    self.shopify.page_delay_ms
                )));
            }
        }

        if mode.is_some() && is_blank(&self.supplier.feed_url) {
            return Err(SyncError::Configuration(
                "supplier.feed_url is not set (VIDAXL_FEED_URL)".into(),
            ));
        }

        if self.pricing.markup <= Decimal::ZERO || self.pricing.rounding_step < Decimal::ZERO {
            return Err(SyncError::Configuration(
                "pricing.markup must be positive and pricing.rounding_step non-negative".into(),
            ));
        }

        if self.sync.test_mode && self.sync.test_limit == 0 {
            return Err(SyncError::Configuration(
                "sync.test_limit must be greater than 0 in test mode".into(),
            ));
        }

        Ok(())
    }

    /// Difference / fetch cap for this run: `test_limit` in test mode, otherwise unlimited.
    pub fn effective_limit(&self) -> usize {
        if self.sync.test_mode {
            self.sync.test_limit
        } else {
            0
        }
    }

    pub fn location_selector(&self) -> LocationSelector {
        match self.shopify.location_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => LocationSelector::Id(LocationId::new(id)),
            _ => LocationSelector::Named(self.shopify.location_name.clone()),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn with_well_known_env(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>> {
    for (var, key) in WELL_KNOWN_ENV {
        let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
        builder = builder
            .set_override_option(*key, value)
            .with_context(|| format!("Failed to apply {}", var))?;
    }
    Ok(builder)
}
