use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use super::queries::{
    GraphQlResponse, InventoryData, InventoryLevelNode, LocationsData, VariantSkusData,
    INVENTORY_LEVELS_QUERY, LOCATIONS_QUERY, VARIANT_SKUS_QUERY,
};
use crate::domain::ports::StorefrontSource;
use crate::domain::records::StorefrontRecord;
use crate::domain::snapshot::Snapshot;
use crate::domain::value_objects::{LocationId, ProductKey};
use crate::error::SyncError;
use crate::infrastructure::config::ShopifyConfig;

const SOURCE: &str = "shopify";

/// Records per GraphQL page, the Admin API maximum.
pub const PAGE_SIZE: u32 = 250;

/// Guard against a cursor that never reaches the last page.
pub const MAX_PAGES: usize = 10_000;

/// Read-only Shopify Admin GraphQL client.
///
/// Pages are fetched strictly one after another with `page_delay` between
/// requests. Any failure discards what earlier pages returned.
pub struct ShopifyClient {
    client: Client,
    endpoint: String,
    access_token: String,
    page_delay: Duration,
}

impl ShopifyClient {
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
        page_delay: Duration,
    ) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("shopsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SyncError::Transport {
                source_name: SOURCE.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
            page_delay,
        })
    }

    pub fn from_config(cfg: &ShopifyConfig) -> Result<Self, SyncError> {
        Self::new(
            cfg.graphql_endpoint(),
            cfg.access_token.clone().unwrap_or_default(),
            Duration::from_secs(cfg.timeout_secs),
            Duration::from_millis(cfg.page_delay_ms),
        )
    }

    /// POST one GraphQL document and decode its `data`.
    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, SyncError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                source_name: SOURCE.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::upstream(SOURCE, format!("HTTP {}", status.as_u16())));
        }

        let body = response.text().await.map_err(|source| SyncError::Transport {
            source_name: SOURCE.to_string(),
            source,
        })?;
        let parsed: GraphQlResponse<T> = serde_json::from_str(&body)
            .map_err(|e| SyncError::upstream(SOURCE, format!("undecodable response: {e}")))?;

        if !parsed.errors.is_empty() {
            let messages: Vec<_> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(SyncError::upstream(SOURCE, messages.join("; ")));
        }

        parsed
            .data
            .ok_or_else(|| SyncError::upstream(SOURCE, "response has no data"))
    }

    async fn pause_between_pages(&self, page: usize) {
        if page > 0 && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
    }
}

#[async_trait]
impl StorefrontSource for ShopifyClient {
    async fn resolve_location(&self, name: &str) -> Result<LocationId, SyncError> {
        let data: LocationsData = self.query(LOCATIONS_QUERY, json!({})).await?;
        let mut nodes = data.locations.edges.into_iter().map(|e| e.node);

        let first = nodes
            .next()
            .ok_or_else(|| SyncError::upstream(SOURCE, "store has no locations"))?;
        if first.name == name {
            return Ok(LocationId::new(&first.id));
        }
        if let Some(found) = nodes.find(|n| n.name == name) {
            return Ok(LocationId::new(&found.id));
        }

        warn!(wanted = name, using = %first.name, "location not found by name, using the first location");
        Ok(LocationId::new(&first.id))
    }

    async fn fetch_inventory(
        &self,
        location: &LocationId,
        cap: usize,
    ) -> Result<Snapshot<StorefrontRecord>, SyncError> {
        let mut snapshot = Snapshot::new("storefront");
        let mut cursor: Option<String> = None;
        let mut dropped = 0usize;
        let mut page = 0usize;

        'pages: loop {
            if page >= MAX_PAGES {
                return Err(SyncError::upstream(
                    SOURCE,
                    format!("pagination exceeded {MAX_PAGES} pages"),
                ));
            }
            self.pause_between_pages(page).await;

            let data: InventoryData = self
                .query(
                    INVENTORY_LEVELS_QUERY,
                    json!({ "locationId": location.as_str(), "first": PAGE_SIZE, "cursor": cursor }),
                )
                .await?;
            let levels = data
                .location
                .ok_or_else(|| SyncError::upstream(SOURCE, format!("location {location} not found")))?
                .inventory_levels;
            page += 1;

            for edge in levels.edges {
                match level_to_record(edge.node, location)? {
                    Some(record) => snapshot.insert(record)?,
                    None => dropped += 1,
                }
                if cap > 0 && snapshot.len() >= cap {
                    debug!(cap, "record cap reached, stopping pagination");
                    break 'pages;
                }
            }

            debug!(page, records = snapshot.len(), "inventory page fetched");

            if !levels.page_info.has_next_page {
                break;
            }
            cursor = Some(levels.page_info.end_cursor.ok_or_else(|| {
                SyncError::upstream(SOURCE, "hasNextPage set without an endCursor")
            })?);
        }

        if dropped > 0 {
            debug!(dropped, "inventory levels without a SKU were skipped");
        }
        Ok(snapshot)
    }

    async fn fetch_variant_skus(&self) -> Result<BTreeSet<ProductKey>, SyncError> {
        let mut skus = BTreeSet::new();
        let mut cursor: Option<String> = None;
        let mut page = 0usize;

        loop {
            if page >= MAX_PAGES {
                return Err(SyncError::upstream(
                    SOURCE,
                    format!("pagination exceeded {MAX_PAGES} pages"),
                ));
            }
            self.pause_between_pages(page).await;

            let data: VariantSkusData = self
                .query(VARIANT_SKUS_QUERY, json!({ "first": PAGE_SIZE, "cursor": cursor }))
                .await?;
            let variants = data.product_variants;
            page += 1;

            skus.extend(
                variants
                    .edges
                    .into_iter()
                    .filter_map(|e| e.node.sku.as_deref().and_then(ProductKey::parse)),
            );
            debug!(page, skus = skus.len(), "variant page fetched");

            if !variants.page_info.has_next_page {
                break;
            }
            cursor = Some(variants.page_info.end_cursor.ok_or_else(|| {
                SyncError::upstream(SOURCE, "hasNextPage set without an endCursor")
            })?);
        }

        Ok(skus)
    }
}

/// Key from the item's own SKU, else its variant's. `None` when neither is set.
fn level_to_record(
    node: InventoryLevelNode,
    location: &LocationId,
) -> Result<Option<StorefrontRecord>, SyncError> {
    let Some(item) = node.item else {
        return Ok(None);
    };
    let variant = item.variant;

    let key = item
        .sku
        .as_deref()
        .and_then(ProductKey::parse)
        .or_else(|| {
            variant
                .as_ref()
                .and_then(|v| v.sku.as_deref())
                .and_then(ProductKey::parse)
        });
    let Some(key) = key else {
        return Ok(None);
    };

    let quantity = node
        .quantities
        .iter()
        .find(|q| q.name == "available")
        .map_or(0, |q| q.quantity);

    let price = match variant.and_then(|v| v.price) {
        Some(raw) => Some(Decimal::from_str(raw.trim()).map_err(|e| {
            SyncError::upstream(SOURCE, format!("invalid price \"{raw}\" for {key}: {e}"))
        })?),
        None => None,
    };

    Ok(Some(StorefrontRecord {
        key,
        quantity,
        price,
        location_id: location.clone(),
    }))
}
