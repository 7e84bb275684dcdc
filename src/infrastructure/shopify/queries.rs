//! Admin GraphQL documents and the response shapes they decode into.

use serde::Deserialize;

pub(super) const LOCATIONS_QUERY: &str = r#"
query Locations {
  locations(first: 50) {
    edges { node { id name } }
  }
}
"#;

pub(super) const INVENTORY_LEVELS_QUERY: &str = r#"
query InventoryLevels($locationId: ID!, $first: Int!, $cursor: String) {
  location(id: $locationId) {
    inventoryLevels(first: $first, after: $cursor) {
      edges {
        node {
          quantities(names: ["available"]) { name quantity }
          item {
            sku
            variant { sku price }
          }
        }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;

pub(super) const VARIANT_SKUS_QUERY: &str = r#"
query VariantSkus($first: Int!, $cursor: String) {
  productVariants(first: $first, after: $cursor) {
    edges { node { sku } }
    pageInfo { hasNextPage endCursor }
  }
}
"#;

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Edge<N> {
    pub node: N,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Connection<N> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
}

// ─── locations ───

#[derive(Debug, Deserialize)]
pub(super) struct LocationsData {
    pub locations: LocationEdges,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationEdges {
    pub edges: Vec<Edge<LocationNode>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationNode {
    pub id: String,
    pub name: String,
}

// ─── inventoryLevels ───

#[derive(Debug, Deserialize)]
pub(super) struct InventoryData {
    pub location: Option<InventoryLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InventoryLocation {
    pub inventory_levels: Connection<InventoryLevelNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InventoryLevelNode {
    #[serde(default)]
    pub quantities: Vec<NamedQuantity>,
    pub item: Option<InventoryItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NamedQuantity {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct InventoryItem {
    pub sku: Option<String>,
    pub variant: Option<VariantRef>,
}

#[derive(Debug, Deserialize)]
pub(super) struct VariantRef {
    pub sku: Option<String>,
    /// Money scalar, e.g. "12.99".
    pub price: Option<String>,
}

// ─── productVariants ───

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VariantSkusData {
    pub product_variants: Connection<SkuNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SkuNode {
    pub sku: Option<String>,
}
