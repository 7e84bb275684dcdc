use serde::{Deserialize, Serialize};
use std::fmt;

/// SKU shared by storefront and supplier. Case-sensitive, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductKey(pub String);

impl ProductKey {
    /// Trim `raw` and return `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ProductKey(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ProductKey {
    fn from(s: &str) -> Self {
        ProductKey(s.to_string())
    }
}

/// Shopify stocking location, always held as a `gid://` global id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub String);

impl LocationId {
    const GID_PREFIX: &'static str = "gid://shopify/Location/";

    /// Accepts either a full global id or the bare numeric id from the admin UI.
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("gid://") {
            LocationId(raw.to_string())
        } else {
            LocationId(format!("{}{}", Self::GID_PREFIX, raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The value dimension a run compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncField {
    Quantity,
    Price,
}

impl fmt::Display for SyncField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncField::Quantity => f.write_str("quantity"),
            SyncField::Price => f.write_str("price"),
        }
    }
}

/// Which two snapshots a run joins.
///
/// The live modes compare the storefront against the supplier feed; the
/// delta modes compare the persisted baseline against the supplier feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    Inventory,
    InventoryDelta,
    Price,
    PriceLive,
}

impl SyncMode {
    pub fn field(self) -> SyncField {
        match self {
            SyncMode::Inventory | SyncMode::InventoryDelta => SyncField::Quantity,
            SyncMode::Price | SyncMode::PriceLive => SyncField::Price,
        }
    }

    /// `true` when the left side is the persisted baseline.
    pub fn uses_baseline(self) -> bool {
        matches!(self, SyncMode::InventoryDelta | SyncMode::Price)
    }

    pub fn needs_storefront(self) -> bool {
        !self.uses_baseline()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncMode::Inventory => "inventory",
            SyncMode::InventoryDelta => "inventory-delta",
            SyncMode::Price => "price",
            SyncMode::PriceLive => "price-live",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
