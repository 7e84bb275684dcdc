use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::value_objects::{LocationId, ProductKey, SyncField};

/// Anything that can be keyed into a [`Snapshot`](crate::domain::snapshot::Snapshot)
/// and projected onto one [`SyncField`].
pub trait Record {
    fn key(&self) -> &ProductKey;

    /// Value for `field`, or `None` when this record does not carry it.
    fn field_value(&self, field: SyncField) -> Option<Decimal>;
}

/// One variant's inventory level at a single stocking location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorefrontRecord {
    pub key: ProductKey,
    pub quantity: i64,
    pub price: Option<Decimal>,
    pub location_id: LocationId,
}

impl Record for StorefrontRecord {
    fn key(&self) -> &ProductKey {
        &self.key
    }

    fn field_value(&self, field: SyncField) -> Option<Decimal> {
        match field {
            SyncField::Quantity => Some(Decimal::from(self.quantity)),
            SyncField::Price => self.price,
        }
    }
}

/// One row of the supplier feed. `price` is the retail price, present only
/// when the feed was parsed for a price run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierRecord {
    pub key: ProductKey,
    pub quantity: i64,
    pub price: Option<Decimal>,
}

impl Record for SupplierRecord {
    fn key(&self) -> &ProductKey {
        &self.key
    }

    fn field_value(&self, field: SyncField) -> Option<Decimal> {
        match field {
            SyncField::Quantity => Some(Decimal::from(self.quantity)),
            SyncField::Price => self.price,
        }
    }
}
