use anyhow::Result;

use super::csv_body;
use crate::domain::{ports::OutputWriter, reconciliation::Reconciliation, value_objects::SyncField};

/// Matrixify bulk-update file: one `UPDATE` row per differing variant,
/// carrying the supplier value.
pub struct ImportFileWriter;

const UPDATE: &str = "UPDATE";

impl ImportFileWriter {
    fn header(field: SyncField) -> [&'static str; 3] {
        match field {
            SyncField::Quantity => [
                "Variant SKU",
                "Inventory Available: Shop location",
                "Variant Command",
            ],
            SyncField::Price => ["Variant SKU", "Variant Price", "Variant Command"],
        }
    }
}

impl OutputWriter for ImportFileWriter {
    fn format(&self, reconciliation: &Reconciliation) -> Result<String> {
        csv_body(
            Self::header(reconciliation.field),
            reconciliation.differences.iter().map(|d| {
                [
                    d.key.to_string(),
                    d.new_value.normalize().to_string(),
                    UPDATE.to_string(),
                ]
            }),
        )
    }

    fn file_name(&self, field: SyncField) -> &'static str {
        match field {
            SyncField::Quantity => "inventory_updates.csv",
            SyncField::Price => "price_updates.csv",
        }
    }
}
