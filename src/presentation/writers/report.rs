use anyhow::Result;

use super::csv_body;
use crate::domain::{ports::OutputWriter, reconciliation::Reconciliation, value_objects::SyncField};

/// Human-readable companion to the import file: old value, new value and delta per SKU.
pub struct ReportWriter;

impl OutputWriter for ReportWriter {
    fn format(&self, reconciliation: &Reconciliation) -> Result<String> {
        let header = match reconciliation.field {
            SyncField::Quantity => ["sku", "shopify_qty", "vidaxl_qty", "difference"],
            SyncField::Price => ["sku", "shopify_price", "vidaxl_price", "difference"],
        };

        csv_body(
            header,
            reconciliation.differences.iter().map(|d| {
                [
                    d.key.to_string(),
                    d.old_value.normalize().to_string(),
                    d.new_value.normalize().to_string(),
                    d.delta.normalize().to_string(),
                ]
            }),
        )
    }

    fn file_name(&self, field: SyncField) -> &'static str {
        match field {
            SyncField::Quantity => "inventory_report.csv",
            SyncField::Price => "price_report.csv",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::difference::{Difference, DifferenceSet};
    use crate::domain::snapshot::FieldSnapshot;
    use crate::domain::value_objects::{ProductKey, SyncMode};
    use rust_decimal::Decimal;

    #[test]
    fn report_lists_old_new_and_delta() {
        let rc = Reconciliation::new(
            SyncMode::PriceLive,
            &FieldSnapshot::new(),
            &FieldSnapshot::new(),
            DifferenceSet {
                differences: vec![Difference::new(
                    ProductKey::from("A"),
                    "99.00".parse().unwrap(),
                    Decimal::from(79),
                )],
                truncated: false,
            },
        );

        assert_eq!(
            ReportWriter.format(&rc).unwrap(),
            "sku,shopify_price,vidaxl_price,difference\nA,99,79,-20\n"
        );
    }

    #[test]
    fn repeated_formatting_is_byte_identical() {
        let rc = Reconciliation::new(
            SyncMode::Inventory,
            &FieldSnapshot::new(),
            &FieldSnapshot::new(),
            DifferenceSet {
                differences: vec![Difference::new(ProductKey::from("B"), Decimal::from(10), Decimal::from(7))],
                truncated: false,
            },
        );

        let first = ReportWriter.format(&rc).unwrap();
        assert_eq!(first, "sku,shopify_qty,vidaxl_qty,difference\nB,10,7,-3\n");
        assert_eq!(ReportWriter.format(&rc).unwrap(), first);
    }
}
