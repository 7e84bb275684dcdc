use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::difference::{Difference, DifferenceSet};
use crate::domain::snapshot::FieldSnapshot;
use crate::domain::value_objects::{SyncField, SyncMode};

/// Outcome of one reconciliation pass, ready for the export writers.
#[derive(Debug, Serialize, Clone)]
pub struct Reconciliation {
    pub run_id: String,
    pub mode: SyncMode,
    pub field: SyncField,
    pub created_at: String,
    /// Sorted ascending by key.
    pub differences: Vec<Difference>,
    pub summary: Summary,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Summary {
    pub left_keys: usize,
    pub right_keys: usize,
    pub common_keys: usize,
    pub total_differences: usize,
    pub increases: usize,
    pub decreases: usize,
    pub total_increase: Decimal,
    /// Sum of the negative deltas (zero or below).
    pub total_decrease: Decimal,
    /// Set when the difference cap stopped collection early.
    pub truncated: bool,
}

impl Reconciliation {
    pub fn new(
        mode: SyncMode,
        left: &FieldSnapshot,
        right: &FieldSnapshot,
        joined: DifferenceSet,
    ) -> Self {
        let DifferenceSet {
            mut differences,
            truncated,
        } = joined;
        differences.sort_by(|a, b| a.key.cmp(&b.key));

        let mut increases = 0;
        let mut decreases = 0;
        let mut total_increase = Decimal::ZERO;
        let mut total_decrease = Decimal::ZERO;
        for d in &differences {
            if d.is_increase() {
                increases += 1;
                total_increase += d.delta;
            } else {
                decreases += 1;
                total_decrease += d.delta;
            }
        }

        Reconciliation {
            run_id: format!(
                "rc_{}_{}",
                Utc::now().format("%Y%m%d_%H%M%S"),
                Uuid::new_v4().simple()
            ),
            mode,
            field: mode.field(),
            created_at: Utc::now().to_rfc3339(),
            summary: Summary {
                left_keys: left.len(),
                right_keys: right.len(),
                common_keys: left.common_keys(right),
                total_differences: differences.len(),
                increases,
                decreases,
                total_increase,
                total_decrease,
                truncated,
            },
            differences,
        }
    }

    pub fn is_in_sync(&self) -> bool {
        self.differences.is_empty()
    }
}
