use crate::domain::{
    difference::{Difference, DifferenceSet},
    ports::Reconciler,
    snapshot::FieldSnapshot,
};

// ─── Key Join Reconciler (implementation of the port) ───

/// Inner join on product key.
///
/// Keys present on only one side are ignored: additions and removals are
/// not managed, only levels of products both catalogs know. The old side is
/// walked in ascending key order, so a `limit` yields the first `limit`
/// differences by key.
#[derive(Default)]
pub struct KeyJoinReconciler;

impl KeyJoinReconciler {
    pub fn new() -> Self {
        Self
    }
}

impl Reconciler for KeyJoinReconciler {
    fn reconcile(&self, old: &FieldSnapshot, new: &FieldSnapshot, limit: usize) -> DifferenceSet {
        let mut set = DifferenceSet::default();

        for (key, old_value) in old.iter() {
            let Some(new_value) = new.get(key) else {
                continue;
            };
            // Decimal equality is numeric: 159 == 159.00
            if old_value == new_value {
                continue;
            }
            if limit > 0 && set.differences.len() >= limit {
                set.truncated = true;
                break;
            }
            set.differences
                .push(Difference::new(key.clone(), *old_value, *new_value));
        }

        set
    }
}
