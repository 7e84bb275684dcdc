use std::collections::{btree_map, BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::domain::records::Record;
use crate::domain::value_objects::{ProductKey, SyncField};
use crate::error::SyncError;

/// Point-in-time view of one side, keyed by product.
///
/// Keys are unique: [`Snapshot::insert`] rejects a second record for the
/// same key instead of overwriting it.
#[derive(Debug, Clone)]
pub struct Snapshot<R> {
    label: &'static str,
    records: BTreeMap<ProductKey, R>,
}

impl<R: Record> Snapshot<R> {
    /// `label` names the side in error messages ("storefront", "supplier").
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            records: BTreeMap::new(),
        }
    }

    pub fn from_records(
        label: &'static str,
        records: impl IntoIterator<Item = R>,
    ) -> Result<Self, SyncError> {
        let mut snapshot = Self::new(label);
        for record in records {
            snapshot.insert(record)?;
        }
        Ok(snapshot)
    }

    pub fn insert(&mut self, record: R) -> Result<(), SyncError> {
        match self.records.entry(record.key().clone()) {
            btree_map::Entry::Occupied(e) => Err(SyncError::DuplicateKey {
                snapshot: self.label.to_string(),
                key: e.key().0.clone(),
            }),
            btree_map::Entry::Vacant(e) => {
                e.insert(record);
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &ProductKey) -> Option<&R> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    /// Keep only the records whose key is in `keys`.
    pub fn retain_keys(&mut self, keys: &BTreeSet<ProductKey>) {
        self.records.retain(|k, _| keys.contains(k));
    }

    /// Keep at most the first `cap` records in key order (0 keeps all).
    pub fn truncate(&mut self, cap: usize) {
        if cap == 0 || self.records.len() <= cap {
            return;
        }
        if let Some(first_dropped) = self.records.keys().nth(cap).cloned() {
            let _dropped = self.records.split_off(&first_dropped);
        }
    }

    /// Project onto one field. Records that do not carry the field are left out.
    pub fn project(&self, field: SyncField) -> FieldSnapshot {
        self.records
            .iter()
            .filter_map(|(k, r)| r.field_value(field).map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A snapshot reduced to one value per key; the unit the reconciler and the
/// baseline store work with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSnapshot(BTreeMap<ProductKey, Decimal>);

impl FieldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ProductKey, value: Decimal) -> Option<Decimal> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: &ProductKey) -> Option<&Decimal> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &ProductKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductKey, &Decimal)> {
        self.0.iter()
    }

    /// Number of keys present in both snapshots.
    pub fn common_keys(&self, other: &FieldSnapshot) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.0.keys().filter(|k| large.contains_key(k)).count()
    }
}

impl FromIterator<(ProductKey, Decimal)> for FieldSnapshot {
    fn from_iter<I: IntoIterator<Item = (ProductKey, Decimal)>>(iter: I) -> Self {
        FieldSnapshot(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::SupplierRecord;

    fn supplier(key: &str, qty: i64, price: Option<i64>) -> SupplierRecord {
        SupplierRecord {
            key: ProductKey::from(key),
            quantity: qty,
            price: price.map(Decimal::from),
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = Snapshot::from_records("supplier", vec![supplier("A", 1, None), supplier("A", 2, None)])
            .unwrap_err();
        assert!(matches!(err, SyncError::DuplicateKey { ref key, .. } if key == "A"));
    }

    #[test]
    fn projection_skips_records_without_the_field() {
        let snap = Snapshot::from_records(
            "supplier",
            vec![supplier("A", 1, Some(100)), supplier("B", 2, None)],
        )
        .unwrap();

        let prices = snap.project(SyncField::Price);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get(&ProductKey::from("A")), Some(&Decimal::from(100)));

        let qty = snap.project(SyncField::Quantity);
        assert_eq!(qty.len(), 2);
    }

    #[test]
    fn truncate_keeps_lowest_keys() {
        let mut snap = Snapshot::from_records(
            "supplier",
            vec![supplier("C", 1, None), supplier("A", 1, None), supplier("B", 1, None)],
        )
        .unwrap();
        snap.truncate(2);
        let keys: Vec<_> = snap.records().map(|r| r.key.0.clone()).collect();
        assert_eq!(keys, vec!["A", "B"]);

        snap.truncate(0);
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn retain_keys_filters_to_the_given_set() {
        let mut snap = Snapshot::from_records(
            "supplier",
            vec![supplier("A", 1, None), supplier("B", 1, None)],
        )
        .unwrap();
        let keep: BTreeSet<ProductKey> = [ProductKey::from("B")].into();
        snap.retain_keys(&keep);
        assert_eq!(snap.len(), 1);
        assert!(snap.get(&ProductKey::from("B")).is_some());
    }

    #[test]
    fn common_keys_counts_the_intersection() {
        let a: FieldSnapshot = [("A", 1), ("B", 2), ("C", 3)]
            .into_iter()
            .map(|(k, v)| (ProductKey::from(k), Decimal::from(v)))
            .collect();
        let b: FieldSnapshot = [("B", 9), ("D", 1)]
            .into_iter()
            .map(|(k, v)| (ProductKey::from(k), Decimal::from(v)))
            .collect();
        assert_eq!(a.common_keys(&b), 1);
        assert_eq!(b.common_keys(&a), 1);
    }
}
