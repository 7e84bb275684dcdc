use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use crate::domain::ports::{BaselineStore, SkuCache};
use crate::domain::snapshot::FieldSnapshot;
use crate::domain::value_objects::{ProductKey, SyncField};
use crate::error::SyncError;

/// In-memory implementation of [`BaselineStore`].
///
/// For embedding shopsync where the baseline lives somewhere other than the
/// local state directory, and for tests.
#[derive(Debug, Default)]
pub struct MemoryBaselineStore(Mutex<BTreeMap<SyncField, FieldSnapshot>>);

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(field: SyncField, snapshot: FieldSnapshot) -> Self {
        let store = Self::new();
        store.put(field, snapshot);
        store
    }

    fn put(&self, field: SyncField, snapshot: FieldSnapshot) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(field, snapshot);
    }

    /// What was last saved for `field`, if anything.
    pub fn get(&self, field: SyncField) -> Option<FieldSnapshot> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&field)
            .cloned()
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn load(&self, field: SyncField) -> Result<FieldSnapshot, SyncError> {
        Ok(self.get(field).unwrap_or_default())
    }

    fn save(&self, field: SyncField, snapshot: &FieldSnapshot) -> Result<(), SyncError> {
        self.put(field, snapshot.clone());
        Ok(())
    }
}

/// In-memory implementation of [`SkuCache`].
#[derive(Debug, Default)]
pub struct MemorySkuCache(Mutex<BTreeSet<ProductKey>>);

impl MemorySkuCache {
    pub fn new(skus: BTreeSet<ProductKey>) -> Self {
        Self(Mutex::new(skus))
    }
}

impl SkuCache for MemorySkuCache {
    fn load(&self) -> Result<BTreeSet<ProductKey>, SyncError> {
        Ok(self.0.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, skus: &BTreeSet<ProductKey>) -> Result<(), SyncError> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = skus.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn baseline_survives_a_poisoned_lock() {
        let store = Arc::new(MemoryBaselineStore::new());
        let holder = Arc::clone(&store);
        let joined = thread::spawn(move || {
            let _guard = holder.0.lock().unwrap();
            panic!("panic while holding the baseline lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(store.0.is_poisoned());

        let snapshot: FieldSnapshot = [(ProductKey::from("A"), Decimal::from(3))].into_iter().collect();
        store.save(SyncField::Quantity, &snapshot).unwrap();

        assert_eq!(store.load(SyncField::Quantity).unwrap(), snapshot);
        assert_eq!(store.get(SyncField::Quantity), Some(snapshot));
    }

    #[test]
    fn sku_cache_survives_a_poisoned_lock() {
        let cache = Arc::new(MemorySkuCache::default());
        let holder = Arc::clone(&cache);
        let joined = thread::spawn(move || {
            let _guard = holder.0.lock().unwrap();
            panic!("panic while holding the SKU lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(cache.0.is_poisoned());

        let skus: BTreeSet<_> = [ProductKey::from("A"), ProductKey::from("B")].into();
        cache.save(&skus).unwrap();

        assert_eq!(cache.load().unwrap(), skus);
    }
}
