use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};

use super::write_atomic;
use crate::domain::ports::SkuCache;
use crate::domain::value_objects::ProductKey;
use crate::error::SyncError;

/// On-disk shape of `shop_skus.json`.
#[derive(Debug, Serialize, Deserialize)]
struct SkuCacheFile {
    skus: Vec<ProductKey>,
    count: usize,
    updated: String,
}

/// SKU set cached as pretty-printed JSON.
pub struct JsonSkuCache {
    path: PathBuf,
}

impl JsonSkuCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SkuCache for JsonSkuCache {
    fn load(&self) -> Result<BTreeSet<ProductKey>, SyncError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no SKU cache yet");
                return Ok(BTreeSet::new());
            }
            Err(e) => return Err(SyncError::io(&self.path, e)),
        };

        let file: SkuCacheFile = serde_json::from_slice(&bytes)
            .map_err(|e| SyncError::parse(self.path.display().to_string(), e.to_string()))?;
        let skus: BTreeSet<_> = file.skus.into_iter().collect();
        debug!(path = %self.path.display(), skus = skus.len(), updated = %file.updated, "SKU cache loaded");
        Ok(skus)
    }

    fn save(&self, skus: &BTreeSet<ProductKey>) -> Result<(), SyncError> {
        let file = SkuCacheFile {
            skus: skus.iter().cloned().collect(),
            count: skus.len(),
            updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        let bytes = serde_json::to_vec_pretty(&file)
            .map_err(|e| SyncError::parse(self.path.display().to_string(), e.to_string()))?;
        write_atomic(&self.path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cache_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonSkuCache::new(dir.path().join("shop_skus.json"));
        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn saves_sorted_skus_with_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("shop_skus.json");
        let cache = JsonSkuCache::new(&path);
        let skus: BTreeSet<_> = ["B", "A"].into_iter().map(ProductKey::from).collect();

        cache.save(&skus).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["skus"], serde_json::json!(["A", "B"]));
        assert_eq!(json["count"], 2);
        assert!(json["updated"].as_str().unwrap().ends_with('Z'));
        assert_eq!(cache.load().unwrap(), skus);
    }

    #[test]
    fn corrupt_cache_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop_skus.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            JsonSkuCache::new(&path).load(),
            Err(SyncError::Parse { .. })
        ));
    }
}
