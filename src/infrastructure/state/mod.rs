//! Files that survive between runs: the supplier baseline and the shop SKU cache.

mod baseline;
mod sku_cache;

pub use baseline::CsvBaselineStore;
pub use sku_cache::JsonSkuCache;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Write `contents` next to `path` and rename it over the target, creating
/// parent directories as needed. Readers never see a half-written file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), SyncError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }

    let tmp = temp_sibling(path);
    fs::write(&tmp, contents).map_err(|e| SyncError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        SyncError::io(path, e)
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("state.csv");

        write_atomic(&target, b"one").unwrap();
        write_atomic(&target, b"two").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "two");
        let names: Vec<_> = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["state.csv"]);
    }
}
