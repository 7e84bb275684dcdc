use rust_decimal::Decimal;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use super::write_atomic;
use crate::domain::ports::BaselineStore;
use crate::domain::snapshot::FieldSnapshot;
use crate::domain::value_objects::{ProductKey, SyncField};
use crate::error::SyncError;

/// Baseline kept as one two-column CSV per field inside `dir`.
///
/// | field    | file                 | header             |
/// |----------|----------------------|--------------------|
/// | quantity | `last_inventory.csv` | `SKU,Stock`        |
/// | price    | `last_prices.csv`    | `SKU,Retail_Price` |
pub struct CsvBaselineStore {
    dir: PathBuf,
}

impl CsvBaselineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, field: SyncField) -> PathBuf {
        self.dir.join(file_name(field))
    }
}

fn file_name(field: SyncField) -> &'static str {
    match field {
        SyncField::Quantity => "last_inventory.csv",
        SyncField::Price => "last_prices.csv",
    }
}

fn header(field: SyncField) -> [&'static str; 2] {
    match field {
        SyncField::Quantity => ["SKU", "Stock"],
        SyncField::Price => ["SKU", "Retail_Price"],
    }
}

impl BaselineStore for CsvBaselineStore {
    fn load(&self, field: SyncField) -> Result<FieldSnapshot, SyncError> {
        let path = self.path_for(field);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no baseline yet, starting empty");
                return Ok(FieldSnapshot::new());
            }
            Err(e) => return Err(SyncError::io(&path, e)),
        };

        let snapshot = parse_baseline(&bytes, &path)?;
        debug!(path = %path.display(), keys = snapshot.len(), "baseline loaded");
        Ok(snapshot)
    }

    fn save(&self, field: SyncField, snapshot: &FieldSnapshot) -> Result<(), SyncError> {
        let path = self.path_for(field);
        let context = path.display().to_string();
        let csv_err = |e: csv::Error| SyncError::parse(&context, e.to_string());

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(header(field)).map_err(csv_err)?;
        for (key, value) in snapshot.iter() {
            let value = value.normalize().to_string();
            writer
                .write_record([key.as_str(), value.as_str()])
                .map_err(csv_err)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| SyncError::parse(&context, e.to_string()))?;

        write_atomic(&path, &bytes)?;
        info!(path = %path.display(), keys = snapshot.len(), "baseline saved");
        Ok(())
    }
}

fn parse_baseline(bytes: &[u8], path: &Path) -> Result<FieldSnapshot, SyncError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let mut snapshot = FieldSnapshot::new();

    for (i, row) in reader.records().enumerate() {
        let context = format!("{} line {}", path.display(), i + 2);
        let row = row.map_err(|e| SyncError::parse(&context, e.to_string()))?;
        if row.len() != 2 {
            return Err(SyncError::parse(
                &context,
                format!("expected 2 columns, found {}", row.len()),
            ));
        }

        let key = ProductKey::parse(&row[0])
            .ok_or_else(|| SyncError::parse(&context, "blank SKU"))?;
        let value = Decimal::from_str(&row[1])
            .map_err(|_| SyncError::parse(&context, format!("\"{}\" is not a number", &row[1])))?;

        if snapshot.insert(key.clone(), value).is_some() {
            return Err(SyncError::parse(&context, format!("SKU {key} appears twice")));
        }
    }
    Ok(snapshot)
}
