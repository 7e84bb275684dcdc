use crate::domain::{ports::OutputWriter, reconciliation::Reconciliation};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use self::{import::ImportFileWriter, report::ReportWriter};

pub mod import;
pub mod report;

/// Every artifact a non-empty run produces: the import file, then the report.
pub fn all_writers() -> Vec<Box<dyn OutputWriter>> {
    vec![Box::new(ImportFileWriter), Box::new(ReportWriter)]
}

/// Writes the reconciliation to `dir` via the chosen writer and returns the path.
pub fn write_to_file(
    writer: &dyn OutputWriter,
    reconciliation: &Reconciliation,
    dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let content = writer.format(reconciliation)?;
    let path = dir.join(writer.file_name(reconciliation.field));
    fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Comma-separated, `\n`-terminated, one header row.
fn csv_body<const N: usize>(
    header: [&str; N],
    rows: impl IntoIterator<Item = [String; N]>,
) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer.into_inner().context("flushing CSV buffer")?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::difference::{Difference, DifferenceSet};
    use crate::domain::snapshot::FieldSnapshot;
    use crate::domain::value_objects::{ProductKey, SyncMode};
    use rust_decimal::Decimal;

    #[test]
    fn write_to_file_creates_the_directory_and_names_by_field() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let rc = Reconciliation::new(
            SyncMode::Price,
            &FieldSnapshot::new(),
            &FieldSnapshot::new(),
            DifferenceSet {
                differences: vec![Difference::new(
                    ProductKey::from("A"),
                    Decimal::from(99),
                    Decimal::from(79),
                )],
                truncated: false,
            },
        );

        let paths: Vec<_> = all_writers()
            .iter()
            .map(|w| write_to_file(w.as_ref(), &rc, &out).unwrap())
            .collect();

        assert_eq!(paths, vec![out.join("price_updates.csv"), out.join("price_report.csv")]);
        let first = fs::read(&paths[0]).unwrap();
        write_to_file(&ImportFileWriter, &rc, &out).unwrap();
        assert_eq!(fs::read(&paths[0]).unwrap(), first);
    }
}
