use crate::application::monitoring::PerfReport;
use crate::domain::reconciliation::Reconciliation;
use colored::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::{Table, Tabled};

/// Rows shown before the table is cut off; the files always carry all of them.
const MAX_ROWS_SHOWN: usize = 25;

#[derive(Tabled)]
struct DifferenceRow {
    sku: String,
    old: String,
    new: String,
    delta: String,
}

#[derive(Tabled)]
struct SummaryRow {
    metric: String,
    value: String,
}

pub fn print_summary(reconciliation: &Reconciliation, written: &[PathBuf], dry_run: bool) {
    println!();

    println!("{}", "SHOPSYNC RUN SUMMARY".bold().cyan());
    println!(
        "Mode: {}  ·  field: {}",
        reconciliation.mode.as_str().blue(),
        reconciliation.field.to_string().green()
    );
    println!("Run: {}", reconciliation.run_id.bright_yellow());
    println!();

    if reconciliation.is_in_sync() {
        println!("{}", "✓ In sync, no update file produced.".bold().green());
        println!();
        return;
    }

    let rows: Vec<DifferenceRow> = reconciliation
        .differences
        .iter()
        .take(MAX_ROWS_SHOWN)
        .map(|d| DifferenceRow {
            sku: d.key.as_str().bold().to_string(),
            old: d.old_value.normalize().to_string().dimmed().to_string(),
            new: d.new_value.normalize().to_string().cyan().to_string(),
            delta: colour_delta(d.delta),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=3)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    if reconciliation.differences.len() > MAX_ROWS_SHOWN {
        println!(
            "  … and {} more",
            (reconciliation.differences.len() - MAX_ROWS_SHOWN).to_string().bold()
        );
    }

    let s = &reconciliation.summary;
    let summary_rows = vec![
        SummaryRow {
            metric: "Keys (old / new / common)".into(),
            value: format!("{} / {} / {}", s.left_keys, s.right_keys, s.common_keys),
        },
        SummaryRow {
            metric: "Increases".into(),
            value: format!("{} (+{})", s.increases, s.total_increase.normalize())
                .green()
                .to_string(),
        },
        SummaryRow {
            metric: "Decreases".into(),
            value: format!("{} ({})", s.decreases, s.total_decrease.normalize())
                .red()
                .to_string(),
        },
        SummaryRow {
            metric: "Total differences".into(),
            value: s.total_differences.to_string().bold().to_string(),
        },
    ];

    let summary_table = Table::new(summary_rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=1)).with(Alignment::right()))
        .to_string();

    println!();
    println!("{summary_table}");
    if s.truncated {
        println!("{}", "Difference cap reached (test mode); output is partial.".yellow());
    }

    if dry_run {
        println!("{}", "Dry run: nothing written.".italic());
    }
    for path in written {
        println!("Written {}", path.display().to_string().bold());
    }
    println!();
}

/// One-line result of a SKU cache refresh.
pub fn print_sku_refresh(count: usize, path: &std::path::Path) {
    println!(
        "{} {} SKUs cached in {}",
        "✓".bold().green(),
        count.to_string().bold(),
        path.display()
    );
}

fn colour_delta(delta: Decimal) -> String {
    let text = delta.normalize().to_string();
    if delta.is_sign_negative() {
        text.red().to_string()
    } else {
        format!("+{text}").green().to_string()
    }
}

// ─── Performance summary ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PerfRow {
    operation: String,
    subject: String,
    records: String,
    #[tabled(rename = "time (ms)")]
    duration_ms: String,
}

/// Print a performance timing table to stdout.
pub fn print_perf_summary(report: &PerfReport) {
    if report.timings.is_empty() {
        return;
    }

    println!("{}", "PERFORMANCE".bold().cyan());

    let rows: Vec<PerfRow> = report
        .timings
        .iter()
        .map(|t| PerfRow {
            operation: t.operation.dimmed().to_string(),
            subject: t.subject.bold().to_string(),
            records: t.records.to_string(),
            duration_ms: format_duration(t.duration_ms),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..=3)).with(Alignment::right()))
        .to_string();

    println!("{table}");

    println!(
        "  Total: {} record(s) fetched  ·  {} ms elapsed",
        report.total_records_fetched.to_string().bold(),
        format_duration(report.total_ms),
    );
    println!();
}

fn format_duration(ms: u128) -> String {
    if ms >= 1_000 {
        format!("{:.1}s", ms as f64 / 1_000.0).yellow().to_string()
    } else if ms >= 100 {
        ms.to_string().yellow().to_string()
    } else {
        ms.to_string().green().to_string()
    }
}
