//! Summary Table
//!
//! Fixed-column benchmark summary, one row per result:
//!
//! ```text
//! ------------------------------ benchmark summary -------------------------------
//! collected 1 items
//!
//! --------------------------------------------------------------------------------
//! Benchmark (time in us)              Min           Mean         Median     Stddev
//! --------------------------------------------------------------------------------
//! tests/calc.rs: CalcTes..       1,000.00       1,000.00       1,000.00       0.00
//! ```
//!
//! Times are shown in microseconds. A missing statistic prints `----`.

use crate::sink::{Emphasis, Sink};
use hookbench_core::BenchmarkResult;
use hookbench_stats::MICROS_PER_SECOND;
use std::io;

/// Widths of the Min, Mean, Median and Stddev columns
pub const TIME_COLUMN_WIDTHS: [usize; 4] = [15, 15, 15, 11];

/// Label of the name column
pub const HEADER_LABEL: &str = "Benchmark (time in us)";

/// Printed in place of an absent statistic
pub const PLACEHOLDER: &str = "----";

const TIME_LABELS: [&str; 4] = ["Min", "Mean", "Median", "Stddev"];

/// Column geometry for a given terminal width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    /// Width of the file + name column
    pub name_width: usize,
}

impl TableLayout {
    /// Layout for `columns` terminal columns
    pub fn new(columns: usize) -> Self {
        let times: usize = TIME_COLUMN_WIDTHS.iter().sum();
        Self {
            name_width: columns.saturating_sub(times).max(HEADER_LABEL.len()),
        }
    }

    /// Full table width
    pub fn width(&self) -> usize {
        self.name_width + TIME_COLUMN_WIDTHS.iter().sum::<usize>()
    }

    /// Characters left for the test name after `file` and its `: ` prefix
    pub fn allowed_name_len(&self, file: &str) -> usize {
        self.name_width.saturating_sub(file.chars().count() + 4)
    }
}

/// Render the benchmark summary for `results` into `sink`
pub fn render_summary(results: &[BenchmarkResult], sink: &mut dyn Sink) -> io::Result<()> {
    let layout = TableLayout::new(sink.width());
    let rule = "-".repeat(layout.width());

    sink.write_sep('-', "benchmark summary")?;
    sink.write_line(&format!("collected {} items", results.len()))?;
    sink.write("\n", Emphasis::Plain)?;

    let mut header = format!("{:<width$}", HEADER_LABEL, width = layout.name_width);
    for (label, width) in TIME_LABELS.iter().zip(TIME_COLUMN_WIDTHS) {
        header.push_str(&format!("{:>width$}", label, width = width));
    }

    sink.write_line(&rule)?;
    sink.write_line(&header)?;
    sink.write_line(&rule)?;

    for result in results {
        render_row(result, &layout, sink)?;
    }
    Ok(())
}

fn render_row(result: &BenchmarkResult, layout: &TableLayout, sink: &mut dyn Sink) -> io::Result<()> {
    let file = result.identity().display_file();
    let allowed = layout.allowed_name_len(&file);
    let name = truncate_name(&result.identity().qualified_name(), allowed);

    sink.write(&format!("{}: ", file), Emphasis::Muted)?;
    sink.write(&format!("{:<width$}", name, width = allowed + 2), Emphasis::Plain)?;

    let summary = result.summary();
    let values = [summary.min, summary.mean, summary.median, summary.std_dev];
    for (value, width) in values.into_iter().zip(TIME_COLUMN_WIDTHS) {
        match value {
            Some(seconds) => sink.write(
                &format!("{:>width$}", format_grouped(seconds * MICROS_PER_SECOND), width = width),
                Emphasis::Strong,
            )?,
            None => sink.write(&format!("{:>width$}", PLACEHOLDER, width = width), Emphasis::Muted)?,
        }
    }
    sink.write("\n", Emphasis::Plain)
}

/// First `allowed` characters of `name`, with `..` appended when cut
pub fn truncate_name(name: &str, allowed: usize) -> String {
    let mut chars = name.chars();
    let mut kept: String = chars.by_ref().take(allowed).collect();
    if chars.next().is_some() {
        kept.push_str("..");
    }
    kept
}

/// Two decimals with `,` between thousands: `1234567.891` → `1,234,567.89`
pub fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if value.is_sign_negative() && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 && ch.is_ascii_digit() {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
