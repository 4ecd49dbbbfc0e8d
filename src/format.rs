use std::fmt::Write;

use anyhow::Result;

use crate::{dataset::Kind, stats::Stats};

const COLUMN_WIDTH: usize = 16;
const COLUMN_PADDING: &str = "  ";

fn format_header(kind: Kind) -> String {
  let header = ["lang", kind.param(), "samples", "mean (s)", "std (s)"]
    .into_iter()
    .enumerate()
    .map(|(i, col)| align(i, col))
    .collect::<Vec<_>>()
    .join(COLUMN_PADDING);

  format!("{header}\n{}", "=".repeat(header.len()))
}

/// Labels are left aligned, numbers right aligned.
fn align(column: usize, text: &str) -> String {
  if column < 2 {
    format!("{text:<COLUMN_WIDTH$}")
  } else {
    format!("{text:>COLUMN_WIDTH$}")
  }
}

fn format_rows(stats: &Stats) -> Result<String> {
  let mut rows = String::new();

  for lang in stats.languages() {
    let mut width = 0;

    for (i, (param, aggregate)) in stats.of(lang).enumerate() {
      let samples = aggregate.samples.to_string();
      let mean = format!("{:.6}", aggregate.mean);
      let stddev = format!("{:.6}", aggregate.stddev);
      let param = param.to_string();

      let row = [if i == 0 { lang } else { "" }, param.as_str(), samples.as_str(), mean.as_str(), stddev.as_str()]
        .into_iter()
        .enumerate()
        .map(|(i, col)| align(i, col))
        .collect::<Vec<_>>()
        .join(COLUMN_PADDING);

      writeln!(rows, "{row}")?;
      width = row.len();
    }

    writeln!(rows, "{}", "-".repeat(width))?;
  }

  Ok(rows)
}

/// Formats the per-group aggregates of a dataset as a text table.
pub fn format(kind: Kind, stats: &Stats) -> Result<String> {
  let mut table = String::new();

  writeln!(table, "{}", format_header(kind))?;
  write!(table, "{}", format_rows(stats)?)?;

  Ok(table)
}
