use std::{
  fmt,
  fs::File,
  io::{Read, Write},
  path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::Error, run::is_valid_time};

/// The two dataset layouts, one per sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Kind {
  /// `lang,n,time`: one program run over a range of input sizes.
  Sizes,
  /// `lang,benchmark,time`: one run per named benchmark.
  Benchmarks,
}

impl Kind {
  pub fn header(self) -> [&'static str; 3] {
    match self {
      Kind::Sizes => ["lang", "n", "time"],
      Kind::Benchmarks => ["lang", "benchmark", "time"],
    }
  }

  /// Name of the parameter column.
  pub fn param(self) -> &'static str {
    self.header()[1]
  }

  pub fn default_path(self) -> &'static str {
    match self {
      Kind::Sizes => "measurements.csv",
      Kind::Benchmarks => "measurements_multiple.csv",
    }
  }
}

/// What a trial was run with: an input size or a benchmark name. Sizes order
/// numerically, names lexically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Param {
  Size(u64),
  Benchmark(String),
}

impl Param {
  pub fn kind(&self) -> Kind {
    match self {
      Param::Size(_) => Kind::Sizes,
      Param::Benchmark(_) => Kind::Benchmarks,
    }
  }
}

impl fmt::Display for Param {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Param::Size(n) => write!(f, "{n}"),
      Param::Benchmark(name) => f.write_str(name),
    }
  }
}

/// One timed execution.
#[derive(Clone, Debug, PartialEq)]
pub struct Trial {
  pub lang: String,
  pub param: Param,
  /// Elapsed seconds, as reported by the interpreter.
  pub time: f64,
}

#[derive(Serialize, Deserialize)]
struct SizeRow<'a> {
  lang: &'a str,
  n: u64,
  time: f64,
}

#[derive(Serialize, Deserialize)]
struct BenchmarkRow<'a> {
  lang: &'a str,
  benchmark: &'a str,
  time: f64,
}

/// Writes trials as they arrive, flushing each row so an interrupted sweep
/// still leaves a readable dataset behind.
pub struct DatasetWriter<W: Write> {
  kind: Kind,
  writer: csv::Writer<W>,
  rows: usize,
}

impl DatasetWriter<File> {
  /// Creates (or truncates) the dataset at `path` and writes its header.
  pub fn create<P: AsRef<Path>>(path: P, kind: Kind) -> Result<Self> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("create {path:?}"))?;

    Self::new(file, kind)
  }
}

impl<W: Write> DatasetWriter<W> {
  pub fn new(inner: W, kind: Kind) -> Result<Self> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(inner);
    writer.write_record(kind.header()).context("write header")?;
    writer.flush().context("flush")?;

    Ok(Self { kind, writer, rows: 0 })
  }

  pub fn kind(&self) -> Kind {
    self.kind
  }

  /// Number of trials written so far.
  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn write(&mut self, trial: &Trial) -> Result<()> {
    let lang = trial.lang.as_str();
    let written = match (&trial.param, self.kind) {
      (Param::Size(n), Kind::Sizes) => self.writer.serialize(SizeRow {
        lang,
        n: *n,
        time: trial.time,
      }),
      (Param::Benchmark(benchmark), Kind::Benchmarks) => self.writer.serialize(BenchmarkRow {
        lang,
        benchmark: benchmark.as_str(),
        time: trial.time,
      }),
      (param, kind) => {
        return Err(
          Error::Schema {
            expected: kind.param().to_string(),
            found: param.kind().param().to_string(),
          }
          .into(),
        )
      }
    };
    written.context("write row")?;

    self.writer.flush().context("flush")?;
    self.rows += 1;

    Ok(())
  }

  #[cfg(test)]
  pub fn into_inner(self) -> Result<W> {
    self.writer.into_inner().map_err(|err| anyhow::anyhow!("{}", err.error()))
  }
}

/// Reads a whole dataset of the given `kind` back into memory.
pub fn read<P: AsRef<Path>>(path: P, kind: Kind) -> Result<Vec<Trial>> {
  let path = path.as_ref();
  let file = File::open(path).with_context(|| format!("open {path:?}"))?;

  from_reader(file, kind).with_context(|| format!("read {path:?}"))
}

pub fn from_reader<R: Read>(reader: R, kind: Kind) -> Result<Vec<Trial>> {
  let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

  let headers = reader.headers().context("read header")?.clone();
  if headers.iter().ne(kind.header()) {
    return Err(
      Error::Schema {
        expected: kind.header().join(","),
        found: headers.iter().collect::<Vec<_>>().join(","),
      }
      .into(),
    );
  }

  let schema = || kind.header().join(",");
  let mut trials = Vec::new();
  let mut record = csv::StringRecord::new();

  while reader
    .read_record(&mut record)
    .map_err(|source| Error::Row { schema: schema(), source })?
  {
    let trial = match kind {
      Kind::Sizes => {
        let row: SizeRow = record
          .deserialize(Some(&headers))
          .map_err(|source| Error::Row { schema: schema(), source })?;
        Trial {
          lang: row.lang.to_string(),
          param: Param::Size(row.n),
          time: row.time,
        }
      }
      Kind::Benchmarks => {
        let row: BenchmarkRow = record
          .deserialize(Some(&headers))
          .map_err(|source| Error::Row { schema: schema(), source })?;
        Trial {
          lang: row.lang.to_string(),
          param: Param::Benchmark(row.benchmark.to_string()),
          time: row.time,
        }
      }
    };

    if !is_valid_time(trial.time) {
      let line = record.position().map_or(0, |position| position.line());
      return Err(Error::Time { line, time: trial.time }.into());
    }

    trials.push(trial);
  }

  Ok(trials)
}
