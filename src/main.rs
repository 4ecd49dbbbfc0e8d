mod bench;
mod chart;
mod config;
mod dataset;
mod error;
mod ext;
mod format;
mod run;
mod stats;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use self::{
  bench::Bench,
  chart::{BarChart, TrendChart},
  config::Config,
  dataset::{DatasetWriter, Kind},
  run::ProcessRunner,
  stats::Stats,
};

#[derive(Parser)]
#[command(version, about = "Times Lox interpreters against each other")]
struct Args {
  /// TOML file overriding the default sweep configuration.
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Runs a sweep, writing one dataset row per trial.
  Collect {
    kind: Kind,
    /// Dataset to (over)write.
    #[arg(short, long)]
    dataset: Option<PathBuf>,
  },
  /// Prints the mean and standard deviation of every group in a dataset.
  Summary {
    kind: Kind,
    #[arg(short, long)]
    dataset: Option<PathBuf>,
  },
  /// Charts mean time against input size for a sizes dataset.
  Trend {
    #[arg(short, long)]
    dataset: Option<PathBuf>,
    /// Leaves out sizes below this one.
    #[arg(long)]
    min_size: Option<u64>,
  },
  /// Charts the time of each benchmark, grouped by benchmark.
  Bars {
    #[arg(short, long)]
    dataset: Option<PathBuf>,
  },
}

fn dataset_path(dataset: &Option<PathBuf>, kind: Kind) -> &Path {
  dataset.as_deref().unwrap_or(Path::new(kind.default_path()))
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "lox_bench=info".into()))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref()).context("config")?;

  match args.command {
    Command::Collect { kind, dataset } => {
      let path = dataset_path(&dataset, kind);
      let mut writer = DatasetWriter::create(path, kind).context("dataset")?;

      let rows = Bench::new(&config, ProcessRunner)
        .sweep(&mut writer)
        .inspect_err(|err| {
          if let Some(kind) = error::kind_of(err) {
            tracing::error!(?kind, rows = writer.rows(), "sweep aborted");
          }
        })
        .context("collect")?;

      tracing::info!(rows, ?path, "done");
    }
    Command::Summary { kind, dataset } => {
      let trials = dataset::read(dataset_path(&dataset, kind), kind).context("dataset")?;

      print!("{}", format::format(kind, &Stats::from_trials(&trials)).context("format")?);
    }
    Command::Trend { dataset, min_size } => {
      let trials = dataset::read(dataset_path(&dataset, Kind::Sizes), Kind::Sizes).context("dataset")?;

      print!("{}", TrendChart::new(&config, &trials, min_size));
    }
    Command::Bars { dataset } => {
      let trials = dataset::read(dataset_path(&dataset, Kind::Benchmarks), Kind::Benchmarks).context("dataset")?;

      print!("{}", BarChart::new(&config, &trials));
    }
  }

  Ok(())
}
