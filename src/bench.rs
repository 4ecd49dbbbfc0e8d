use std::io::Write;

use anyhow::{Context, Result};

use crate::{
  config::Config,
  dataset::{DatasetWriter, Kind, Param, Trial},
  run::{Parse, Runner},
};

/// Drives the sweeps, one trial at a time, writing each trial as soon as it
/// is measured.
pub struct Bench<'a, R> {
  config: &'a Config,
  runner: R,
}

impl<'a, R: Runner> Bench<'a, R> {
  pub fn new(config: &'a Config, runner: R) -> Self {
    Self { config, runner }
  }

  /// Runs the sweep matching the writer's dataset kind. Returns the number of
  /// trials written.
  pub fn sweep<W: Write>(&mut self, writer: &mut DatasetWriter<W>) -> Result<usize> {
    match writer.kind() {
      Kind::Sizes => self.sweep_sizes(writer).context("sizes sweep")?,
      Kind::Benchmarks => self.sweep_benchmarks(writer).context("benchmarks sweep")?,
    }

    Ok(writer.rows())
  }

  /// For each language, for each size, runs the fixed program `trials` times
  /// with the size as its argument.
  pub fn sweep_sizes<W: Write>(&mut self, writer: &mut DatasetWriter<W>) -> Result<()> {
    let program = &self.config.program;

    for language in &self.config.languages {
      tracing::info!(lang = %language.name, "benchmarking");

      for n in self.config.sizes.clone() {
        for trial in 0..self.config.trials {
          let stdout = self
            .runner
            .run(language, program, Some(n))
            .with_context(|| format!("run {} n={n} trial {trial}", language.name))?;
          let time = Parse::SingleValue
            .parse(&stdout)
            .with_context(|| format!("parse {} n={n} trial {trial}", language.name))?;

          tracing::info!(lang = %language.name, n, time, "trial");

          writer.write(&Trial {
            lang: language.name.clone(),
            param: Param::Size(n),
            time,
          })?;
        }
      }
    }

    Ok(())
  }

  /// For each benchmark, runs every language once on it.
  pub fn sweep_benchmarks<W: Write>(&mut self, writer: &mut DatasetWriter<W>) -> Result<()> {
    for benchmark in &self.config.benchmarks {
      let program = self.config.benchmark_path(benchmark);
      tracing::info!(%benchmark, ?program, "benchmarking");

      for language in &self.config.languages {
        let stdout = self
          .runner
          .run(language, &program, None)
          .with_context(|| format!("run {} {benchmark}", language.name))?;
        let time = Parse::LastLine
          .parse(&stdout)
          .with_context(|| format!("parse {} {benchmark}", language.name))?;

        tracing::info!(lang = %language.name, %benchmark, time, "trial");

        writer.write(&Trial {
          lang: language.name.clone(),
          param: Param::Benchmark(benchmark.clone()),
          time,
        })?;
      }
    }

    Ok(())
  }
}
