use std::{path::Path, process::Command};

use crate::{config::Language, error::Error, ext::CommandExt};

/// Executes one trial of an interpreter and hands back what it printed.
pub trait Runner {
  /// Runs `language` on `program`, passing `arg` as its only argument if
  /// given, and returns the captured stdout.
  fn run(&mut self, language: &Language, program: &Path, arg: Option<u64>) -> Result<String, Error>;
}

/// Spawns one OS process per trial and blocks until it exits.
pub struct ProcessRunner;

impl Runner for ProcessRunner {
  /// # Errors
  ///
  /// This will return an error if:
  /// - the command is empty or its binary can't be spawned.
  /// - the exit status is non-zero.
  fn run(&mut self, language: &Language, program: &Path, arg: Option<u64>) -> Result<String, Error> {
    let Some((bin, prefix)) = language.command.split_first() else {
      return Err(Error::Launch {
        command: language.name.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
      });
    };

    let mut command = Command::new(bin);
    command.args(prefix).arg(program).args(arg.map(|n| n.to_string()));

    tracing::debug!(command = %command.display(), "running");

    command.status_stdout()
  }
}

/// How a timing is read out of an interpreter's stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parse {
  /// The whole output is the timing.
  SingleValue,
  /// The timing is the last line, followed by the final newline. Anything
  /// printed before it is ignored.
  LastLine,
}

impl Parse {
  pub fn parse(self, stdout: &str) -> Result<f64, Error> {
    match self {
      Parse::SingleValue => parse_timing(stdout.trim_end_matches('\n')),
      Parse::LastLine => {
        let lines: Vec<&str> = stdout.split('\n').collect();
        let [.., timing, _] = lines.as_slice() else {
          return Err(Error::MissingLine { found: lines.len() });
        };

        parse_timing(timing)
      }
    }
  }
}

fn parse_timing(text: &str) -> Result<f64, Error> {
  let invalid = |source| Error::Parse {
    found: text.to_string(),
    source,
  };

  let time: f64 = text.trim().parse().map_err(|err| invalid(Some(err)))?;
  if !is_valid_time(time) {
    return Err(invalid(None));
  }

  Ok(time)
}

/// Elapsed seconds are finite and never negative.
pub fn is_valid_time(time: f64) -> bool {
  time.is_finite() && time >= 0.0
}
