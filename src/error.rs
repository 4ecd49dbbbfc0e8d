use std::{io, num::ParseFloatError, process::ExitStatus};

/// Coarse classification of [`Error`], for callers that only care about which
/// stage of the pipeline failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
  /// The interpreter could not be started, or did not exit successfully.
  Launch,
  /// The interpreter's output did not hold a timing where one was expected.
  Parse,
  /// A dataset file does not match the layout its reader expects.
  Schema,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("failed to launch `{command}`")]
  Launch { command: String, source: io::Error },

  #[error("failed to forward the stderr of `{command}`")]
  Stderr { command: String, source: io::Error },

  #[error("`{command}` exited with non-zero status {status}")]
  Exited { command: String, status: ExitStatus },

  #[error("expected a non-negative floating-point timing, found {found:?}")]
  Parse {
    found: String,
    #[source]
    source: Option<ParseFloatError>,
  },

  #[error("expected at least two lines of output, found {found}")]
  MissingLine { found: usize },

  #[error("expected header {expected:?}, found {found:?}")]
  Schema { expected: String, found: String },

  #[error("row does not match the {schema:?} layout")]
  Row { schema: String, source: csv::Error },

  #[error("line {line}: expected a non-negative finite time, found {time}")]
  Time { line: u64, time: f64 },
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Launch { .. } | Error::Stderr { .. } | Error::Exited { .. } => ErrorKind::Launch,
      Error::Parse { .. } | Error::MissingLine { .. } => ErrorKind::Parse,
      Error::Schema { .. } | Error::Row { .. } | Error::Time { .. } => ErrorKind::Schema,
    }
  }
}

/// Returns the [`ErrorKind`] of the typed error at the root of an `anyhow`
/// chain, if there is one.
pub fn kind_of(err: &anyhow::Error) -> Option<ErrorKind> {
  err.downcast_ref::<Error>().map(Error::kind)
}
