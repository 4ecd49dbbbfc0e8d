use std::{
  io::Write,
  process::{Command, ExitStatus},
};

use crate::error::Error;

#[extend::ext(name = ExitStatusExt)]
pub impl ExitStatus {
  fn check_success(&self, command: &str) -> Result<(), Error> {
    if !self.success() {
      return Err(Error::Exited {
        command: command.to_string(),
        status: *self,
      });
    }

    Ok(())
  }
}

#[extend::ext(name = CommandExt)]
pub impl Command {
  /// The program and its arguments, space separated, for diagnostics.
  fn display(&self) -> String {
    std::iter::once(self.get_program())
      .chain(self.get_args())
      .map(|arg| arg.to_string_lossy())
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Runs the command to completion, capturing stdout and forwarding stderr.
  /// Returns an error if the process can't be spawned or exits non-zero.
  fn status_stdout(&mut self) -> Result<String, Error> {
    let command = self.display();
    let output = self.output().map_err(|source| Error::Launch {
      command: command.clone(),
      source,
    })?;

    std::io::stderr()
      .write_all(&output.stderr)
      .map_err(|source| Error::Stderr {
        command: command.clone(),
        source,
      })?;

    output.status.check_success(&command)?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}
