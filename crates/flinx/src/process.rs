// Copyright (c) 2023 Axo Developer Co.
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Running `git`, the Sphinx builders and the platform opener.
use std::ffi::OsStr;
use std::fmt::Display;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};

use owo_colors::OwoColorize;
use thiserror::Error;
use tracing::trace;

/// Longest argument list shown before the command line is cut short.
const MAX_DISPLAY_ARGS_LEN: usize = 120;

#[derive(Debug, Error)]
pub(crate) enum Error {
    /// The program could not be started, usually because it does not exist.
    #[error("Failed to {summary}: could not run `{program}`")]
    Exec {
        summary: String,
        program: String,
        #[source]
        cause: std::io::Error,
    },

    #[error("Failed to {summary}: `{program}` exited unsuccessfully\n{error}")]
    Status {
        summary: String,
        program: String,
        error: StatusError,
    },
}

/// A non-zero exit, with whatever the program printed if it was captured.
#[derive(Debug)]
pub(crate) struct StatusError {
    status: ExitStatus,
    output: Option<Output>,
}

impl Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n{}\n{}", "[status]".red(), self.status)?;

        let Some(output) = &self.output else {
            return Ok(());
        };
        for (label, bytes) in [("[stdout]", &output.stdout), ("[stderr]", &output.stderr)] {
            let text = String::from_utf8_lossy(bytes);
            let lines = text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>();
            if !lines.is_empty() {
                writeln!(f, "\n{}\n{}", label.red(), lines.join("\n"))?;
            }
        }
        Ok(())
    }
}

/// An external program, with a summary of what it is run for.
///
/// The summary reads as the end of "Failed to ...", e.g. `build the documentation`.
pub(crate) struct Cmd {
    inner: Command,
    summary: String,
    check_status: bool,
}

impl Cmd {
    pub(crate) fn new(program: impl AsRef<OsStr>, summary: impl Into<String>) -> Self {
        Self {
            inner: Command::new(program),
            summary: summary.into(),
            check_status: true,
        }
    }

    /// Whether a non-zero exit is turned into [`Error::Status`]. Defaults to `true`.
    pub(crate) fn check(&mut self, checked: bool) -> &mut Self {
        self.check_status = checked;
        self
    }

    pub(crate) fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.inner.arg(arg);
        self
    }

    pub(crate) fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub(crate) fn current_dir(&mut self, dir: impl AsRef<Path>) -> &mut Self {
        self.inner.current_dir(dir);
        self
    }

    pub(crate) fn stdout(&mut self, cfg: impl Into<Stdio>) -> &mut Self {
        self.inner.stdout(cfg);
        self
    }

    pub(crate) fn stderr(&mut self, cfg: impl Into<Stdio>) -> &mut Self {
        self.inner.stderr(cfg);
        self
    }

    /// Run with inherited streams and wait, discarding the status.
    pub(crate) fn run(&mut self) -> Result<(), Error> {
        self.status()?;
        Ok(())
    }

    /// Run with inherited streams and wait for the exit status.
    pub(crate) fn status(&mut self) -> Result<ExitStatus, Error> {
        trace!("Executing `{self}`");
        let status = self.inner.status().map_err(|cause| self.exec_error(cause))?;
        if self.check_status && !status.success() {
            return Err(self.status_error(status, None));
        }
        Ok(status)
    }

    /// Run with captured output.
    pub(crate) fn output(&mut self) -> Result<Output, Error> {
        trace!("Executing `{self}`");
        let output = self.inner.output().map_err(|cause| self.exec_error(cause))?;
        if self.check_status && !output.status.success() {
            return Err(self.status_error(output.status, Some(output)));
        }
        Ok(output)
    }

    fn program(&self) -> String {
        self.inner.get_program().to_string_lossy().into_owned()
    }

    fn exec_error(&self, cause: std::io::Error) -> Error {
        Error::Exec {
            summary: self.summary.clone(),
            program: self.program(),
            cause,
        }
    }

    fn status_error(&self, status: ExitStatus, output: Option<Output>) -> Error {
        Error::Status {
            summary: self.summary.clone(),
            program: self.program(),
            error: StatusError { status, output },
        }
    }
}

/// The command line as a shell would show it, cut short after a while.
impl Display for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(cwd) = self.inner.get_current_dir() {
            write!(f, "cd {} && ", cwd.to_string_lossy())?;
        }
        write!(f, "{}", self.program())?;

        let mut len = 0;
        for arg in self.inner.get_args() {
            write!(f, " {}", arg.to_string_lossy())?;
            len += arg.len() + 1;
            if len > MAX_DISPLAY_ARGS_LEN {
                write!(f, " [...]")?;
                break;
            }
        }
        Ok(())
    }
}
