use std::sync::LazyLock;

use anstream::{ColorChoice, eprint, print};

/// Whether colored output is enabled for stderr, after `--color` and the terminal are
/// taken into account.
pub(crate) static USE_COLOR: LazyLock<bool> =
    LazyLock::new(|| match anstream::Stderr::choice(&std::io::stderr()) {
        ColorChoice::Always | ColorChoice::AlwaysAnsi => true,
        ColorChoice::Never => false,
        // We just asked anstream for a choice, that can't be auto
        ColorChoice::Auto => unreachable!(),
    });

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Printer {
    /// A printer that suppresses all output.
    Silent,
    /// A printer that suppresses status messages but keeps command output.
    Quiet,
    /// A printer that prints to standard streams.
    Default,
    /// A printer that also reports every file it writes.
    Verbose,
}

impl Printer {
    /// Return the [`Stdout`] for this printer.
    pub(crate) fn stdout(self) -> Stdout {
        match self {
            Self::Silent => Stdout::Disabled,
            Self::Quiet | Self::Default | Self::Verbose => Stdout::Enabled,
        }
    }

    /// Return the [`Stderr`] for status messages.
    pub(crate) fn stderr(self) -> Stderr {
        match self {
            Self::Silent | Self::Quiet => Stderr::Disabled,
            Self::Default | Self::Verbose => Stderr::Enabled,
        }
    }

    /// Return the [`Stderr`] for messages that are only shown in verbose mode.
    pub(crate) fn verbose(self) -> Stderr {
        match self {
            Self::Verbose => Stderr::Enabled,
            Self::Silent | Self::Quiet | Self::Default => Stderr::Disabled,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) enum Stdout {
    Enabled,
    Disabled,
}

impl std::fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        match self {
            Self::Enabled => {
                #[allow(clippy::print_stdout)]
                {
                    print!("{s}");
                }
            }
            Self::Disabled => {}
        }

        Ok(())
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) enum Stderr {
    Enabled,
    Disabled,
}

impl std::fmt::Write for Stderr {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        match self {
            Self::Enabled => {
                #[allow(clippy::print_stderr)]
                {
                    eprint!("{s}");
                }
            }
            Self::Disabled => {}
        }

        Ok(())
    }
}
