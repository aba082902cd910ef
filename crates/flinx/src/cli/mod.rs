use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::styling::{AnsiColor, Effects};
use clap::builder::Styles;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use flinx_consts::env_vars::EnvVars;

use crate::metadata::MetadataKey;

mod build;
mod generate;
mod metadata;

pub(crate) use build::{build, serve};
pub(crate) use generate::{WriteMode, generate, write_docs};
pub(crate) use metadata::metadata;

#[derive(Copy, Clone)]
pub(crate) enum ExitStatus {
    /// The command succeeded.
    Success,

    /// The command failed due to an error in the user input.
    Failure,

    /// The command failed with an unexpected error.
    Error,

    /// The command's exit status is propagated from an external command.
    External(u8),
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => Self::from(0),
            ExitStatus::Failure => Self::from(1),
            ExitStatus::Error => Self::from(2),
            ExitStatus::External(code) => Self::from(code),
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub(crate) enum ColorChoice {
    /// Enables colored output only when the output is going to a terminal or TTY with support.
    Auto,

    /// Enables colored output regardless of the detected environment.
    Always,

    /// Disables colored output.
    Never,
}

impl From<ColorChoice> for anstream::ColorChoice {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => Self::Auto,
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
        }
    }
}

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser)]
#[command(
    name = "flinx",
    author,
    version,
    about = "Configuration-free Sphinx documentation for Python projects"
)]
#[command(propagate_version = true)]
#[command(
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
#[command(styles=STYLES)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,

    #[command(flatten)]
    pub(crate) globals: GlobalArgs,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Global options", next_display_order = 1000)]
pub(crate) struct GlobalArgs {
    /// Change to directory before running.
    #[arg(global = true, short = 'C', long, value_name = "DIR")]
    pub(crate) cd: Option<PathBuf>,

    /// Whether to use color in output.
    #[arg(
        global = true,
        long,
        value_enum,
        env = EnvVars::FLINX_COLOR,
        default_value_t = ColorChoice::Auto,
    )]
    pub(crate) color: ColorChoice,

    /// Use quiet output.
    ///
    /// Repeating this option, e.g., `-qq`, will enable a silent mode in which
    /// flinx will write no output to stdout.
    #[arg(global = true, short, long, conflicts_with = "verbose", action = ArgAction::Count)]
    pub(crate) quiet: u8,

    /// Use verbose output.
    ///
    /// Pass sphinx's own output through with `-v`; add log messages with `-vv` and `-vvv`.
    #[arg(global = true, short, long, action = ArgAction::Count)]
    pub(crate) verbose: u8,

    /// Display the concise help for this command.
    #[arg(global = true, short, long, action = ArgAction::HelpShort)]
    help: Option<bool>,

    /// Display the flinx version.
    #[arg(global = true, short = 'V', long, action = ArgAction::Version)]
    version: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Write `docs/conf.py` and `docs/index.rst` from the project metadata.
    Generate(GenerateArgs),
    /// Write `docs/conf.py` and `docs/index.rst` without the generated-file header.
    ///
    /// Ejected files are yours to edit: `build` and `serve` use them as they are.
    Eject(GenerateArgs),
    /// Build the documentation with `sphinx-build`.
    Build(BuildArgs),
    /// Build and serve the documentation with `sphinx-autobuild`, rebuilding on changes.
    Serve(BuildArgs),
    /// Show the resolved project metadata and Sphinx extensions.
    Metadata(MetadataArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct GenerateArgs {
    /// Overwrite files that were not generated by flinx.
    #[arg(short, long)]
    pub(crate) force: bool,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct BuildArgs {
    /// Rebuild all the docs, regardless of what has changed.
    #[arg(short, long)]
    pub(crate) all_files: bool,

    /// Open the HTML index in a browser.
    #[arg(short, long)]
    pub(crate) open_url: bool,

    /// The Sphinx builder to use.
    #[arg(long, default_value = "html", value_name = "BUILDER")]
    pub(crate) format: String,
}

#[derive(Debug, Copy, Clone, Default, ValueEnum)]
pub(crate) enum MetadataOutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct MetadataArgs {
    /// Only show these keys.
    #[arg(value_enum)]
    pub(crate) keys: Vec<MetadataKey>,

    /// The output format.
    #[arg(long, value_enum, default_value_t = MetadataOutputFormat::Text)]
    pub(crate) output_format: MetadataOutputFormat,
}
