use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use anstream::{ColorChoice, eprintln};
use anyhow::{Context, Result};
use clap::Parser;
use flinx_consts::DOCS_DIR;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::cli::{Cli, Command, ExitStatus, WriteMode};
use crate::printer::{Printer, USE_COLOR};

mod cli;
mod config;
mod fs;
mod git;
mod metadata;
mod printer;
mod process;
mod pyproject;
mod templates;
mod warnings;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    /// Suppress all tracing output by default (overridable by `RUST_LOG`).
    #[default]
    Default,
    /// Show verbose messages.
    Verbose,
    /// Show debug messages by default (overridable by `RUST_LOG`).
    Debug,
    /// Show trace messages by default (overridable by `RUST_LOG`).
    Trace,
    /// Show trace messages for all crates by default (overridable by `RUST_LOG`).
    TraceAll,
}

fn setup_logging(level: Level) -> Result<()> {
    let directive = match level {
        Level::Default | Level::Verbose => LevelFilter::OFF.into(),
        Level::Debug => Directive::from_str("flinx=debug")?,
        Level::Trace => Directive::from_str("flinx=trace")?,
        Level::TraceAll => Directive::from_str("trace")?,
    };

    let stderr_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env()
        .context("Invalid RUST_LOG directive")?;
    let stderr_format = tracing_subscriber::fmt::format()
        .with_target(false)
        .with_ansi(*USE_COLOR);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .event_format(stderr_format)
        .with_writer(anstream::stderr)
        .with_filter(stderr_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    Ok(())
}

fn run(cli: Cli) -> Result<ExitStatus> {
    // Enabled ANSI colors on Windows.
    let _ = anstyle_query::windows::enable_ansi_colors();

    ColorChoice::write_global(cli.globals.color.into());

    setup_logging(match cli.globals.verbose {
        0 => Level::Default,
        1 => Level::Verbose,
        2 => Level::Debug,
        3 => Level::Trace,
        _ => Level::TraceAll,
    })?;

    let printer = if cli.globals.quiet == 1 {
        Printer::Quiet
    } else if cli.globals.quiet > 1 {
        Printer::Silent
    } else if cli.globals.verbose > 0 {
        Printer::Verbose
    } else {
        Printer::Default
    };

    if cli.globals.quiet > 0 {
        warnings::disable();
    } else {
        warnings::enable();
    }

    debug!("flinx: {}", env!("CARGO_PKG_VERSION"));

    if let Some(dir) = cli.globals.cd.as_ref() {
        debug!("Changing current directory to: `{}`", dir.display());
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change directory to `{}`", dir.display()))?;
    }

    debug!("Args: {:?}", std::env::args().collect::<Vec<_>>());

    let project_dir = Path::new(".");
    let docs_dir = Path::new(DOCS_DIR);
    let verbose = cli.globals.verbose > 0;

    match cli.command {
        Command::Generate(args) => cli::generate(
            project_dir,
            docs_dir,
            WriteMode::Generate { force: args.force },
            printer,
        ),
        Command::Eject(args) => cli::generate(
            project_dir,
            docs_dir,
            WriteMode::Eject { force: args.force },
            printer,
        ),
        Command::Build(args) => cli::build(project_dir, docs_dir, &args, verbose, printer),
        Command::Serve(args) => cli::serve(project_dir, docs_dir, &args, verbose, printer),
        Command::Metadata(args) => {
            cli::metadata(project_dir, args.keys, args.output_format, printer)
        }
    }
}

fn main() -> ExitCode {
    ctrlc::set_handler(move || {
        #[allow(clippy::exit, clippy::cast_possible_wrap)]
        std::process::exit(if cfg!(windows) {
            0xC000_013A_u32 as i32
        } else {
            130
        });
    })
    .expect("Error setting Ctrl-C handler");

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    match run(cli) {
        Ok(code) => code.into(),
        Err(err) => {
            let mut causes = err.chain();
            if let Some(err) = causes.next() {
                eprintln!("{}: {}", "error".red().bold(), err);
            }
            for err in causes {
                eprintln!("  {}: {}", "caused by".red().bold(), err);
            }
            ExitStatus::Error.into()
        }
    }
}
