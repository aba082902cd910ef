use std::ffi::OsString;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use flinx_consts::env_vars::EnvVars;
use flinx_consts::{BUILD_DIR, MASTER_BASENAME};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::cli::{BuildArgs, ExitStatus, WriteMode, write_docs};
use crate::fs::Simplified;
use crate::printer::Printer;
use crate::process::Cmd;
use crate::warn_user;

const SPHINX_BUILD: &str = "sphinx-build";
const SPHINX_AUTOBUILD: &str = "sphinx-autobuild";

/// Find a Sphinx executable, unless an environment variable names one.
fn find_builder(env_var: &str, name: &str) -> Result<PathBuf> {
    if let Some(program) = EnvVars::var_os(env_var) {
        debug!("Using `{}` from {env_var}", program.to_string_lossy());
        return Ok(PathBuf::from(program));
    }
    which::which(name).with_context(|| {
        format!("Failed to find `{name}`. Install Sphinx, or set {env_var} to its location")
    })
}

/// The arguments shared by `sphinx-build` and `sphinx-autobuild`.
pub(crate) fn sphinx_args(
    docs_dir: &Path,
    conf_dir: &Path,
    format: &str,
    all_files: bool,
    verbose: bool,
) -> Vec<OsString> {
    let build_dir = docs_dir.join(BUILD_DIR).join(format);

    let mut args: Vec<OsString> = vec![
        "-b".into(),
        format.into(),
        "-c".into(),
        conf_dir.into(),
        "-j".into(),
        "auto".into(),
    ];
    if !verbose {
        args.push("-q".into());
    }
    args.push(docs_dir.into());
    args.push(build_dir.into());
    if all_files {
        args.push("-a".into());
    }
    args
}

/// Regenerate the configuration, returning the builder arguments.
fn prepare(
    project_dir: &Path,
    docs_dir: &Path,
    args: &BuildArgs,
    verbose: bool,
    printer: Printer,
) -> Result<Vec<OsString>> {
    let conf_path = write_docs(project_dir, docs_dir, WriteMode::Refresh, printer)?;
    let conf_dir = conf_path.parent().unwrap_or(docs_dir);
    Ok(sphinx_args(
        docs_dir,
        conf_dir,
        &args.format,
        args.all_files,
        verbose,
    ))
}

/// Map a builder's exit status onto ours.
fn builder_status(name: &str, status: std::process::ExitStatus) -> ExitStatus {
    if status.success() {
        return ExitStatus::Success;
    }
    warn_user!("`{name}` exited with {status}");
    match status.code().and_then(|code| u8::try_from(code).ok()) {
        Some(code) => ExitStatus::External(code),
        None => ExitStatus::Failure,
    }
}

pub(crate) fn build(
    project_dir: &Path,
    docs_dir: &Path,
    args: &BuildArgs,
    verbose: bool,
    printer: Printer,
) -> Result<ExitStatus> {
    let sphinx_args = prepare(project_dir, docs_dir, args, verbose, printer)?;
    let program = find_builder(EnvVars::FLINX_SPHINX_BUILD, SPHINX_BUILD)?;

    let status = Cmd::new(&program, "build the documentation")
        .args(&sphinx_args)
        .check(false)
        .status()?;
    let status = builder_status(SPHINX_BUILD, status);
    if !matches!(status, ExitStatus::Success) {
        return Ok(status);
    }

    if args.open_url && args.format == "html" {
        let index = docs_dir
            .join(BUILD_DIR)
            .join(&args.format)
            .join(format!("{MASTER_BASENAME}.html"));
        open_in_browser(&index, printer)?;
    }

    Ok(ExitStatus::Success)
}

pub(crate) fn serve(
    project_dir: &Path,
    docs_dir: &Path,
    args: &BuildArgs,
    verbose: bool,
    printer: Printer,
) -> Result<ExitStatus> {
    let mut sphinx_args = prepare(project_dir, docs_dir, args, verbose, printer)?;
    if args.open_url {
        sphinx_args.push("-B".into());
    }
    let program = find_builder(EnvVars::FLINX_SPHINX_AUTOBUILD, SPHINX_AUTOBUILD)?;

    let status = Cmd::new(&program, "serve the documentation")
        .args(&sphinx_args)
        .check(false)
        .status()?;
    Ok(builder_status(SPHINX_AUTOBUILD, status))
}

/// Open a built page with the platform's opener.
fn open_in_browser(path: &Path, printer: Printer) -> Result<()> {
    if EnvVars::is_set(EnvVars::FLINX_NO_OPEN) {
        debug!("Not opening `{}`: {} is set", path.display(), EnvVars::FLINX_NO_OPEN);
        return Ok(());
    }

    let path = dunce::canonicalize(path)
        .with_context(|| format!("Failed to find `{}`", path.user_display()))?;

    let mut cmd = if cfg!(target_os = "macos") {
        Cmd::new("open", "open the documentation")
    } else if cfg!(windows) {
        let mut cmd = Cmd::new("cmd", "open the documentation");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Cmd::new("xdg-open", "open the documentation")
    };
    cmd.arg(&path).stdout(Stdio::null()).stderr(Stdio::null());

    match cmd.run() {
        Ok(()) => {
            writeln!(printer.stderr(), "Opened {}", path.user_display().cyan())?;
        }
        Err(err) => warn_user!("Failed to open `{}` in a browser: {err}", path.user_display()),
    }
    Ok(())
}
