use std::path::{Path, PathBuf};
use std::str::Utf8Error;
use std::sync::LazyLock;

use tracing::instrument;

use crate::process;
use crate::process::Cmd;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Command(#[from] process::Error),

    #[error("Failed to find git: {0}")]
    GitNotFound(#[from] which::Error),

    #[error(transparent)]
    UTF8(#[from] Utf8Error),

    #[error("Git `user.name` is not configured")]
    MissingUserName,
}

pub(crate) static GIT: LazyLock<Result<PathBuf, which::Error>> =
    LazyLock::new(|| which::which("git"));

pub(crate) fn git_cmd(summary: &str) -> Result<Cmd, Error> {
    let mut cmd = Cmd::new(GIT.as_ref().map_err(|&e| Error::GitNotFound(e))?, summary);
    cmd.arg("-c").arg("core.useBuiltinFSMonitor=false");

    Ok(cmd)
}

/// Read the configured `user.name`, as seen from `cwd`.
#[instrument(level = "trace")]
pub(crate) fn get_user_name(cwd: &Path) -> Result<String, Error> {
    let output = git_cmd("get user name")?
        .current_dir(cwd)
        .arg("config")
        .arg("user.name")
        .check(true)
        .output()?;

    let name = str::from_utf8(&output.stdout)?.trim();
    if name.is_empty() {
        return Err(Error::MissingUserName);
    }
    Ok(name.to_string())
}
