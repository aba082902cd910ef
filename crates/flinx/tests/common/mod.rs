#![allow(dead_code, unreachable_pub)]

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::fixture::{ChildPath, FileWriteStr, PathChild, PathCreateDir};
use flinx_consts::PYPROJECT_TOML;
use flinx_consts::env_vars::EnvVars;
use lazy_regex::regex;

pub struct TestContext {
    work_dir: ChildPath,
    home_dir: ChildPath,

    /// Standard filters for this test context.
    filters: Vec<(String, String)>,

    #[allow(dead_code)]
    _root: tempfile::TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let root = tempfile::TempDir::new().expect("Failed to create test root directory");

        let root_path = ChildPath::new(root.path());
        let work_dir = root_path.child("sample");
        work_dir.create_dir_all().expect("Failed to create work directory");
        let home_dir = root_path.child("home");
        home_dir.create_dir_all().expect("Failed to create home directory");

        let mut filters = Vec::new();
        // The canonical path goes first: it may extend the raw one, e.g. `/private/var`.
        for path in [
            dunce::canonicalize(root.path()).expect("Failed to canonicalize test root"),
            root.path().to_path_buf(),
        ] {
            filters.push((
                format!(r"{}[\\/]?", regex::escape(&path.display().to_string())),
                "[TEMP_DIR]/".to_string(),
            ));
        }
        filters.push((r"\b20\d\d\b".to_string(), "[YEAR]".to_string()));

        Self {
            work_dir,
            home_dir,
            filters,
            _root: root,
        }
    }

    pub fn filters(&self) -> Vec<(&str, &str)> {
        self.filters
            .iter()
            .map(|(pattern, replacement)| (pattern.as_str(), replacement.as_str()))
            .collect()
    }

    pub fn work_dir(&self) -> &ChildPath {
        &self.work_dir
    }

    pub fn home_dir(&self) -> &ChildPath {
        &self.home_dir
    }

    /// A `flinx` command running in the project directory, isolated from the user's git
    /// configuration and environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_bin());
        cmd.current_dir(self.work_dir.path());
        cmd.env(EnvVars::HOME, self.home_dir.path());
        cmd.env(EnvVars::GIT_CONFIG_GLOBAL, self.home_dir.child(".gitconfig").path());
        cmd.env(EnvVars::GIT_CONFIG_NOSYSTEM, "1");
        cmd.env(EnvVars::FLINX_COLOR, "never");
        cmd.env(EnvVars::FLINX_NO_OPEN, "1");
        cmd.env_remove(EnvVars::FLINX_SPHINX_BUILD);
        cmd.env_remove(EnvVars::FLINX_SPHINX_AUTOBUILD);
        cmd.env_remove(EnvVars::SPHINXBUILD);
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn generate(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("generate");
        cmd
    }

    pub fn eject(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("eject");
        cmd
    }

    pub fn build(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("build");
        cmd
    }

    pub fn metadata(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("metadata");
        cmd
    }

    /// Write a file relative to the project directory.
    pub fn write(&self, path: impl AsRef<Path>, contents: &str) {
        let child = self.work_dir.child(path);
        if let Some(parent) = child.path().parent() {
            fs_err::create_dir_all(parent).expect("Failed to create parent directory");
        }
        child.write_str(contents).expect("Failed to write file");
    }

    /// Read a file relative to the project directory.
    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs_err::read_to_string(self.work_dir.child(path)).expect("Failed to read file")
    }

    /// A single-module project with a README and declared metadata.
    pub fn init_project(&self) {
        self.write("sample.py", "\"\"\"A sample module.\"\"\"\n\n__version__ = \"0.1.0\"\n");
        self.write("README.rst", "Sample\n======\n");
        self.write(
            PYPROJECT_TOML,
            indoc::indoc! {r#"
                [tool.flinx.metadata]
                author = "Ada Lovelace"
                date = "1999"

                [tool.flinx.configuration]
                html_theme = "alabaster"
            "#},
        );
    }

    /// Install a stand-in for a Sphinx executable that echoes its arguments and exits
    /// with `code`.
    #[cfg(unix)]
    pub fn fake_sphinx(&self, name: &str, code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.home_dir.child(name);
        path.write_str(&format!("#!/bin/sh\necho \"{name} $*\"\nexit {code}\n"))
            .expect("Failed to write script");
        fs_err::set_permissions(path.path(), std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        path.path().to_path_buf()
    }
}

pub fn get_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_flinx"))
}

/// Run [`insta_cmd::assert_cmd_snapshot!`] with the given filters applied.
#[allow(unused_macros)]
macro_rules! cmd_snapshot {
    ($filters:expr, $spawnable:expr, @$snapshot:literal) => {{
        let mut settings = insta::Settings::clone_current();
        for (matcher, replacement) in $filters {
            settings.add_filter(matcher, replacement);
        }
        let _guard = settings.bind_to_scope();
        insta_cmd::assert_cmd_snapshot!($spawnable, @$snapshot);
    }};
}

#[allow(unused_imports)]
pub(crate) use cmd_snapshot;
