use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

use flinx_consts::INIT_PY;
use itertools::Itertools;
use lazy_regex::regex_captures;
use tracing::{debug, trace};

use crate::fs::sorted_entries;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ModuleError {
    #[error("Couldn't find a module in `{}`", .0.display())]
    NoModule(PathBuf),

    #[error(
        "Too many module candidates in `{}`: {}",
        .dir.display(),
        .candidates.iter().map(|c| format!("`{c}`")).join(", ")
    )]
    Ambiguous {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    #[error("Failed to list `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),
}

/// Return the value assigned to `__version__` in a Python source file.
///
/// The file is only read, never executed: the first line of the form
/// `__version__ = "..."` (single or double quotes) wins. Returns `None` if the file does
/// not exist, is not UTF-8 text, or has no such line.
pub(crate) fn read_version(path: &Path) -> Option<String> {
    let contents = match fs_err::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            if err.kind() != io::ErrorKind::NotFound {
                trace!(error = %err, "Skipping unreadable file");
            }
            return None;
        }
    };

    let (_, literal) = regex_captures!(r#"(?m)^\s*__version__\s*=\s*('.*?'|".*?")"#, &contents)?;
    let version = literal.trim_matches(|c| c == '"' || c == '\'');
    trace!(path = %path.display(), version, "Found version definition");
    Some(version.to_string())
}

/// Test modules are never candidates: `test_*` and `*_test`.
fn is_test_name(name: &str) -> bool {
    name.starts_with("test_") || name.ends_with("_test")
}

#[derive(Debug, Clone, Copy)]
enum CandidateKind {
    /// A top-level `*.py` file.
    File,
    /// A top-level package directory with an `__init__.py`.
    Package,
}

impl Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Package => f.write_str("package"),
        }
    }
}

/// List the module names of one kind that declare a `__version__`.
fn module_candidates(project_dir: &Path, kind: CandidateKind) -> io::Result<Vec<String>> {
    let mut candidates = Vec::new();

    for path in sorted_entries(project_dir)? {
        let (name, version_file) = match kind {
            CandidateKind::File => {
                if path.extension().is_none_or(|ext| ext != "py") || !path.is_file() {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                    continue;
                };
                (stem.to_string(), path.clone())
            }
            CandidateKind::Package => {
                if !path.is_dir() {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                    continue;
                };
                let init = path.join(INIT_PY);
                if !init.is_file() {
                    continue;
                }
                (name.to_string(), init)
            }
        };

        if is_test_name(&name) {
            trace!(%kind, %name, "Skipping test module");
            continue;
        }
        if read_version(&version_file).is_none() {
            trace!(%kind, %name, "Skipping module without `__version__`");
            continue;
        }
        candidates.push(name);
    }

    Ok(candidates)
}

/// Find the project's module in `project_dir`.
///
/// File modules are preferred: package directories are only considered when no top-level
/// file declares a version. Exactly one candidate must remain.
pub(crate) fn find_module(project_dir: &Path) -> Result<String, ModuleError> {
    let io_err = |err: io::Error| ModuleError::Io(project_dir.to_path_buf(), err);

    let mut candidates = module_candidates(project_dir, CandidateKind::File).map_err(io_err)?;
    if candidates.is_empty() {
        candidates = module_candidates(project_dir, CandidateKind::Package).map_err(io_err)?;
    }

    match candidates.len() {
        0 => Err(ModuleError::NoModule(project_dir.to_path_buf())),
        1 => {
            let module = candidates.remove(0);
            debug!(%module, "Found module");
            Ok(module)
        }
        _ => Err(ModuleError::Ambiguous {
            dir: project_dir.to_path_buf(),
            candidates,
        }),
    }
}

/// Path of the file that defines `module`: `<module>/__init__.py` for a package,
/// `<module>.py` otherwise.
pub(crate) fn module_source_path(project_dir: &Path, module: &str) -> PathBuf {
    let package = project_dir.join(module);
    if package.is_dir() {
        package.join(INIT_PY)
    } else {
        project_dir.join(format!("{module}.py"))
    }
}
