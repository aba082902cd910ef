use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flinx_consts::{CONF_PY, GENERATED_MARKER, INDEX_RST, MASTER_BASENAME};
use owo_colors::OwoColorize;
use tracing::{debug, trace};

use crate::cli::ExitStatus;
use crate::config::SphinxConfig;
use crate::fs::{Simplified, read_to_string_if_exists};
use crate::metadata::{MetadataKey, ProjectMetadata};
use crate::printer::Printer;
use crate::templates::{ConfContext, IndexContext, Templates};
use crate::warn_user;

/// How existing files in the docs directory are treated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Write files that carry the generated-file marker.
    Generate { force: bool },
    /// Write files without the marker, handing them over to the user.
    Eject { force: bool },
    /// Refresh generated files before a build, keeping ejected ones.
    Refresh,
}

impl WriteMode {
    fn generated_text(self) -> Option<&'static str> {
        match self {
            Self::Generate { .. } | Self::Refresh => Some(GENERATED_MARKER),
            Self::Eject { .. } => None,
        }
    }

    fn force(self) -> bool {
        match self {
            Self::Generate { force } | Self::Eject { force } => force,
            Self::Refresh => false,
        }
    }
}

/// A file the user owns: it exists and was not written by `flinx generate`.
fn is_user_owned(contents: Option<&str>) -> bool {
    contents.is_some_and(|contents| !contents.contains(GENERATED_MARKER))
}

/// Render `conf.py` and `index.rst` for the project in `project_dir`.
fn render(project_dir: &Path, mode: WriteMode) -> Result<[(&'static str, String); 2]> {
    let metadata = ProjectMetadata::from_dir(project_dir)?;
    let config = SphinxConfig::from_dir(metadata.project_dir())?;

    let name = metadata.get(MetadataKey::Name)?;
    let module = metadata.get(MetadataKey::Module)?;
    let version = metadata.get(MetadataKey::Version)?;
    let date = metadata.get(MetadataKey::Date)?;
    let author = metadata.lookup(MetadataKey::Author)?.unwrap_or_default();
    let readme = metadata.lookup(MetadataKey::Readme)?;
    let entries = config.entries()?;

    let copyright = if author.is_empty() {
        date
    } else {
        format!("{date}, {author}")
    };

    let templates = Templates::new()?;
    let generated_text = mode.generated_text();
    let conf = templates.render_conf(&ConfContext {
        generated_text,
        module_path: "..",
        project: &name,
        copyright,
        author: &author,
        version: &version,
        source_suffix: &[".rst"],
        master_doc: MASTER_BASENAME,
        config: &entries,
    })?;
    let index = templates.render_index(&IndexContext::new(
        generated_text,
        &name,
        readme.as_deref(),
        &module,
    ))?;

    Ok([(INDEX_RST, index), (CONF_PY, conf)])
}

/// Write the Sphinx configuration and index page into `docs_dir`.
///
/// Every target is checked before anything is written, so a refusal leaves the docs
/// directory untouched.
pub(crate) fn write_docs(
    project_dir: &Path,
    docs_dir: &Path,
    mode: WriteMode,
    printer: Printer,
) -> Result<PathBuf> {
    let files = render(project_dir, mode)?;

    let mut pending = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = docs_dir.join(name);
        let existing = read_to_string_if_exists(&path)?;

        if is_user_owned(existing.as_deref()) {
            match mode {
                WriteMode::Refresh => {
                    warn_user!("Using ejected `{}`", path.user_display().cyan());
                    continue;
                }
                _ if mode.force() => {
                    debug!(path = %path.display(), "Overwriting user-owned file");
                }
                _ => anyhow::bail!(
                    "`{}` was not generated by flinx; use `--force` to overwrite it",
                    path.user_display().cyan()
                ),
            }
        }

        if existing.as_deref() == Some(contents.as_str()) {
            trace!(path = %path.display(), "Unchanged");
            continue;
        }
        pending.push((path, contents));
    }

    fs_err::create_dir_all(docs_dir)?;
    for (path, contents) in pending {
        fs_err::write(&path, contents)?;
        let mut out = match mode {
            WriteMode::Refresh => printer.verbose(),
            WriteMode::Generate { .. } | WriteMode::Eject { .. } => printer.stderr(),
        };
        writeln!(out, "Wrote {}", path.user_display().cyan())?;
    }

    Ok(docs_dir.join(CONF_PY))
}

pub(crate) fn generate(
    project_dir: &Path,
    docs_dir: &Path,
    mode: WriteMode,
    printer: Printer,
) -> Result<ExitStatus> {
    write_docs(project_dir, docs_dir, mode, printer).with_context(|| {
        format!(
            "Failed to write the documentation configuration in `{}`",
            docs_dir.user_display()
        )
    })?;
    Ok(ExitStatus::Success)
}
