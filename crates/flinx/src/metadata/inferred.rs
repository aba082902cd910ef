use std::io;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use flinx_consts::README_FILENAMES;
use tracing::debug;

use crate::fs::sorted_entries;
use crate::git;
use crate::metadata::{Error, MetadataKey, MetadataProvider, find_module};

/// Metadata derived from the project directory itself.
///
/// This is the last source consulted, so everything it answers is a default that a
/// declaration in `pyproject.toml` can override.
#[derive(Debug)]
pub(crate) struct InferredMetadata {
    project_dir: PathBuf,
}

impl InferredMetadata {
    pub(crate) fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    fn name(&self) -> Option<String> {
        self.project_dir
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToString::to_string)
    }

    fn author(&self) -> Option<String> {
        match git::get_user_name(&self.project_dir) {
            Ok(name) => Some(name),
            Err(err) => {
                debug!(error = %err, "Couldn't read the author from git");
                None
            }
        }
    }

    fn date() -> String {
        chrono::Local::now().year().to_string()
    }
}

impl MetadataProvider for InferredMetadata {
    fn source(&self) -> &str {
        "inferred"
    }

    fn lookup(&self, key: MetadataKey) -> Result<Option<String>, Error> {
        Ok(match key {
            MetadataKey::Name => self.name(),
            MetadataKey::Module => Some(find_module(&self.project_dir)?),
            MetadataKey::Author => self.author(),
            MetadataKey::Date => Some(Self::date()),
            MetadataKey::Readme => find_readme(&self.project_dir)
                .map_err(|err| Error::ReadDir(self.project_dir.clone(), err))?,
            MetadataKey::Version => None,
        })
    }
}

/// Find the project's README: `README.rst` or `README.md`, in any letter case.
///
/// When several match, reStructuredText wins over Markdown and ties are broken by name.
pub(crate) fn find_readme(project_dir: &Path) -> io::Result<Option<String>> {
    let readme = sorted_entries(project_dir)?
        .into_iter()
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            let rank = README_FILENAMES
                .iter()
                .position(|readme| readme.eq_ignore_ascii_case(&name))?;
            Some((rank, name))
        })
        .min()
        .map(|(_, name)| name);
    Ok(readme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_directory_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let project = dir.path().join("my-project");
        fs_err::create_dir(&project)?;

        let metadata = InferredMetadata::new(&project);
        assert_eq!(
            metadata.lookup(MetadataKey::Name)?.as_deref(),
            Some("my-project")
        );
        Ok(())
    }

    #[test]
    fn module_and_version() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs_err::write(dir.path().join("module.py"), "__version__ = '1.0'\n")?;

        let metadata = InferredMetadata::new(dir.path());
        assert_eq!(metadata.lookup(MetadataKey::Module)?.as_deref(), Some("module"));
        // The version is resolved through the module, not by this provider.
        assert_eq!(metadata.lookup(MetadataKey::Version)?, None);
        Ok(())
    }

    #[test]
    fn module_errors_propagate() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let metadata = InferredMetadata::new(dir.path());
        assert!(matches!(
            metadata.lookup(MetadataKey::Module),
            Err(Error::Module(_))
        ));
        Ok(())
    }

    #[test]
    fn date_is_current_year() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let date = InferredMetadata::new(dir.path())
            .lookup(MetadataKey::Date)?
            .expect("date is always inferred");
        assert_eq!(date.len(), 4);
        assert!(date.chars().all(|c| c.is_ascii_digit()), "{date}");
        Ok(())
    }

    #[test]
    fn readme_prefers_rst() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs_err::write(dir.path().join("readme.md"), "")?;
        fs_err::write(dir.path().join("README.rst"), "")?;
        fs_err::write(dir.path().join("README.txt"), "")?;

        assert_eq!(find_readme(dir.path())?.as_deref(), Some("README.rst"));
        Ok(())
    }

    #[test]
    fn readme_any_case() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs_err::write(dir.path().join("Readme.MD"), "")?;

        assert_eq!(find_readme(dir.path())?.as_deref(), Some("Readme.MD"));
        Ok(())
    }

    #[test]
    fn readme_ignores_directories() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs_err::create_dir(dir.path().join("README.rst"))?;
        fs_err::write(dir.path().join("README.md"), "")?;

        assert_eq!(find_readme(dir.path())?.as_deref(), Some("README.md"));
        Ok(())
    }

    #[test]
    fn no_readme() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs_err::write(dir.path().join("README"), "")?;

        let metadata = InferredMetadata::new(dir.path());
        assert_eq!(metadata.lookup(MetadataKey::Readme)?, None);
        Ok(())
    }
}
