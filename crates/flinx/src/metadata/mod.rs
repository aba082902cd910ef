use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{debug, trace};

use crate::pyproject;

pub(crate) use inferred::InferredMetadata;
pub(crate) use module::{ModuleError, find_module, module_source_path, read_version};
pub(crate) use schema::{SCHEMAS, SchemaProvider};

mod inferred;
mod module;
mod schema;

/// A piece of project metadata that can be resolved.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    clap::ValueEnum,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub(crate) enum MetadataKey {
    Name,
    Module,
    Author,
    Version,
    Readme,
    Date,
}

impl MetadataKey {
    /// Keys a documentation build cannot do without.
    pub(crate) fn is_required(self) -> bool {
        matches!(self, Self::Name | Self::Module | Self::Version)
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Couldn't determine the project `{0}`")]
    NotFound(MetadataKey),

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Pyproject(#[from] pyproject::Error),

    #[error("Failed to read directory `{}`", .0.display())]
    ReadDir(PathBuf, #[source] io::Error),

    #[error("Project directory `{}` does not exist", .0.display())]
    ProjectDir(PathBuf, #[source] io::Error),
}

/// A source of metadata values.
///
/// `Ok(None)` means the source has no value for the key and the next source should be
/// consulted. `Err` is a failure that ends the lookup.
pub(crate) trait MetadataProvider: Debug {
    /// A short label for the source, used in logs.
    fn source(&self) -> &str;

    fn lookup(&self, key: MetadataKey) -> Result<Option<String>, Error>;
}

/// An ordered list of providers, where the first one with a value wins.
#[derive(Debug, Default)]
pub(crate) struct CombinedMetadata {
    providers: Vec<Box<dyn MetadataProvider>>,
}

impl CombinedMetadata {
    pub(crate) fn new(providers: Vec<Box<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }
}

impl MetadataProvider for CombinedMetadata {
    fn source(&self) -> &str {
        "combined"
    }

    fn lookup(&self, key: MetadataKey) -> Result<Option<String>, Error> {
        for provider in &self.providers {
            if let Some(value) = provider.lookup(key)? {
                debug!(%key, source = provider.source(), %value, "Resolved metadata");
                return Ok(Some(value));
            }
            trace!(%key, source = provider.source(), "No value");
        }
        Ok(None)
    }
}

/// The resolved metadata of a Python project directory.
#[derive(Debug)]
pub(crate) struct ProjectMetadata {
    project_dir: PathBuf,
    metadata: CombinedMetadata,
}

impl ProjectMetadata {
    /// Build the providers for `project_dir`.
    ///
    /// Declared schemas are consulted first, in the order of [`SCHEMAS`], but only when
    /// the directory has a `pyproject.toml`. Inferred metadata comes last.
    pub(crate) fn from_dir(project_dir: &Path) -> Result<Self, Error> {
        let project_dir = dunce::canonicalize(project_dir)
            .map_err(|err| Error::ProjectDir(project_dir.to_path_buf(), err))?;

        let mut providers: Vec<Box<dyn MetadataProvider>> = Vec::new();
        if let Some(document) = pyproject::read_pyproject(&project_dir)? {
            for schema in SCHEMAS {
                providers.push(Box::new(SchemaProvider::from_document(schema, &document)));
            }
        } else {
            debug!("No `pyproject.toml`, using inferred metadata only");
        }
        providers.push(Box::new(InferredMetadata::new(&project_dir)));

        Ok(Self {
            project_dir,
            metadata: CombinedMetadata::new(providers),
        })
    }

    pub(crate) fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Look up a key, returning `None` if no source has a value.
    ///
    /// `version` never comes from a source: it is always read from the resolved
    /// module's source file.
    pub(crate) fn lookup(&self, key: MetadataKey) -> Result<Option<String>, Error> {
        match key {
            MetadataKey::Version => self.version(),
            _ => self.metadata.lookup(key),
        }
    }

    /// Look up a key that must have a value.
    pub(crate) fn get(&self, key: MetadataKey) -> Result<String, Error> {
        self.lookup(key)?.ok_or(Error::NotFound(key))
    }

    fn version(&self) -> Result<Option<String>, Error> {
        let Some(module) = self.metadata.lookup(MetadataKey::Module)? else {
            return Ok(None);
        };
        let path = module_source_path(&self.project_dir, &module);
        let version = read_version(&path);
        if version.is_none() {
            debug!(path = %path.display(), "No `__version__` in module source");
        }
        Ok(version)
    }
}
