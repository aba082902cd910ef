use std::path::{Path, PathBuf};

use flinx_consts::PYPROJECT_TOML;
use toml::{Table, Value};
use tracing::trace;

use crate::fs::read_to_string_if_exists;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Failed to read `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to parse `{path}`")]
    Parse {
        path: PathBuf,
        #[source]
        error: Box<toml::de::Error>,
    },
}

/// Read and parse a TOML document, returning `None` if the file does not exist.
pub(crate) fn read_document(path: &Path) -> Result<Option<Table>, Error> {
    let Some(contents) = read_to_string_if_exists(path).map_err(|error| Error::Read {
        path: path.to_path_buf(),
        error,
    })?
    else {
        return Ok(None);
    };

    let table = toml::from_str::<Table>(&contents).map_err(|error| Error::Parse {
        path: path.to_path_buf(),
        error: Box::new(error),
    })?;
    Ok(Some(table))
}

/// Read the `pyproject.toml` in `project_dir`, if there is one.
pub(crate) fn read_pyproject(project_dir: &Path) -> Result<Option<Table>, Error> {
    read_document(&project_dir.join(PYPROJECT_TOML))
}

/// Walk a dotted path such as `tool.poetry` down nested tables.
///
/// Returns `None` if any segment is missing or is not a table.
pub(crate) fn table_at<'a>(document: &'a Table, dotted_path: &str) -> Option<&'a Table> {
    let mut table = document;
    for segment in dotted_path.split('.') {
        match table.get(segment) {
            Some(Value::Table(child)) => table = child,
            Some(_) => {
                trace!(dotted_path, segment, "Segment is not a table");
                return None;
            }
            None => return None,
        }
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_returns_none() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(read_pyproject(dir.path())?.is_none());
        Ok(())
    }

    #[test]
    fn unparsable_toml_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs_err::write(dir.path().join(PYPROJECT_TOML), "this is not valid toml {{{\n")?;

        let err = read_pyproject(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains(PYPROJECT_TOML));
        Ok(())
    }

    #[test]
    fn dotted_path_lookup() -> anyhow::Result<()> {
        let document: Table = toml::from_str(indoc::indoc! {r#"
            [tool]
            scalar = 1

            [tool.flit.metadata]
            module = "pkg"

            [tool.black]
            line-length = 100
        "#})?;

        let flit = table_at(&document, "tool.flit.metadata").expect("table exists");
        assert_eq!(flit.get("module").and_then(Value::as_str), Some("pkg"));

        assert!(table_at(&document, "tool.poetry").is_none());
        assert!(table_at(&document, "tool.scalar.inner").is_none());
        assert!(table_at(&document, "tool.black.line-length").is_none());
        Ok(())
    }
}
