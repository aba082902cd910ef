use std::path::Path;

use flinx_consts::SPHINX_CONFIGURATION_PATH;
use lazy_regex::regex_is_match;
use serde::Serialize;
use toml::{Table, Value};
use tracing::{debug, trace};

use crate::pyproject::{self, table_at};

const EXTENSIONS_KEY: &str = "extensions";

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Pyproject(#[from] pyproject::Error),

    #[error("`tool.flinx.configuration.extensions` must be an array of strings, found {0}")]
    ExtensionsNotArray(&'static str),

    #[error("`tool.flinx.configuration.extensions[{index}]` must be a string, found {found}")]
    InvalidExtension { index: usize, found: &'static str },

    #[error("`tool.flinx.configuration.{0}` is not a valid Sphinx configuration name")]
    InvalidName(String),
}

/// One Sphinx configuration assignment, as written into `conf.py`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ConfigEntry {
    pub(crate) name: String,
    pub(crate) value: serde_json::Value,
}

/// Sphinx configuration values declared in `pyproject.toml`.
#[derive(Debug, Default)]
pub(crate) struct SphinxConfig {
    values: Table,
}

impl SphinxConfig {
    pub(crate) fn from_document(document: &Table) -> Self {
        let values = table_at(document, SPHINX_CONFIGURATION_PATH)
            .cloned()
            .unwrap_or_default();
        trace!(count = values.len(), "Read Sphinx configuration");
        Self { values }
    }

    /// Read the configuration of the project in `project_dir`. A missing `pyproject.toml`
    /// or a missing table is an empty configuration.
    pub(crate) fn from_dir(project_dir: &Path) -> Result<Self, Error> {
        Ok(pyproject::read_pyproject(project_dir)?
            .map(|document| Self::from_document(&document))
            .unwrap_or_default())
    }

    fn declared_extensions(&self) -> Result<Option<Vec<&str>>, Error> {
        let Some(value) = self.values.get(EXTENSIONS_KEY) else {
            return Ok(None);
        };
        let Value::Array(entries) = value else {
            return Err(Error::ExtensionsNotArray(value.type_str()));
        };
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.as_str().ok_or(Error::InvalidExtension {
                    index,
                    found: entry.type_str(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// The Sphinx extensions to enable: the declared ones (or the default) followed by
    /// those implied by the configuration keys.
    pub(crate) fn extensions(&self) -> Result<Vec<String>, Error> {
        let declared = self.declared_extensions()?;
        let extensions = flinx_extensions::resolve(
            declared.as_deref(),
            self.values.keys().map(String::as_str),
        );
        debug!(?extensions, "Resolved extensions");
        Ok(extensions)
    }

    /// Every configuration value in declaration order, with `extensions` set to the
    /// resolved list. A resolved list that was not declared is appended.
    pub(crate) fn entries(&self) -> Result<Vec<ConfigEntry>, Error> {
        let extensions = serde_json::Value::from(self.extensions()?);

        let mut entries = Vec::with_capacity(self.values.len() + 1);
        let mut extensions = Some(extensions);
        for (name, value) in &self.values {
            if !regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_]*$", name) {
                return Err(Error::InvalidName(name.clone()));
            }
            let value = if name == EXTENSIONS_KEY {
                extensions.take().unwrap_or_default()
            } else {
                toml_to_json(value)
            };
            entries.push(ConfigEntry {
                name: name.clone(),
                value,
            });
        }
        if let Some(extensions) = extensions {
            entries.push(ConfigEntry {
                name: EXTENSIONS_KEY.to_string(),
                value: extensions,
            });
        }
        Ok(entries)
    }
}

/// Convert a TOML value to JSON. Datetimes have no JSON counterpart and become strings.
pub(crate) fn toml_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or_else(|| serde_json::Value::String(f.to_string()), serde_json::Value::Number),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Datetime(datetime) => serde_json::Value::String(datetime.to_string()),
        Value::Array(array) => array.iter().map(toml_to_json).collect(),
        Value::Table(table) => serde_json::Value::Object(
            table
                .iter()
                .map(|(key, value)| (key.clone(), toml_to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use flinx_consts::PYPROJECT_TOML;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn config(document: &str) -> SphinxConfig {
        let document: Table = toml::from_str(document).expect("valid TOML");
        SphinxConfig::from_document(&document)
    }

    #[test]
    fn default_extensions() -> anyhow::Result<()> {
        assert_eq!(SphinxConfig::default().extensions()?, ["sphinx.ext.autodoc"]);
        assert_eq!(
            config("[tool.black]\nline-length = 100\n").extensions()?,
            ["sphinx.ext.autodoc"]
        );
        Ok(())
    }

    #[test]
    fn declared_and_implied_extensions() -> anyhow::Result<()> {
        let config = config(indoc! {r#"
            [tool.flinx.configuration]
            extensions = ["napoleon", "custom.ext"]
            intersphinx_mapping = { python = ["https://docs.python.org/3", ""] }
            autodoc_member_order = "bysource"
            html_theme = "alabaster"
        "#});

        assert_eq!(
            config.extensions()?,
            [
                "sphinx.ext.napoleon",
                "custom.ext",
                "sphinx.ext.autodoc",
                "sphinx.ext.intersphinx",
            ]
        );
        Ok(())
    }

    #[test]
    fn extensions_must_be_strings() {
        let err = config(indoc! {r#"
            [tool.flinx.configuration]
            extensions = "autodoc"
        "#})
        .extensions()
        .unwrap_err();
        assert!(matches!(err, Error::ExtensionsNotArray("string")), "{err}");

        let err = config(indoc! {r#"
            [tool.flinx.configuration]
            extensions = ["autodoc", 3]
        "#})
        .extensions()
        .unwrap_err();
        assert!(matches!(err, Error::InvalidExtension { index: 1, .. }), "{err}");
        assert!(err.to_string().contains("extensions[1]"), "{err}");
    }

    #[test]
    fn entries_keep_declaration_order() -> anyhow::Result<()> {
        let config = config(indoc! {r#"
            [tool.flinx.configuration]
            html_theme = "alabaster"
            extensions = ["todo"]
            todo_include_todos = true
        "#});

        assert_eq!(
            config.entries()?,
            [
                ConfigEntry {
                    name: "html_theme".to_string(),
                    value: json!("alabaster"),
                },
                ConfigEntry {
                    name: "extensions".to_string(),
                    value: json!(["sphinx.ext.todo"]),
                },
                ConfigEntry {
                    name: "todo_include_todos".to_string(),
                    value: json!(true),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn resolved_extensions_are_appended() -> anyhow::Result<()> {
        let entries = config(indoc! {r#"
            [tool.flinx.configuration]
            html_theme = "alabaster"
        "#})
        .entries()?;

        let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["html_theme", "extensions"]);
        assert_eq!(entries[1].value, json!(["sphinx.ext.autodoc"]));
        Ok(())
    }

    #[test]
    fn names_must_be_identifiers() {
        let err = config(indoc! {r#"
            [tool.flinx.configuration]
            html-theme = "furo"
        "#})
        .entries()
        .unwrap_err();
        assert!(matches!(&err, Error::InvalidName(name) if name == "html-theme"), "{err}");
    }

    #[test]
    fn toml_values_as_json() -> anyhow::Result<()> {
        let document: Table = toml::from_str(indoc! {r#"
            string = "s"
            integer = 3
            float = 1.5
            boolean = false
            date = 1979-05-27
            array = [1, "two"]
            table = { nested = { key = "value" } }
        "#})?;

        assert_eq!(
            toml_to_json(&Value::Table(document)),
            json!({
                "string": "s",
                "integer": 3,
                "float": 1.5,
                "boolean": false,
                "date": "1979-05-27",
                "array": [1, "two"],
                "table": { "nested": { "key": "value" } },
            })
        );
        Ok(())
    }

    #[test]
    fn missing_pyproject_is_empty() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(SphinxConfig::from_dir(dir.path())?.entries()?.len(), 1);

        fs_err::write(
            dir.path().join(PYPROJECT_TOML),
            "[tool.flinx.configuration]\nhtml_theme = \"furo\"\n",
        )?;
        assert_eq!(SphinxConfig::from_dir(dir.path())?.entries()?.len(), 2);
        Ok(())
    }
}
