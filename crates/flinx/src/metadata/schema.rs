use std::path::Path;

use toml::{Table, Value};
use tracing::trace;

use crate::metadata::{Error, MetadataKey, MetadataProvider};
use crate::pyproject::{self, table_at};

/// How a metadata key maps onto the fields of a schema's table.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Translation {
    /// Read a field with a different name.
    Field(&'static str),
    /// Read the first of these fields that is present.
    Fallbacks(&'static [&'static str]),
    /// Compute the value from the whole table.
    Computed(fn(&Table) -> Option<String>),
}

/// A convention for declaring project metadata in `pyproject.toml`.
#[derive(Debug)]
pub(crate) struct Schema {
    pub(crate) name: &'static str,
    /// Dotted path of the metadata table, e.g. `tool.poetry`.
    pub(crate) table_path: &'static str,
    /// Keys that are not listed are read from the field of the same name.
    translations: &'static [(MetadataKey, Translation)],
}

impl Schema {
    fn translation(&self, key: MetadataKey) -> Option<Translation> {
        self.translations
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, translation)| *translation)
    }
}

/// Metadata declared for flinx itself, overriding every other source.
pub(crate) static FLINX: Schema = Schema {
    name: "flinx",
    table_path: "tool.flinx.metadata",
    translations: &[],
};

pub(crate) static FLIT: Schema = Schema {
    name: "flit",
    table_path: "tool.flit.metadata",
    translations: &[
        (
            MetadataKey::Name,
            Translation::Fallbacks(&["dist-name", "module"]),
        ),
        (
            MetadataKey::Readme,
            Translation::Fallbacks(&["description-file", "readme"]),
        ),
    ],
};

pub(crate) static POETRY: Schema = Schema {
    name: "poetry",
    table_path: "tool.poetry",
    translations: &[(MetadataKey::Author, Translation::Computed(poetry_author))],
};

/// Declared schemas, in override order.
pub(crate) static SCHEMAS: [&Schema; 3] = [&FLINX, &FLIT, &POETRY];

/// Join names as prose: `A`, `A and B`, `A, B and C`.
fn join_names(names: &[&str]) -> Option<String> {
    match names {
        [] => None,
        [only] => Some((*only).to_string()),
        [init @ .., last] => Some(format!("{} and {last}", init.join(", "))),
    }
}

/// Poetry lists authors as `"Name <email>"` strings. Entries with only an email
/// contribute no name.
fn poetry_author(metadata: &Table) -> Option<String> {
    let authors = metadata.get("authors")?.as_array()?;
    let names = authors
        .iter()
        .filter_map(Value::as_str)
        .map(|author| author.split_once('<').map_or(author, |(name, _)| name).trim())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>();
    join_names(&names)
}

/// Only scalar values are usable as metadata.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(_) | Value::Array(_) | Value::Table(_) => None,
    }
}

/// Reads metadata from one schema's table in `pyproject.toml`.
///
/// A missing document or table is not an error: the provider is empty and every lookup
/// misses.
#[derive(Debug)]
pub(crate) struct SchemaProvider {
    schema: &'static Schema,
    metadata: Table,
}

impl SchemaProvider {
    pub(crate) fn from_document(schema: &'static Schema, document: &Table) -> Self {
        let metadata = table_at(document, schema.table_path)
            .cloned()
            .unwrap_or_else(|| {
                trace!(schema = schema.name, "No `{}` table", schema.table_path);
                Table::new()
            });
        Self { schema, metadata }
    }

    pub(crate) fn from_path(
        schema: &'static Schema,
        path: &Path,
    ) -> Result<Self, pyproject::Error> {
        match pyproject::read_document(path)? {
            Some(document) => Ok(Self::from_document(schema, &document)),
            None => Ok(Self {
                schema,
                metadata: Table::new(),
            }),
        }
    }

    fn field(&self, name: &str) -> Option<String> {
        self.metadata.get(name).and_then(scalar)
    }
}

impl MetadataProvider for SchemaProvider {
    fn source(&self) -> &str {
        self.schema.name
    }

    fn lookup(&self, key: MetadataKey) -> Result<Option<String>, Error> {
        let value = match self.schema.translation(key) {
            None => self.field(key.as_ref()),
            Some(Translation::Field(name)) => self.field(name),
            Some(Translation::Fallbacks(names)) => names.iter().find_map(|name| self.field(name)),
            Some(Translation::Computed(compute)) => compute(&self.metadata),
        };
        Ok(value)
    }
}
