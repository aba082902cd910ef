use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::cli::{ExitStatus, MetadataOutputFormat};
use crate::config::SphinxConfig;
use crate::metadata::{MetadataKey, ProjectMetadata};
use crate::printer::Printer;

#[derive(Serialize)]
struct SerializableMetadata {
    metadata: serde_json::Map<String, serde_json::Value>,
    extensions: Vec<String>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    errors: serde_json::Map<String, serde_json::Value>,
}

/// Show how each metadata key resolves for the project in `project_dir`.
///
/// Lookup errors and missing required keys make the command fail; optional keys may be
/// missing.
pub(crate) fn metadata(
    project_dir: &Path,
    keys: Vec<MetadataKey>,
    output_format: MetadataOutputFormat,
    printer: Printer,
) -> Result<ExitStatus> {
    let project = ProjectMetadata::from_dir(project_dir)?;
    let extensions = SphinxConfig::from_dir(project.project_dir())?.extensions()?;

    let show_extensions = keys.is_empty();
    let keys = if keys.is_empty() {
        MetadataKey::iter().collect()
    } else {
        keys
    };

    let mut status = ExitStatus::Success;
    let resolved: Vec<_> = keys
        .into_iter()
        .map(|key| {
            let value = project.lookup(key);
            match &value {
                Ok(None) if key.is_required() => status = ExitStatus::Failure,
                Err(_) => status = ExitStatus::Failure,
                Ok(_) => {}
            }
            (key, value)
        })
        .collect();

    match output_format {
        MetadataOutputFormat::Text => {
            let mut stdout = printer.stdout();
            for (key, value) in &resolved {
                let label = format!("{key}:");
                match value {
                    Ok(Some(value)) => writeln!(stdout, "{} {value}", label.bold())?,
                    Ok(None) => writeln!(stdout, "{} {}", label.bold(), "(missing)".dimmed())?,
                    Err(err) => writeln!(stdout, "{} {}", label.bold(), err.red())?,
                }
            }
            if show_extensions {
                writeln!(
                    stdout,
                    "{} {}",
                    "extensions:".bold(),
                    extensions.join(", ")
                )?;
            }
        }
        MetadataOutputFormat::Json => {
            let mut serializable = SerializableMetadata {
                metadata: serde_json::Map::new(),
                extensions,
                errors: serde_json::Map::new(),
            };
            for (key, value) in resolved {
                let value = match value {
                    Ok(value) => serde_json::Value::from(value),
                    Err(err) => {
                        serializable
                            .errors
                            .insert(key.to_string(), err.to_string().into());
                        serde_json::Value::Null
                    }
                };
                serializable.metadata.insert(key.to_string(), value);
            }
            let json_output = serde_json::to_string_pretty(&serializable)?;
            writeln!(printer.stdout(), "{json_output}")?;
        }
    }

    Ok(status)
}
