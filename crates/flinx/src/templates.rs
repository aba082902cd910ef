use std::collections::HashMap;
use std::fmt::Write;

use flinx_consts::{CONF_PY, INDEX_RST};
use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::config::ConfigEntry;

static CONF_PY_TEMPLATE: &str = include_str!("../templates/conf.py.tera");
static INDEX_RST_TEMPLATE: &str = include_str!("../templates/index.rst.tera");

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("Failed to load the built-in templates")]
    Load(#[source] tera::Error),

    #[error("Failed to render `{name}`")]
    Render {
        name: &'static str,
        #[source]
        error: tera::Error,
    },
}

/// Values for `conf.py`.
#[derive(Debug, Serialize)]
pub(crate) struct ConfContext<'a> {
    pub(crate) generated_text: Option<&'a str>,
    /// Path of the project root, relative to the configuration directory.
    pub(crate) module_path: &'a str,
    pub(crate) project: &'a str,
    pub(crate) copyright: String,
    pub(crate) author: &'a str,
    pub(crate) version: &'a str,
    pub(crate) source_suffix: &'a [&'a str],
    pub(crate) master_doc: &'a str,
    pub(crate) config: &'a [ConfigEntry],
}

/// Values for `index.rst`.
#[derive(Debug, Serialize)]
pub(crate) struct IndexContext<'a> {
    pub(crate) generated_text: Option<&'a str>,
    pub(crate) project: &'a str,
    pub(crate) title_rule: String,
    pub(crate) readme: Option<&'a str>,
    pub(crate) module: &'a str,
}

impl<'a> IndexContext<'a> {
    pub(crate) fn new(
        generated_text: Option<&'a str>,
        project: &'a str,
        readme: Option<&'a str>,
        module: &'a str,
    ) -> Self {
        Self {
            generated_text,
            project,
            title_rule: "=".repeat(project.chars().count()),
            readme,
            module,
        }
    }
}

/// The built-in documentation templates.
pub(crate) struct Templates {
    tera: Tera,
}

impl Templates {
    pub(crate) fn new() -> Result<Self, Error> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("repr", repr_filter);
        tera.register_filter("project_rel", project_rel_filter);
        tera.add_raw_templates(vec![
            (CONF_PY, CONF_PY_TEMPLATE),
            (INDEX_RST, INDEX_RST_TEMPLATE),
        ])
        .map_err(Error::Load)?;
        Ok(Self { tera })
    }

    fn render(&self, name: &'static str, context: &impl Serialize) -> Result<String, Error> {
        let context =
            Context::from_serialize(context).map_err(|error| Error::Render { name, error })?;
        self.tera
            .render(name, &context)
            .map_err(|error| Error::Render { name, error })
    }

    pub(crate) fn render_conf(&self, context: &ConfContext) -> Result<String, Error> {
        self.render(CONF_PY, context)
    }

    pub(crate) fn render_index(&self, context: &IndexContext) -> Result<String, Error> {
        self.render(INDEX_RST, context)
    }
}

fn repr_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let mut literal = String::new();
    python_literal(value, &mut literal);
    Ok(Value::String(literal))
}

fn project_rel_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let path = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("project_rel filter requires a string path"))?;
    Ok(Value::String(project_relative(path)))
}

/// Rewrite a path relative to the project root so that it resolves from the docs
/// directory, one level down.
pub(crate) fn project_relative(path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    let mut path = path;
    while let Some(rest) = path.strip_prefix("./") {
        path = rest.trim_start_matches('/');
    }
    if path.is_empty() || path == "." {
        "..".to_string()
    } else {
        format!("../{path}")
    }
}

/// Render a JSON value as the equivalent Python literal.
pub(crate) fn python_literal(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(number) => {
            let _ = write!(out, "{number}");
        }
        Value::String(s) => python_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                python_literal(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                python_string(key, out);
                out.push_str(": ");
                python_literal(item, out);
            }
            out.push('}');
        }
    }
}

/// Quote a string the way Python's `repr` does: single quotes unless the string contains
/// a single quote and no double quote.
fn python_string(s: &str, out: &mut String) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}
