pub mod env_vars;

pub const PYPROJECT_TOML: &str = "pyproject.toml";
pub const INIT_PY: &str = "__init__.py";

pub const DOCS_DIR: &str = "docs";
pub const BUILD_DIR: &str = "_build";
pub const CONF_PY: &str = "conf.py";
pub const INDEX_RST: &str = "index.rst";
pub const MASTER_BASENAME: &str = "index";

/// README names recognized by metadata inference, in tie-break order.
pub static README_FILENAMES: &[&str] = &["README.rst", "README.md"];

/// Dotted path of the Sphinx configuration table inside `pyproject.toml`.
pub const SPHINX_CONFIGURATION_PATH: &str = "tool.flinx.configuration";

/// Marker line written into generated files. Files without it are never overwritten
/// implicitly.
pub const GENERATED_MARKER: &str =
    "THIS FILE IS AUTOMATICALLY GENERATED BY FLINX. MANUAL CHANGES WILL BE LOST.";
