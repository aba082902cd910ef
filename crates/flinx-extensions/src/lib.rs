//! Infer the Sphinx extensions a project needs.
//!
//! Users may list extensions by their short name (`autodoc`) or by a fully qualified
//! module path (`sphinxcontrib.mermaid`). Extensions are also implied by configuration
//! values: setting `napoleon_google_docstring` only makes sense with `sphinx.ext.napoleon`
//! enabled, so it is enabled automatically.

use std::borrow::Cow;
use std::collections::BTreeSet;

use phf::{phf_map, phf_set};

/// Module namespace of the extensions bundled with Sphinx.
pub const NAMESPACE: &str = "sphinx.ext";

/// Extensions enabled when the configuration does not list any.
pub static DEFAULT_EXTENSIONS: &[&str] = &["autodoc"];

/// Short names accepted as shortcuts for `sphinx.ext.<name>`.
pub static BUILTIN_EXTENSIONS: phf::Set<&'static str> = phf_set! {
    "autodoc",
    "autosectionlabel",
    "autosummary",
    "coverage",
    "doctest",
    "extlinks",
    "githubpages",
    "graphviz",
    "ifconfig",
    "imgconverter",
    "imgmath",
    "inheritance_diagram",
    "intersphinx",
    "jsmath",
    "linkcode",
    "mathjax",
    "napoleon",
    "todo",
    "viewcode",
};

/// Configuration prefixes that don't share the name of the extension they configure.
///
/// `image_converter` belongs to `imgconverter` (there is no `image` extension),
/// `autoclass_content` to `autodoc`, and so on.
pub static CONFIG_PREFIXES: phf::Map<&'static str, &'static str> = phf_map! {
    "autoclass" => "autodoc",
    "image" => "imgconverter",
    "inheritance" => "inheritance_diagram",
};

/// Returns `true` if `name` is the short name of an extension bundled with Sphinx.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_EXTENSIONS.contains(name)
}

/// Expand a short name to its `sphinx.ext.*` module. Other names are returned unchanged.
pub fn canonical_name(name: &str) -> Cow<'_, str> {
    if is_builtin(name) {
        Cow::Owned(format!("{NAMESPACE}.{name}"))
    } else {
        Cow::Borrowed(name)
    }
}

/// The prefix of a configuration key: everything before the first `_`.
///
/// Keys without an `_` have no prefix and imply no extension.
pub fn config_prefix(key: &str) -> Option<&str> {
    key.split_once('_').map(|(prefix, _)| prefix)
}

/// Builtin extensions implied by a set of configuration keys, sorted by short name.
pub fn implied_extensions<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    keys.into_iter()
        .filter_map(config_prefix)
        .map(|prefix| CONFIG_PREFIXES.get(prefix).copied().unwrap_or(prefix))
        .filter(|name| is_builtin(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|name| canonical_name(name).into_owned())
        .collect()
}

/// Resolve the full extension list.
///
/// `declared` is the user's `extensions` value, if any; `keys` are all configuration keys.
/// Declared extensions come first in their given order, followed by inferred builtin
/// extensions in alphabetical order. Duplicates are dropped.
pub fn resolve<'a>(
    declared: Option<&[&'a str]>,
    keys: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let declared = declared.unwrap_or(DEFAULT_EXTENSIONS);

    let mut extensions: Vec<String> = Vec::with_capacity(declared.len());
    for name in declared {
        let name = canonical_name(name);
        if !extensions.iter().any(|ext| *ext == name) {
            extensions.push(name.into_owned());
        }
    }

    for ext in implied_extensions(keys) {
        if !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }

    extensions
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn implied(key: &str) -> Vec<String> {
        resolve(Some(&[]), [key])
    }

    #[test]
    fn default_extensions() {
        assert_eq!(resolve(None, []), vec!["sphinx.ext.autodoc"]);
    }

    #[test]
    fn declared_names() {
        // Short names are expanded.
        assert_eq!(
            resolve(Some(&["inheritance_diagram"]), ["extensions"]),
            vec!["sphinx.ext.inheritance_diagram"]
        );
        // Everything else is copied verbatim.
        assert_eq!(
            resolve(Some(&["custom.ext", "todo"]), ["extensions"]),
            vec!["custom.ext", "sphinx.ext.todo"]
        );
        // Declaring an empty list disables the default.
        assert!(resolve(Some(&[]), ["extensions"]).is_empty());
    }

    #[test]
    fn declared_duplicates_are_dropped() {
        assert_eq!(
            resolve(
                Some(&["autodoc", "sphinx.ext.autodoc", "custom.ext", "custom.ext"]),
                []
            ),
            vec!["sphinx.ext.autodoc", "custom.ext"]
        );
    }

    #[test]
    fn inferred_from_prefix() {
        let cases = [
            ("autoclass_content", "sphinx.ext.autodoc"),
            ("autodoc_member_order", "sphinx.ext.autodoc"),
            ("autosectionlabel_prefix_document", "sphinx.ext.autosectionlabel"),
            ("autosummary_generate", "sphinx.ext.autosummary"),
            ("coverage_ignore_modules", "sphinx.ext.coverage"),
            ("doctest_path", "sphinx.ext.doctest"),
            ("graphviz_dot", "sphinx.ext.graphviz"),
            ("image_converter", "sphinx.ext.imgconverter"),
            ("inheritance_graph_attrs", "sphinx.ext.inheritance_diagram"),
            ("intersphinx_mapping", "sphinx.ext.intersphinx"),
            ("linkcode_resolve", "sphinx.ext.linkcode"),
            ("mathjax_options", "sphinx.ext.mathjax"),
            ("napoleon_google_docstring", "sphinx.ext.napoleon"),
            ("todo_include_todos", "sphinx.ext.todo"),
            ("viewcode_follow_imported_members", "sphinx.ext.viewcode"),
            ("extlinks_detect_hardcoded_links", "sphinx.ext.extlinks"),
        ];
        for (key, expected) in cases {
            assert_eq!(implied(key), vec![expected], "key `{key}`");
        }
    }

    #[test]
    fn inferred_without_declaration() {
        assert_eq!(
            resolve(None, ["autodoc_member_order"]),
            vec!["sphinx.ext.autodoc"]
        );
        assert_eq!(
            resolve(None, ["napoleon_numpy_docstring"]),
            vec!["sphinx.ext.autodoc", "sphinx.ext.napoleon"]
        );
    }

    #[test]
    fn unrelated_keys_imply_nothing() {
        assert!(implied("html_theme").is_empty());
        assert!(implied("extensions").is_empty());
        assert!(implied("project_name").is_empty());
    }

    #[test]
    fn keys_without_underscore_imply_nothing() {
        assert!(implied("extlinks").is_empty());
        assert_eq!(resolve(None, ["todo"]), vec!["sphinx.ext.autodoc"]);
        assert_eq!(resolve(None, ["extlinks"]), vec!["sphinx.ext.autodoc"]);
    }

    #[test]
    fn inferred_order_is_alphabetical() {
        let forward = resolve(
            Some(&["custom.ext"]),
            ["todo_include_todos", "intersphinx_mapping", "autodoc_typehints"],
        );
        let backward = resolve(
            Some(&["custom.ext"]),
            ["autodoc_typehints", "intersphinx_mapping", "todo_include_todos"],
        );
        assert_eq!(
            forward,
            vec![
                "custom.ext",
                "sphinx.ext.autodoc",
                "sphinx.ext.intersphinx",
                "sphinx.ext.todo",
            ]
        );
        assert_eq!(forward, backward);
    }

    #[test]
    fn inferred_extensions_are_not_repeated() {
        assert_eq!(
            resolve(
                Some(&["todo", "autodoc"]),
                ["todo_include_todos", "todo_link_only", "autoclass_content"]
            ),
            vec!["sphinx.ext.todo", "sphinx.ext.autodoc"]
        );
    }

    #[test]
    fn config_prefixes_map_to_builtins() {
        for (prefix, name) in &CONFIG_PREFIXES {
            assert!(is_builtin(name), "`{prefix}` maps to unknown extension `{name}`");
        }
    }

    #[test]
    fn prefix_of_key() {
        assert_eq!(config_prefix("autodoc_member_order"), Some("autodoc"));
        assert_eq!(config_prefix("extlinks"), None);
        assert_eq!(config_prefix("_private"), Some(""));
    }
}
