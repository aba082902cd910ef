use std::ffi::{OsStr, OsString};

use tracing::info;

pub struct EnvVars;

impl EnvVars {
    pub const PATH: &'static str = "PATH";
    pub const HOME: &'static str = "HOME";

    // Git related
    pub const GIT_CONFIG_GLOBAL: &'static str = "GIT_CONFIG_GLOBAL";
    pub const GIT_CONFIG_NOSYSTEM: &'static str = "GIT_CONFIG_NOSYSTEM";

    // FLINX specific environment variables, public for users
    pub const FLINX_COLOR: &'static str = "FLINX_COLOR";
    pub const FLINX_SPHINX_BUILD: &'static str = "FLINX_SPHINX_BUILD";
    pub const FLINX_SPHINX_AUTOBUILD: &'static str = "FLINX_SPHINX_AUTOBUILD";
    pub const FLINX_NO_OPEN: &'static str = "FLINX_NO_OPEN";
}

impl EnvVars {
    // Sphinx reads this when no builder override is present.
    pub const SPHINXBUILD: &'static str = "SPHINXBUILD";
}

impl EnvVars {
    /// Read an environment variable. For `FLINX_SPHINX_BUILD`, fall back to the `SPHINXBUILD`
    /// variable that Sphinx's own Makefiles honor.
    pub fn var_os(name: &str) -> Option<OsString> {
        #[allow(clippy::disallowed_methods)]
        std::env::var_os(name).or_else(|| {
            let fallback = Self::sphinx_name(name)?;
            let val = std::env::var_os(fallback)?;
            info!("Falling back to Sphinx environment variable {fallback}");
            Some(val)
        })
    }

    /// Whether a flag variable such as `FLINX_NO_OPEN` is set.
    ///
    /// Any value turns the flag on except an explicit false-like one (`0`, `false`, `no`,
    /// `off`).
    pub fn is_set(name: &str) -> bool {
        Self::is_flag_value(Self::var_os(name).as_deref())
    }

    fn is_flag_value(val: Option<&OsStr>) -> bool {
        match val {
            None => false,
            Some(val) => val.to_str().and_then(Self::parse_boolish) != Some(false),
        }
    }

    fn parse_boolish(val: &str) -> Option<bool> {
        match val.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    fn sphinx_name(name: &str) -> Option<&'static str> {
        match name {
            Self::FLINX_SPHINX_BUILD => Some(Self::SPHINXBUILD),
            _ => None,
        }
    }
}
