//! Settings loaded from `.xpocommit.toml`.
//!
//! ```toml
//! [xpocommit-ai]
//! ignoredFiles = ["*.lock", "dist/**"]
//! model = "gemini-2.5-flash"
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::ignore::IgnoreMatcher;

/// Settings file looked up at the work tree root.
pub const CONFIG_FILE_NAME: &str = ".xpocommit.toml";

/// Environment variable pointing at a settings file.
pub const CONFIG_ENV_VAR: &str = "XPOCOMMIT_CONFIG";

/// Namespaced table holding all settings.
pub const CONFIG_NAMESPACE: &str = "xpocommit-ai";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Glob patterns for files to leave out of the diff.
    #[serde(default)]
    pub ignored_files: Vec<String>,
    /// Model name for the message service.
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL for the message service.
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(rename = "xpocommit-ai", default)]
    settings: Settings,
}

impl Settings {
    /// Load settings.
    ///
    /// Lookup order: `explicit`, then `XPOCOMMIT_CONFIG`, then
    /// `.xpocommit.toml` in `root`. Only the implicit file may be absent.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        if let Some(path) = named {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            return Self::from_file(&path);
        }

        let implicit = root.join(CONFIG_FILE_NAME);
        if implicit.is_file() {
            Self::from_file(&implicit)
        } else {
            debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Loaded {} ignore pattern(s) from {}",
            settings.ignored_files.len(),
            path.display()
        );
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.settings)
    }

    /// Append extra patterns after the configured ones.
    pub fn with_extra_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_files
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn matcher(&self) -> IgnoreMatcher {
        IgnoreMatcher::compile(&self.ignored_files)
    }
}

/// Read a timeout in whole seconds from `var`.
///
/// Unset or empty falls back to `default`; an unparsable value is logged and
/// also falls back.
pub fn timeout_from_env(var: &str, default: Duration) -> Duration {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => match v.trim().parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    var,
                    v,
                    default.as_secs()
                );
                default
            }
        },
        _ => default,
    }
}
