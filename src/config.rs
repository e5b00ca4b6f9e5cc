//! Configuration for the jbscript CLI
//!
//! Settings come from an optional `jbscript.toml`, then environment
//! overrides (`JBSCRIPT_STRICT`, `JBSCRIPT_LOG`), then command-line flags.
//!
//! ```toml
//! [analyzer]
//! strict = true
//!
//! [runtime]
//! log_level = "debug"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// File looked up in the working directory when no path is given
pub const CONFIG_FILE: &str = "jbscript.toml";

pub const STRICT_ENV: &str = "JBSCRIPT_STRICT";
pub const LOG_ENV: &str = "JBSCRIPT_LOG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Warnings fail `check` as well as errors
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// `tracing` filter directive, e.g. `info` or `jbscript=debug`
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Parses TOML text; `path` only labels errors
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reads a config file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Config::from_toml(&text, path)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// File settings with the process environment applied on top
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Config::load(path.unwrap_or_else(|| Path::new(CONFIG_FILE)))?;
        Ok(config.with_overrides(|name| std::env::var(name).ok()))
    }

    /// Applies environment-style overrides read through `lookup`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(STRICT_ENV) {
            self.analyzer.strict = is_enabled(&value);
        }
        if let Some(level) = lookup(LOG_ENV).filter(|level| !level.trim().is_empty()) {
            self.runtime.log_level = level;
        }
        self
    }
}

fn is_enabled(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.analyzer.strict);
        assert_eq!(config.runtime.log_level, "warn");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("[analyzer]\nstrict = true\n", Path::new("inline")).unwrap();
        assert!(config.analyzer.strict);
        assert_eq!(config.runtime.log_level, "warn");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[runtime]\nlog_level = \"debug\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.runtime.log_level, "debug");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let err = Config::from_toml("[analyzer]\nstrict = \"very\"\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = [(STRICT_ENV, "1"), (LOG_ENV, "trace")].into_iter().collect();
        let config = Config::default().with_overrides(|name| env.get(name).map(|v| v.to_string()));
        assert!(config.analyzer.strict);
        assert_eq!(config.runtime.log_level, "trace");

        let strict = Config::from_toml("[analyzer]\nstrict = true\n", Path::new("inline"))
            .unwrap()
            .with_overrides(|name| (name == STRICT_ENV).then(|| "false".to_string()));
        assert!(!strict.analyzer.strict);
    }
}
