//! Store configuration, loaded from YAML.
//!
//! ```yaml
//! strict_paths: false
//! project_keys:
//!   - win.loc
//!   - default.dir
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;


#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot parse config: {0}")]
    Invalid(#[source] serde_yaml::Error),
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Return `InvalidPath` from `execute` instead of ignoring the set.
    #[serde(default)]
    pub strict_paths: bool,
    /// Top-level keys that survive a project clear.
    #[serde(default = "default_project_keys")]
    pub project_keys: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        default_config()
    }
}


/// Window placement and working directory survive a project reset.
pub fn default_config() -> StoreConfig {
    StoreConfig {
        strict_paths: false,
        project_keys: default_project_keys(),
    }
}

fn default_project_keys() -> Vec<String> {
    vec!["win.loc".into(), "default.dir".into()]
}


/// Load `StoreConfig` from a YAML file.
pub fn load(path: &Path) -> Result<StoreConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(default_config());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}


/// Parse `StoreConfig` from a YAML string. An empty document yields the
/// defaults.
pub fn parse(content: &str) -> Result<StoreConfig, ConfigError> {
    if content.trim().is_empty() {
        return Ok(default_config());
    }
    serde_yaml::from_str(content).map_err(ConfigError::Invalid)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_default() {
        assert_eq!(parse("").unwrap(), default_config());
    }

    #[test]
    fn partial_fills_defaults() {
        let cfg = parse("strict_paths: true\n").unwrap();
        assert!(cfg.strict_paths);
        assert_eq!(cfg.project_keys, vec!["win.loc", "default.dir"]);
    }

    #[test]
    fn custom_project_keys() {
        let cfg = parse("project_keys:\n  - win.loc\n  - theme\n").unwrap();
        assert_eq!(cfg.project_keys, vec!["win.loc", "theme"]);
        assert!(!cfg.strict_paths);
    }

    #[test]
    fn unknown_field_rejected() {
        let err = parse("strict: true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().starts_with("cannot parse config"));
    }

    #[test]
    fn load_missing_file() {
        let err = load(Path::new("/nonexistent/paramstore.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
