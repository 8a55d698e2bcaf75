//! Host configuration for file-backed boards.
//!
//! # Responsibility
//! - Describe where board data and logs live, and at which level to log.
//! - Load overrides from an optional `stickynote.json` in the data directory.
//!
//! # Invariants
//! - Validated configs always hold absolute directories and a known level.

use crate::logging::{default_log_level, level_name, parse_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File name of the optional per-board config file.
pub const CONFIG_FILE_NAME: &str = "stickynote.json";

/// Configuration validation/loading error.
#[derive(Debug)]
pub enum ConfigError {
    /// Directory value is empty or not absolute.
    InvalidDirectory { field: &'static str, value: String },
    /// Log level outside `trace|debug|info|warn|error`.
    InvalidLogLevel(String),
    /// Config file exists but cannot be read.
    Read { path: PathBuf, source: std::io::Error },
    /// Config file exists but is not valid JSON for this shape.
    Parse { path: PathBuf, source: serde_json::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory { field, value } => {
                write!(f, "`{field}` must be an absolute directory, got `{value}`")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidDirectory { .. } | Self::InvalidLogLevel(_) => None,
        }
    }
}

/// Board host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    /// Directory holding one file per persisted key.
    pub data_dir: PathBuf,
    /// Directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_dir: None,
            log_level: level_name(default_log_level()),
        }
    }
}

impl BoardConfig {
    /// Builds a config for `data_dir`, merged with `stickynote.json` inside
    /// it when that file exists. `data_dir` always wins over the file value.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let path = data_dir.join(CONFIG_FILE_NAME);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<BoardConfig>(&raw)
                .map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BoardConfig::default(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        config.data_dir = data_dir;
        Ok(config)
    }

    /// Checks directories and level, normalizing the level in place.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        check_dir("data_dir", &self.data_dir)?;
        if let Some(log_dir) = &self.log_dir {
            check_dir("log_dir", log_dir)?;
        }
        let level = parse_level(&self.log_level)
            .map_err(|err| ConfigError::InvalidLogLevel(err.to_string()))?;
        self.log_level = level_name(level);
        Ok(())
    }
}

fn check_dir(field: &'static str, dir: &Path) -> Result<(), ConfigError> {
    if dir.as_os_str().is_empty() || !dir.is_absolute() {
        return Err(ConfigError::InvalidDirectory {
            field,
            value: dir.display().to_string(),
        });
    }
    Ok(())
}

fn default_data_dir() -> PathBuf {
    std::env::temp_dir().join("stickynote")
}

#[cfg(test)]
mod tests {
    use super::{BoardConfig, ConfigError, CONFIG_FILE_NAME};

    #[test]
    fn missing_config_file_yields_defaults_for_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = BoardConfig::load(dir.path()).unwrap();
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn config_file_overrides_level_and_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let body = serde_json::json!({
            "log_level": "WARNING",
            "log_dir": log_dir,
        });
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), body.to_string()).unwrap();

        let mut config = BoardConfig::load(dir.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some(log_dir.as_path()));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"colour":"red"}"#).unwrap();
        let err = BoardConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validate_rejects_relative_dirs_and_bad_levels() {
        let mut config = BoardConfig {
            data_dir: "relative/board".into(),
            ..BoardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDirectory { field: "data_dir", .. })
        ));

        let mut config = BoardConfig {
            log_level: "loud".to_string(),
            ..BoardConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLogLevel(_))));
    }
}
