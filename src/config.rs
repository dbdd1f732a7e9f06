//! Runtime configuration. Precedence: environment > YAML file (`SAT_CONFIG`) > defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::ImportOptions;
use crate::error::ConfigError;

pub const DEFAULT_DATA_DIR: &str = "data/catalogs";
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const ENV_CONFIG_FILE: &str = "SAT_CONFIG";
pub const ENV_DATA_DIR: &str = "SAT_DATA_DIR";
pub const ENV_LOG: &str = "SAT_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_filter: String,
    pub import: ImportOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            import: ImportOptions::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    log: Option<String>,
    import: Option<ImportOptions>,
}

/// Raw override values, as read from the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config_file: Option<String>,
    pub data_dir: Option<String>,
    pub log_filter: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            config_file: var(ENV_CONFIG_FILE),
            data_dir: var(ENV_DATA_DIR),
            log_filter: var(ENV_LOG),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_overrides(Overrides::from_env())
    }

    pub fn from_overrides(overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = overrides.config_file.as_deref() {
            let file = read_file_config(Path::new(path))?;
            if let Some(dir) = file.data_dir {
                config.data_dir = dir;
            }
            if let Some(log) = file.log {
                config.log_filter = log;
            }
            if let Some(import) = file.import {
                config.import = import;
            }
        }
        if let Some(dir) = overrides.data_dir {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(log) = overrides.log_filter {
            config.log_filter = log;
        }

        if config.import.start_row == 0 {
            return Err(ConfigError::Invalid(
                "import.start_row is 1-based and must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn write_temp_config(name: &str, body: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = env::temp_dir().join(format!("sat-config-{name}-{stamp}.yaml"));
        fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn defaults_without_overrides() {
        let config = Config::from_overrides(Overrides::default()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_dir, PathBuf::from("data/catalogs"));
        assert_eq!(config.import.start_row, 2);
    }

    #[test]
    fn file_values_apply_and_env_wins() {
        let path = write_temp_config(
            "layered",
            "data_dir: /srv/sat\nlog: debug\nimport:\n  sheet_index: 1\n  start_row: 5\n",
        );
        let from_file = Config::from_overrides(Overrides {
            config_file: Some(path.display().to_string()),
            ..Overrides::default()
        })
        .unwrap();
        assert_eq!(from_file.data_dir, PathBuf::from("/srv/sat"));
        assert_eq!(from_file.log_filter, "debug");
        assert_eq!(from_file.import.sheet_index, 1);
        assert_eq!(from_file.import.start_row, 5);

        let layered = Config::from_overrides(Overrides {
            config_file: Some(path.display().to_string()),
            data_dir: Some("/tmp/other".to_string()),
            log_filter: Some("warn".to_string()),
        })
        .unwrap();
        assert_eq!(layered.data_dir, PathBuf::from("/tmp/other"));
        assert_eq!(layered.log_filter, "warn");
        assert_eq!(layered.import.start_row, 5);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_import_section_keeps_default_start_row() {
        let path = write_temp_config("partial", "import:\n  sheet_index: 2\n");
        let config = Config::from_overrides(Overrides {
            config_file: Some(path.display().to_string()),
            ..Overrides::default()
        })
        .unwrap();
        assert_eq!(config.import.sheet_index, 2);
        assert_eq!(config.import.start_row, 2);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn bad_files_are_reported() {
        let missing = Config::from_overrides(Overrides {
            config_file: Some("/definitely/not/here.yaml".to_string()),
            ..Overrides::default()
        });
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        let path = write_temp_config("zero", "import:\n  start_row: 0\n");
        let zero = Config::from_overrides(Overrides {
            config_file: Some(path.display().to_string()),
            ..Overrides::default()
        });
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));
        let _ = fs::remove_file(path);
    }
}
