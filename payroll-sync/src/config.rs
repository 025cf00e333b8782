//! Pipeline configuration.
//!
//! ```text
//! ~/.payroll/
//!   config.yaml                     (optional overrides)
//!   hr/employees.yaml               (roster)
//!   shared-data/payroll_export.json (exchange channel)
//!   shared-data/accounting_export.json
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_EXPORT_SOURCE: &str = "HR System";

pub const CHANNEL_FILE: &str = "payroll_export.json";
pub const ACCOUNTING_FILE: &str = "accounting_export.json";

pub fn payroll_root(home: &Path) -> PathBuf {
    home.join(".payroll")
}

pub fn config_path_at(home: &Path) -> PathBuf {
    payroll_root(home).join("config.yaml")
}

pub fn shared_data_dir(home: &Path) -> PathBuf {
    payroll_root(home).join("shared-data")
}

/// Everything the pipeline components need, passed explicitly at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub roster_path: PathBuf,
    pub channel_path: PathBuf,
    pub accounting_path: Option<PathBuf>,
    pub export_source: String,
    pub debounce: Duration,
    pub extract_timeout: Duration,
}

/// Optional `config.yaml`; every field overrides the default when present.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    roster_path: Option<PathBuf>,
    channel_path: Option<PathBuf>,
    accounting_path: Option<PathBuf>,
    export_source: Option<String>,
    debounce_ms: Option<u64>,
    extract_timeout_ms: Option<u64>,
}

impl PipelineConfig {
    /// Default layout rooted at `home`.
    pub fn defaults_at(home: &Path) -> Self {
        Self {
            roster_path: payroll_core::roster::roster_path_at(home),
            channel_path: shared_data_dir(home).join(CHANNEL_FILE),
            accounting_path: Some(shared_data_dir(home).join(ACCOUNTING_FILE)),
            export_source: DEFAULT_EXPORT_SOURCE.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            extract_timeout: DEFAULT_EXTRACT_TIMEOUT,
        }
    }

    /// Defaults overlaid with `<home>/.payroll/config.yaml` if it exists.
    pub fn load_at(home: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::defaults_at(home);
        let path = config_path_at(home);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(config),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        };

        if let Some(roster_path) = file.roster_path {
            config.roster_path = roster_path;
        }
        if let Some(channel_path) = file.channel_path {
            config.channel_path = channel_path;
        }
        if let Some(accounting_path) = file.accounting_path {
            config.accounting_path = Some(accounting_path);
        }
        if let Some(export_source) = file.export_source {
            config.export_source = export_source;
        }
        if let Some(ms) = file.debounce_ms {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = file.extract_timeout_ms {
            config.extract_timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }

    /// [`PipelineConfig::load_at`] for the current user's home directory.
    pub fn load() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Self::load_at(&home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_live_under_dot_payroll() {
        let config = PipelineConfig::defaults_at(Path::new("/home/test"));
        assert_eq!(
            config.channel_path,
            PathBuf::from("/home/test/.payroll/shared-data/payroll_export.json")
        );
        assert_eq!(
            config.roster_path,
            PathBuf::from("/home/test/.payroll/hr/employees.yaml")
        );
        assert_eq!(config.debounce, Duration::from_millis(1000));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let home = TempDir::new().unwrap();
        let config = PipelineConfig::load_at(home.path()).expect("load");
        assert_eq!(config, PipelineConfig::defaults_at(home.path()));
    }

    #[test]
    fn config_file_overrides_fields() {
        let home = TempDir::new().unwrap();
        let path = config_path_at(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "export_source: XAMPP HR System\ndebounce_ms: 250\nchannel_path: /srv/exchange/payroll.json\n",
        )
        .unwrap();

        let config = PipelineConfig::load_at(home.path()).expect("load");
        assert_eq!(config.export_source, "XAMPP HR System");
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.channel_path, PathBuf::from("/srv/exchange/payroll.json"));
        assert_eq!(config.extract_timeout, DEFAULT_EXTRACT_TIMEOUT);
    }

    #[test]
    fn malformed_config_names_the_path() {
        let home = TempDir::new().unwrap();
        let path = config_path_at(home.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "debounce_ms: [not, a, number]\n").unwrap();

        let err = PipelineConfig::load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("config.yaml"));
    }
}
