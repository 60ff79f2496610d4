use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::core::errors::LedgerError;
use crate::core::services::limit_service::Threshold;
use crate::utils::{fs as ledger_fs, paths};

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const TR_MONTHS: [&str; 12] = [
    "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül", "Ekim",
    "Kasım", "Aralık",
];

/// Language used for human readable report labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportLocale {
    #[default]
    En,
    Tr,
}

impl ReportLocale {
    /// Full month name for a 1-based month number.
    pub fn month_name(self, month: u32) -> &'static str {
        let names = match self {
            ReportLocale::En => &EN_MONTHS,
            ReportLocale::Tr => &TR_MONTHS,
        };
        let index = month.clamp(1, 12) as usize - 1;
        names[index]
    }
}

impl fmt::Display for ReportLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ReportLocale::En => "en",
            ReportLocale::Tr => "tr",
        };
        f.write_str(tag)
    }
}

/// User preferences that influence reporting and storage location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerConfig {
    #[serde(default)]
    pub locale: ReportLocale,
    #[serde(default = "LedgerConfig::default_warning_threshold")]
    pub warning_threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            locale: ReportLocale::default(),
            warning_threshold: Self::default_warning_threshold(),
            data_dir: None,
        }
    }
}

impl LedgerConfig {
    pub fn default_warning_threshold() -> f64 {
        Threshold::DEFAULT.percent()
    }

    /// Limit warning threshold, falling back to the default for unusable values.
    pub fn threshold(&self) -> Threshold {
        Threshold::new(self.warning_threshold).unwrap_or_default()
    }

    /// Directory for the persisted collections; defaults under the app data dir.
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(paths::ledger_data_dir)
    }
}

/// Loads and saves [`LedgerConfig`] as `config.json` under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        fs::create_dir_all(&base).map_err(config_io)?;
        Ok(Self {
            path: paths::config_file_in(&base),
        })
    }

    /// Returns the stored configuration, or defaults when none was saved yet.
    pub fn load(&self) -> Result<LedgerConfig, LedgerError> {
        if !self.path.exists() {
            return Ok(LedgerConfig::default());
        }
        let data = fs::read_to_string(&self.path).map_err(config_io)?;
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Config(format!("`{}` is not valid: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &LedgerConfig) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| LedgerError::Config(err.to_string()))?;
        ledger_fs::replace_atomic(&self.path, &json).map_err(config_io)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn config_io(err: std::io::Error) -> LedgerError {
    LedgerError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.threshold(), Threshold::DEFAULT);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = LedgerConfig {
            locale: ReportLocale::Tr,
            warning_threshold: 90.0,
            data_dir: Some(temp.path().join("ledger")),
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn corrupt_file_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "{ nope").unwrap();
        assert!(matches!(manager.load(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn unusable_threshold_falls_back_to_default() {
        let config = LedgerConfig {
            warning_threshold: -5.0,
            ..LedgerConfig::default()
        };
        assert_eq!(config.threshold(), Threshold::DEFAULT);
    }

    #[test]
    fn month_names_follow_locale() {
        assert_eq!(ReportLocale::En.month_name(2), "February");
        assert_eq!(ReportLocale::Tr.month_name(8), "Ağustos");
    }
}
