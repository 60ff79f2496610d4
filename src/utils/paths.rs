use dirs::home_dir;
use std::{env, path::PathBuf};

const HOME_ENV: &str = "LEDGER_CORE_HOME";
const DEFAULT_DIR_NAME: &str = ".ledger_core";
const DATA_DIR: &str = "data";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.ledger_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding the persisted ledger collections.
pub fn ledger_data_dir() -> PathBuf {
    data_dir_in(&app_data_dir())
}

pub fn data_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(DATA_DIR)
}

pub fn config_file_in(base: &std::path::Path) -> PathBuf {
    base.join(CONFIG_FILE)
}
