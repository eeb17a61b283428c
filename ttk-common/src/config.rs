//! Configuration loading and data directory resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TTK_DATA_DIR";

/// Data directory resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`data_dir` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_dir(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_dir) = config.get("data_dir").and_then(|v| v.as_str()) {
                    return PathBuf::from(data_dir);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_dir()
}

/// Source endpoints listed in the config file (`links` array), if any
pub fn configured_links() -> Vec<String> {
    let Ok(config_path) = find_config_file() else {
        return Vec::new();
    };
    let Ok(toml_content) = std::fs::read_to_string(&config_path) else {
        return Vec::new();
    };
    let Ok(config) = toml::from_str::<toml::Value>(&toml_content) else {
        return Vec::new();
    };

    config
        .get("links")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Get configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tendertrack").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tendertrack/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tendertrack"))
        .unwrap_or_else(|| PathBuf::from("./tendertrack_data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_arg_wins_over_env() {
        std::env::set_var(DATA_DIR_ENV, "/tmp/from-env");
        let dir = resolve_data_dir(Some("/tmp/from-cli"));
        assert_eq!(dir, PathBuf::from("/tmp/from-cli"));
        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    #[serial]
    fn env_used_when_no_cli_arg() {
        std::env::set_var(DATA_DIR_ENV, "/tmp/from-env");
        let dir = resolve_data_dir(None);
        assert_eq!(dir, PathBuf::from("/tmp/from-env"));
        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    #[serial]
    fn falls_back_to_default() {
        std::env::remove_var(DATA_DIR_ENV);
        let dir = resolve_data_dir(None);
        // Platform default ends with the application directory name
        assert!(dir.ends_with("tendertrack") || dir.ends_with("tendertrack_data"));
    }
}
