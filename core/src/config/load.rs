use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::AppConfig;

/// Default tasktrack data directory: ~/.tasktrack
pub fn get_tasktrack_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tasktrack"))
}

pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Toml {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_default() -> Result<AppConfig, ConfigError> {
    // Priority 1: ~/.tasktrack/config.toml
    let home_config = get_tasktrack_data_dir().map(|dir| dir.join("config.toml"));

    // Priority 2: ./tasktrack.toml (current directory)
    let local_config = Path::new("tasktrack.toml");

    let mut cfg = match home_config.filter(|p| p.exists()) {
        Some(path) => load_from_path(&path)?,
        None if local_config.exists() => load_from_path(local_config)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

/// Environment variable overrides (highest priority).
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, get: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = get("TASKTRACK_APP_ID").filter(|v| !v.trim().is_empty()) {
        cfg.app_id = v;
    }

    if let Some(v) = get("TASKTRACK_WINDOW_SIZE").filter(|v| !v.trim().is_empty()) {
        let size = v
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidValue {
                key: "TASKTRACK_WINDOW_SIZE",
                value: v.clone(),
            })?;
        cfg.indexing.window_size = size;
    }

    if let Some(v) = get("TASKTRACK_LOG").filter(|v| !v.trim().is_empty()) {
        cfg.logging.level = v;
    }

    Ok(())
}
