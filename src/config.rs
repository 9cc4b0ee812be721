use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Bumped whenever stored fields change meaning; older files are reset to defaults.
pub const CONFIG_VERSION: u32 = 1;

/// Application preferences stored in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub version: u32,
    /// Whether the overlay should be running. Restored on launch.
    #[serde(default)]
    pub is_enabled: bool,
    /// Blinder fill as 0xRRGGBB
    #[serde(default)]
    pub blinder_color: u32,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            is_enabled: false,
            blinder_color: 0x000000,
            debug_logging: false,
        }
    }
}

pub fn config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("SurfaceBlinder").join("config.json")
}

pub fn load_config() -> AppConfig {
    load_from(&config_path())
}

pub fn save_config(config: &AppConfig) {
    if let Err(err) = save_to(&config_path(), config) {
        tracing::warn!(error = %err, "failed to save config");
    }
}

/// Read preferences from `path`. Missing, unreadable or outdated files yield defaults;
/// an outdated file is rewritten with the defaults.
pub fn load_from(path: &Path) -> AppConfig {
    if !path.exists() {
        return AppConfig::default();
    }
    let data = fs::read_to_string(path).unwrap_or_default();
    let config: AppConfig = match serde_json::from_str(&data) {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "config unreadable, using defaults");
            return AppConfig::default();
        }
    };
    if config.version != CONFIG_VERSION {
        tracing::info!(
            found = config.version,
            expected = CONFIG_VERSION,
            "config version mismatch, resetting"
        );
        let fresh = AppConfig::default();
        if let Err(err) = save_to(path, &fresh) {
            tracing::warn!(error = %err, "failed to rewrite config");
        }
        return fresh;
    }
    config
}

pub fn save_to(path: &Path, config: &AppConfig) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(config)?;
    fs::write(path, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = load_from(&dir.path().join("config.json"));
        assert_eq!(cfg, AppConfig::default());
        assert!(!cfg.is_enabled);
    }

    #[test]
    fn saved_preferences_are_loaded_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = AppConfig {
            is_enabled: true,
            blinder_color: 0x101010,
            ..AppConfig::default()
        };
        save_to(&path, &cfg).unwrap();
        assert_eq!(load_from(&path), cfg);
    }

    #[test]
    fn outdated_version_is_reset_and_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"version":0,"is_enabled":true,"blinder_color":255}"#).unwrap();

        let cfg = load_from(&path);
        assert_eq!(cfg, AppConfig::default());

        let stored: AppConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored.version, CONFIG_VERSION);
        assert!(!stored.is_enabled);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(load_from(&path), AppConfig::default());
    }
}
