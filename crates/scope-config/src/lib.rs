mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Returns the config directory: <platform config dir>/scope-tracker/
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("scope-tracker");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the config file path: <platform config dir>/scope-tracker/config.toml
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from the default location, or return defaults if not found.
///
/// The second value is `true` when the file existed.
pub fn load_config() -> Result<(AppConfig, bool)> {
    load_config_from(&config_path()?)
}

/// Load and validate config from `path`, or return defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<(AppConfig, bool)> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        info!(?path, "Loaded config");
        Ok((config, true))
    } else {
        info!(?path, "No config found, using defaults");
        Ok((AppConfig::default(), false))
    }
}

/// Save config to the default location.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

/// Save config to `path`.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    info!(?path, "Saved config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scope-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = scratch_path("does-not-exist.toml");
        let (config, existed) = load_config_from(&path).unwrap();
        assert!(!existed);
        assert_eq!(config.telemetry.port, 5005);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = scratch_path("saved.toml");
        let mut config = AppConfig::default();
        config.trail.capacity = 42;
        config.egress.url = "http://example.invalid:9000/api/main/view".into();
        save_config_to(&path, &config).unwrap();

        let (loaded, existed) = load_config_from(&path).unwrap();
        assert!(existed);
        assert_eq!(loaded.trail.capacity, 42);
        assert_eq!(loaded.egress.url, config.egress.url);
    }

    #[test]
    fn invalid_file_is_rejected() {
        let path = scratch_path("invalid.toml");
        std::fs::write(&path, "[trail]\ncapacity = 0\n").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
