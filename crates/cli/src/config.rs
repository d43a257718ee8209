use anyhow::{Context, Result};
use eventscope_runtime_config::{apply_compat_fallbacks, EventscopeConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "EVENTSCOPE_CONFIG";

/// Get the config directory path (~/.config/eventscope/)
pub fn config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".config").join("eventscope"))
}

/// Config file path, honoring `EVENTSCOPE_CONFIG` when set.
pub fn config_path() -> Result<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join(CONFIG_FILE_NAME)),
    }
}

fn read_config_doc(path: &Path) -> Result<EventscopeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config = toml::from_str::<EventscopeConfig>(&content)
        .with_context(|| format!("Failed to parse config at {}", path.display()))?;
    Ok(config)
}

/// Load the effective config. A missing file yields the defaults.
pub fn load_config() -> Result<EventscopeConfig> {
    let path = config_path()?;
    let mut config = if path.exists() {
        debug!(path = %path.display(), "loading config");
        read_config_doc(&path)?
    } else {
        EventscopeConfig::default()
    };

    if apply_compat_fallbacks(&mut config) {
        warn!(path = %path.display(), "config contained unusable values; using fallbacks");
    }
    Ok(config)
}

/// Print the effective config as TOML.
pub fn show_config() -> Result<()> {
    let path = config_path()?;
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config).context("Failed to serialize config")?;

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, showing defaults)", path.display());
    }
    print!("{rendered}");
    Ok(())
}
