use std::path::Path;

use anyhow::Context;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::client::config::DEFAULT_API_BASE_URL;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub api_base_url: String,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            notifications: true,
        }
    }
}

/// Missing or unreadable settings fall back to the defaults.
pub fn load_settings(path: &Path) -> Settings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("No settings at {} ({}), using defaults", path.display(), e);
            return Settings::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Ignoring corrupt settings file {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create settings directory {}", parent.display()))?;
        }
    }
    let raw = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, raw).with_context(|| format!("failed to write settings to {}", path.display()))?;
    Ok(())
}

pub fn clear_settings(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        std::fs::remove_file(path).with_context(|| format!("failed to remove {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings { theme: Theme::Dark, api_base_url: "http://10.0.0.2:5000/api".into(), notifications: false };

        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);

        clear_settings(&path).unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn partial_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();
        let settings = load_settings(&path);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }
}
