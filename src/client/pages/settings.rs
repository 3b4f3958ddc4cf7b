use std::path::PathBuf;

use url::Url;

use crate::client::utils::settings_store::{self, Settings, Theme};

#[derive(Debug)]
pub struct SettingsPage {
    pub settings: Settings,
    pub path: PathBuf,
    pub error: Option<String>,
}

impl SettingsPage {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self { settings: settings_store::load_settings(&path), path, error: None }
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.settings.theme = self.settings.theme.toggled();
        self.settings.theme
    }

    pub fn set_notifications(&mut self, enabled: bool) {
        self.settings.notifications = enabled;
    }

    /// Accepts only absolute http(s) URLs.
    pub fn set_api_base_url(&mut self, raw: &str) -> bool {
        match Url::parse(raw.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                self.settings.api_base_url = url.to_string();
                self.error = None;
                true
            }
            _ => {
                self.error = Some(format!("Invalid API base URL: {}", raw));
                false
            }
        }
    }

    /// Deletes the settings file and falls back to defaults.
    pub fn reset(&mut self) -> bool {
        match settings_store::clear_settings(&self.path) {
            Ok(()) => {
                self.settings = Settings::default();
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(format!("Failed to reset settings: {}", e));
                false
            }
        }
    }

    pub fn save(&mut self) -> bool {
        match settings_store::save_settings(&self.path, &self.settings) {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(format!("Failed to save settings: {}", e));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_persist_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut page = SettingsPage::load(&path);
        assert_eq!(page.theme(), Theme::Light);
        assert_eq!(page.toggle_theme(), Theme::Dark);
        page.set_notifications(false);
        assert!(page.set_api_base_url("http://192.168.1.20:5000/api"));
        assert!(page.save());

        let reloaded = SettingsPage::load(&path);
        assert_eq!(reloaded.theme(), Theme::Dark);
        assert!(!reloaded.settings.notifications);
        assert_eq!(reloaded.settings.api_base_url, "http://192.168.1.20:5000/api");
    }

    #[test]
    fn reset_forgets_saved_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut page = SettingsPage::load(&path);
        page.toggle_theme();
        assert!(page.save());
        assert!(page.reset());
        assert_eq!(page.settings, Settings::default());
        assert!(!path.exists());
        assert_eq!(SettingsPage::load(&path).theme(), Theme::Light);
        // nothing to delete the second time
        assert!(page.reset());
    }

    #[test]
    fn rejects_non_http_urls() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = SettingsPage::load(dir.path().join("s.json"));
        assert!(!page.set_api_base_url("ftp://example.com"));
        assert!(!page.set_api_base_url("localhost:5000"));
        assert!(page.error.is_some());
    }
}
