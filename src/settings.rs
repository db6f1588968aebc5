use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::eraser::Eraser;
use crate::error::SettingsError;
use crate::snap::SnapEngine;
use crate::stroke::Rgba;

const APP_DIR: &str = "PugNetPaint";
const SETTINGS_FILE: &str = "settings.json";

/// User preferences, saved as JSON.
///
/// Passed explicitly to whatever needs it; there is no global instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old settings
pub struct Settings {
    /// Unlocks experimental features.
    pub beta_mode_enabled: bool,
    /// Embed stroke history into exported PNG/JPEG files. Needs beta mode.
    pub experimental_history_export_enabled: bool,
    pub snap_enabled: bool,
    /// Endpoints closer than this (canvas units) get joined.
    pub snap_threshold: f64,
    pub brush_width: f64,
    pub brush_color: Rgba,
    /// Eraser radius in canvas units.
    pub eraser_radius: f64,
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            beta_mode_enabled: false,
            experimental_history_export_enabled: false,
            snap_enabled: true,
            snap_threshold: 8.0,
            brush_width: 2.0,
            brush_color: Rgba::BLUE,
            eraser_radius: 6.0,
            jpeg_quality: 95,
        }
    }
}

impl Settings {
    /// `$APPDATA/PugNetPaint/settings.json`, falling back to the XDG config
    /// directory. `None` if no home can be found.
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("APPDATA")
            .or_else(|| std::env::var_os("XDG_CONFIG_HOME"))
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Reads settings from `path`. A missing or unreadable file yields the
    /// defaults.
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings file at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Failed to read settings {}: {}", path.display(), err);
                return Self::default();
            }
        };

        serde_json::from_str(&json).unwrap_or_else(|err| {
            log::warn!("Failed to parse settings {}: {}", path.display(), err);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Turning beta mode off also turns off every experimental feature.
    pub fn set_beta_mode(&mut self, enabled: bool) {
        self.beta_mode_enabled = enabled;
        if !enabled {
            self.experimental_history_export_enabled = false;
        }
    }

    /// History export needs both beta mode and its own toggle.
    pub fn history_export_available(&self) -> bool {
        self.beta_mode_enabled && self.experimental_history_export_enabled
    }

    /// Snap distance in effect; zero when snapping is turned off.
    pub fn effective_snap_threshold(&self) -> f64 {
        if self.snap_enabled {
            self.snap_threshold.max(0.0)
        } else {
            0.0
        }
    }

    pub fn snap_engine(&self) -> SnapEngine {
        SnapEngine::new(self.effective_snap_threshold())
    }

    pub fn eraser(&self) -> Eraser {
        Eraser::new(self.eraser_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let settings = Settings {
            beta_mode_enabled: true,
            snap_threshold: 3.5,
            brush_color: Rgba::ORANGE,
            ..Settings::default()
        };
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn test_beta_off_disables_history_export() {
        let mut settings = Settings::default();
        settings.set_beta_mode(true);
        settings.experimental_history_export_enabled = true;
        assert!(settings.history_export_available());

        settings.set_beta_mode(false);
        assert!(!settings.experimental_history_export_enabled);

        // Re-enabling beta does not bring the feature back on its own.
        settings.set_beta_mode(true);
        assert!(!settings.history_export_available());
    }

    #[test]
    fn test_missing_or_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        assert_eq!(Settings::load(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "beta_mode_enabled": true }"#).unwrap();

        let settings = Settings::load(&path);
        assert!(settings.beta_mode_enabled);
        assert_eq!(settings.snap_threshold, 8.0);
    }

    #[test]
    fn test_feature_gates() {
        let mut settings = Settings::default();
        assert!(!settings.history_export_available());
        settings.experimental_history_export_enabled = true;
        assert!(!settings.history_export_available());
        settings.beta_mode_enabled = true;
        assert!(settings.history_export_available());

        assert_eq!(settings.effective_snap_threshold(), 8.0);
        settings.snap_enabled = false;
        assert_eq!(settings.snap_engine().threshold(), 0.0);
    }
}
