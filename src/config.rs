//! Configuration management
//!
//! Loads and validates the YAML settings file (bank page sizes, button
//! timing, controller profile). Settings are read once at startup.

use crate::session::ControllerProfile;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Root settings structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSettings {
    #[serde(default)]
    pub bank: BankSettings,
    #[serde(default)]
    pub buttons: ButtonSettings,
    #[serde(default)]
    pub profile: ControllerProfile,
}

/// Bank window page sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSettings {
    #[serde(default = "default_num_tracks")]
    pub num_tracks: usize,
    #[serde(default = "default_num_scenes")]
    pub num_scenes: usize,
    #[serde(default = "default_num_sends")]
    pub num_sends: usize,
    /// Whether the surface has a scene-launch section.
    #[serde(default = "default_true")]
    pub scene_section: bool,
}

/// Button timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonSettings {
    /// Held this long, a press counts as LONG.
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
}

fn default_num_tracks() -> usize {
    8
}

fn default_num_scenes() -> usize {
    8
}

fn default_num_sends() -> usize {
    6
}

fn default_long_press_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl Default for BankSettings {
    fn default() -> Self {
        Self {
            num_tracks: default_num_tracks(),
            num_scenes: default_num_scenes(),
            num_sends: default_num_sends(),
            scene_section: true,
        }
    }
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            long_press_ms: default_long_press_ms(),
        }
    }
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            bank: BankSettings::default(),
            buttons: ButtonSettings::default(),
            profile: ControllerProfile::default(),
        }
    }
}

/// Validation failures for loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("bank track page size must be non-zero")]
    ZeroTrackPage,
    #[error("bank scene page size must be non-zero")]
    ZeroScenePage,
    #[error("long press threshold must be at least 50 ms, got {0}")]
    LongPressTooShort(u64),
}

impl SurfaceSettings {
    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        let settings: SurfaceSettings = serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse settings file '{}'", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!(
                "Settings file '{}' not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.bank.num_tracks == 0 {
            return Err(SettingsError::ZeroTrackPage);
        }
        if self.bank.num_scenes == 0 {
            return Err(SettingsError::ZeroScenePage);
        }
        if self.buttons.long_press_ms < 50 {
            return Err(SettingsError::LongPressTooShort(self.buttons.long_press_ms));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = SurfaceSettings::default();
        assert_eq!(settings.bank.num_tracks, 8);
        assert_eq!(settings.bank.num_scenes, 8);
        assert_eq!(settings.bank.num_sends, 6);
        assert!(settings.bank.scene_section);
        assert_eq!(settings.buttons.long_press_ms, 500);
        assert_eq!(settings.profile, ControllerProfile::Advanced);
    }

    #[test]
    fn test_load_partial_yaml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bank:\n  num_tracks: 16\nprofile: simple").unwrap();

        let settings = SurfaceSettings::load(file.path()).unwrap();
        assert_eq!(settings.bank.num_tracks, 16);
        assert_eq!(settings.bank.num_scenes, 8);
        assert_eq!(settings.profile, ControllerProfile::Simple);
    }

    #[test]
    fn test_round_trip() {
        let mut settings = SurfaceSettings::default();
        settings.buttons.long_press_ms = 750;
        settings.bank.scene_section = false;

        let yaml = serde_yaml::to_string(&settings).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let loaded = SurfaceSettings::load(file.path()).unwrap();
        assert_eq!(loaded.buttons.long_press_ms, 750);
        assert!(!loaded.bank.scene_section);
    }

    #[test]
    fn test_validation_rejects_zero_track_page() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bank:\n  num_tracks: 0").unwrap();
        assert!(SurfaceSettings::load(file.path()).is_err());
    }

    #[test]
    fn test_validation_rejects_tiny_long_press() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "buttons:\n  long_press_ms: 10").unwrap();
        assert!(SurfaceSettings::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = SurfaceSettings::load_or_default("/nonexistent/gridbank.yaml").unwrap();
        assert_eq!(settings.bank.num_tracks, 8);
    }
}
