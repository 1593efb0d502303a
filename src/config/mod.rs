// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for photosift

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Directory the bucket folders are created in
    #[serde(default = "default_output_root")]
    pub output_root: String,

    /// Thresholds used when the command line omits them
    #[serde(default)]
    pub defaults: ThresholdDefaults,

    /// Folder naming settings
    #[serde(default)]
    pub naming: NamingConfig,

    /// Run journal settings
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ThresholdDefaults {
    #[serde(default)]
    pub sharpness: f64,
    #[serde(default)]
    pub contrast: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NamingConfig {
    /// chrono format string for the age boundary in folder names
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_history_path")]
    pub path: String,
}

// Default value functions
fn default_output_root() -> String { ".".to_string() }
fn default_date_format() -> String { "%Y-%m-%dT%H-%M-%S".to_string() }
fn default_true() -> bool { true }
fn default_history_path() -> String { "photosift_history.jsonl".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            defaults: ThresholdDefaults::default(),
            naming: NamingConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for ThresholdDefaults {
    fn default() -> Self {
        Self {
            sharpness: 0.0,
            contrast: 0.0,
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_history_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::SiftError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would break folder naming
    pub fn validate(&self) -> crate::Result<()> {
        if !self.defaults.sharpness.is_finite() || !self.defaults.contrast.is_finite() {
            return Err(crate::SiftError::Config(
                "default thresholds must be finite numbers".to_string(),
            ));
        }
        if self.naming.date_format.trim().is_empty() {
            return Err(crate::SiftError::Config("naming.date_format is empty".to_string()));
        }
        let broken = chrono::format::StrftimeItems::new(&self.naming.date_format)
            .any(|item| matches!(item, chrono::format::Item::Error));
        if broken {
            return Err(crate::SiftError::Config(format!(
                "naming.date_format '{}' is not a valid strftime format",
                self.naming.date_format
            )));
        }
        // Specifiers such as %D render separators the format string never shows
        let mut sample = String::new();
        let epoch = chrono::NaiveDateTime::default();
        let rendered = write!(sample, "{}", epoch.format(&self.naming.date_format));
        if rendered.is_err() || sample.contains(['/', '\\']) {
            return Err(crate::SiftError::Config(format!(
                "naming.date_format '{}' must not render path separators",
                self.naming.date_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.output_root, ".");
        assert_eq!(config.naming.date_format, "%Y-%m-%dT%H-%M-%S");
        assert!(config.history.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photosift.json");
        std::fs::write(&path, r#"{ "output_root": "sorted", "defaults": { "sharpness": 4.5 } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.output_root, "sorted");
        assert_eq!(config.defaults.sharpness, 4.5);
        assert_eq!(config.defaults.contrast, 0.0);
        assert_eq!(config.history.path, "photosift_history.jsonl");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photosift.json");
        let mut config = AppConfig::default();
        config.defaults.contrast = 30.0;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.defaults.contrast, 30.0);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photosift.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(AppConfig::load(&path), Err(crate::SiftError::Config(_))));
    }

    #[test]
    fn test_date_format_with_separator_rejected() {
        let mut config = AppConfig::default();
        config.naming.date_format = "%Y/%m/%d".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_date_format_rendering_separator_rejected() {
        let mut config = AppConfig::default();
        for format in ["%D", "%x", "%F %R"] {
            config.naming.date_format = format.to_string();
            let rejected = config.validate().is_err();
            assert_eq!(rejected, format != "%F %R", "{}", format);
        }
    }
}
