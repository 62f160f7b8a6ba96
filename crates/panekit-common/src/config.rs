//! Toolkit configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;
use crate::{PaneKitError, Result};

/// Top-level configuration, usually loaded once at application start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneKitConfig {
    /// Style engine settings
    pub style: StyleConfig,

    /// Dirty-region compositor settings
    pub compositor: CompositorConfig,

    /// Paint retry policy on graphics device loss
    pub retry: RetryConfig,

    /// Optional `tracing` filter directive
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Share one render rule between a pseudo mask and the mask of the
    /// pseudo-classes that actually contributed to it
    pub alias_pseudo_states: bool,

    /// Font family used when no rule names one
    pub default_font_family: String,

    /// Font size in pixels used when no rule sets one
    pub default_font_size: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Regions with more rectangles than this collapse to their bounding box
    pub max_region_rects: usize,

    /// Skip the sibling-overlap scan under parents whose children never overlap
    pub honor_non_overlap: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            alias_pseudo_states: true,
            default_font_family: "Segoe UI".to_string(),
            default_font_size: 12,
        }
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            max_region_rects: 16,
            honor_non_overlap: true,
        }
    }
}

impl PaneKitConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PaneKitError::config_with_source("invalid configuration", e))
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PaneKitError::config_with_source("unserializable configuration", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PaneKitConfig::default();
        assert!(config.style.alias_pseudo_states);
        assert_eq!(config.compositor.max_region_rects, 16);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PaneKitConfig::from_json_str(
            r#"{ "style": { "alias_pseudo_states": false }, "retry": { "max_attempts": 5 } }"#,
        )
        .unwrap();
        assert!(!config.style.alias_pseudo_states);
        assert_eq!(config.style.default_font_size, 12);
        assert_eq!(config.retry.max_attempts, 5);
        assert!(config.compositor.honor_non_overlap);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = PaneKitConfig::from_json_str("{ style: ").unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = PaneKitConfig::default();
        config.log_filter = Some("panekit_css=debug".into());
        let json = config.to_json_string().unwrap();
        assert_eq!(PaneKitConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("panekit-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "compositor": { "max_region_rects": 8 } }"#).unwrap();
        let config = PaneKitConfig::from_json_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.compositor.max_region_rects, 8);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PaneKitConfig::from_json_file("/nonexistent/panekit/config.json").unwrap_err();
        assert!(matches!(err, PaneKitError::Io(_)));
    }
}
