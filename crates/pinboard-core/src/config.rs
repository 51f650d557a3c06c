//! Canvas configuration.

use serde::{Deserialize, Serialize};

/// Storage slot holding the serialized element list.
pub const DEFAULT_STORAGE_KEY: &str = "canvasElements";

/// Canvas and persistence settings.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Background color as a hex string.
    pub background: String,
    /// New shapes are placed in `[0, spawn_extent)` on both axes.
    pub spawn_extent: f64,
    /// Key of the durable slot holding the element list.
    pub storage_key: String,
    pub default_radius: f64,
    pub default_rect_size: f64,
    pub default_font_size: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            background: "#f3f3f3".to_string(),
            spawn_extent: 400.0,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_radius: 50.0,
            default_rect_size: 100.0,
            default_font_size: 40.0,
        }
    }
}

impl CanvasConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.width, 500);
        assert_eq!(config.height, 500);
        assert_eq!(config.storage_key, "canvasElements");
        assert_eq!(config.spawn_extent, 400.0);
    }

    #[test]
    fn test_partial_json() {
        let config = CanvasConfig::from_json(r#"{"width": 800, "storage_key": "board"}"#).unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 500);
        assert_eq!(config.storage_key, "board");
    }

    #[test]
    fn test_json_roundtrip() {
        let config = CanvasConfig {
            spawn_extent: 250.0,
            ..Default::default()
        };
        let parsed = CanvasConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
