use macroquad::prelude::Color;
use serde::Deserialize;

use crate::error::MapError;

/// Options applied while loading a map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Object group used by [`Map::collides_point`](crate::Map::collides_point)
    /// and [`Map::collides_rect`](crate::Map::collides_rect).
    pub collision_group: String,
    /// Treat cells beyond a layer's `width * height` as a payload error
    /// instead of dropping them.
    pub strict_layer_size: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            collision_group: "collisionmap".to_owned(),
            strict_layer_size: false,
        }
    }
}

impl LoadOptions {
    /// Parses options from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options for [`Composer`](crate::Composer).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Extra tiles composed on every side of the camera window.
    pub cull_margin_tiles: u32,
    /// Whole-map composition skips layers with `visible="0"`.
    pub skip_hidden_layers: bool,
    /// RGBA fill used by the object-group debug overlay.
    pub debug_object_rgba: [u8; 4],
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            cull_margin_tiles: 0,
            skip_hidden_layers: true,
            debug_object_rgba: [0, 0, 0, 255],
        }
    }
}

impl ComposerConfig {
    /// Parses a config from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn debug_object_color(&self) -> Color {
        let [r, g, b, a] = self.debug_object_rgba;
        Color::from_rgba(r, g, b, a)
    }
}
