use std::time::Duration;

use serde::Deserialize;

use crate::geometry::Color;

const DEFAULT_REDRAW_DELAY_MS: u64 = 6;
const DEFAULT_BRUSH_RADIUS: f32 = 3.0;

/// Host-tunable knobs for the editor surface.
///
/// Everything has a sensible default; hosts that carry a settings file can
/// deserialize this from JSON and pass it to `EditorSurface::with_config`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Delay before a coalesced overlay repaint fires, in milliseconds.
    pub redraw_delay_ms: u64,
    /// Initial brush color as `[r, g, b]`.
    pub brush_color: [u8; 3],
    /// Initial brush stroke radius in canvas pixels.
    pub brush_radius: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            redraw_delay_ms: DEFAULT_REDRAW_DELAY_MS,
            brush_color: [255, 255, 255],
            brush_radius: DEFAULT_BRUSH_RADIUS,
        }
    }
}

impl EditorConfig {
    pub fn redraw_delay(&self) -> Duration {
        Duration::from_millis(self.redraw_delay_ms)
    }

    pub fn brush_color(&self) -> Color {
        let [r, g, b] = self.brush_color;
        Color::new(r, g, b)
    }

    /// Parse a config from JSON, falling back to defaults on malformed input.
    pub fn from_json(contents: &str) -> Self {
        serde_json::from_str(contents).unwrap_or_else(|err| {
            tracing::warn!(?err, "failed to parse editor config; using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_constants() {
        let config = EditorConfig::default();
        assert_eq!(config.redraw_delay(), Duration::from_millis(6));
        assert_eq!(config.brush_color(), Color::new(255, 255, 255));
        assert_eq!(config.brush_radius, DEFAULT_BRUSH_RADIUS);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = EditorConfig::from_json(r#"{"redraw_delay_ms": 12}"#);
        assert_eq!(config.redraw_delay(), Duration::from_millis(12));
        assert_eq!(config.brush_radius, DEFAULT_BRUSH_RADIUS);
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        let config = EditorConfig::from_json("not json");
        assert_eq!(config.redraw_delay_ms, DEFAULT_REDRAW_DELAY_MS);
    }
}
