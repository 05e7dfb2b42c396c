//! Scene configuration.
//!
//! Serde-backed so hosts can ship a JSON manifest next to their assets.
//! Defaults reproduce the reference grid: 45-degree camera five units back,
//! three columns, nine images drifting downward.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    /// Distance between the camera and the grid plane.
    pub z: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            z: 5.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    /// Grid columns; rows follow from the manifest length.
    pub columns: usize,
    /// Scroll smoothing factor, also the per-frame drift increment.
    pub scroll_ease: f32,
    /// Per-frame increment applied to the scroll target.
    pub scroll_speed: f32,
    /// Drift direction along y; -1 scrolls tiles downward.
    pub direction: f32,
    /// Extra vertical offset for middle-column tiles, for staggering.
    pub middle_column_offset: Option<f32>,
    /// Image paths, resolved through the configured `ImageSource`.
    pub images: Vec<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            columns: 3,
            scroll_ease: 0.05,
            scroll_speed: 0.02,
            direction: -1.0,
            middle_column_offset: None,
            images: (1..=9).map(|i| format!("images/{i}.webp")).collect(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_grid() {
        let config = SceneConfig::default();
        assert_eq!(config.columns, 3);
        assert_eq!(config.direction, -1.0);
        assert_eq!(config.images.len(), 9);
        assert_eq!(config.camera.fov_deg, 45.0);
        assert_eq!(config.camera.z, 5.0);
    }

    #[test]
    fn json_round_trips() {
        let mut config = SceneConfig::default();
        config.middle_column_offset = Some(1.2);
        config.images = vec!["a.png".into(), "b.png".into()];

        let json = config.to_json().unwrap();
        let back = SceneConfig::from_json(&json).unwrap();
        assert_eq!(back.middle_column_offset, Some(1.2));
        assert_eq!(back.images, config.images);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = SceneConfig::from_json(r#"{ "columns": 4 }"#).unwrap();
        assert_eq!(config.columns, 4);
        assert_eq!(config.scroll_ease, 0.05);
        assert_eq!(config.images.len(), 9);
    }
}
