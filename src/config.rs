//! Viewer options with documented defaults and a pure override merge.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::scene::ColorSpace;

/// 0xRRGGBB to linear-ish 0..1 components
pub fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    /// Vertical field of view, degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Fixed start position instead of the computed fit
    pub position: Option<[f32; 3]>,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            position: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingOptions {
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub directional_color: u32,
    pub directional_intensity: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient_color: 0xffffff,
            ambient_intensity: 2.0,
            directional_color: 0xffffff,
            directional_intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsOptions {
    pub damping: bool,
    pub damping_factor: f32,
}

impl Default for ControlsOptions {
    fn default() -> Self {
        Self {
            damping: true,
            damping_factor: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    /// World units per frame
    pub speed: f32,
    /// Planar distance above which the running clip is used
    pub run_threshold: f32,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            speed: 0.2,
            run_threshold: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundOptions {
    pub color1: u32,
    pub color2: u32,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            color1: 0x2f3640,
            color2: 0x0c0e12,
        }
    }
}

pub const DEFAULT_PLUGINS: &[&str] = &[
    "Lighter",
    "Shaders.Background",
    "Helpers.Grid",
    "Helpers.Axes",
    "Helpers.Skeleton",
    "Helpers.ViewCube",
    "Effects.Selected.Outline",
];

/// Every recognised viewer option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Seconds without activity before drawing is suspended
    pub life_time: f32,
    pub camera: CameraOptions,
    pub texture_color_space: ColorSpace,
    pub output_color_space: ColorSpace,
    pub lights: LightingOptions,
    pub controls: ControlsOptions,
    pub walk: WalkOptions,
    pub background: Option<BackgroundOptions>,
    /// Built-in plugin names installed at construction
    pub plugins: Vec<String>,
    pub wireframe: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            life_time: 3.0,
            camera: CameraOptions::default(),
            texture_color_space: ColorSpace::Srgb,
            output_color_space: ColorSpace::Srgb,
            lights: LightingOptions::default(),
            controls: ControlsOptions::default(),
            walk: WalkOptions::default(),
            background: None,
            plugins: DEFAULT_PLUGINS.iter().map(|s| s.to_string()).collect(),
            wireframe: false,
        }
    }
}

// === Overrides ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOverrides {
    pub fov: Option<f32>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub position: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingOverrides {
    pub ambient_color: Option<u32>,
    pub ambient_intensity: Option<f32>,
    pub directional_color: Option<u32>,
    pub directional_intensity: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsOverrides {
    pub damping: Option<bool>,
    pub damping_factor: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkOverrides {
    pub speed: Option<f32>,
    pub run_threshold: Option<f32>,
}

/// Partial options; `None` keeps the base value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOverrides {
    pub life_time: Option<f32>,
    pub camera: Option<CameraOverrides>,
    pub texture_color_space: Option<ColorSpace>,
    pub output_color_space: Option<ColorSpace>,
    pub lights: Option<LightingOverrides>,
    pub controls: Option<ControlsOverrides>,
    pub walk: Option<WalkOverrides>,
    pub background: Option<BackgroundOptions>,
    pub plugins: Option<Vec<String>>,
    pub wireframe: Option<bool>,
}

fn pick<T: Clone>(base: &T, over: &Option<T>) -> T {
    over.as_ref().unwrap_or(base).clone()
}

impl CameraOptions {
    pub fn merge(&self, o: &CameraOverrides) -> Self {
        Self {
            fov: pick(&self.fov, &o.fov),
            near: pick(&self.near, &o.near),
            far: pick(&self.far, &o.far),
            position: o.position.or(self.position),
        }
    }
}

impl LightingOptions {
    pub fn merge(&self, o: &LightingOverrides) -> Self {
        Self {
            ambient_color: pick(&self.ambient_color, &o.ambient_color),
            ambient_intensity: pick(&self.ambient_intensity, &o.ambient_intensity),
            directional_color: pick(&self.directional_color, &o.directional_color),
            directional_intensity: pick(&self.directional_intensity, &o.directional_intensity),
        }
    }
}

impl ControlsOptions {
    pub fn merge(&self, o: &ControlsOverrides) -> Self {
        Self {
            damping: pick(&self.damping, &o.damping),
            damping_factor: pick(&self.damping_factor, &o.damping_factor),
        }
    }
}

impl WalkOptions {
    pub fn merge(&self, o: &WalkOverrides) -> Self {
        Self {
            speed: pick(&self.speed, &o.speed),
            run_threshold: pick(&self.run_threshold, &o.run_threshold),
        }
    }
}

impl ViewerOptions {
    /// Field-wise override; nested groups merge by the same rule
    pub fn merge(&self, o: &ViewerOverrides) -> Self {
        Self {
            life_time: pick(&self.life_time, &o.life_time),
            camera: o.camera.as_ref().map_or_else(|| self.camera.clone(), |c| self.camera.merge(c)),
            texture_color_space: pick(&self.texture_color_space, &o.texture_color_space),
            output_color_space: pick(&self.output_color_space, &o.output_color_space),
            lights: o.lights.as_ref().map_or_else(|| self.lights.clone(), |l| self.lights.merge(l)),
            controls: o
                .controls
                .as_ref()
                .map_or_else(|| self.controls.clone(), |c| self.controls.merge(c)),
            walk: o.walk.as_ref().map_or_else(|| self.walk.clone(), |w| self.walk.merge(w)),
            background: o.background.or(self.background),
            plugins: pick(&self.plugins, &o.plugins),
            wireframe: pick(&self.wireframe, &o.wireframe),
        }
    }

    /// Partial JSON document over the defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let overrides: ViewerOverrides = serde_json::from_str(json)?;
        let options = Self::default().merge(&overrides);
        options.validate()?;
        Ok(options)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ViewerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.life_time > 0.0) {
            return Err(ViewerError::Config(format!("life_time must be positive, got {}", self.life_time)));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(ViewerError::Config(format!(
                "camera clipping range {}..{} is invalid",
                self.camera.near, self.camera.far
            )));
        }
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(ViewerError::Config(format!("camera fov {} out of range", self.camera.fov)));
        }
        if !(self.walk.speed > 0.0) {
            return Err(ViewerError::Config("walk speed must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = ViewerOptions::default();
        assert_eq!(options.life_time, 3.0);
        assert_eq!(options.camera.fov, 75.0);
        assert_eq!(options.camera.near, 0.1);
        assert_eq!(options.camera.far, 1000.0);
        assert_eq!(options.camera.position, None);
        assert_eq!(options.lights.ambient_intensity, 2.0);
        assert_eq!(options.walk.run_threshold, 10.0);
        assert!(options.plugins.iter().any(|p| p == "Helpers.Grid"));
    }

    #[test]
    fn merge_overrides_only_given_fields() {
        let base = ViewerOptions::default();
        let merged = base.merge(&ViewerOverrides {
            life_time: Some(1.0),
            camera: Some(CameraOverrides {
                fov: Some(50.0),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(merged.life_time, 1.0);
        assert_eq!(merged.camera.fov, 50.0);
        assert_eq!(merged.camera.near, base.camera.near);
        assert_eq!(merged.lights, base.lights);
        // Base is untouched
        assert_eq!(base.life_time, 3.0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let options = ViewerOptions::from_json_str(
            r#"{ "life_time": 5, "camera": { "position": [1, 2, 3] }, "plugins": ["Helpers.Axes"] }"#,
        )
        .unwrap();
        assert_eq!(options.life_time, 5.0);
        assert_eq!(options.camera.position, Some([1.0, 2.0, 3.0]));
        assert_eq!(options.camera.fov, 75.0);
        assert_eq!(options.plugins, vec!["Helpers.Axes".to_string()]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ViewerOptions::from_json_str(r#"{ "life_time": 0 }"#),
            Err(ViewerError::Config(_))
        ));
        assert!(matches!(
            ViewerOptions::from_json_str("{ not json"),
            Err(ViewerError::ConfigParse(_))
        ));
    }

    #[test]
    fn hex_colors_unpack() {
        assert_eq!(rgb(0xff0000), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(rgb(0x000000), Vec3::ZERO);
    }
}
