//! Viewer configuration loading

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::fixture::CoolingPalette;
use crate::layout::FloorPlanLayout;
use crate::scene::Rgb;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Parse `#rrggbb`, `rrggbb` or `0xrrggbb`
pub fn parse_hex_color(s: &str) -> Result<Rgb, ConfigError> {
    let trimmed = s.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    if hex.len() != 6 {
        return Err(ConfigError::InvalidColor(s.to_string()));
    }
    u32::from_str_radix(hex, 16)
        .map(Rgb::from_hex)
        .map_err(|_| ConfigError::InvalidColor(s.to_string()))
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_hex_color(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// Initial near plane; replaced once the plan is framed
    #[serde(default = "default_near")]
    pub near: f32,
    /// Initial far plane; replaced once the plan is framed
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_camera_target")]
    pub target: [f32; 3],
    /// Orbit speed multiplier for pointer drags
    #[serde(default = "default_speed")]
    pub rotate_speed: f32,
    /// Zoom speed multiplier for scroll notches
    #[serde(default = "default_speed")]
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
            target: default_camera_target(),
            rotate_speed: default_speed(),
            zoom_speed: default_speed(),
        }
    }
}

fn default_fov() -> f32 {
    45.0
}

fn default_near() -> f32 {
    0.01
}

fn default_far() -> f32 {
    7500.0
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 100.0, 200.0]
}

fn default_camera_target() -> [f32; 3] {
    [0.0, 5.0, 0.0]
}

fn default_speed() -> f32 {
    1.0
}

impl CameraConfig {
    pub fn to_camera(&self) -> PerspectiveCamera {
        PerspectiveCamera {
            fov_y_degrees: self.fov,
            near: self.near,
            far: self.far,
            position: Vec3::from_array(self.position),
            target: Vec3::from_array(self.target),
            ..PerspectiveCamera::default()
        }
    }

    pub fn to_controls(&self) -> OrbitControls {
        OrbitControls::new(Vec3::from_array(self.target), self.rotate_speed, self.zoom_speed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Floor-plan model
    #[serde(default = "default_floor_plan")]
    pub floor_plan: String,
    /// Material library for loaders that keep materials apart from the mesh
    #[serde(default = "default_floor_plan_materials")]
    pub floor_plan_materials: String,
    /// Snowflake model, instanced once per A/C unit and once for the master
    #[serde(default = "default_snowflake")]
    pub snowflake: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            floor_plan: default_floor_plan(),
            floor_plan_materials: default_floor_plan_materials(),
            snowflake: default_snowflake(),
        }
    }
}

fn default_floor_plan() -> String {
    "model/flatplan.glb".to_string()
}

fn default_floor_plan_materials() -> String {
    "model/flatplan.mtl".to_string()
}

fn default_snowflake() -> String {
    "model/snowflake.glb".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(default = "default_background")]
    pub background: Rgb,
    #[serde(default = "default_cooling_neutral")]
    pub cooling_neutral: Rgb,
    #[serde(default = "default_cooling_active")]
    pub cooling_active: Rgb,
    #[serde(default = "default_lamp_glow")]
    pub lamp_glow: Rgb,
    #[serde(default = "default_outline")]
    pub outline: Rgb,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            cooling_neutral: default_cooling_neutral(),
            cooling_active: default_cooling_active(),
            lamp_glow: default_lamp_glow(),
            outline: default_outline(),
        }
    }
}

fn default_background() -> Rgb {
    crate::layout::BACKGROUND
}

fn default_cooling_neutral() -> Rgb {
    CoolingPalette::default().neutral
}

fn default_cooling_active() -> Rgb {
    CoolingPalette::default().active
}

fn default_lamp_glow() -> Rgb {
    crate::effect::GLOW_COLOR
}

fn default_outline() -> Rgb {
    crate::effect::OUTLINE_COLOR
}

impl ColorsConfig {
    pub fn palette(&self) -> CoolingPalette {
        CoolingPalette {
            neutral: self.cooling_neutral,
            active: self.cooling_active,
        }
    }

    /// Recolor lamp glows and hover outlines
    pub fn apply(&self, layout: &mut FloorPlanLayout) {
        for lamp in &mut layout.lamps {
            lamp.effect.color = self.lamp_glow;
            lamp.outline.color = self.outline;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Pointer moves forgiven between press and release before the gesture
    /// counts as a drag
    #[serde(default = "default_drag_tolerance")]
    pub drag_tolerance: u32,
    /// Opacity of a lit ceiling zone
    #[serde(default = "default_ceiling_on_opacity")]
    pub ceiling_on_opacity: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_tolerance: default_drag_tolerance(),
            ceiling_on_opacity: default_ceiling_on_opacity(),
        }
    }
}

fn default_drag_tolerance() -> u32 {
    1
}

fn default_ceiling_on_opacity() -> f32 {
    0.25
}

impl ViewerConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load configuration from file, falling back to defaults when it is missing
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = ViewerConfig::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ViewerConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = ViewerConfig::default().to_toml()?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#5050ff").unwrap(), Rgb(0x5050ff));
        assert_eq!(parse_hex_color("0xF0F0F0").unwrap(), Rgb(0xf0f0f0));
        assert_eq!(parse_hex_color(" ffff99 ").unwrap(), Rgb(0xffff99));
        assert!(matches!(parse_hex_color("#fff"), Err(ConfigError::InvalidColor(_))));
        assert!(matches!(parse_hex_color("#gggggg"), Err(ConfigError::InvalidColor(_))));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r##"
[camera]
fov = 60.0

[colors]
cooling_active = "#00ff00"

[interaction]
drag_tolerance = 3
"##;

        let config = ViewerConfig::from_toml(toml).unwrap();
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.camera.position, [0.0, 100.0, 200.0]);
        assert_eq!(config.colors.cooling_active, Rgb(0x00ff00));
        assert_eq!(config.colors.cooling_neutral, Rgb(0xf0f0f0));
        assert_eq!(config.interaction.drag_tolerance, 3);
        assert_eq!(config.interaction.ceiling_on_opacity, 0.25);
        assert_eq!(config.assets.snowflake, "model/snowflake.glb");

        let camera = config.camera.to_camera();
        assert_eq!(camera.fov_y_degrees, 60.0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_camera_section_builds_controls() {
        let toml = r##"
[camera]
target = [10.0, 0.0, -5.0]
rotate_speed = 0.5
zoom_speed = 2.0
"##;
        let config = ViewerConfig::from_toml(toml).unwrap();
        let controls = config.camera.to_controls();
        assert_eq!(controls.target, Vec3::new(10.0, 0.0, -5.0));
        assert_eq!(controls.rotate_speed, 0.5);
        assert_eq!(controls.zoom_speed, 2.0);
        assert_eq!(controls.max_distance, f32::INFINITY);

        let mut camera = config.camera.to_camera();
        let mut controls = controls;
        controls.update(&mut camera);
        assert_eq!(camera.target, controls.target);
    }

    #[test]
    fn test_bad_color_rejected() {
        let toml = r##"
[colors]
background = "not-a-color"
"##;
        assert!(matches!(ViewerConfig::from_toml(toml), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.interaction.drag_tolerance, 1);
        assert_eq!(config.colors.background, Rgb(0xf0f0f0));
    }

    #[test]
    fn test_saved_defaults_load_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flatplan.toml");
        save_default_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"#5050ff\""));

        let config = load_config(&path).unwrap();
        assert_eq!(config.colors.palette(), CoolingPalette::default());
        assert_eq!(config.assets.floor_plan, "model/flatplan.glb");
    }

    #[test]
    fn test_colors_apply_to_lamps() {
        let mut layout = FloorPlanLayout::apartment();
        let colors = ColorsConfig {
            lamp_glow: Rgb(0x123456),
            ..ColorsConfig::default()
        };
        colors.apply(&mut layout);
        assert!(layout.lamps.iter().all(|l| l.effect.color == Rgb(0x123456)));
    }
}
