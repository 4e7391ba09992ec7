use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Viewer configuration, loaded from a TOML file.
#[derive(Debug, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub asset: AssetConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default = "default_lights")]
    pub lights: Vec<DirectionalLightConfig>,
    #[serde(default)]
    pub ambient: AmbientConfig,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            asset: AssetConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lights: default_lights(),
            ambient: AmbientConfig::default(),
            background: BackgroundConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

fn default_width() -> usize {
    1280
}
fn default_height() -> usize {
    720
}
fn default_title() -> String {
    "OBJ Viewer".to_string()
}

/// The model asset: a material library and a geometry file paired by
/// basename under one directory (`<dir>/<name>.mtl`, `<dir>/<name>.obj`).
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "default_asset_dir")]
    pub dir: String,
    #[serde(default = "default_asset_name")]
    pub name: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: default_asset_dir(),
            name: default_asset_name(),
        }
    }
}

impl AssetConfig {
    pub fn mtl_path(&self) -> PathBuf {
        Path::new(&self.dir).join(format!("{}.mtl", self.name))
    }

    pub fn obj_path(&self) -> PathBuf {
        Path::new(&self.dir).join(format!("{}.obj", self.name))
    }
}

fn default_asset_dir() -> String {
    "assets".to_string()
}
fn default_asset_name() -> String {
    "model".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    #[serde(default = "default_camera_up")]
    pub up: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: [0.0, 0.0, 0.0],
            up: default_camera_up(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 300.0, 300.0]
}
fn default_camera_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_fov() -> f32 {
    60.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    2000.0
}

/// Orbit-control behavior. Clamp ranges are in degrees; a range whose min
/// exceeds its max disables that clamp.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "default_damping")]
    pub damping: f32,
    #[serde(default = "default_sensitivity")]
    pub orbit_sensitivity: f32,
    #[serde(default = "default_sensitivity")]
    pub dolly_sensitivity: f32,
    #[serde(default = "default_polar_min")]
    pub polar_min_deg: f32,
    #[serde(default = "default_polar_max")]
    pub polar_max_deg: f32,
    #[serde(default)]
    pub azimuth_min_deg: f32,
    #[serde(default)]
    pub azimuth_max_deg: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            orbit_sensitivity: default_sensitivity(),
            dolly_sensitivity: default_sensitivity(),
            polar_min_deg: default_polar_min(),
            polar_max_deg: default_polar_max(),
            azimuth_min_deg: 0.0,
            azimuth_max_deg: 0.0,
        }
    }
}

fn default_damping() -> f32 {
    0.1
}
fn default_sensitivity() -> f32 {
    1.0
}
fn default_polar_min() -> f32 {
    90.0
}
fn default_polar_max() -> f32 {
    160.0
}

#[derive(Debug, Deserialize)]
pub struct DirectionalLightConfig {
    pub direction: [f32; 3],
    #[serde(default = "default_light_color")]
    pub color: [f32; 3],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

fn default_lights() -> Vec<DirectionalLightConfig> {
    vec![DirectionalLightConfig {
        direction: [-0.6, -0.8, -0.4],
        color: default_light_color(),
        intensity: default_intensity(),
    }]
}

fn default_light_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_intensity() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct AmbientConfig {
    #[serde(default = "default_ambient_color")]
    pub color: [f32; 3],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: default_ambient_color(),
            intensity: default_intensity(),
        }
    }
}

fn default_ambient_color() -> [f32; 3] {
    // 0x888888
    [0.533, 0.533, 0.533]
}

#[derive(Debug, Deserialize)]
pub struct BackgroundConfig {
    #[serde(default = "default_background_color")]
    pub color: [f32; 3],
    pub gradient_top: Option<[f32; 3]>,
    pub gradient_bottom: Option<[f32; 3]>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            color: default_background_color(),
            gradient_top: Some([0.2, 0.2, 0.3]),
            gradient_bottom: Some([0.05, 0.05, 0.1]),
        }
    }
}

fn default_background_color() -> [f32; 3] {
    [0.1, 0.1, 0.1]
}

/// Headless-mode output location.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_output_name")]
    pub name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            name: default_output_name(),
        }
    }
}

fn default_output_dir() -> String {
    "output".to_string()
}
fn default_output_name() -> String {
    "render".to_string()
}
