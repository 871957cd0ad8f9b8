//! Render configuration, stored as RON

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::rasterizer::{Color, ImageProp, RasterSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Degrees
    pub yaw: f32,
    /// Degrees
    pub pitch: f32,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    /// World units per second
    pub move_speed: f32,
    /// Radians per pixel of mouse travel
    pub rotate_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            yaw: 0.0,
            pitch: 0.0,
            fov_deg: 60.0,
            near: 0.1,
            far: 100.0,
            move_speed: 3.0,
            rotate_speed: 0.005,
        }
    }
}

/// Largest width or height a window texture can take
pub const MAX_DIMENSION: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub raster: RasterSettings,
    pub swapchain_buffers: usize,
    pub clear_color: Color,
    pub camera: CameraConfig,
    /// OBJ file to draw; the built-in cube when unset
    pub mesh: Option<PathBuf>,
    /// Model rotation, radians per second
    pub spin_speed: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            raster: RasterSettings::default(),
            swapchain_buffers: 2,
            clear_color: Color::new(20, 22, 30),
            camera: CameraConfig::default(),
            mesh: None,
            spin_speed: 0.8,
        }
    }
}

impl RenderConfig {
    pub fn prop(&self) -> ImageProp {
        ImageProp::new(self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Reject settings the renderer cannot start with
    pub fn validate(&self) -> RenderResult<()> {
        let in_range = |d: usize| (1..=MAX_DIMENSION).contains(&d);
        if !in_range(self.width) || !in_range(self.height) {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.swapchain_buffers == 0 {
            return Err(RenderError::EmptySwapchain);
        }
        if self.raster.threads == Some(0) {
            return Err(RenderError::ThreadPool(
                "raster 'threads' must be >= 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> RenderResult<RenderConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| RenderError::io(path, e))?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> RenderResult<RenderConfig> {
    let config: RenderConfig = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> RenderResult<()> {
    let path = path.as_ref();
    fs::write(path, config_to_string(config)?).map_err(|e| RenderError::io(path, e))
}

pub fn config_to_string(config: &RenderConfig) -> RenderResult<String> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(config, pretty)?)
}
