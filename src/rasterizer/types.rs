//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

use super::math::Vec4;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 0xRRGGBB, fully opaque
    pub fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Convert a shader output (0.0-1.0 per channel) to 8-bit.
    /// NaN channels become 0.
    pub fn from_vec4(v: Vec4) -> Self {
        fn channel(c: f32) -> u8 {
            // `as u8` saturates and maps NaN to 0
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self {
            r: channel(v.x),
            g: channel(v.y),
            b: channel(v.z),
            a: channel(v.w),
        }
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }

    /// Packed 0xRRGGBBAA
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | (self.a as u32)
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::with_alpha(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// Which triangles get culled, by winding as seen in NDC (y up)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    /// Keep both windings
    None,
    /// Cull clockwise triangles
    #[default]
    Cw,
    /// Cull counter-clockwise triangles
    Ccw,
}

/// How primitives crossing the clip volume are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipMode {
    /// Drop the whole triangle if any vertex leaves the homogeneous cube
    Reject,
    /// Clip against the w, near and far planes; side planes are left to
    /// the raster bounds
    #[default]
    NearFar,
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Face culling
    pub cull: CullMode,
    /// Homogeneous clipping strategy
    pub clip: ClipMode,
    /// Rasterize image rows on a worker pool (None = single-threaded)
    pub threads: Option<usize>,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            cull: CullMode::Cw,
            clip: ClipMode::NearFar,
            threads: None,
        }
    }
}
