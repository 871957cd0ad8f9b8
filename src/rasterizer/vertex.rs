//! Per-vertex record carried through the pipeline
//!
//! Before the perspective divide `position` is a clip-space point. After it,
//! `position.xyz` is the raster-space point (x, y in pixels, z in NDC depth),
//! `rhw` is 1/w and `uv`/`normal` are pre-multiplied by `rhw`. Linear
//! interpolation in screen space then stays perspective-correct once the
//! attributes are divided back by the interpolated `rhw`.

use std::ops::{Add, Mul, Sub};

use super::math::{Vec2, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec4,
    pub uv: Vec2,
    pub normal: Vec3,
    pub rhw: f32,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec4::W,
            uv: Vec2::ZERO,
            normal: Vec3::ZERO,
            rhw: 1.0,
        }
    }
}

impl Vertex {
    /// All-zero vertex, the step of an empty scanline
    pub const ZERO: Vertex = Vertex {
        position: Vec4::ZERO,
        uv: Vec2::ZERO,
        normal: Vec3::ZERO,
        rhw: 0.0,
    };

    pub fn new(position: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self {
            position: position.extend(1.0),
            uv,
            normal,
            rhw: 1.0,
        }
    }

    /// Screen-space vertex with neutral attributes, handy for tests and overlays
    pub fn from_screen(x: f32, y: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, y, z), Vec2::ZERO, Vec3::ZERO)
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.position.z
    }

    /// Raster-space position (valid after the perspective divide)
    #[inline]
    pub fn screen(&self) -> Vec3 {
        self.position.truncate()
    }

    /// Linear interpolation of every field. `t` outside [0, 1] extrapolates.
    #[inline]
    pub fn interpolate(v0: &Vertex, v1: &Vertex, t: f32) -> Vertex {
        Vertex {
            position: v0.position.lerp(v1.position, t),
            uv: v0.uv.lerp(v1.uv, t),
            normal: v0.normal.lerp(v1.normal, t),
            rhw: v0.rhw + (v1.rhw - v0.rhw) * t,
        }
    }

    /// Pre-multiply attributes by `rhw` and record it
    pub fn with_rhw(self, rhw: f32) -> Vertex {
        Vertex {
            position: self.position,
            uv: self.uv * rhw,
            normal: self.normal * rhw,
            rhw,
        }
    }

    /// Divide interpolated attributes back by the interpolated `rhw`.
    /// Returns the vertex unchanged if `rhw` is not a usable divisor.
    pub fn perspective_corrected(&self) -> Vertex {
        if !(self.rhw.is_finite() && self.rhw > 0.0) {
            return *self;
        }
        let w = 1.0 / self.rhw;
        Vertex {
            position: self.position,
            uv: self.uv * w,
            normal: self.normal * w,
            rhw: self.rhw,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rhw.is_finite()
    }
}

impl Add for Vertex {
    type Output = Vertex;
    fn add(self, other: Vertex) -> Vertex {
        Vertex {
            position: self.position + other.position,
            uv: self.uv + other.uv,
            normal: self.normal + other.normal,
            rhw: self.rhw + other.rhw,
        }
    }
}

impl Sub for Vertex {
    type Output = Vertex;
    fn sub(self, other: Vertex) -> Vertex {
        Vertex {
            position: self.position - other.position,
            uv: self.uv - other.uv,
            normal: self.normal - other.normal,
            rhw: self.rhw - other.rhw,
        }
    }
}

impl Mul<f32> for Vertex {
    type Output = Vertex;
    fn mul(self, s: f32) -> Vertex {
        Vertex {
            position: self.position * s,
            uv: self.uv * s,
            normal: self.normal * s,
            rhw: self.rhw * s,
        }
    }
}
