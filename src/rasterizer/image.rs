//! Color + depth render target

use std::path::Path;

use crate::error::{RenderError, RenderResult};

use super::types::Color;

/// Depth value of an untouched pixel. Smaller is nearer.
pub const FAR_DEPTH: f32 = 1.0;

/// Bytes per RGBA8 pixel
pub const PIXEL_SIZE: usize = 4;

/// Image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProp {
    pub width: usize,
    pub height: usize,
}

impl ImageProp {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Framebuffer for software rendering: RGBA8 color plus a parallel depth buffer
#[derive(Debug, Clone)]
pub struct Image {
    pixels: Vec<u8>,
    depth: Vec<f32>,
    prop: ImageProp,
}

impl Image {
    pub fn new(prop: ImageProp) -> Self {
        Self {
            pixels: vec![0; prop.area() * PIXEL_SIZE],
            depth: vec![FAR_DEPTH; prop.area()],
            prop,
        }
    }

    pub fn width(&self) -> usize {
        self.prop.width
    }

    pub fn height(&self) -> usize {
        self.prop.height
    }

    pub fn prop(&self) -> ImageProp {
        self.prop
    }

    /// Bytes per row
    pub fn pitch(&self) -> usize {
        self.prop.width * PIXEL_SIZE
    }

    /// Raw RGBA8 rows, `pitch()` bytes apart
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth
    }

    /// Zero the color buffer and reset depth to the far value
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.clear_depth();
    }

    /// Fill the color buffer with one color and reset depth
    pub fn clear_color(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(PIXEL_SIZE) {
            px.copy_from_slice(&bytes);
        }
        self.clear_depth();
    }

    pub fn clear_depth(&mut self) {
        self.depth.fill(FAR_DEPTH);
    }

    /// Reallocate both buffers; previous contents are discarded
    pub fn resize(&mut self, prop: ImageProp) {
        *self = Image::new(prop);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.prop.width && y < self.prop.height {
            Some(y * self.prop.width + x)
        } else {
            None
        }
    }

    /// Write one pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            let offset = idx * PIXEL_SIZE;
            self.pixels[offset..offset + PIXEL_SIZE].copy_from_slice(&color.to_bytes());
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|idx| {
            let offset = idx * PIXEL_SIZE;
            Color::from_bytes([
                self.pixels[offset],
                self.pixels[offset + 1],
                self.pixels[offset + 2],
                self.pixels[offset + 3],
            ])
        })
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn set_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn set_depth(&mut self, x: i32, y: i32, depth: f32) {
        if let Some(idx) = self.index(x, y) {
            self.depth[idx] = depth;
        }
    }

    /// Stored depth, or `None` outside the image
    pub fn read_depth(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|idx| self.depth[idx])
    }

    /// True if `depth` is nearer than what is stored. False outside the image
    /// and for NaN depths.
    pub fn test_depth(&self, x: i32, y: i32, depth: f32) -> bool {
        match self.index(x, y) {
            Some(idx) => depth < self.depth[idx],
            None => false,
        }
    }

    /// Depth test, then write color and depth on success
    pub fn test_depth_and_set_pixel(&mut self, x: i32, y: i32, depth: f32, color: Color) -> bool {
        if !self.test_depth(x, y, depth) {
            return false;
        }
        self.set_depth(x, y, depth);
        self.set_pixel(x, y, color);
        true
    }

    /// Mutable color and depth slices of row `y`
    pub fn row_mut(&mut self, y: usize) -> (&mut [u8], &mut [f32]) {
        let w = self.prop.width;
        let pitch = w * PIXEL_SIZE;
        (
            &mut self.pixels[y * pitch..(y + 1) * pitch],
            &mut self.depth[y * w..(y + 1) * w],
        )
    }

    /// Both buffers at once, for splitting into disjoint rows
    pub fn buffers_mut(&mut self) -> (&mut [u8], &mut [f32]) {
        (&mut self.pixels, &mut self.depth)
    }

    /// Encode the color buffer as PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let path = path.as_ref();
        let buffer = ::image::RgbaImage::from_raw(
            self.prop.width as u32,
            self.prop.height as u32,
            self.pixels.clone(),
        )
        .ok_or(RenderError::InvalidDimensions {
            width: self.prop.width,
            height: self.prop.height,
        })?;
        buffer.save_with_format(path, ::image::ImageFormat::Png)?;
        Ok(())
    }
}
