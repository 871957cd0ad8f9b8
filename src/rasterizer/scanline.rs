//! Scanline generation and per-row edge walking

use std::ops::Range;

use super::image::{Image, PIXEL_SIZE};
use super::math::Vec4;
use super::trapezoid::{Primitive, Trapezoid};
use super::types::Color;
use super::vertex::Vertex;

/// Column coordinates are clamped to this magnitude so span arithmetic
/// stays inside `i32`. Far beyond any image width.
const COLUMN_LIMIT: f32 = (1 << 29) as f32;

#[inline]
fn column(x: f32) -> i32 {
    x.round().clamp(-COLUMN_LIMIT, COLUMN_LIMIT) as i32
}

/// One row of a trapezoid: left boundary, per-pixel step and integer span
#[derive(Debug, Clone, Copy)]
pub struct Scanline {
    pub start: Vertex,
    pub step: Vertex,
    pub y: i32,
    pub x: i32,
    pub width: i32,
}

impl Scanline {
    /// Intersect `trap` with raster row `y`, sampled at the row centre
    pub fn from_trapezoid(trap: &Trapezoid, prim: &Primitive, y: i32) -> Scanline {
        let sample_y = y as f32 + 0.5;
        let vl = trap.left.vertex_at(prim, sample_y);
        let vr = trap.right.vertex_at(prim, sample_y);

        if !vl.is_finite() || !vr.is_finite() {
            return Scanline::empty(vl, y);
        }

        // Step from the unclamped span so attributes stay anchored to the
        // real edges even when they lie far outside the image
        let span = f64::from(vr.x().round()) - f64::from(vl.x().round());
        let x = column(vl.x());
        let width = column(vr.x()) - x;
        if span < 1.0 || width <= 0 {
            return Scanline::empty(vl, y);
        }

        let step = (vr - vl) * ((1.0 / span) as f32);
        Scanline { start: vl, step, y, x, width }
    }

    fn empty(start: Vertex, y: i32) -> Scanline {
        Scanline {
            start,
            step: Vertex::ZERO,
            y,
            x: column(start.x()),
            width: 0,
        }
    }

    /// Pixel columns covered, clipped to `[0, row_width)`
    pub fn columns(&self, row_width: usize) -> Range<i32> {
        let lo = self.x.max(0);
        let hi = self.x.saturating_add(self.width).min(row_width as i32);
        lo..hi.max(lo)
    }

    /// Walk the span across one image row, depth testing every pixel.
    /// `color` and `depth` are that row's slices. Returns pixels written.
    pub fn rasterize<F>(&self, color: &mut [u8], depth: &mut [f32], shade: &F) -> usize
    where
        F: Fn(&Vertex) -> Vec4 + ?Sized,
    {
        let cols = self.columns(depth.len());
        if cols.is_empty() {
            return 0;
        }

        // Running vertex sits on pixel centres: half a step in, plus any
        // columns skipped by the left clip, measured from the unclamped edge
        let skipped = (f64::from(cols.start) - f64::from(self.start.x().round())) as f32;
        let mut v = self.start + self.step * (skipped + 0.5);
        let mut written = 0;

        for x in cols {
            let x = x as usize;
            let z = v.depth();
            if z < depth[x] {
                let rgba = Color::from_vec4(shade(&v.perspective_corrected()));
                depth[x] = z;
                color[x * PIXEL_SIZE..(x + 1) * PIXEL_SIZE].copy_from_slice(&rgba.to_bytes());
                written += 1;
            }
            v = v + self.step;
        }

        written
    }
}

/// Raster rows covered by a trapezoid, clipped to `[0, height)`
pub fn row_range(trap: &Trapezoid, height: usize) -> Range<i32> {
    if !(trap.top.is_finite() && trap.bottom.is_finite()) {
        return 0..0;
    }
    let top = (trap.top.round() as i32).max(0);
    let bottom = (trap.bottom.round() as i32).min(height as i32);
    top..bottom.max(top)
}

/// Rasterize every row of one trapezoid into `image`. Returns pixels written.
pub fn rasterize_trapezoid<F>(image: &mut Image, prim: &Primitive, trap: &Trapezoid, shade: &F) -> usize
where
    F: Fn(&Vertex) -> Vec4 + ?Sized,
{
    let mut written = 0;
    for y in row_range(trap, image.height()) {
        let line = Scanline::from_trapezoid(trap, prim, y);
        let (color, depth) = image.row_mut(y as usize);
        written += line.rasterize(color, depth, shade);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::image::ImageProp;
    use crate::rasterizer::trapezoid::Trapezoids;

    fn flat(_: &Vertex) -> Vec4 {
        Vec4::ONE
    }

    fn decompose(points: [(f32, f32, f32); 3]) -> (Primitive, Trapezoids) {
        let mut prim = Primitive::new(
            Vertex::from_screen(points[0].0, points[0].1, points[0].2),
            Vertex::from_screen(points[1].0, points[1].1, points[1].2),
            Vertex::from_screen(points[2].0, points[2].1, points[2].2),
        );
        let traps = Trapezoid::from_primitive(&mut prim);
        (prim, traps)
    }

    fn draw(image: &mut Image, prim: &Primitive, traps: &Trapezoids) -> usize {
        traps
            .iter()
            .flatten()
            .map(|t| rasterize_trapezoid(image, prim, t, &flat))
            .sum()
    }

    fn covered(image: &Image) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..image.height() as i32 {
            for x in 0..image.width() as i32 {
                if image.pixel(x, y) == Some(Color::WHITE) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_scanline_span_for_right_triangle() {
        let (prim, traps) = decompose([(0.0, 0.0, 0.5), (4.0, 0.0, 0.5), (0.0, 4.0, 0.5)]);
        let trap = traps[0].unwrap();
        let widths: Vec<i32> = (0..4)
            .map(|y| Scanline::from_trapezoid(&trap, &prim, y).width)
            .collect();
        assert_eq!(widths, vec![4, 3, 2, 1]);
        assert!((0..4).all(|y| Scanline::from_trapezoid(&trap, &prim, y).x == 0));
    }

    #[test]
    fn test_right_triangle_covers_lower_left_half() {
        let (prim, traps) = decompose([(0.0, 0.0, 0.5), (4.0, 0.0, 0.5), (0.0, 4.0, 0.5)]);
        let mut image = Image::new(ImageProp::new(8, 8));
        let written = draw(&mut image, &prim, &traps);
        assert_eq!(written, 10);

        let expected = vec![
            (0, 0), (1, 0), (2, 0), (3, 0),
            (0, 1), (1, 1), (2, 1),
            (0, 2), (1, 2),
            (0, 3),
        ];
        assert_eq!(covered(&image), expected);
    }

    #[test]
    fn test_zero_width_scanline_writes_nothing() {
        let (prim, traps) = decompose([(2.0, 0.0, 0.5), (2.2, 0.0, 0.5), (2.1, 6.0, 0.5)]);
        let trap = traps[0].unwrap();
        let line = Scanline::from_trapezoid(&trap, &prim, 3);
        assert_eq!(line.width, 0);
        assert_eq!(line.step, Vertex::ZERO);

        let mut image = Image::new(ImageProp::new(8, 8));
        let (color, depth) = image.row_mut(3);
        assert_eq!(line.rasterize(color, depth, &flat), 0);
    }

    #[test]
    fn test_clipping_to_image_bounds() {
        let (prim, traps) = decompose([(-10.0, -10.0, 0.5), (30.0, -10.0, 0.5), (-10.0, 30.0, 0.5)]);
        let mut image = Image::new(ImageProp::new(4, 4));
        let written = draw(&mut image, &prim, &traps);
        // The triangle covers the whole 4x4 image
        assert_eq!(written, 16);
    }

    #[test]
    fn test_depth_interpolates_across_row() {
        let mut prim = Primitive::new(
            Vertex::from_screen(0.0, 0.0, 0.0),
            Vertex::from_screen(8.0, 0.0, 0.8),
            Vertex::from_screen(0.0, 8.0, 0.0),
        );
        let traps = Trapezoid::from_primitive(&mut prim);
        let mut image = Image::new(ImageProp::new(8, 8));
        draw(&mut image, &prim, &traps);
        let d0 = image.read_depth(0, 0).unwrap();
        let d6 = image.read_depth(6, 0).unwrap();
        assert!(d0 < d6);
        assert!(d6 < 0.8);
    }

    #[test]
    fn test_nearer_pixels_win_in_either_order() {
        let near = [(0.0, 0.0, 0.2), (8.0, 0.0, 0.2), (0.0, 8.0, 0.2)];
        let far = [(0.0, 0.0, 0.6), (8.0, 0.0, 0.6), (0.0, 8.0, 0.6)];

        let red = |_: &Vertex| Vec4::new(1.0, 0.0, 0.0, 1.0);
        let blue = |_: &Vertex| Vec4::new(0.0, 0.0, 1.0, 1.0);

        for near_first in [true, false] {
            let mut image = Image::new(ImageProp::new(8, 8));
            let (np, nt) = decompose(near);
            let (fp, ft) = decompose(far);
            let mut passes: Vec<(&Primitive, &Trapezoids, bool)> =
                vec![(&np, &nt, true), (&fp, &ft, false)];
            if !near_first {
                passes.reverse();
            }
            for (prim, traps, is_near) in passes {
                for trap in traps.iter().flatten() {
                    if is_near {
                        rasterize_trapezoid(&mut image, prim, trap, &red);
                    } else {
                        rasterize_trapezoid(&mut image, prim, trap, &blue);
                    }
                }
            }
            assert_eq!(image.pixel(1, 1), Some(Color::RED));
            assert!((image.read_depth(1, 1).unwrap() - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn test_shader_receives_perspective_corrected_attributes() {
        // Constant uv pre-multiplied by varying rhw must come back constant
        let mut verts = [
            Vertex::from_screen(0.0, 0.0, 0.5),
            Vertex::from_screen(8.0, 0.0, 0.5),
            Vertex::from_screen(0.0, 8.0, 0.5),
        ];
        for (v, rhw) in verts.iter_mut().zip([1.0, 0.25, 0.5]) {
            v.uv = crate::rasterizer::math::Vec2::new(0.75, 0.75);
            *v = v.with_rhw(rhw);
        }
        let mut prim = Primitive::new(verts[0], verts[1], verts[2]);
        let traps = Trapezoid::from_primitive(&mut prim);

        let mut image = Image::new(ImageProp::new(8, 8));
        let shade = |v: &Vertex| {
            assert!((v.uv.x - 0.75).abs() < 1e-4, "uv {}", v.uv.x);
            Vec4::ONE
        };
        let written: usize = traps
            .iter()
            .flatten()
            .map(|t| rasterize_trapezoid(&mut image, &prim, t, &shade))
            .sum();
        assert!(written > 0);
    }

    #[test]
    fn test_far_off_screen_edges_keep_span_and_depth() {
        // Edges billions of pixels outside a small image
        let mut prim = Primitive::new(
            Vertex::from_screen(-3.0e9, 0.0, 0.0),
            Vertex::from_screen(3.0e9, 0.0, 1.0),
            Vertex::from_screen(0.0, 8.0, 0.5),
        );
        let traps = Trapezoid::from_primitive(&mut prim);
        let trap = traps[0].unwrap();

        let line = Scanline::from_trapezoid(&trap, &prim, 0);
        assert!(line.width > 0);
        assert_eq!(line.columns(8), 0..8);

        let mut image = Image::new(ImageProp::new(8, 8));
        let (color, depth) = image.row_mut(0);
        assert_eq!(line.rasterize(color, depth, &flat), 8);
        // Row 0 is centred on x = 0, halfway between the edges in depth
        let d = image.read_depth(0, 0).unwrap();
        assert!((d - 0.5).abs() < 1e-3, "depth {d}");
    }

    /// Deterministic xorshift64 for repeatable triangle sets
    struct XorShift(u64);

    impl XorShift {
        fn next_f32(&mut self, lo: f32, hi: f32) -> f32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            let unit = (self.0 >> 40) as f32 / (1u64 << 24) as f32;
            lo + (hi - lo) * unit
        }
    }

    /// Signed distance in pixels from `p` to the line through `a` and `b`,
    /// positive on the interior side of a triangle with orientation `sign`
    fn edge_distance(a: (f32, f32), b: (f32, f32), p: (f32, f32), sign: f32) -> f32 {
        let (ex, ey) = (b.0 - a.0, b.1 - a.1);
        let len = (ex * ex + ey * ey).sqrt();
        sign * (ex * (p.1 - a.1) - ey * (p.0 - a.0)) / len
    }

    #[test]
    fn test_arbitrary_triangles_cover_their_interior() {
        const SIZE: usize = 32;
        const MARGIN: f32 = 0.75;
        let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
        let mut checked = 0;

        for _ in 0..500 {
            let pts: Vec<(f32, f32)> = (0..3)
                .map(|_| (rng.next_f32(-4.0, 36.0), rng.next_f32(-4.0, 36.0)))
                .collect();
            let (a, b, c) = (pts[0], pts[1], pts[2]);
            let area = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
            if area.abs() < 1.0 {
                continue;
            }
            checked += 1;

            let (prim, traps) = decompose([(a.0, a.1, 0.5), (b.0, b.1, 0.5), (c.0, c.1, 0.5)]);
            let mut image = Image::new(ImageProp::new(SIZE, SIZE));
            draw(&mut image, &prim, &traps);

            let sign = area.signum();
            for y in 0..SIZE as i32 {
                for x in 0..SIZE as i32 {
                    let p = (x as f32 + 0.5, y as f32 + 0.5);
                    let inside = edge_distance(a, b, p, sign)
                        .min(edge_distance(b, c, p, sign))
                        .min(edge_distance(c, a, p, sign));
                    let written = image.pixel(x, y) == Some(Color::WHITE);
                    assert!(
                        !(inside > MARGIN && !written),
                        "interior pixel ({x}, {y}) skipped for {pts:?}"
                    );
                    assert!(
                        !(inside < -MARGIN && written),
                        "exterior pixel ({x}, {y}) written for {pts:?}"
                    );
                }
            }
        }
        assert!(checked > 400);
    }

    #[test]
    fn test_row_range_clips() {
        let (_, traps) = decompose([(0.0, -3.0, 0.5), (4.0, -3.0, 0.5), (0.0, 20.0, 0.5)]);
        let trap = traps[0].unwrap();
        assert_eq!(row_range(&trap, 8), 0..8);

        let (_, traps) = decompose([(0.0, 10.0, 0.5), (4.0, 10.0, 0.5), (0.0, 20.0, 0.5)]);
        assert!(row_range(&traps[0].unwrap(), 8).is_empty());
    }
}
