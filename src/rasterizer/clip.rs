//! Homogeneous clip-space accept/reject and near/far clipping
//!
//! Runs on clip-space vertices before the perspective divide.

use super::types::ClipMode;
use super::vertex::Vertex;

/// Smallest `w` allowed through clipping, keeps 1/w bounded
pub const W_EPSILON: f32 = 1e-5;

/// A triangle clipped against three planes has at most 3 + 3 vertices
const MAX_POLYGON: usize = 6;

/// Outcome for one triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveState {
    /// Outside the clip volume (or unusable); draw nothing
    Discard,
    /// Entirely inside; draw as is
    Keep,
    /// Crosses a clipped plane; draw the clipped polygon instead
    Split,
}

#[derive(Debug, Clone, Copy)]
enum Plane {
    W,
    Near,
    Far,
    Left,
    Right,
    Bottom,
    Top,
}

impl Plane {
    const ALL: [Plane; 7] = [
        Plane::W,
        Plane::Near,
        Plane::Far,
        Plane::Left,
        Plane::Right,
        Plane::Bottom,
        Plane::Top,
    ];

    /// Planes the polygon is actually cut against
    const CLIPPED: [Plane; 3] = [Plane::W, Plane::Near, Plane::Far];

    /// Signed distance, inside when >= 0
    #[inline]
    fn distance(self, v: &Vertex) -> f32 {
        let p = v.position;
        match self {
            Plane::W => p.w - W_EPSILON,
            Plane::Near => p.z + p.w,
            Plane::Far => p.w - p.z,
            Plane::Left => p.x + p.w,
            Plane::Right => p.w - p.x,
            Plane::Bottom => p.y + p.w,
            Plane::Top => p.w - p.y,
        }
    }
}

/// Conservative test: every vertex strictly inside the homogeneous cube
#[inline]
fn inside_cube(v: &Vertex) -> bool {
    let p = v.position;
    p.w > 0.0 && p.x.abs() <= p.w && p.y.abs() <= p.w && p.z.abs() <= p.w
}

/// Decide what to do with a clip-space triangle
pub fn classify(tri: &[Vertex; 3], mode: ClipMode) -> PrimitiveState {
    if tri.iter().any(|v| !v.position.is_finite()) {
        return PrimitiveState::Discard;
    }

    match mode {
        ClipMode::Reject => {
            if tri.iter().all(inside_cube) {
                PrimitiveState::Keep
            } else {
                PrimitiveState::Discard
            }
        }
        ClipMode::NearFar => {
            // Trivial reject: all three outside one plane
            for plane in Plane::ALL {
                if tri.iter().all(|v| plane.distance(v) < 0.0) {
                    return PrimitiveState::Discard;
                }
            }
            let crosses = Plane::CLIPPED
                .iter()
                .any(|plane| tri.iter().any(|v| plane.distance(v) < 0.0));
            if crosses {
                PrimitiveState::Split
            } else {
                PrimitiveState::Keep
            }
        }
    }
}

/// Convex polygon produced by clipping, stored inline
#[derive(Debug, Clone, Copy)]
pub struct Polygon {
    vertices: [Vertex; MAX_POLYGON],
    len: usize,
}

impl Polygon {
    fn from_triangle(tri: &[Vertex; 3]) -> Self {
        let mut vertices = [Vertex::default(); MAX_POLYGON];
        vertices[..3].copy_from_slice(tri);
        Self { vertices, len: 3 }
    }

    fn empty() -> Self {
        Self {
            vertices: [Vertex::default(); MAX_POLYGON],
            len: 0,
        }
    }

    fn push(&mut self, v: Vertex) {
        // Convex input and one plane per pass keep us within capacity
        if self.len < MAX_POLYGON {
            self.vertices[self.len] = v;
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices[..self.len]
    }

    /// Fan triangulation around the first vertex, preserving winding
    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        let verts = self.vertices();
        (1..self.len.saturating_sub(1)).map(move |i| [verts[0], verts[i], verts[i + 1]])
    }

    /// One Sutherland–Hodgman pass
    fn clip(&self, plane: Plane) -> Polygon {
        let mut out = Polygon::empty();
        let verts = self.vertices();
        for (i, current) in verts.iter().enumerate() {
            let next = &verts[(i + 1) % verts.len()];
            let dc = plane.distance(current);
            let dn = plane.distance(next);

            if dc >= 0.0 {
                out.push(*current);
            }
            if (dc >= 0.0) != (dn >= 0.0) {
                let t = dc / (dc - dn);
                out.push(Vertex::interpolate(current, next, t));
            }
        }
        out
    }
}

/// Clip a triangle against the w, near and far planes
pub fn clip_triangle(tri: &[Vertex; 3]) -> Polygon {
    let mut poly = Polygon::from_triangle(tri);
    for plane in Plane::CLIPPED {
        if poly.len() < 3 {
            return Polygon::empty();
        }
        poly = poly.clip(plane);
    }
    if poly.len() < 3 {
        return Polygon::empty();
    }
    poly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::Vec4;

    fn clip_vertex(x: f32, y: f32, z: f32, w: f32) -> Vertex {
        Vertex {
            position: Vec4::new(x, y, z, w),
            ..Vertex::default()
        }
    }

    #[test]
    fn test_inside_triangle_is_kept() {
        let tri = [
            clip_vertex(-0.5, -0.5, 0.5, 1.0),
            clip_vertex(0.5, -0.5, 0.5, 1.0),
            clip_vertex(0.0, 0.5, 0.5, 1.0),
        ];
        assert_eq!(classify(&tri, ClipMode::Reject), PrimitiveState::Keep);
        assert_eq!(classify(&tri, ClipMode::NearFar), PrimitiveState::Keep);
    }

    #[test]
    fn test_behind_viewer_is_discarded() {
        let tri = [
            clip_vertex(-0.5, -0.5, 0.5, -1.0),
            clip_vertex(0.5, -0.5, 0.5, -2.0),
            clip_vertex(0.0, 0.5, 0.5, -1.0),
        ];
        assert_eq!(classify(&tri, ClipMode::Reject), PrimitiveState::Discard);
        assert_eq!(classify(&tri, ClipMode::NearFar), PrimitiveState::Discard);
    }

    #[test]
    fn test_reject_drops_partially_outside() {
        let tri = [
            clip_vertex(-0.5, -0.5, 0.5, 1.0),
            clip_vertex(3.0, -0.5, 0.5, 1.0),
            clip_vertex(0.0, 0.5, 0.5, 1.0),
        ];
        assert_eq!(classify(&tri, ClipMode::Reject), PrimitiveState::Discard);
        // Side planes are left to the raster bounds
        assert_eq!(classify(&tri, ClipMode::NearFar), PrimitiveState::Keep);
    }

    #[test]
    fn test_straddling_near_plane_splits() {
        let tri = [
            clip_vertex(-0.5, -0.5, -2.0, 1.0),
            clip_vertex(0.5, -0.5, 0.5, 1.0),
            clip_vertex(0.0, 0.5, 0.5, 1.0),
        ];
        assert_eq!(classify(&tri, ClipMode::NearFar), PrimitiveState::Split);

        let poly = clip_triangle(&tri);
        // One corner cut off: a quad
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.triangles().count(), 2);
        for v in poly.vertices() {
            assert!(v.position.z >= -v.position.w - 1e-5);
        }
    }

    #[test]
    fn test_clip_interpolates_attributes() {
        let mut a = clip_vertex(0.0, 0.0, -3.0, 1.0);
        let mut b = clip_vertex(0.0, 0.0, 1.0, 1.0);
        let c = clip_vertex(1.0, 0.0, 1.0, 1.0);
        a.uv.x = 0.0;
        b.uv.x = 1.0;
        let poly = clip_triangle(&[a, b, c]);
        // Edge a->b crosses z = -1 halfway
        let cut = poly
            .vertices()
            .iter()
            .find(|v| (v.position.z + 1.0).abs() < 1e-5 && v.position.x == 0.0)
            .copied()
            .unwrap();
        assert!((cut.uv.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_fully_clipped_polygon_is_empty() {
        let tri = [
            clip_vertex(0.0, 0.0, 0.0, 0.0),
            clip_vertex(1.0, 0.0, 0.0, 0.0),
            clip_vertex(0.0, 1.0, 0.0, 0.0),
        ];
        assert!(clip_triangle(&tri).is_empty());
        assert_eq!(clip_triangle(&tri).triangles().count(), 0);
    }

    #[test]
    fn test_non_finite_is_discarded() {
        let tri = [
            clip_vertex(f32::NAN, 0.0, 0.5, 1.0),
            clip_vertex(1.0, 0.0, 0.5, 1.0),
            clip_vertex(0.0, 1.0, 0.5, 1.0),
        ];
        assert_eq!(classify(&tri, ClipMode::NearFar), PrimitiveState::Discard);
    }
}
