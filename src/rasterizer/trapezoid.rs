//! Triangle to trapezoid decomposition
//!
//! A triangle sorted by Y splits at its middle vertex into at most two
//! trapezoids with horizontal top and bottom. Edges are slot indices into
//! the `Primitive` that owns the vertices, so a trapezoid can never outlive
//! the storage it points into without the borrow checker noticing at use.

use super::math::signed_area;
use super::vertex::Vertex;

/// Slot of the vertex synthesized on the long edge at the middle vertex's Y
pub const SPLIT_SLOT: usize = 3;

/// Owned vertex storage for one triangle: three corners plus the split vertex
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    pub vertices: [Vertex; 4],
}

impl Primitive {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2, Vertex::default()],
        }
    }

    #[inline]
    pub fn vertex(&self, slot: usize) -> &Vertex {
        &self.vertices[slot]
    }
}

/// Two slots of the same primitive, `v0` above `v1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub v0: usize,
    pub v1: usize,
}

impl Edge {
    pub fn new(v0: usize, v1: usize) -> Self {
        Self { v0, v1 }
    }

    /// Parameter along the edge at height `y` (0 at `v0`, 1 at `v1`)
    #[inline]
    pub fn t_at(&self, prim: &Primitive, y: f32) -> f32 {
        let y0 = prim.vertex(self.v0).y();
        let y1 = prim.vertex(self.v1).y();
        let dy = y1 - y0;
        if dy == 0.0 {
            return 0.0;
        }
        (y - y0) / dy
    }

    #[inline]
    pub fn vertex_at(&self, prim: &Primitive, y: f32) -> Vertex {
        let t = self.t_at(prim, y);
        Vertex::interpolate(prim.vertex(self.v0), prim.vertex(self.v1), t)
    }

    #[inline]
    pub fn x_at(&self, prim: &Primitive, y: f32) -> f32 {
        let t = self.t_at(prim, y);
        let x0 = prim.vertex(self.v0).x();
        let x1 = prim.vertex(self.v1).x();
        x0 + (x1 - x0) * t
    }
}

/// Horizontal band `[top, bottom)` bounded by a left and a right edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trapezoid {
    pub top: f32,
    pub bottom: f32,
    pub left: Edge,
    pub right: Edge,
}

/// Result of decomposing one triangle
pub type Trapezoids = [Option<Trapezoid>; 2];

impl Trapezoid {
    /// `None` for an empty band (`top >= bottom`)
    pub fn new(top: f32, bottom: f32, left: Edge, right: Edge) -> Option<Self> {
        if top < bottom {
            Some(Self { top, bottom, left, right })
        } else {
            None
        }
    }

    /// Decompose the triangle held in `prim`. Sorts the three corner slots by
    /// Y in place and may fill `SPLIT_SLOT`. Degenerate triangles (zero area,
    /// all Y equal, all X equal, non-finite corners) yield nothing.
    pub fn from_primitive(prim: &mut Primitive) -> Trapezoids {
        let corners = &mut prim.vertices[..3];
        if corners.iter().any(|v| !v.is_finite()) {
            return [None, None];
        }
        corners.sort_by(|a, b| a.y().total_cmp(&b.y()));

        let (a, b, c) = (prim.vertices[0], prim.vertices[1], prim.vertices[2]);

        if a.y() == c.y() || (a.x() == b.x() && b.x() == c.x()) {
            return [None, None];
        }
        if signed_area(a.screen(), b.screen(), c.screen()) == 0.0 {
            return [None, None];
        }

        // Flat top: a and b share the top row
        if a.y() == b.y() {
            if a.x() > b.x() {
                prim.vertices.swap(0, 1);
            }
            let trap = Trapezoid::new(a.y(), c.y(), Edge::new(0, 2), Edge::new(1, 2));
            return [trap, None];
        }

        // Flat bottom: b and c share the bottom row
        if b.y() == c.y() {
            if b.x() > c.x() {
                prim.vertices.swap(1, 2);
            }
            let trap = Trapezoid::new(a.y(), c.y(), Edge::new(0, 1), Edge::new(0, 2));
            return [trap, None];
        }

        let t = (b.y() - a.y()) / (c.y() - a.y());
        let mut middle = Vertex::interpolate(&a, &c, t);
        // Pin to the exact row of b so the two bands share a boundary
        middle.position.y = b.y();
        prim.vertices[SPLIT_SLOT] = middle;

        let (upper, lower) = if b.x() <= middle.x() {
            (
                (Edge::new(0, 1), Edge::new(0, SPLIT_SLOT)),
                (Edge::new(1, 2), Edge::new(SPLIT_SLOT, 2)),
            )
        } else {
            (
                (Edge::new(0, SPLIT_SLOT), Edge::new(0, 1)),
                (Edge::new(SPLIT_SLOT, 2), Edge::new(1, 2)),
            )
        };

        [
            Trapezoid::new(a.y(), b.y(), upper.0, upper.1),
            Trapezoid::new(b.y(), c.y(), lower.0, lower.1),
        ]
    }
}
