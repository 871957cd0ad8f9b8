//! Triangle meshes: vertex arrays with optional index lists
//!
//! Loaded from Wavefront OBJ or built in code. The pipeline reads triangles
//! through `Mesh::triangles`, which resolves indices and reports bad ones.

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::error::{RenderError, RenderResult};

/// Source vertex, before the vertex-changing callback runs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
}

impl MeshVertex {
    pub fn new(position: Vec3, uv: Vec2, normal: Vec3) -> Self {
        Self { position, uv, normal }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    /// `None` means every three vertices form a triangle
    pub indices: Option<Vec<u32>>,
}

impl Mesh {
    /// Implicit triangle list
    pub fn new(vertices: Vec<MeshVertex>) -> Self {
        Self { vertices, indices: None }
    }

    pub fn indexed(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices: Some(indices),
        }
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertices.len() / 3,
        }
    }

    /// Triangles in submission order. `None` for a triangle with an
    /// out-of-range index. Trailing partial triangles are ignored.
    pub fn triangles(&self) -> impl Iterator<Item = Option<[MeshVertex; 3]>> + '_ {
        (0..self.triangle_count()).map(move |t| {
            let corner = |i: usize| -> Option<MeshVertex> {
                let idx = match &self.indices {
                    Some(indices) => indices[t * 3 + i] as usize,
                    None => t * 3 + i,
                };
                self.vertices.get(idx).copied()
            };
            Some([corner(0)?, corner(1)?, corner(2)?])
        })
    }

    /// Unit cube (-1..1) with per-face normals, counter-clockwise when
    /// viewed from outside
    pub fn cube() -> Self {
        let positions = [
            // Front
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            // Back
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            // Top
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
            // Bottom
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            // Right
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            // Left
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ];
        let normals = [Vec3::Z, Vec3::NEG_Z, Vec3::Y, Vec3::NEG_Y, Vec3::X, Vec3::NEG_X];
        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (face, normal) in normals.iter().enumerate() {
            let base = face * 4;
            for i in 0..4 {
                vertices.push(MeshVertex::new(positions[base + i], uvs[i], *normal));
            }
            let b = base as u32;
            indices.extend_from_slice(&[b, b + 1, b + 2, b, b + 2, b + 3]);
        }
        Self::indexed(vertices, indices)
    }

    /// Parse Wavefront OBJ text. Supports `v`, `vt`, `vn` and `f` (polygons
    /// are fan-triangulated, negative indices count from the end). Faces
    /// without normals get a flat face normal. Other statements are skipped.
    pub fn from_obj_str(src: &str) -> RenderResult<Self> {
        let mut positions: Vec<Vec3> = Vec::new();
        let mut uvs: Vec<Vec2> = Vec::new();
        let mut normals: Vec<Vec3> = Vec::new();
        let mut vertices = Vec::new();

        for (n, raw) in src.lines().enumerate() {
            let line_no = n + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };

            match keyword {
                "v" => positions.push(parse_vec3(parts, line_no)?),
                "vn" => normals.push(parse_vec3(parts, line_no)?),
                "vt" => {
                    let u = parse_float(parts.next(), line_no)?;
                    let v = parse_float(parts.next(), line_no)?;
                    uvs.push(Vec2::new(u, v));
                }
                "f" => {
                    let corners = parts
                        .map(|token| {
                            parse_corner(token, line_no, &positions, &uvs, &normals)
                        })
                        .collect::<RenderResult<Vec<_>>>()?;
                    if corners.len() < 3 {
                        return Err(RenderError::obj(line_no, "face needs at least 3 vertices"));
                    }
                    for i in 1..corners.len() - 1 {
                        let mut tri = [corners[0], corners[i], corners[i + 1]];
                        fill_flat_normal(&mut tri);
                        vertices.extend(tri.iter().map(|c| c.vertex));
                    }
                }
                _ => {}
            }
        }

        tracing::debug!(
            positions = positions.len(),
            triangles = vertices.len() / 3,
            "parsed obj"
        );
        Ok(Self::new(vertices))
    }
}

/// Load a mesh from an OBJ file
pub fn load_obj<P: AsRef<Path>>(path: P) -> RenderResult<Mesh> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| RenderError::io(path, e))?;
    Mesh::from_obj_str(&contents)
}

#[derive(Clone, Copy)]
struct Corner {
    vertex: MeshVertex,
    has_normal: bool,
}

fn fill_flat_normal(tri: &mut [Corner; 3]) {
    let normal = (tri[1].vertex.position - tri[0].vertex.position)
        .cross(tri[2].vertex.position - tri[0].vertex.position)
        .normalize_or_zero();
    for corner in tri.iter_mut().filter(|c| !c.has_normal) {
        corner.vertex.normal = normal;
    }
}

fn parse_float(token: Option<&str>, line: usize) -> RenderResult<f32> {
    let token = token.ok_or_else(|| RenderError::obj(line, "missing component"))?;
    token
        .parse::<f32>()
        .map_err(|_| RenderError::obj(line, format!("bad number '{token}'")))
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>, line: usize) -> RenderResult<Vec3> {
    Ok(Vec3::new(
        parse_float(parts.next(), line)?,
        parse_float(parts.next(), line)?,
        parse_float(parts.next(), line)?,
    ))
}

/// Resolve a 1-based (or negative, relative) OBJ index
fn resolve_index(token: &str, len: usize, line: usize) -> RenderResult<usize> {
    let raw: i64 = token
        .parse()
        .map_err(|_| RenderError::obj(line, format!("bad index '{token}'")))?;
    let idx = match raw {
        0 => None,
        r if r > 0 => Some(r as usize - 1),
        r => len.checked_sub(r.unsigned_abs() as usize),
    };
    idx.filter(|&i| i < len)
        .ok_or_else(|| RenderError::obj(line, format!("index {raw} out of range")))
}

fn parse_corner(
    token: &str,
    line: usize,
    positions: &[Vec3],
    uvs: &[Vec2],
    normals: &[Vec3],
) -> RenderResult<Corner> {
    let mut fields = token.split('/');
    let position = match fields.next() {
        Some(p) if !p.is_empty() => positions[resolve_index(p, positions.len(), line)?],
        _ => return Err(RenderError::obj(line, format!("bad face vertex '{token}'"))),
    };
    let uv = match fields.next() {
        Some(t) if !t.is_empty() => uvs[resolve_index(t, uvs.len(), line)?],
        _ => Vec2::ZERO,
    };
    let normal = match fields.next() {
        Some(n) if !n.is_empty() => Some(normals[resolve_index(n, normals.len(), line)?]),
        _ => None,
    };
    Ok(Corner {
        vertex: MeshVertex::new(position, uv, normal.unwrap_or(Vec3::ZERO)),
        has_normal: normal.is_some(),
    })
}
