//! Draw call orchestration
//!
//! `Pipeline::perform` runs the vertex stage for every triangle of a mesh,
//! collecting trapezoids into a per-frame draw buffer, then rasterizes the
//! whole buffer into the target image. Every rejection along the way
//! (clipping, culling, degenerate shapes) is silent.

use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};
use crate::world::Mesh;

use super::clip::{classify, clip_triangle, PrimitiveState};
use super::image::{Image, PIXEL_SIZE};
use super::math::{face_normal, ndc_to_viewport, Vec3, Vec4};
use super::scanline::{rasterize_trapezoid, row_range, Scanline};
use super::trapezoid::{Primitive, Trapezoid, Trapezoids};
use super::types::{CullMode, RasterSettings};
use super::vertex::Vertex;

/// Rows handed to one worker at a time in the parallel path
const ROW_BAND: usize = 16;

/// Reference direction for face orientation in raster space
const VIEW_REFERENCE: Vec3 = Vec3::Z;

/// Per-frame values threaded into the vertex-changing callback
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame
    pub delta: f32,
    /// Seconds accumulated since the first frame
    pub time: f32,
    pub frame: u64,
}

impl FrameContext {
    /// Context for the next frame
    pub fn advance(self, delta: f32) -> Self {
        Self {
            delta,
            time: self.time + delta,
            frame: self.frame + 1,
        }
    }
}

/// Maps a vertex to its clip-space position
pub type VertexChanging = Box<dyn Fn(&Vertex, &FrameContext) -> Vec4 + Send + Sync>;

/// Maps a perspective-corrected vertex to an RGBA color in [0, 1]
pub type PixelShading = Box<dyn Fn(&Vertex) -> Vec4 + Send + Sync>;

/// Counters for one draw call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Triangles read from the mesh
    pub triangles: usize,
    /// Dropped by clipping or bad indices
    pub clipped: usize,
    /// Cut by the near/far planes
    pub split: usize,
    /// Source triangles dropped by face culling, counted once even when
    /// clipping split them into several pieces
    pub culled: usize,
    pub trapezoids: usize,
    pub pixels: usize,
}

struct DrawItem {
    prim: Primitive,
    traps: Trapezoids,
}

pub struct Pipeline {
    settings: RasterSettings,
    vertex_changing: VertexChanging,
    pixel_shading: PixelShading,
    draw_buffer: Vec<DrawItem>,
    pool: Option<rayon::ThreadPool>,
}

impl Pipeline {
    /// Pipeline with pass-through vertex positions and white pixels
    pub fn new(settings: RasterSettings) -> RenderResult<Self> {
        let pool = build_thread_pool(settings.threads)?;
        Ok(Self {
            settings,
            vertex_changing: Box::new(|v, _| v.position),
            pixel_shading: Box::new(|_| Vec4::ONE),
            draw_buffer: Vec::new(),
            pool,
        })
    }

    pub fn settings(&self) -> &RasterSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: RasterSettings) -> RenderResult<()> {
        if settings.threads != self.settings.threads {
            self.pool = build_thread_pool(settings.threads)?;
        }
        self.settings = settings;
        Ok(())
    }

    pub fn set_vertex_changing<F>(&mut self, changing: F)
    where
        F: Fn(&Vertex, &FrameContext) -> Vec4 + Send + Sync + 'static,
    {
        self.vertex_changing = Box::new(changing);
    }

    pub fn set_pixel_shading<F>(&mut self, shading: F)
    where
        F: Fn(&Vertex) -> Vec4 + Send + Sync + 'static,
    {
        self.pixel_shading = Box::new(shading);
    }

    /// Draw every triangle of `mesh` into `image`
    #[tracing::instrument(level = "trace", skip_all, fields(triangles = mesh.triangle_count()))]
    pub fn perform(&mut self, image: &mut Image, mesh: &Mesh, ctx: &FrameContext) -> DrawStats {
        let mut stats = DrawStats::default();
        self.draw_buffer.clear();

        for source in mesh.triangles() {
            stats.triangles += 1;
            let Some(source) = source else {
                stats.clipped += 1;
                continue;
            };

            let tri = source.map(|mv| {
                let mut v = Vertex::new(mv.position, mv.uv, mv.normal);
                v.position = (self.vertex_changing)(&v, ctx);
                v
            });

            match classify(&tri, self.settings.clip) {
                PrimitiveState::Discard => stats.clipped += 1,
                PrimitiveState::Keep => {
                    if self.submit(&tri, image, &mut stats) {
                        stats.culled += 1;
                    }
                }
                PrimitiveState::Split => {
                    stats.split += 1;
                    let poly = clip_triangle(&tri);
                    let mut culled = false;
                    for piece in poly.triangles() {
                        culled |= self.submit(&piece, image, &mut stats);
                    }
                    if culled {
                        stats.culled += 1;
                    }
                }
            }
        }

        stats.pixels = self.rasterize(image);

        tracing::trace!(
            triangles = stats.triangles,
            clipped = stats.clipped,
            split = stats.split,
            culled = stats.culled,
            trapezoids = stats.trapezoids,
            pixels = stats.pixels,
            "draw call finished"
        );
        stats
    }

    /// Divide, map to the viewport, cull and decompose one clip-space
    /// triangle. Returns true if it was culled.
    fn submit(&mut self, tri: &[Vertex; 3], image: &Image, stats: &mut DrawStats) -> bool {
        let screen = tri.map(|v| to_screen(&v, image.width(), image.height()));

        if is_culled(&screen, self.settings.cull) {
            return true;
        }

        let mut prim = Primitive::new(screen[0], screen[1], screen[2]);
        let traps = Trapezoid::from_primitive(&mut prim);
        let count = traps.iter().flatten().count();
        if count > 0 {
            stats.trapezoids += count;
            self.draw_buffer.push(DrawItem { prim, traps });
        }
        false
    }

    fn rasterize(&self, image: &mut Image) -> usize {
        if image.width() == 0 || image.height() == 0 || self.draw_buffer.is_empty() {
            return 0;
        }

        match &self.pool {
            Some(pool) => pool.install(|| self.rasterize_parallel(image)),
            None => {
                let shade = &*self.pixel_shading;
                let mut written = 0;
                for item in &self.draw_buffer {
                    for trap in item.traps.iter().flatten() {
                        written += rasterize_trapezoid(image, &item.prim, trap, shade);
                    }
                }
                written
            }
        }
    }

    /// Bands of rows are disjoint in both buffers, so workers never alias.
    /// Within a pixel, trapezoids are still visited in submission order.
    fn rasterize_parallel(&self, image: &mut Image) -> usize {
        let width = image.width();
        let height = image.height();
        let shade = &*self.pixel_shading;
        let draw_buffer = &self.draw_buffer;
        let (color, depth) = image.buffers_mut();

        color
            .par_chunks_mut(width * PIXEL_SIZE * ROW_BAND)
            .zip(depth.par_chunks_mut(width * ROW_BAND))
            .enumerate()
            .map(|(band, (color, depth))| {
                let first = (band * ROW_BAND) as i32;
                let rows = (depth.len() / width) as i32;
                let band_rows = first..first + rows;

                let mut written = 0;
                for item in draw_buffer {
                    for trap in item.traps.iter().flatten() {
                        let covered = row_range(trap, height);
                        let lo = covered.start.max(band_rows.start);
                        let hi = covered.end.min(band_rows.end);
                        for y in lo..hi {
                            let local = (y - first) as usize;
                            let line = Scanline::from_trapezoid(trap, &item.prim, y);
                            written += line.rasterize(
                                &mut color[local * width * PIXEL_SIZE..(local + 1) * width * PIXEL_SIZE],
                                &mut depth[local * width..(local + 1) * width],
                                shade,
                            );
                        }
                    }
                }
                written
            })
            .sum()
    }
}

/// Perspective divide and viewport mapping. Attributes are pre-multiplied
/// by 1/w for perspective-correct interpolation.
fn to_screen(v: &Vertex, width: usize, height: usize) -> Vertex {
    let rhw = 1.0 / v.position.w;
    let ndc = v.position.truncate() * rhw;
    let screen = ndc_to_viewport(ndc, width, height);
    Vertex {
        position: screen.extend(1.0),
        uv: v.uv,
        normal: v.normal,
        rhw: 1.0,
    }
    .with_rhw(rhw)
}

/// Raster space has y down, so NDC counter-clockwise shows up as a negative
/// orientation against the view reference.
fn is_culled(screen: &[Vertex; 3], mode: CullMode) -> bool {
    let orientation = face_normal(screen[0].screen(), screen[1].screen(), screen[2].screen())
        .dot(VIEW_REFERENCE);
    match mode {
        CullMode::None => false,
        CullMode::Cw => orientation > 0.0,
        CullMode::Ccw => orientation < 0.0,
    }
}

fn build_thread_pool(threads: Option<usize>) -> RenderResult<Option<rayon::ThreadPool>> {
    let Some(n) = threads else {
        return Ok(None);
    };
    if n == 0 {
        return Err(RenderError::ThreadPool(
            "raster 'threads' must be >= 1 when set".to_string(),
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build()
        .map(Some)
        .map_err(|e| RenderError::ThreadPool(format!("failed to build rayon thread pool: {e}")))
}
