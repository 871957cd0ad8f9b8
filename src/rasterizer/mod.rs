//! Trapezoid-based software rasterizer
//!
//! Triangles are transformed by a caller-supplied vertex callback, clipped in
//! homogeneous space, split into at most two flat-topped/flat-bottomed
//! trapezoids and scanned row by row with a depth test. Pixel color comes from
//! a caller-supplied shading callback.

mod clip;
mod image;
mod math;
mod pipeline;
mod scanline;
mod swapchain;
mod trapezoid;
mod types;
mod vertex;

pub use clip::*;
pub use self::image::*;
pub use math::*;
pub use pipeline::*;
pub use scanline::*;
pub use swapchain::*;
pub use trapezoid::*;
pub use types::*;
pub use vertex::*;
