//! Scene-side collaborators of the rasterizer
//!
//! - Meshes (built-in cube, OBJ loading)
//! - Fly camera feeding the vertex-changing callback
//! - RON render configuration
//! - A lit, spinning scene wiring all of the above into a pipeline

mod camera;
mod config;
mod mesh;
mod scene;

pub use camera::*;
pub use config::*;
pub use mesh::*;
pub use scene::*;
