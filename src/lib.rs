//! Trapeze - a trapezoid-decomposition software rasterizer
//!
//! Library half of the viewer and snapshot tools. See `rasterizer::Pipeline`
//! for the draw entry point and `rasterizer::Swapchain` for frame rotation.

pub mod error;
pub mod rasterizer;
pub mod world;
