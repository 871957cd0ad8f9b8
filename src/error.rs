//! Error type shared by the library
//!
//! Geometry never fails: degenerate or off-screen primitives are dropped
//! silently by the pipeline. Errors only come from setup and I/O.

use std::path::PathBuf;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("swapchain needs at least one buffer")]
    EmptySwapchain,

    #[error("no frame has been written yet")]
    NothingToPresent,

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("obj parse error at line {line}: {message}")]
    Obj { line: usize, message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("image encode error: {0}")]
    Encode(#[from] ::image::ImageError),
}

impl RenderError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn obj(line: usize, message: impl Into<String>) -> Self {
        Self::Obj {
            line,
            message: message.into(),
        }
    }
}
