//! Error types for rendering operations.

use thiserror::Error;

/// Errors raised while rasterizing resources.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}
