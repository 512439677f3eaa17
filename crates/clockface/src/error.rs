//! Error types for clock face operations.
//!
//! [`ClockError`] wraps every error that can occur while configuring a skin,
//! loading glyphs, and rendering a frame.

use std::io;

use thiserror::Error;

use clockface_core::RenderError;
use clockface_format::FormatError;

/// The main error type for clock face operations.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid format string: {0}")]
    Format(#[from] FormatError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Font error: {0}")]
    Font(String),
}
