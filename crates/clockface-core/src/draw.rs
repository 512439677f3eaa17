//! Drawing primitives.
//!
//! - [`Painter`]: a device surface with a transform stack
//! - [`Brush`] / [`Pen`]: fill and outline definitions
//! - [`Composition`]: how new pixels combine with existing ones

mod brush;
mod painter;

pub use brush::{Brush, ColorStop, Pen};
pub use painter::{Composition, Painter};
pub(crate) use painter::device_extent;

/// Bitmap type used for patterns, glyph images and cached renders.
pub use tiny_skia::Pixmap;
