//! The rasterizing painter.
//!
//! [`Painter`] owns a pixel surface and a transform stack. Every drawing call
//! takes logical coordinates; the current transform (which already includes the
//! device pixel ratio) maps them onto device pixels.

use std::path::Path;

use log::trace;
use tiny_skia::{FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke};

use crate::{
    draw::{Brush, Pen},
    error::RenderError,
    geometry::{Rect, Transform},
};

/// How newly drawn pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Composition {
    /// Draw over existing content (the default)
    #[default]
    SourceOver,
    /// Keep new pixels only where the surface already has coverage
    SourceIn,
    /// Draw behind existing content
    DestinationOver,
    /// Keep existing pixels only where the new pixels have coverage
    DestinationIn,
}

impl From<Composition> for tiny_skia::BlendMode {
    fn from(composition: Composition) -> Self {
        match composition {
            Composition::SourceOver => Self::SourceOver,
            Composition::SourceIn => Self::SourceIn,
            Composition::DestinationOver => Self::DestinationOver,
            Composition::DestinationIn => Self::DestinationIn,
        }
    }
}

/// A drawing surface with a transform stack.
#[derive(Debug)]
pub struct Painter {
    pixmap: Pixmap,
    transform: Transform,
    saved: Vec<Transform>,
    device_pixel_ratio: f32,
}

impl Painter {
    /// Creates a transparent surface of `width` x `height` device pixels.
    ///
    /// The initial transform scales logical units by `device_pixel_ratio`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::SurfaceAllocation`] for zero or oversized dimensions.
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Result<Self, RenderError> {
        Self::with_transform(
            width,
            height,
            Transform::scale(device_pixel_ratio, device_pixel_ratio),
            device_pixel_ratio,
        )
    }

    /// Creates a surface just large enough to hold `rect` at the given ratio,
    /// with the rect's top-left corner at device pixel `(0, 0)`.
    pub fn for_rect(rect: Rect, device_pixel_ratio: f32) -> Result<Self, RenderError> {
        let width = device_extent(rect.width() * device_pixel_ratio);
        let height = device_extent(rect.height() * device_pixel_ratio);
        let transform = Transform::translation(-rect.x(), -rect.y())
            .then(Transform::scale(device_pixel_ratio, device_pixel_ratio));
        Self::with_transform(width, height, transform, device_pixel_ratio)
    }

    /// Creates a surface with an explicit logical-to-device transform.
    pub fn with_transform(
        width: u32,
        height: u32,
        transform: Transform,
        device_pixel_ratio: f32,
    ) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            transform,
            saved: Vec::new(),
            device_pixel_ratio,
        })
    }

    /// Surface width in device pixels
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Surface height in device pixels
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Current logical-to-device transform
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Pushes the current transform on the stack.
    pub fn save(&mut self) {
        self.saved.push(self.transform);
    }

    /// Pops the transform saved by the matching [`Painter::save`].
    pub fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    /// Prepends `transform`: it is applied to coordinates before the current one.
    pub fn concat(&mut self, transform: Transform) {
        self.transform = transform.then(self.transform);
    }

    /// Fills `rect` with `brush`; see [`Brush`] for the meaning of `stretch`.
    pub fn fill_rect(
        &mut self,
        rect: Rect,
        brush: &Brush,
        stretch: bool,
        composition: Composition,
    ) {
        let Some(skia_rect) = to_skia_rect(rect) else {
            return;
        };
        let Some(shader) = brush.shader(rect, stretch) else {
            trace!(rect:?; "Skipping fill with a degenerate brush");
            return;
        };
        let paint = Paint {
            shader,
            blend_mode: composition.into(),
            anti_alias: true,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(skia_rect, &paint, to_skia_transform(self.transform), None);
    }

    /// Strokes the outline of `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, pen: &Pen) {
        let Some(skia_rect) = to_skia_rect(rect) else {
            return;
        };
        let path = PathBuilder::from_rect(skia_rect);
        let mut paint = Paint::default();
        paint.set_color(pen.color().to_skia());
        paint.anti_alias = true;
        let stroke = Stroke {
            width: pen.width(),
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            to_skia_transform(self.transform),
            None,
        );
    }

    /// Draws a bitmap. `transform` maps the bitmap's pixel grid into logical
    /// coordinates; the current transform is applied afterwards.
    pub fn draw_pixmap(&mut self, pixmap: &Pixmap, transform: Transform) {
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            pixmap.as_ref(),
            &paint,
            to_skia_transform(transform.then(self.transform)),
            None,
        );
    }

    /// Starts an isolated surface with the same size and transform.
    ///
    /// Content drawn on the layer composites against a clean alpha channel;
    /// hand it back with [`Painter::end_layer`].
    pub fn begin_layer(&self) -> Result<Painter, RenderError> {
        Self::with_transform(
            self.width(),
            self.height(),
            self.transform,
            self.device_pixel_ratio,
        )
    }

    /// Composites a layer created by [`Painter::begin_layer`] onto this surface.
    pub fn end_layer(&mut self, layer: Painter) {
        self.pixmap.draw_pixmap(
            0,
            0,
            layer.pixmap.as_ref(),
            &PixmapPaint::default(),
            tiny_skia::Transform::identity(),
            None,
        );
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Writes the surface as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        self.pixmap
            .save_png(path)
            .map_err(|err| RenderError::Encode(err.to_string()))
    }
}

/// Rounds a device extent up to whole pixels, never below one pixel.
pub(crate) fn device_extent(value: f32) -> u32 {
    if value.is_finite() && value > 1.0 {
        value.ceil() as u32
    } else {
        1
    }
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    if rect.is_empty() {
        return None;
    }
    tiny_skia::Rect::from_xywh(rect.x(), rect.y(), rect.width(), rect.height())
}

fn to_skia_transform(t: Transform) -> tiny_skia::Transform {
    tiny_skia::Transform::from_row(t.m11(), t.m12(), t.m21(), t.m22(), t.dx(), t.dy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn alpha_at(painter: &Painter, x: u32, y: u32) -> u8 {
        painter
            .pixmap()
            .pixel(x, y)
            .map(|pixel| pixel.alpha())
            .unwrap_or(0)
    }

    fn red() -> Brush {
        Brush::solid(Color::new("red").unwrap())
    }

    #[test]
    fn test_new_rejects_zero_size() {
        let result = Painter::new(0, 10, 1.0);
        assert!(matches!(
            result,
            Err(RenderError::SurfaceAllocation {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn test_fill_rect_respects_device_pixel_ratio() {
        let mut painter = Painter::new(8, 8, 2.0).unwrap();
        painter.fill_rect(
            Rect::new(0.0, 0.0, 2.0, 2.0),
            &red(),
            false,
            Composition::SourceOver,
        );
        assert_eq!(alpha_at(&painter, 3, 3), 255);
        assert_eq!(alpha_at(&painter, 5, 5), 0);
    }

    #[test]
    fn test_save_restore_transform() {
        let mut painter = Painter::new(4, 4, 1.0).unwrap();
        painter.save();
        painter.concat(Transform::translation(2.0, 0.0));
        assert_eq!(painter.transform(), Transform::translation(2.0, 0.0));
        painter.restore();
        assert!(painter.transform().is_identity());
    }

    #[test]
    fn test_for_rect_maps_origin_to_first_pixel() {
        let mut painter = Painter::for_rect(Rect::new(-4.0, -4.0, 4.0, 4.0), 1.0).unwrap();
        assert_eq!((painter.width(), painter.height()), (4, 4));
        painter.fill_rect(
            Rect::new(-4.0, -4.0, 1.0, 1.0),
            &red(),
            false,
            Composition::SourceOver,
        );
        assert_eq!(alpha_at(&painter, 0, 0), 255);
        assert_eq!(alpha_at(&painter, 2, 2), 0);
    }

    #[test]
    fn test_source_in_keeps_only_covered_pixels() {
        let mut painter = Painter::new(4, 1, 1.0).unwrap();
        painter.fill_rect(
            Rect::new(0.0, 0.0, 2.0, 1.0),
            &red(),
            false,
            Composition::SourceOver,
        );
        painter.fill_rect(
            Rect::new(0.0, 0.0, 4.0, 1.0),
            &Brush::solid(Color::new("blue").unwrap()),
            false,
            Composition::SourceIn,
        );
        let covered = painter.pixmap().pixel(0, 0).unwrap();
        assert_eq!(covered.blue(), 255);
        assert_eq!(covered.red(), 0);
        assert_eq!(alpha_at(&painter, 3, 0), 0);
    }

    #[test]
    fn test_layer_composites_back() {
        let mut painter = Painter::new(4, 4, 1.0).unwrap();
        let mut layer = painter.begin_layer().unwrap();
        layer.fill_rect(
            Rect::new(0.0, 0.0, 4.0, 4.0),
            &red(),
            false,
            Composition::SourceOver,
        );
        assert_eq!(alpha_at(&painter, 1, 1), 0);
        painter.end_layer(layer);
        assert_eq!(alpha_at(&painter, 1, 1), 255);
    }

    #[test]
    fn test_device_extent_rounds_up() {
        assert_eq!(device_extent(3.2), 4);
        assert_eq!(device_extent(0.0), 1);
        assert_eq!(device_extent(f32::NAN), 1);
    }
}
