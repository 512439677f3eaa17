//! Brush and pen definitions.
//!
//! A [`Brush`] describes how an area is filled (solid color, linear gradient or
//! bitmap pattern); a [`Pen`] describes how an outline is stroked. Both carry a
//! [`ContentHash`] so effects built from them can key the bitmap cache.

use std::rc::Rc;

use tiny_skia::{
    FilterQuality, GradientStop, LinearGradient, Pattern, Pixmap, Shader, SpreadMode,
};

use crate::{
    color::Color,
    geometry::{Point, Rect},
    hash::{ContentHash, ContentHasher},
};

/// A color stop on a gradient, `offset` in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    offset: f32,
    color: Color,
}

impl ColorStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// Describes how an area is filled.
///
/// # Stretching
///
/// Every fill is resolved against a target rectangle. With `stretch` enabled the
/// brush is mapped onto that rectangle: gradient endpoints are relative
/// (`(0, 0)` is the top-left corner, `(1, 1)` the bottom-right one) and patterns
/// are scaled to cover it exactly. Without stretching gradient endpoints are
/// logical coordinates and patterns tile from the rectangle origin.
#[derive(Debug, Clone)]
pub enum Brush {
    Solid(Color),
    LinearGradient {
        start: Point,
        end: Point,
        stops: Vec<ColorStop>,
    },
    Pattern(Rc<Pixmap>),
}

impl Brush {
    pub fn solid(color: Color) -> Self {
        Self::Solid(color)
    }

    /// Summary of every parameter that affects the fill.
    pub fn content_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        match self {
            Self::Solid(color) => {
                hasher.write("solid").write(color);
            }
            Self::LinearGradient { start, end, stops } => {
                hasher
                    .write("linear-gradient")
                    .write_f32(start.x())
                    .write_f32(start.y())
                    .write_f32(end.x())
                    .write_f32(end.y());
                for stop in stops {
                    hasher.write_f32(stop.offset()).write(&stop.color());
                }
            }
            Self::Pattern(pixmap) => {
                hasher
                    .write("pattern")
                    .write(&pixmap.width())
                    .write(&pixmap.height())
                    .write(pixmap.data());
            }
        }
        hasher.finish()
    }

    /// Builds the rasterizer shader that fills `target`.
    ///
    /// Returns `None` for degenerate gradients, which then paint nothing.
    pub(crate) fn shader(&self, target: Rect, stretch: bool) -> Option<Shader<'_>> {
        match self {
            Self::Solid(color) => Some(Shader::SolidColor(color.to_skia())),
            Self::LinearGradient { start, end, stops } => {
                let (start, end) = if stretch {
                    (relative_point(target, *start), relative_point(target, *end))
                } else {
                    (*start, *end)
                };
                let stops = stops
                    .iter()
                    .map(|stop| GradientStop::new(stop.offset(), stop.color().to_skia()))
                    .collect();
                LinearGradient::new(
                    tiny_skia::Point::from_xy(start.x(), start.y()),
                    tiny_skia::Point::from_xy(end.x(), end.y()),
                    stops,
                    SpreadMode::Pad,
                    tiny_skia::Transform::identity(),
                )
            }
            Self::Pattern(pixmap) => {
                let pixmap: &Pixmap = pixmap;
                let (spread, transform) = if stretch {
                    let sx = target.width() / pixmap.width() as f32;
                    let sy = target.height() / pixmap.height() as f32;
                    (
                        SpreadMode::Pad,
                        tiny_skia::Transform::from_row(sx, 0.0, 0.0, sy, target.x(), target.y()),
                    )
                } else {
                    (
                        SpreadMode::Repeat,
                        tiny_skia::Transform::from_translate(target.x(), target.y()),
                    )
                };
                Some(Pattern::new(
                    pixmap.as_ref(),
                    spread,
                    FilterQuality::Bilinear,
                    1.0,
                    transform,
                ))
            }
        }
    }
}

fn relative_point(target: Rect, p: Point) -> Point {
    Point::new(
        target.x() + p.x() * target.width(),
        target.y() + p.y() * target.height(),
    )
}

/// Defines how an outline is stroked.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    color: Color,
    width: f32,
}

impl Pen {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn content_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher.write("pen").write(&self.color).write_f32(self.width);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::new("red").unwrap()
    }

    #[test]
    fn test_solid_hash_tracks_color() {
        let a = Brush::solid(red());
        let b = Brush::solid(red());
        let c = Brush::solid(Color::new("blue").unwrap());
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn test_gradient_hash_tracks_stops() {
        let gradient = |offset| Brush::LinearGradient {
            start: Point::new(0.0, 0.0),
            end: Point::new(0.0, 1.0),
            stops: vec![ColorStop::new(0.0, red()), ColorStop::new(offset, red())],
        };
        assert_ne!(gradient(1.0).content_hash(), gradient(0.5).content_hash());
    }

    #[test]
    fn test_pattern_hash_tracks_pixels() {
        let mut pixmap = Pixmap::new(2, 2).unwrap();
        let before = Brush::Pattern(Rc::new(pixmap.clone())).content_hash();
        pixmap.fill(tiny_skia::Color::WHITE);
        let after = Brush::Pattern(Rc::new(pixmap)).content_hash();
        assert_ne!(before, after);
    }

    #[test]
    fn test_color_stop_offset_clamped() {
        assert_eq!(ColorStop::new(1.5, red()).offset(), 1.0);
        assert_eq!(ColorStop::new(-0.5, red()).offset(), 0.0);
    }

    #[test]
    fn test_pen_hash_tracks_width() {
        assert_ne!(
            Pen::new(red(), 1.0).content_hash(),
            Pen::new(red(), 2.0).content_hash()
        );
    }
}
