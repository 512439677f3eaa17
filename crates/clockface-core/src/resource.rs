//! Drawable resources and their decorators.
//!
//! A [`Resource`] is an immutable drawable: a bounding rectangle, two advances
//! and a draw operation, plus a [`ContentHash`] cache key. Decorators wrap a
//! shared inner resource and forward every query they don't override.
//!
//! # Overview
//!
//! - [`PixmapResource`] / [`BlankResource`]: leaf resources
//! - [`StampedResource`]: mixes a configuration hash into the cache key
//! - [`InvisibleResource`]: keeps the inner geometry, draws nothing
//! - [`DebugOverlay`]: outlines the rect and the advance box
//!
//! Effect and cache decorators live in [`crate::effect`] and [`crate::cache`].

use std::{fmt, rc::Rc};

use crate::{
    color::Color,
    draw::{Painter, Pen, Pixmap},
    geometry::{Rect, Transform},
    hash::{ContentHash, ContentHasher},
};

/// An opaque drawable.
///
/// Coordinates are logical units. By convention glyph resources put the
/// baseline at `y = 0`, so their rect usually starts at a negative `y`.
pub trait Resource: fmt::Debug {
    /// Bounding rectangle of everything [`Resource::draw`] paints
    fn rect(&self) -> Rect;

    /// Horizontal distance from this resource's origin to the next sibling's
    fn advance_x(&self) -> f32;

    /// Vertical distance from this resource's origin to the next sibling's
    fn advance_y(&self) -> f32;

    /// Summary of the rendered pixels; [`ContentHash::INVALID`] disables caching.
    fn cache_key(&self) -> ContentHash;

    /// Paints the resource with the painter's current transform.
    fn draw(&self, painter: &mut Painter);
}

/// Shared handle to a resource.
pub type ResourceRef = Rc<dyn Resource>;

/// A bitmap shown over a logical rectangle.
#[derive(Debug, Clone)]
pub struct PixmapResource {
    pixmap: Rc<Pixmap>,
    rect: Rect,
    advance_x: f32,
    advance_y: f32,
    key: ContentHash,
}

impl PixmapResource {
    /// Stretches `pixmap` over `rect`.
    pub fn new(pixmap: Rc<Pixmap>, rect: Rect, advance_x: f32, advance_y: f32) -> Self {
        let mut hasher = ContentHasher::new();
        hasher
            .write("pixmap")
            .write(&pixmap.width())
            .write(&pixmap.height())
            .write(pixmap.data())
            .write_f32(rect.x())
            .write_f32(rect.y())
            .write_f32(rect.width())
            .write_f32(rect.height())
            .write_f32(advance_x)
            .write_f32(advance_y);
        Self {
            key: hasher.finish(),
            pixmap,
            rect,
            advance_x,
            advance_y,
        }
    }

    pub fn pixmap(&self) -> &Rc<Pixmap> {
        &self.pixmap
    }
}

impl Resource for PixmapResource {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn advance_x(&self) -> f32 {
        self.advance_x
    }

    fn advance_y(&self) -> f32 {
        self.advance_y
    }

    fn cache_key(&self) -> ContentHash {
        self.key
    }

    fn draw(&self, painter: &mut Painter) {
        if self.rect.is_empty() {
            return;
        }
        let sx = self.rect.width() / self.pixmap.width() as f32;
        let sy = self.rect.height() / self.pixmap.height() as f32;
        let transform =
            Transform::scale(sx, sy).then(Transform::translation(self.rect.x(), self.rect.y()));
        painter.draw_pixmap(&self.pixmap, transform);
    }
}

/// Geometry without ink, e.g. a space character.
#[derive(Debug, Clone, Copy)]
pub struct BlankResource {
    rect: Rect,
    advance_x: f32,
    advance_y: f32,
}

impl BlankResource {
    pub fn new(rect: Rect, advance_x: f32, advance_y: f32) -> Self {
        Self {
            rect,
            advance_x,
            advance_y,
        }
    }
}

impl Resource for BlankResource {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn advance_x(&self) -> f32 {
        self.advance_x
    }

    fn advance_y(&self) -> f32 {
        self.advance_y
    }

    fn cache_key(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher
            .write("blank")
            .write_f32(self.rect.x())
            .write_f32(self.rect.y())
            .write_f32(self.rect.width())
            .write_f32(self.rect.height())
            .write_f32(self.advance_x)
            .write_f32(self.advance_y);
        hasher.finish()
    }

    fn draw(&self, _painter: &mut Painter) {}
}

/// Mixes a stamp (typically the skin configuration hash) into the inner key.
///
/// Rebuilding with a different stamp yields different cache keys for the same
/// inner resource, so stale bitmaps are never looked up again.
#[derive(Debug, Clone)]
pub struct StampedResource {
    inner: ResourceRef,
    stamp: ContentHash,
}

impl StampedResource {
    pub fn new(inner: ResourceRef, stamp: ContentHash) -> Self {
        Self { inner, stamp }
    }

    pub fn stamp(&self) -> ContentHash {
        self.stamp
    }
}

impl Resource for StampedResource {
    fn rect(&self) -> Rect {
        self.inner.rect()
    }

    fn advance_x(&self) -> f32 {
        self.inner.advance_x()
    }

    fn advance_y(&self) -> f32 {
        self.inner.advance_y()
    }

    fn cache_key(&self) -> ContentHash {
        self.inner.cache_key().xor(self.stamp)
    }

    fn draw(&self, painter: &mut Painter) {
        self.inner.draw(painter);
    }
}

/// Occupies the inner resource's space without painting it.
#[derive(Debug, Clone)]
pub struct InvisibleResource {
    inner: ResourceRef,
}

impl InvisibleResource {
    pub fn new(inner: ResourceRef) -> Self {
        Self { inner }
    }
}

impl Resource for InvisibleResource {
    fn rect(&self) -> Rect {
        self.inner.rect()
    }

    fn advance_x(&self) -> f32 {
        self.inner.advance_x()
    }

    fn advance_y(&self) -> f32 {
        self.inner.advance_y()
    }

    fn cache_key(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher.write("invisible").write_hash(self.inner.cache_key());
        hasher.finish()
    }

    fn draw(&self, _painter: &mut Painter) {}
}

/// Draws the inner resource, then outlines its rect and its advance box.
#[derive(Debug, Clone)]
pub struct DebugOverlay {
    inner: ResourceRef,
    rect_pen: Pen,
    advance_pen: Pen,
}

impl DebugOverlay {
    pub fn new(inner: ResourceRef) -> Self {
        Self {
            inner,
            rect_pen: Pen::new(overlay_color("#ff00ff"), 1.0),
            advance_pen: Pen::new(overlay_color("#00c0ff"), 1.0),
        }
    }

    /// Advance box: from the origin to `(advance_x, advance_y)`, anchored to
    /// the bottom of the rect so baseline glyphs show their full advance.
    fn advance_rect(&self) -> Rect {
        let rect = self.inner.rect();
        Rect::new(
            0.0,
            rect.bottom() - self.inner.advance_y(),
            self.inner.advance_x(),
            self.inner.advance_y(),
        )
    }
}

fn overlay_color(value: &str) -> Color {
    Color::new(value).unwrap_or_default()
}

impl Resource for DebugOverlay {
    fn rect(&self) -> Rect {
        self.inner.rect()
    }

    fn advance_x(&self) -> f32 {
        self.inner.advance_x()
    }

    fn advance_y(&self) -> f32 {
        self.inner.advance_y()
    }

    fn cache_key(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher
            .write("debug-overlay")
            .write_hash(self.inner.cache_key())
            .write_hash(self.rect_pen.content_hash())
            .write_hash(self.advance_pen.content_hash());
        hasher.finish()
    }

    fn draw(&self, painter: &mut Painter) {
        self.inner.draw(painter);
        painter.stroke_rect(self.advance_rect(), &self.advance_pen);
        painter.stroke_rect(self.inner.rect(), &self.rect_pen);
    }
}
