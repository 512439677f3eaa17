//! Effects applied around a resource's draw call.
//!
//! An [`Effect`] does not change geometry. It receives the target rectangle and
//! a callback that renders the undecorated content, and decides when (and on
//! which surface) to invoke it.
//!
//! # Overview
//!
//! - [`TextureEffect`]: draw, then fill the drawn pixels with a brush
//! - [`BackgroundEffect`]: fill, then draw on top
//! - [`BorderEffect`]: draw, then stroke the rectangle
//! - [`NewSurfaceEffect`]: render the content on an isolated layer
//! - [`CompositeEffect`]: an ordered stack of effects
//! - [`EffectResource`]: a [`Resource`] decorator applying an effect
//!
//! # Hash discipline
//!
//! Every effect keeps its [`ContentHash`] current: setters recompute it
//! immediately. A stale hash would serve stale cached bitmaps.

mod border;
mod fill;
mod surface;

use std::{fmt, rc::Rc};

pub use border::BorderEffect;
pub use fill::{BackgroundEffect, TextureEffect};
pub use surface::NewSurfaceEffect;

use crate::{
    draw::Painter,
    geometry::Rect,
    hash::{ContentHash, ContentHasher},
    resource::{Resource, ResourceRef},
};

/// Renders content through some extra drawing step.
pub trait Effect: fmt::Debug {
    /// Summary of every configurable parameter
    fn content_hash(&self) -> ContentHash;

    /// Produces the final pixels for `rect`.
    ///
    /// `content` draws the undecorated content onto the painter it is given;
    /// implementations call it at most once.
    fn apply(&self, painter: &mut Painter, rect: Rect, content: &mut dyn FnMut(&mut Painter));
}

/// Shared handle to an effect.
pub type EffectRef = Rc<dyn Effect>;

/// An ordered stack of effects.
///
/// The first effect wraps the content directly, each following one wraps the
/// result of the previous ones. A [`NewSurfaceEffect`] in the stack isolates
/// everything before it from everything after it.
#[derive(Debug, Clone)]
pub struct CompositeEffect {
    effects: Vec<EffectRef>,
    hash: ContentHash,
}

impl Default for CompositeEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEffect {
    pub fn new() -> Self {
        let mut composite = Self {
            effects: Vec::new(),
            hash: ContentHash::INVALID,
        };
        composite.update_hash();
        composite
    }

    /// Appends an effect (builder style).
    pub fn with_effect(mut self, effect: EffectRef) -> Self {
        self.push(effect);
        self
    }

    pub fn push(&mut self, effect: EffectRef) {
        self.effects.push(effect);
        self.update_hash();
    }

    pub fn effects(&self) -> &[EffectRef] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    // Order-sensitive: effects generally don't commute, so `[a, b]` and
    // `[b, a]` must not share cached bitmaps.
    fn update_hash(&mut self) {
        let mut hasher = ContentHasher::new();
        hasher.write("composite").write(&self.effects.len());
        for effect in &self.effects {
            hasher.write_hash(effect.content_hash());
        }
        self.hash = hasher.finish();
    }
}

impl Effect for CompositeEffect {
    fn content_hash(&self) -> ContentHash {
        self.hash
    }

    fn apply(&self, painter: &mut Painter, rect: Rect, content: &mut dyn FnMut(&mut Painter)) {
        apply_stack(&self.effects, painter, rect, content);
    }
}

fn apply_stack(
    effects: &[EffectRef],
    painter: &mut Painter,
    rect: Rect,
    content: &mut dyn FnMut(&mut Painter),
) {
    match effects.split_last() {
        None => content(painter),
        Some((outermost, inner)) => outermost.apply(painter, rect, &mut |painter: &mut Painter| {
            apply_stack(inner, painter, rect, content)
        }),
    }
}

/// Decorates a resource with an effect.
///
/// Geometry is forwarded unchanged; the cache key combines the inner key with
/// the effect hash in order.
#[derive(Debug, Clone)]
pub struct EffectResource {
    inner: ResourceRef,
    effect: EffectRef,
}

impl EffectResource {
    pub fn new(inner: ResourceRef, effect: EffectRef) -> Self {
        Self { inner, effect }
    }

    pub fn inner(&self) -> &ResourceRef {
        &self.inner
    }
}

impl Resource for EffectResource {
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
            .write("effect")
            .write_hash(self.inner.cache_key())
            .write_hash(self.effect.content_hash());
        hasher.finish()
    }

    fn draw(&self, painter: &mut Painter) {
        let inner = &self.inner;
        self.effect
            .apply(painter, inner.rect(), &mut |painter: &mut Painter| {
                inner.draw(painter)
            });
    }
}
