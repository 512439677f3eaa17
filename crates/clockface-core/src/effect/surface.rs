//! The new-surface barrier.

use log::warn;

use crate::{
    draw::Painter,
    effect::Effect,
    geometry::Rect,
    hash::{ContentHash, ContentHasher},
};

/// Renders the content on an isolated layer before compositing it back.
///
/// Effects wrapped by this one see a clean alpha channel; effects wrapping it
/// see the flattened result.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewSurfaceEffect;

impl NewSurfaceEffect {
    pub fn new() -> Self {
        Self
    }
}

impl Effect for NewSurfaceEffect {
    fn content_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher.write("new-surface");
        hasher.finish()
    }

    fn apply(&self, painter: &mut Painter, rect: Rect, content: &mut dyn FnMut(&mut Painter)) {
        match painter.begin_layer() {
            Ok(mut layer) => {
                content(&mut layer);
                painter.end_layer(layer);
            }
            Err(err) => {
                warn!(err:%, rect:?; "Cannot isolate content, drawing in place");
                content(painter);
            }
        }
    }
}
