//! Outline effect.

use crate::{
    draw::{Painter, Pen},
    effect::Effect,
    geometry::Rect,
    hash::{ContentHash, ContentHasher},
};

/// Draws the content, then strokes the target rectangle.
#[derive(Debug, Clone)]
pub struct BorderEffect {
    pen: Pen,
    hash: ContentHash,
}

impl BorderEffect {
    pub fn new(pen: Pen) -> Self {
        let hash = border_hash(&pen);
        Self { pen, hash }
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    pub fn set_pen(&mut self, pen: Pen) {
        self.hash = border_hash(&pen);
        self.pen = pen;
    }
}

fn border_hash(pen: &Pen) -> ContentHash {
    let mut hasher = ContentHasher::new();
    hasher.write("border").write_hash(pen.content_hash());
    hasher.finish()
}

impl Effect for BorderEffect {
    fn content_hash(&self) -> ContentHash {
        self.hash
    }

    fn apply(&self, painter: &mut Painter, rect: Rect, content: &mut dyn FnMut(&mut Painter)) {
        content(painter);
        painter.stroke_rect(rect, &self.pen);
    }
}
