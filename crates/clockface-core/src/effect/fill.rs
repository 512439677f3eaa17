//! Brush-based effects: texture and background.

use log::trace;

use crate::{
    draw::{Brush, Composition, Painter},
    effect::Effect,
    geometry::Rect,
    hash::{ContentHash, ContentHasher},
};

/// Replaces the color of the drawn pixels with a brush, keeping their alpha.
///
/// The content is drawn first, then the brush is composited with
/// [`Composition::SourceIn`]. Anything already on the surface under the
/// rectangle is tinted as well, so stack a [`super::NewSurfaceEffect`] after
/// this effect when the content sits on other pixels.
#[derive(Debug, Clone)]
pub struct TextureEffect {
    brush: Brush,
    stretch: bool,
    hash: ContentHash,
}

impl TextureEffect {
    pub fn new(brush: Brush, stretch: bool) -> Self {
        let hash = fill_hash("texture", &brush, stretch);
        Self {
            brush,
            stretch,
            hash,
        }
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn stretch(&self) -> bool {
        self.stretch
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
        self.hash = fill_hash("texture", &self.brush, self.stretch);
    }

    pub fn set_stretch(&mut self, stretch: bool) {
        self.stretch = stretch;
        self.hash = fill_hash("texture", &self.brush, self.stretch);
    }
}

impl Effect for TextureEffect {
    fn content_hash(&self) -> ContentHash {
        self.hash
    }

    fn apply(&self, painter: &mut Painter, rect: Rect, content: &mut dyn FnMut(&mut Painter)) {
        content(painter);
        trace!(rect:?, stretch = self.stretch; "Applying texture");
        painter.fill_rect(rect, &self.brush, self.stretch, Composition::SourceIn);
    }
}

/// Fills the rectangle with a brush, then draws the content on top.
#[derive(Debug, Clone)]
pub struct BackgroundEffect {
    brush: Brush,
    stretch: bool,
    hash: ContentHash,
}

impl BackgroundEffect {
    pub fn new(brush: Brush, stretch: bool) -> Self {
        let hash = fill_hash("background", &brush, stretch);
        Self {
            brush,
            stretch,
            hash,
        }
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn stretch(&self) -> bool {
        self.stretch
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
        self.hash = fill_hash("background", &self.brush, self.stretch);
    }

    pub fn set_stretch(&mut self, stretch: bool) {
        self.stretch = stretch;
        self.hash = fill_hash("background", &self.brush, self.stretch);
    }
}

impl Effect for BackgroundEffect {
    fn content_hash(&self) -> ContentHash {
        self.hash
    }

    fn apply(&self, painter: &mut Painter, rect: Rect, content: &mut dyn FnMut(&mut Painter)) {
        trace!(rect:?, stretch = self.stretch; "Applying background");
        painter.fill_rect(rect, &self.brush, self.stretch, Composition::SourceOver);
        content(painter);
    }
}

fn fill_hash(kind: &str, brush: &Brush, stretch: bool) -> ContentHash {
    let mut hasher = ContentHasher::new();
    hasher
        .write(kind)
        .write_hash(brush.content_hash())
        .write(&stretch);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{color::Color, effect::tests::SquareResource, resource::Resource};

    fn solid(color: &str) -> Brush {
        Brush::solid(Color::new(color).unwrap())
    }

    #[test]
    fn test_texture_hash_refreshed_by_setters() {
        let mut texture = TextureEffect::new(solid("red"), false);
        let initial = texture.content_hash();

        texture.set_stretch(true);
        let stretched = texture.content_hash();
        assert_ne!(initial, stretched);

        texture.set_brush(solid("green"));
        assert_ne!(texture.content_hash(), stretched);

        texture.set_brush(solid("red"));
        texture.set_stretch(false);
        assert_eq!(texture.content_hash(), initial);
    }

    #[test]
    fn test_texture_and_background_hash_differ() {
        let texture = TextureEffect::new(solid("red"), false);
        let background = BackgroundEffect::new(solid("red"), false);
        assert_ne!(texture.content_hash(), background.content_hash());
    }

    #[test]
    fn test_texture_recolors_content_only() {
        let square = SquareResource {
            rect: Rect::new(0.0, 0.0, 2.0, 2.0),
            color: "black",
        };
        let texture = TextureEffect::new(solid("lime"), false);
        let mut painter = Painter::new(4, 2, 1.0).unwrap();
        texture.apply(
            &mut painter,
            Rect::new(0.0, 0.0, 4.0, 2.0),
            &mut |painter: &mut Painter| square.draw(painter),
        );

        let inside = painter.pixmap().pixel(1, 1).unwrap();
        assert_eq!((inside.green(), inside.alpha()), (255, 255));
        assert_eq!(painter.pixmap().pixel(3, 1).unwrap().alpha(), 0);
    }

    #[test]
    fn test_background_drawn_below_content() {
        let square = SquareResource {
            rect: Rect::new(0.0, 0.0, 2.0, 2.0),
            color: "black",
        };
        let background = BackgroundEffect::new(solid("white"), false);
        let mut painter = Painter::new(4, 2, 1.0).unwrap();
        background.apply(
            &mut painter,
            Rect::new(0.0, 0.0, 4.0, 2.0),
            &mut |painter: &mut Painter| square.draw(painter),
        );

        let content = painter.pixmap().pixel(1, 1).unwrap();
        let fill = painter.pixmap().pixel(3, 1).unwrap();
        assert_eq!(content.red(), 0);
        assert_eq!(fill.red(), 255);
    }
}
