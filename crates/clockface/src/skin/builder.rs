//! Builds the item tree of one formatted instant.

use std::rc::Rc;

use log::trace;

use clockface_core::{
    cache::CachedResource,
    effect::EffectResource,
    geometry::{Orientation, Transform},
    item::{ItemId, ItemTree, TreeResource},
    layout::LinearLayout,
    resource::{DebugOverlay, InvisibleResource, ResourceRef, StampedResource},
};
use clockface_format::FormatSink;

use super::Skin;

/// Turns format callbacks into glyph items.
///
/// Each character becomes a leaf wrapped in the skin's per-element effects,
/// the configuration stamp and the bitmap cache. Leaves are collected into a
/// line layout; line breaks start a new line, and several lines are stacked
/// by a layout along the orthogonal axis.
pub(super) struct GlyphLayoutBuilder<'a> {
    skin: &'a Skin,
    tree: ItemTree,
    line: Option<ItemId>,
    lines: Vec<ItemId>,
    token_transform: Option<Transform>,
    separator_index: usize,
    glyph_scale: f32,
}

impl<'a> GlyphLayoutBuilder<'a> {
    pub(super) fn new(skin: &'a Skin) -> Self {
        let line_height = skin.factory().line_height();
        let glyph_scale = match skin.config().glyph_base_height() {
            Some(height) if line_height > 0.0 => height / line_height,
            _ => 1.0,
        };
        Self {
            skin,
            tree: ItemTree::new(),
            line: None,
            lines: Vec::new(),
            token_transform: None,
            separator_index: 0,
            glyph_scale,
        }
    }

    fn orientation(&self) -> Orientation {
        self.skin.config().orientation()
    }

    fn linear_layout(&self, orientation: Orientation) -> LinearLayout {
        let config = self.skin.config();
        LinearLayout::new(orientation)
            .with_spacing(config.spacing())
            .with_ignore_advance(config.ignore_advance(orientation))
    }

    fn current_line(&mut self) -> ItemId {
        if let Some(line) = self.line {
            return line;
        }
        let line = self.tree.add_layout(self.linear_layout(self.orientation()));
        self.tree
            .set_alignment(line, self.skin.config().line_alignment());
        self.line = Some(line);
        line
    }

    /// Wraps a glyph in the per-element decorators.
    fn decorate(&self, glyph: ResourceRef) -> ResourceRef {
        let mut resource = glyph;
        if let Some(effect) = self.skin.element_effect() {
            resource = Rc::new(EffectResource::new(resource, Rc::clone(effect)));
        }
        resource = Rc::new(StampedResource::new(resource, self.skin.stamp()));
        resource = Rc::new(CachedResource::new(resource, Rc::clone(self.skin.cache())));
        if self.skin.debug_overlay() {
            resource = Rc::new(DebugOverlay::new(resource));
        }
        resource
    }

    fn push(&mut self, glyph: ResourceRef) {
        let leaf = self.tree.add_leaf(self.decorate(glyph));
        let mut transform = Transform::scale(self.glyph_scale, self.glyph_scale);
        if let Some(token) = self.token_transform {
            transform = transform.then(token);
        }
        if !transform.is_identity() {
            self.tree.set_transform(leaf, transform);
        }
        let line = self.current_line();
        self.tree.append(line, leaf);
    }

    fn finish_line(&mut self) {
        let Some(line) = self.line.take() else {
            return;
        };
        if self.tree.children(line).is_empty() {
            self.tree.remove(line);
            return;
        }
        self.tree.update_geometry(line);

        let config = self.skin.config();
        if config.respect_line_spacing() && self.orientation() == Orientation::Horizontal {
            let factory = self.skin.factory();
            let ascent = factory.ascent() * self.glyph_scale;
            let descent = factory.descent() * self.glyph_scale;
            if let Some(geometry) = self.tree.geometry(line) {
                // nominal span, grown to fit enlarged or displaced glyphs
                let ink = geometry.intrinsic_rect();
                let top = ink.min(Orientation::Vertical).min(-ascent);
                let bottom = ink.max(Orientation::Vertical).max(descent);
                let rect = ink.with_span(Orientation::Vertical, top, bottom);
                let advance_x = geometry.advance_x();
                let advance_y = geometry.advance_y().max(bottom - top);
                self.tree.set_intrinsic(line, rect, advance_x, advance_y);
            }
        }
        self.lines.push(line);
    }

    /// Completes the last line and returns the finished layout.
    pub(super) fn finish(mut self) -> TreeResource {
        self.finish_line();

        let root = match self.lines.as_slice() {
            [line] => *line,
            lines => {
                let lines = lines.to_vec();
                let root = self
                    .tree
                    .add_layout(self.linear_layout(self.orientation().orthogonal()));
                for line in lines {
                    self.tree.append(root, line);
                }
                self.tree.update_geometry(root);
                root
            }
        };
        trace!(lines = self.lines.len(), items = self.tree.len(); "Glyph layout built");
        TreeResource::new(Rc::new(self.tree), root)
    }
}

impl FormatSink for GlyphLayoutBuilder<'_> {
    fn literal(&mut self, ch: char) {
        match self.skin.factory().glyph(ch) {
            Some(glyph) => self.push(glyph),
            None => trace!(ch:?; "Skipping character without glyph"),
        }
    }

    fn separator(&mut self, ch: char) {
        let config = self.skin.config();
        let index = self.separator_index;
        self.separator_index += 1;

        let ch = if config.use_custom_separators() {
            config.custom_separators().get(index).copied().unwrap_or(ch)
        } else {
            ch
        };
        let factory = self.skin.factory();
        let Some(glyph) = factory.glyph(ch) else {
            trace!(ch:?; "Skipping separator without glyph");
            return;
        };

        let glyph = if self.skin.is_separator_visible() {
            glyph
        } else {
            factory
                .blank_separator()
                .unwrap_or_else(|| Rc::new(InvisibleResource::new(glyph)))
        };
        self.push(glyph);
    }

    fn token_start(&mut self, pattern: &str) {
        self.token_transform = self
            .skin
            .config()
            .token_transform(pattern)
            .map(|transform| transform.to_transform());
    }

    fn token_end(&mut self, _pattern: &str) {
        self.token_transform = None;
    }

    fn line_break(&mut self) {
        self.finish_line();
    }
}
