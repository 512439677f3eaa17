//! Linear layout: items in a row or a column.

use crate::{
    geometry::{Orientation, Rect},
    item::ItemGeometry,
    layout::{LayoutAlgorithm, LayoutMetrics, Placement},
};

/// Sequences items along one axis.
///
/// Arranging runs these steps:
///
/// 1. Every item's cross-axis position is reset to zero.
/// 2. The reference extent is the union of the rects of all fixed-size items
///    along the cross axis.
/// 3. Resizable items are scaled to span the reference extent exactly and
///    moved to its start. Without fixed-size items they keep their natural
///    size.
/// 4. Items are placed along the main axis: the first at `0`, each following
///    one after the previous item's advance (or, with `ignore_advance`, right
///    after the previous item's rect) plus `spacing`.
/// 5. Fixed-size items are aligned inside the resulting frame according to
///    the cross-axis component of their [`crate::layout::Alignment`].
/// 6. The main-axis advance spans from the first item's position to the last
///    item's position plus its advance; the cross-axis advance is the largest
///    cross-axis rect extent or advance of any item.
///
/// # Examples
///
/// ```
/// # use clockface_core::{geometry::{Orientation, Rect}, item::ItemGeometry};
/// # use clockface_core::layout::{LayoutAlgorithm, LinearLayout};
/// let mut items = vec![
///     ItemGeometry::new(Rect::new(0.0, -8.0, 5.0, 10.0), 6.0, 10.0),
///     ItemGeometry::new(Rect::new(0.0, -8.0, 5.0, 10.0), 6.0, 10.0),
/// ];
/// let metrics = LinearLayout::new(Orientation::Horizontal)
///     .with_spacing(2.0)
///     .arrange(&mut items);
///
/// assert_eq!(items[1].position().x(), 8.0);
/// assert_eq!(metrics.advance_x(), 14.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearLayout {
    orientation: Orientation,
    spacing: f32,
    ignore_advance: bool,
}

impl LinearLayout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            spacing: 0.0,
            ignore_advance: false,
        }
    }

    /// Sets the gap added between consecutive items (builder style).
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Packs items by their rects instead of their advances (builder style).
    pub fn with_ignore_advance(mut self, ignore_advance: bool) -> Self {
        self.ignore_advance = ignore_advance;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn ignore_advance(&self) -> bool {
        self.ignore_advance
    }

    fn fit_resizable(&self, items: &mut [ItemGeometry]) {
        let cross = self.orientation.orthogonal();
        let reference = items
            .iter()
            .filter(|item| !item.is_resize_enabled())
            .map(ItemGeometry::rect)
            .filter(|rect| !rect.is_empty())
            .reduce(Rect::union);

        for item in items.iter_mut().filter(|item| item.is_resize_enabled()) {
            match reference {
                Some(extent) => {
                    item.resize(extent.dimension(cross), cross);
                    let offset = extent.min(cross) - item.rect().min(cross);
                    item.set_position(item.position().with_coord(cross, offset));
                }
                None => item.reset_resize(),
            }
        }
    }

    fn sequence(&self, items: &mut [ItemGeometry]) {
        let main = self.orientation;
        let mut position = 0.0;
        for index in 0..items.len() {
            if let Some(prev) = index.checked_sub(1).map(|prev| &items[prev]) {
                let step = if self.ignore_advance {
                    prev.rect().max(main) - items[index].rect().min(main)
                } else {
                    prev.advance(main)
                };
                position = prev.position().coord(main) + step + self.spacing;
            }
            let item = &mut items[index];
            item.set_position(item.position().with_coord(main, position));
        }
    }

    fn align(&self, items: &mut [ItemGeometry]) {
        let cross = self.orientation.orthogonal();
        let frame = placed_bounds(items);
        if frame.is_empty() {
            return;
        }
        for item in items.iter_mut().filter(|item| !item.is_resize_enabled()) {
            let rect = item.rect();
            let offset = match item.alignment().placement(cross) {
                Placement::Start => frame.min(cross) - rect.min(cross),
                Placement::Center => {
                    (frame.min(cross) + frame.max(cross)) / 2.0
                        - (rect.min(cross) + rect.max(cross)) / 2.0
                }
                Placement::End => frame.max(cross) - rect.max(cross),
                Placement::Natural => continue,
            };
            item.set_position(item.position().with_coord(cross, offset));
        }
    }
}

fn placed_bounds(items: &[ItemGeometry]) -> Rect {
    items
        .iter()
        .map(ItemGeometry::placed_rect)
        .fold(Rect::default(), Rect::union)
}

impl LayoutAlgorithm for LinearLayout {
    fn arrange(&self, items: &mut [ItemGeometry]) -> LayoutMetrics {
        assert!(!items.is_empty(), "cannot arrange a layout without items");
        let main = self.orientation;
        let cross = main.orthogonal();

        for item in items.iter_mut() {
            item.set_position(item.position().with_coord(cross, 0.0));
        }
        self.fit_resizable(items);
        self.sequence(items);
        self.align(items);

        let rect = placed_bounds(items);
        let first = &items[0];
        let last = &items[items.len() - 1];
        let main_advance =
            last.position().coord(main) - first.position().coord(main) + last.advance(main);
        let cross_advance = items
            .iter()
            .map(|item| item.rect().dimension(cross).max(item.advance(cross)))
            .fold(0.0, f32::max);

        LayoutMetrics::from_axes(main, rect, main_advance, cross_advance)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::layout::{Alignment, HorizontalAlignment, VerticalAlignment};

    fn reference_items() -> Vec<ItemGeometry> {
        vec![
            ItemGeometry::new(Rect::new(0.0, -4.0, 5.0, 6.0), 5.0, 5.0),
            ItemGeometry::new(Rect::new(-1.0, -3.0, 4.0, 7.0), 5.0, 4.0),
            ItemGeometry::new(Rect::new(-1.0, -5.0, 4.0, 6.0), 3.0, 8.0),
            ItemGeometry::new(Rect::new(-2.0, -2.0, 5.0, 5.0), 5.0, 4.0),
        ]
    }

    fn main_positions(items: &[ItemGeometry], axis: Orientation) -> Vec<f32> {
        items.iter().map(|item| item.position().coord(axis)).collect()
    }

    #[test]
    fn test_horizontal_positions_and_bounds() {
        let mut items = reference_items();
        let metrics = LinearLayout::new(Orientation::Horizontal).arrange(&mut items);

        assert_eq!(
            main_positions(&items, Orientation::Horizontal),
            vec![0.0, 5.0, 10.0, 13.0]
        );
        assert_eq!(metrics.rect(), Rect::new(0.0, -5.0, 16.0, 9.0));
        assert_approx_eq!(f32, metrics.advance_x(), 18.0);
        assert_approx_eq!(f32, metrics.advance_y(), 8.0);
    }

    #[test]
    fn test_spacing_added_between_items() {
        let mut items = reference_items();
        LinearLayout::new(Orientation::Horizontal)
            .with_spacing(2.0)
            .arrange(&mut items);

        assert_eq!(
            main_positions(&items, Orientation::Horizontal),
            vec![0.0, 7.0, 14.0, 19.0]
        );
    }

    #[test]
    fn test_ignore_advance_packs_by_rect() {
        let mut items = reference_items();
        LinearLayout::new(Orientation::Horizontal)
            .with_ignore_advance(true)
            .arrange(&mut items);

        // prev.pos + prev.rect.right - item.rect.left
        assert_eq!(
            main_positions(&items, Orientation::Horizontal),
            vec![0.0, 6.0, 10.0, 15.0]
        );
    }

    #[test]
    fn test_vertical_sequencing() {
        let mut items = reference_items();
        let metrics = LinearLayout::new(Orientation::Vertical).arrange(&mut items);

        assert_eq!(
            main_positions(&items, Orientation::Vertical),
            vec![0.0, 5.0, 9.0, 17.0]
        );
        assert_approx_eq!(f32, metrics.advance_y(), 21.0);
        assert_approx_eq!(f32, metrics.advance_x(), 5.0);
    }

    #[test]
    fn test_stale_cross_position_reset() {
        let mut items = reference_items();
        for item in items.iter_mut() {
            item.set_position(item.position().with_coord(Orientation::Vertical, 40.0));
        }
        let metrics = LinearLayout::new(Orientation::Horizontal).arrange(&mut items);
        assert_eq!(metrics.rect(), Rect::new(0.0, -5.0, 16.0, 9.0));
    }

    #[test]
    fn test_arrange_is_idempotent() {
        let layout = LinearLayout::new(Orientation::Horizontal).with_spacing(1.5);
        let mut items = reference_items();
        items[1] = items[1].clone().with_resize_enabled(true);
        items[3].set_alignment(Alignment::new(
            HorizontalAlignment::Justify,
            VerticalAlignment::Bottom,
        ));

        let first = layout.arrange(&mut items);
        let snapshot = items.clone();
        let second = layout.arrange(&mut items);

        assert_eq!(first, second);
        assert_eq!(items, snapshot);
    }

    #[test]
    fn test_resizable_item_fills_cross_extent() {
        let mut items = vec![
            ItemGeometry::new(Rect::new(0.0, -8.0, 5.0, 10.0), 6.0, 10.0),
            ItemGeometry::new(Rect::new(0.0, 0.0, 2.0, 4.0), 2.0, 4.0).with_resize_enabled(true),
        ];
        LinearLayout::new(Orientation::Horizontal).arrange(&mut items);

        let resized = &items[1];
        assert_approx_eq!(f32, resized.resize_scale(), 2.5);
        assert_approx_eq!(f32, resized.rect().width(), 5.0);
        assert_approx_eq!(f32, resized.placed_rect().y(), -8.0);
        assert_approx_eq!(f32, resized.placed_rect().bottom(), 2.0);
    }

    #[test]
    fn test_only_resizable_items_keep_natural_size() {
        let mut items = vec![
            ItemGeometry::new(Rect::new(0.0, 0.0, 2.0, 4.0), 2.0, 4.0).with_resize_enabled(true),
            ItemGeometry::new(Rect::new(0.0, 0.0, 3.0, 9.0), 3.0, 9.0).with_resize_enabled(true),
        ];
        LinearLayout::new(Orientation::Horizontal).arrange(&mut items);

        assert_eq!(items[0].resize_scale(), 1.0);
        assert_eq!(items[1].resize_scale(), 1.0);
        assert_eq!(items[1].rect(), Rect::new(0.0, 0.0, 3.0, 9.0));
    }

    #[test]
    fn test_alignment_within_frame() {
        let align = |vertical| {
            Alignment::new(HorizontalAlignment::Justify, vertical)
        };
        let mut items = vec![
            ItemGeometry::new(Rect::new(0.0, 0.0, 2.0, 10.0), 2.0, 10.0),
            ItemGeometry::new(Rect::new(0.0, 0.0, 2.0, 2.0), 2.0, 2.0)
                .with_alignment(align(VerticalAlignment::Top)),
            ItemGeometry::new(Rect::new(0.0, 0.0, 2.0, 2.0), 2.0, 2.0)
                .with_alignment(align(VerticalAlignment::Center)),
            ItemGeometry::new(Rect::new(0.0, 0.0, 2.0, 2.0), 2.0, 2.0)
                .with_alignment(align(VerticalAlignment::Bottom)),
        ];
        LinearLayout::new(Orientation::Horizontal).arrange(&mut items);

        assert_approx_eq!(f32, items[1].placed_rect().y(), 0.0);
        assert_approx_eq!(f32, items[2].placed_rect().y(), 4.0);
        assert_approx_eq!(f32, items[3].placed_rect().bottom(), 10.0);
    }

    #[test]
    #[should_panic(expected = "without items")]
    fn test_empty_layout_panics() {
        LinearLayout::new(Orientation::Horizontal).arrange(&mut []);
    }
}
