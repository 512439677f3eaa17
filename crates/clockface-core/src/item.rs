//! Geometry items and the item tree.
//!
//! # Overview
//!
//! - [`ItemGeometry`]: intrinsic rect and advances, a transform, an optional
//!   resize factor, and the cached result of applying them
//! - [`ItemTree`]: an arena of leaf items (wrapping a [`Resource`]) and layout
//!   items (owning ordered children and a [`LayoutAlgorithm`])
//! - [`TreeResource`]: exposes a built tree as a [`Resource`]
//!
//! # Geometry updates
//!
//! Cached geometry is recomputed only on request. [`ItemTree::set_transform`]
//! updates the item itself and stops there; [`ItemTree::update_geometry`]
//! recomputes the item, re-runs its layout algorithm if it has one, and then
//! walks up the parent chain doing the same for every ancestor.
//!
//! Parents are stored as handles. Once a parent is removed from the tree the
//! handle no longer resolves and propagation silently stops.

use std::rc::Rc;

use log::trace;
use slotmap::{SlotMap, new_key_type};

use crate::{
    draw::Painter,
    geometry::{Orientation, Point, Rect, Transform},
    hash::{ContentHash, ContentHasher},
    layout::{Alignment, LayoutAlgorithm, LayoutMetrics},
    resource::{Resource, ResourceRef},
};

/// Geometry of one item.
///
/// The current rect is always `transform.map_rect(intrinsic_rect)`, scaled by
/// the resize factor when resizing is enabled. Advances follow the scale part of
/// the transform and the same resize factor. The position is assigned by the
/// owning layout and applied after everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGeometry {
    intrinsic_rect: Rect,
    intrinsic_advance_x: f32,
    intrinsic_advance_y: f32,
    transform: Transform,
    resize_enabled: bool,
    resize_scale: f32,
    rect: Rect,
    advance_x: f32,
    advance_y: f32,
    position: Point,
    alignment: Alignment,
}

impl ItemGeometry {
    pub fn new(rect: Rect, advance_x: f32, advance_y: f32) -> Self {
        Self {
            intrinsic_rect: rect,
            intrinsic_advance_x: advance_x,
            intrinsic_advance_y: advance_y,
            transform: Transform::identity(),
            resize_enabled: false,
            resize_scale: 1.0,
            rect,
            advance_x,
            advance_y,
            position: Point::default(),
            alignment: Alignment::default(),
        }
    }

    /// Sets the alignment (builder style).
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Enables resizing (builder style).
    pub fn with_resize_enabled(mut self, enabled: bool) -> Self {
        self.set_resize_enabled(enabled);
        self
    }

    /// Sets the transform (builder style).
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.set_transform(transform);
        self
    }

    /// Current rect, before the position is applied
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn advance_x(&self) -> f32 {
        self.advance_x
    }

    pub fn advance_y(&self) -> f32 {
        self.advance_y
    }

    pub fn advance(&self, axis: Orientation) -> f32 {
        match axis {
            Orientation::Horizontal => self.advance_x,
            Orientation::Vertical => self.advance_y,
        }
    }

    pub fn intrinsic_rect(&self) -> Rect {
        self.intrinsic_rect
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Current rect in the parent's coordinates
    pub fn placed_rect(&self) -> Rect {
        self.rect.translate(self.position)
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Replaces the transform and recomputes the cached geometry.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.recompute();
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub fn is_resize_enabled(&self) -> bool {
        self.resize_enabled
    }

    pub fn resize_scale(&self) -> f32 {
        self.resize_scale
    }

    /// Enables or disables resizing; disabling restores the unscaled geometry.
    pub fn set_resize_enabled(&mut self, enabled: bool) {
        self.resize_enabled = enabled;
        if !enabled {
            self.resize_scale = 1.0;
        }
        self.recompute();
    }

    /// Scales the item uniformly so its extent along `axis` becomes `length`.
    ///
    /// Only meaningful while resizing is enabled; otherwise, or when the
    /// transformed intrinsic extent is zero, the call is ignored.
    pub fn resize(&mut self, length: f32, axis: Orientation) {
        if !self.resize_enabled {
            trace!(length, axis:?; "Ignoring resize of a fixed-size item");
            return;
        }
        let extent = self
            .transform
            .map_rect(self.intrinsic_rect)
            .dimension(axis);
        if extent <= 0.0 || !length.is_finite() {
            return;
        }
        self.resize_scale = length / extent;
        self.recompute();
    }

    /// Returns to the natural size while keeping resizing enabled.
    pub fn reset_resize(&mut self) {
        self.resize_scale = 1.0;
        self.recompute();
    }

    /// Replaces the intrinsic rect and advances and recomputes.
    pub fn set_intrinsic(&mut self, rect: Rect, advance_x: f32, advance_y: f32) {
        self.intrinsic_rect = rect;
        self.intrinsic_advance_x = advance_x;
        self.intrinsic_advance_y = advance_y;
        self.recompute();
    }

    /// Recomputes the cached rect and advances from the intrinsic values.
    pub fn recompute(&mut self) {
        let scale = self.effective_scale();
        self.rect = self.transform.map_rect(self.intrinsic_rect).scale(scale);
        self.advance_x = self.intrinsic_advance_x * self.transform.scale_x() * scale;
        self.advance_y = self.intrinsic_advance_y * self.transform.scale_y() * scale;
    }

    /// Maps the item's intrinsic coordinates into its parent's coordinates.
    pub fn render_transform(&self) -> Transform {
        let scale = self.effective_scale();
        self.transform
            .then(Transform::scale(scale, scale))
            .then(Transform::translation(self.position.x(), self.position.y()))
    }

    fn effective_scale(&self) -> f32 {
        if self.resize_enabled {
            self.resize_scale
        } else {
            1.0
        }
    }
}

new_key_type! {
    /// Handle to an item stored in an [`ItemTree`].
    pub struct ItemId;
}

#[derive(Debug)]
struct LayoutNode {
    algorithm: Box<dyn LayoutAlgorithm>,
    children: Vec<ItemId>,
    relayouts: u32,
}

#[derive(Debug)]
enum ItemKind {
    Leaf(ResourceRef),
    Layout(LayoutNode),
}

#[derive(Debug)]
struct ItemNode {
    geometry: ItemGeometry,
    parent: Option<ItemId>,
    kind: ItemKind,
}

/// Arena of geometry items.
///
/// Children are rendered in insertion order, so later children paint over
/// earlier ones.
#[derive(Debug, Default)]
pub struct ItemTree {
    items: SlotMap<ItemId, ItemNode>,
}

impl ItemTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a leaf item whose intrinsic geometry comes from `resource`.
    pub fn add_leaf(&mut self, resource: ResourceRef) -> ItemId {
        let geometry = ItemGeometry::new(
            resource.rect(),
            resource.advance_x(),
            resource.advance_y(),
        );
        self.items.insert(ItemNode {
            geometry,
            parent: None,
            kind: ItemKind::Leaf(resource),
        })
    }

    /// Adds an empty layout item.
    pub fn add_layout(&mut self, algorithm: impl LayoutAlgorithm + 'static) -> ItemId {
        self.items.insert(ItemNode {
            geometry: ItemGeometry::new(Rect::default(), 0.0, 0.0),
            parent: None,
            kind: ItemKind::Layout(LayoutNode {
                algorithm: Box::new(algorithm),
                children: Vec::new(),
                relayouts: 0,
            }),
        })
    }

    /// Appends `child` to the children of `layout`.
    ///
    /// Geometry is not updated; call [`ItemTree::update_geometry`] once all
    /// children are in place.
    ///
    /// # Panics
    ///
    /// Panics when `layout` is not a layout item, when either item is missing,
    /// or when `child` already has a parent.
    pub fn append(&mut self, layout: ItemId, child: ItemId) {
        assert_ne!(layout, child, "an item cannot contain itself");
        assert!(
            self.parent(child).is_none(),
            "item already belongs to a layout"
        );
        match self.items.get_mut(layout).map(|node| &mut node.kind) {
            Some(ItemKind::Layout(node)) => node.children.push(child),
            _ => panic!("items can only be appended to layout items"),
        }
        let Some(node) = self.items.get_mut(child) else {
            panic!("appended item is not part of the tree");
        };
        node.parent = Some(layout);
    }

    /// Removes an item. Its children stay in the tree without a parent.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let Some(node) = self.items.remove(id) else {
            return false;
        };
        if let Some(ItemNode {
            kind: ItemKind::Layout(parent),
            ..
        }) = node.parent.and_then(|parent| self.items.get_mut(parent))
        {
            parent.children.retain(|child| *child != id);
        }
        true
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn geometry(&self, id: ItemId) -> Option<&ItemGeometry> {
        self.items.get(id).map(|node| &node.geometry)
    }

    /// Parent layout, if it is still part of the tree
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.items
            .get(id)
            .and_then(|node| node.parent)
            .filter(|parent| self.items.contains_key(*parent))
    }

    /// Children in insertion order; empty for leaves.
    pub fn children(&self, id: ItemId) -> &[ItemId] {
        match self.items.get(id).map(|node| &node.kind) {
            Some(ItemKind::Layout(layout)) => &layout.children,
            _ => &[],
        }
    }

    pub fn resource(&self, id: ItemId) -> Option<&ResourceRef> {
        match self.items.get(id).map(|node| &node.kind) {
            Some(ItemKind::Leaf(resource)) => Some(resource),
            _ => None,
        }
    }

    pub fn is_layout(&self, id: ItemId) -> bool {
        matches!(
            self.items.get(id).map(|node| &node.kind),
            Some(ItemKind::Layout(_))
        )
    }

    /// Number of times the layout algorithm of `id` has run.
    pub fn relayout_count(&self, id: ItemId) -> u32 {
        match self.items.get(id).map(|node| &node.kind) {
            Some(ItemKind::Layout(layout)) => layout.relayouts,
            _ => 0,
        }
    }

    /// Replaces the transform of `id` without notifying its parent.
    pub fn set_transform(&mut self, id: ItemId, transform: Transform) {
        if let Some(node) = self.items.get_mut(id) {
            node.geometry.set_transform(transform);
        }
    }

    pub fn set_alignment(&mut self, id: ItemId, alignment: Alignment) {
        if let Some(node) = self.items.get_mut(id) {
            node.geometry.set_alignment(alignment);
        }
    }

    pub fn set_resize_enabled(&mut self, id: ItemId, enabled: bool) {
        if let Some(node) = self.items.get_mut(id) {
            node.geometry.set_resize_enabled(enabled);
        }
    }

    pub fn resize(&mut self, id: ItemId, length: f32, axis: Orientation) {
        if let Some(node) = self.items.get_mut(id) {
            node.geometry.resize(length, axis);
        }
    }

    /// Overrides the intrinsic geometry of `id` without running any algorithm.
    pub fn set_intrinsic(&mut self, id: ItemId, rect: Rect, advance_x: f32, advance_y: f32) {
        if let Some(node) = self.items.get_mut(id) {
            node.geometry.set_intrinsic(rect, advance_x, advance_y);
        }
    }

    /// Recomputes `id`, re-runs its layout algorithm, then does the same for
    /// each ancestor.
    pub fn update_geometry(&mut self, id: ItemId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(node) = self.items.get_mut(id) else {
                break;
            };
            node.geometry.recompute();
            self.relayout(id);
            current = self.parent(id);
        }
    }

    fn relayout(&mut self, id: ItemId) {
        let Some(ItemKind::Layout(layout)) = self.items.get(id).map(|node| &node.kind) else {
            return;
        };
        let (children, mut geometries): (Vec<ItemId>, Vec<ItemGeometry>) = layout
            .children
            .iter()
            .filter_map(|&child| {
                self.items
                    .get(child)
                    .map(|node| (child, node.geometry.clone()))
            })
            .unzip();
        if geometries.is_empty() {
            trace!(id:?; "Skipping layout without children");
            return;
        }
        let metrics: LayoutMetrics = layout.algorithm.arrange(&mut geometries);

        for (child, geometry) in children.into_iter().zip(geometries) {
            if let Some(node) = self.items.get_mut(child) {
                node.geometry = geometry;
            }
        }
        if let Some(node) = self.items.get_mut(id) {
            node.geometry
                .set_intrinsic(metrics.rect(), metrics.advance_x(), metrics.advance_y());
            if let ItemKind::Layout(layout) = &mut node.kind {
                layout.relayouts += 1;
            }
        }
        trace!(id:?, rect:? = metrics.rect(); "Layout arranged");
    }

    /// Draws `id` and its descendants, applying each item's transform.
    pub fn render(&self, id: ItemId, painter: &mut Painter) {
        let Some(node) = self.items.get(id) else {
            return;
        };
        painter.save();
        painter.concat(node.geometry.render_transform());
        match &node.kind {
            ItemKind::Leaf(resource) => resource.draw(painter),
            ItemKind::Layout(layout) => {
                for child in &layout.children {
                    self.render(*child, painter);
                }
            }
        }
        painter.restore();
    }

    /// Summary of everything `render(id)` would paint.
    pub fn content_hash(&self, id: ItemId) -> ContentHash {
        let Some(node) = self.items.get(id) else {
            return ContentHash::INVALID;
        };
        let mut hasher = ContentHasher::new();
        let t = node.geometry.render_transform();
        hasher
            .write_f32(t.m11())
            .write_f32(t.m12())
            .write_f32(t.m21())
            .write_f32(t.m22())
            .write_f32(t.dx())
            .write_f32(t.dy());
        match &node.kind {
            ItemKind::Leaf(resource) => {
                hasher.write("leaf").write_hash(resource.cache_key());
            }
            ItemKind::Layout(layout) => {
                hasher.write("layout").write(&layout.children.len());
                for child in &layout.children {
                    hasher.write_hash(self.content_hash(*child));
                }
            }
        }
        hasher.finish()
    }
}

/// A built item tree drawn as a single resource.
#[derive(Debug, Clone)]
pub struct TreeResource {
    tree: Rc<ItemTree>,
    root: ItemId,
    key: ContentHash,
}

impl TreeResource {
    pub fn new(tree: Rc<ItemTree>, root: ItemId) -> Self {
        let key = tree.content_hash(root);
        Self { tree, root, key }
    }

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    fn root_geometry(&self) -> Option<&ItemGeometry> {
        self.tree.geometry(self.root)
    }
}

impl Resource for TreeResource {
    fn rect(&self) -> Rect {
        self.root_geometry()
            .map(ItemGeometry::placed_rect)
            .unwrap_or_default()
    }

    fn advance_x(&self) -> f32 {
        self.root_geometry().map_or(0.0, ItemGeometry::advance_x)
    }

    fn advance_y(&self) -> f32 {
        self.root_geometry().map_or(0.0, ItemGeometry::advance_y)
    }

    fn cache_key(&self) -> ContentHash {
        self.key
    }

    fn draw(&self, painter: &mut Painter) {
        self.tree.render(self.root, painter);
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::{layout::LinearLayout, resource::BlankResource};

    fn leaf(tree: &mut ItemTree, rect: Rect, advance_x: f32, advance_y: f32) -> ItemId {
        tree.add_leaf(Rc::new(BlankResource::new(rect, advance_x, advance_y)))
    }

    fn glyph(tree: &mut ItemTree) -> ItemId {
        leaf(tree, Rect::new(0.0, -8.0, 5.0, 10.0), 6.0, 10.0)
    }

    #[test]
    fn test_geometry_follows_transform() {
        let mut geometry = ItemGeometry::new(Rect::new(0.0, -4.0, 5.0, 6.0), 5.0, 5.0);
        geometry.set_transform(Transform::scale(2.0, 3.0));

        assert_eq!(geometry.rect(), Rect::new(0.0, -12.0, 10.0, 18.0));
        assert_approx_eq!(f32, geometry.advance_x(), 10.0);
        assert_approx_eq!(f32, geometry.advance_y(), 15.0);
    }

    #[test]
    fn test_resize_scales_both_advances() {
        let mut geometry =
            ItemGeometry::new(Rect::new(0.0, -4.0, 5.0, 8.0), 6.0, 10.0).with_resize_enabled(true);
        geometry.resize(12.0, Orientation::Vertical);

        assert_approx_eq!(f32, geometry.resize_scale(), 1.5);
        assert_approx_eq!(f32, geometry.rect().height(), 12.0);
        assert_approx_eq!(f32, geometry.rect().width(), 7.5);
        assert_approx_eq!(f32, geometry.advance_x(), 9.0);
        assert_approx_eq!(f32, geometry.advance_y(), 15.0);
    }

    #[test]
    fn test_disabling_resize_restores_geometry() {
        let original = ItemGeometry::new(Rect::new(1.0, -4.0, 5.0, 8.0), 6.0, 10.0);
        let mut geometry = original.clone().with_resize_enabled(true);
        geometry.resize(3.0, Orientation::Horizontal);
        geometry.set_resize_enabled(false);

        assert_eq!(geometry.rect(), original.rect());
        assert_eq!(geometry.advance_x(), original.advance_x());
        assert_eq!(geometry.advance_y(), original.advance_y());
        assert_eq!(geometry.resize_scale(), 1.0);
    }

    #[test]
    fn test_resize_ignored_when_disabled() {
        let mut geometry = ItemGeometry::new(Rect::new(0.0, 0.0, 5.0, 8.0), 6.0, 10.0);
        geometry.resize(16.0, Orientation::Vertical);
        assert_eq!(geometry.rect(), Rect::new(0.0, 0.0, 5.0, 8.0));
    }

    #[test]
    fn test_set_transform_does_not_propagate() {
        let mut tree = ItemTree::new();
        let line = tree.add_layout(LinearLayout::new(Orientation::Horizontal));
        let a = glyph(&mut tree);
        tree.append(line, a);
        tree.update_geometry(line);
        let before = tree.geometry(line).unwrap().rect();

        tree.set_transform(a, Transform::scale(2.0, 2.0));

        assert_eq!(tree.relayout_count(line), 1);
        assert_eq!(tree.geometry(line).unwrap().rect(), before);
        assert_approx_eq!(f32, tree.geometry(a).unwrap().rect().width(), 10.0);
    }

    #[test]
    fn test_update_geometry_propagates_once_per_ancestor() {
        let mut tree = ItemTree::new();
        let outer = tree.add_layout(LinearLayout::new(Orientation::Vertical));
        let first_line = tree.add_layout(LinearLayout::new(Orientation::Horizontal));
        let second_line = tree.add_layout(LinearLayout::new(Orientation::Horizontal));
        let changed = glyph(&mut tree);
        let sibling = glyph(&mut tree);
        let unrelated = glyph(&mut tree);
        tree.append(first_line, changed);
        tree.append(first_line, sibling);
        tree.append(second_line, unrelated);
        tree.append(outer, first_line);
        tree.append(outer, second_line);

        tree.set_transform(changed, Transform::scale(2.0, 2.0));
        tree.update_geometry(changed);

        assert_eq!(tree.relayout_count(first_line), 1);
        assert_eq!(tree.relayout_count(outer), 1);
        assert_eq!(tree.relayout_count(second_line), 0);
        assert_approx_eq!(
            f32,
            tree.geometry(sibling).unwrap().position().x(),
            12.0
        );
    }

    #[test]
    fn test_removed_parent_stops_propagation() {
        let mut tree = ItemTree::new();
        let line = tree.add_layout(LinearLayout::new(Orientation::Horizontal));
        let a = glyph(&mut tree);
        tree.append(line, a);

        assert!(tree.remove(line));
        assert_eq!(tree.parent(a), None);
        tree.update_geometry(a);

        assert!(tree.contains(a));
        assert!(!tree.contains(line));
    }

    #[test]
    fn test_remove_detaches_from_parent() {
        let mut tree = ItemTree::new();
        let line = tree.add_layout(LinearLayout::new(Orientation::Horizontal));
        let a = glyph(&mut tree);
        let b = glyph(&mut tree);
        tree.append(line, a);
        tree.append(line, b);

        tree.remove(a);
        tree.update_geometry(line);

        assert_eq!(tree.children(line), &[b]);
        assert_approx_eq!(f32, tree.geometry(line).unwrap().advance_x(), 6.0);
    }

    #[test]
    fn test_empty_layout_keeps_empty_geometry() {
        let mut tree = ItemTree::new();
        let line = tree.add_layout(LinearLayout::new(Orientation::Horizontal));
        tree.update_geometry(line);

        assert!(tree.geometry(line).unwrap().rect().is_empty());
        assert_eq!(tree.relayout_count(line), 0);
    }

    #[test]
    #[should_panic(expected = "already belongs")]
    fn test_append_twice_panics() {
        let mut tree = ItemTree::new();
        let line = tree.add_layout(LinearLayout::new(Orientation::Horizontal));
        let other = tree.add_layout(LinearLayout::new(Orientation::Horizontal));
        let a = glyph(&mut tree);
        tree.append(line, a);
        tree.append(other, a);
    }

    #[test]
    fn test_tree_resource_exposes_root_geometry() {
        let mut tree = ItemTree::new();
        let line = tree.add_layout(LinearLayout::new(Orientation::Horizontal).with_spacing(1.0));
        for _ in 0..3 {
            let item = glyph(&mut tree);
            tree.append(line, item);
        }
        tree.update_geometry(line);

        let resource = TreeResource::new(Rc::new(tree), line);
        assert_eq!(resource.rect(), Rect::new(0.0, -8.0, 19.0, 10.0));
        assert_approx_eq!(f32, resource.advance_x(), 20.0);
        assert!(resource.cache_key().is_valid());
    }

    #[test]
    fn test_tree_hash_tracks_placement() {
        let build = |spacing: f32| {
            let mut tree = ItemTree::new();
            let line =
                tree.add_layout(LinearLayout::new(Orientation::Horizontal).with_spacing(spacing));
            for _ in 0..2 {
                let item = glyph(&mut tree);
                tree.append(line, item);
            }
            tree.update_geometry(line);
            TreeResource::new(Rc::new(tree), line).cache_key()
        };
        assert_eq!(build(1.0), build(1.0));
        assert_ne!(build(1.0), build(2.0));
    }
}
