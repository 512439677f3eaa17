//! Layout algorithms.
//!
//! A layout item in an [`crate::item::ItemTree`] delegates the placement of its
//! children to a [`LayoutAlgorithm`]. The algorithm receives the children's
//! committed geometries, assigns their positions (and resize factors), and
//! returns the layout's own rect and advances.
//!
//! [`LinearLayout`] is the algorithm used by clock skins.

mod linear;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use linear::LinearLayout;

use crate::{
    geometry::{Orientation, Rect},
    item::ItemGeometry,
};

/// Horizontal placement of an item inside its layout frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
    /// Keep the position computed by the algorithm
    #[default]
    Justify,
}

/// Vertical placement of an item inside its layout frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    /// Keep the position computed by the algorithm
    #[default]
    Baseline,
}

/// Per-item alignment; only the component along the layout's cross axis is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Alignment {
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
}

/// Where an item lands along one axis of its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Start,
    Center,
    End,
    Natural,
}

impl Alignment {
    pub fn new(horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn horizontal(&self) -> HorizontalAlignment {
        self.horizontal
    }

    pub fn vertical(&self) -> VerticalAlignment {
        self.vertical
    }

    pub(crate) fn placement(&self, axis: Orientation) -> Placement {
        match axis {
            Orientation::Horizontal => match self.horizontal {
                HorizontalAlignment::Left => Placement::Start,
                HorizontalAlignment::Center => Placement::Center,
                HorizontalAlignment::Right => Placement::End,
                HorizontalAlignment::Justify => Placement::Natural,
            },
            Orientation::Vertical => match self.vertical {
                VerticalAlignment::Top => Placement::Start,
                VerticalAlignment::Center => Placement::Center,
                VerticalAlignment::Bottom => Placement::End,
                VerticalAlignment::Baseline => Placement::Natural,
            },
        }
    }
}

/// Geometry computed for a layout from its children.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutMetrics {
    rect: Rect,
    advance_x: f32,
    advance_y: f32,
}

impl LayoutMetrics {
    pub fn new(rect: Rect, advance_x: f32, advance_y: f32) -> Self {
        Self {
            rect,
            advance_x,
            advance_y,
        }
    }

    /// Builds metrics from main/cross-axis advances.
    pub fn from_axes(main: Orientation, rect: Rect, main_advance: f32, cross_advance: f32) -> Self {
        match main {
            Orientation::Horizontal => Self::new(rect, main_advance, cross_advance),
            Orientation::Vertical => Self::new(rect, cross_advance, main_advance),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn advance_x(&self) -> f32 {
        self.advance_x
    }

    pub fn advance_y(&self) -> f32 {
        self.advance_y
    }
}

/// Places the children of a layout item.
pub trait LayoutAlgorithm: fmt::Debug {
    /// Positions `items` in place and returns the layout's own metrics.
    ///
    /// # Panics
    ///
    /// Implementations may panic when `items` is empty; callers guard against
    /// arranging a layout without children.
    fn arrange(&self, items: &mut [ItemGeometry]) -> LayoutMetrics;
}
