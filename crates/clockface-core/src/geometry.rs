//! Geometric primitives for skin layout and rendering.
//!
//! This module provides the value types used throughout clockface to describe
//! where glyphs, layouts and effects live.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in logical (device-independent) units
//! - [`Size`] - Width and height dimensions
//! - [`Rect`] - A rectangle defined by its top-left corner and size
//! - [`Transform`] - A 2D affine transform (translation, scale, rotation, shear)
//! - [`Orientation`] - One of the two layout axes
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │   glyph rects usually start above the baseline,
//!     │   so their `y` is negative
//!     ▼
//!    +Y
//! ```
//!
//! The origin of a glyph is its pen position on the baseline. The X axis grows to
//! the right and the Y axis grows downward, like most screen coordinate systems.

use serde::{Deserialize, Serialize};

/// One of the two layout axes.
///
/// Used both as the direction of a linear layout and as the axis argument of
/// resize operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Orientation {
    /// Returns the perpendicular axis.
    pub fn orthogonal(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// A 2D point in logical coordinate space.
///
/// # Examples
///
/// ```
/// # use clockface_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns the coordinate along the given axis
    pub fn coord(self, axis: Orientation) -> f32 {
        match axis {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// Creates a new point with the coordinate along `axis` replaced
    pub fn with_coord(mut self, axis: Orientation, value: f32) -> Self {
        match axis {
            Orientation::Horizontal => self.x = value,
            Orientation::Vertical => self.y = value,
        }
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Multiplies both dimensions by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// An axis-aligned rectangle in logical units.
///
/// A rectangle with a non-positive width or height is *empty*. Empty rectangles
/// are neutral elements for [`Rect::union`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle spanning two corner coordinates
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the top-left corner
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    /// Returns true when the rectangle covers no area
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Returns the center point of the rectangle
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Lower edge along `axis` (left for horizontal, top for vertical)
    pub fn min(self, axis: Orientation) -> f32 {
        match axis {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// Upper edge along `axis` (right for horizontal, bottom for vertical)
    pub fn max(self, axis: Orientation) -> f32 {
        match axis {
            Orientation::Horizontal => self.right(),
            Orientation::Vertical => self.bottom(),
        }
    }

    /// Extent along `axis` (width for horizontal, height for vertical)
    pub fn dimension(self, axis: Orientation) -> f32 {
        match axis {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Replaces the span along `axis` with `[min, max]`
    pub fn with_span(self, axis: Orientation, min: f32, max: f32) -> Self {
        match axis {
            Orientation::Horizontal => Self::new(min, self.y, max - min, self.height),
            Orientation::Vertical => Self::new(self.x, min, self.width, max - min),
        }
    }

    /// Moves the rectangle by the specified offset
    pub fn translate(self, offset: Point) -> Self {
        Self::new(
            self.x + offset.x(),
            self.y + offset.y(),
            self.width,
            self.height,
        )
    }

    /// Scales the rectangle about the coordinate origin
    pub fn scale(self, factor: f32) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Smallest rectangle containing both rectangles.
    ///
    /// Empty rectangles do not contribute to the result.
    ///
    /// # Examples
    ///
    /// ```
    /// # use clockface_core::geometry::Rect;
    /// let a = Rect::new(0.0, -4.0, 5.0, 6.0);
    /// let b = Rect::new(4.0, -3.0, 4.0, 7.0);
    /// assert_eq!(a.union(b), Rect::new(0.0, -4.0, 8.0, 8.0));
    /// assert_eq!(a.union(Rect::default()), a);
    /// ```
    pub fn union(self, other: Self) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        Self::from_ltrb(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }
}

/// A 2D affine transform.
///
/// Points are mapped as
///
/// ```text
/// x' = m11 * x + m21 * y + dx
/// y' = m12 * x + m22 * y + dy
/// ```
///
/// The default value is the identity transform. Transforms compose with
/// [`Transform::then`], where the receiver is applied first.
///
/// # Examples
///
/// ```
/// # use clockface_core::geometry::{Point, Transform};
/// let t = Transform::scale(2.0, 2.0).then(Transform::translation(10.0, 0.0));
/// assert_eq!(t.map_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m11: f32,
    m12: f32,
    m21: f32,
    m22: f32,
    dx: f32,
    dy: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Creates a transform from its six matrix components
    pub fn from_row(m11: f32, m12: f32, m21: f32, m22: f32, dx: f32, dy: f32) -> Self {
        Self {
            m11,
            m12,
            m21,
            m22,
            dx,
            dy,
        }
    }

    pub fn identity() -> Self {
        Self::from_row(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn translation(dx: f32, dy: f32) -> Self {
        Self::from_row(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::from_row(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Clockwise rotation (on a Y-down screen) by `degrees`
    pub fn rotation(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::from_row(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Horizontal and vertical shear
    pub fn shear(sh: f32, sv: f32) -> Self {
        Self::from_row(1.0, sv, sh, 1.0, 0.0, 0.0)
    }

    pub fn m11(self) -> f32 {
        self.m11
    }

    pub fn m12(self) -> f32 {
        self.m12
    }

    pub fn m21(self) -> f32 {
        self.m21
    }

    pub fn m22(self) -> f32 {
        self.m22
    }

    pub fn dx(self) -> f32 {
        self.dx
    }

    pub fn dy(self) -> f32 {
        self.dy
    }

    /// Horizontal scale component; the only part of the transform that affects
    /// the horizontal advance
    pub fn scale_x(self) -> f32 {
        self.m11
    }

    /// Vertical scale component; the only part of the transform that affects
    /// the vertical advance
    pub fn scale_y(self) -> f32 {
        self.m22
    }

    pub fn is_identity(self) -> bool {
        self == Self::identity()
    }

    /// Length of the mapped unit vectors, i.e. how much one logical unit along
    /// each axis grows on the output.
    pub fn axis_scales(self) -> (f32, f32) {
        (self.m11.hypot(self.m12), self.m21.hypot(self.m22))
    }

    /// Returns the transform that applies `self` first and `next` afterwards
    pub fn then(self, next: Self) -> Self {
        Self {
            m11: self.m11 * next.m11 + self.m12 * next.m21,
            m12: self.m11 * next.m12 + self.m12 * next.m22,
            m21: self.m21 * next.m11 + self.m22 * next.m21,
            m22: self.m21 * next.m12 + self.m22 * next.m22,
            dx: self.dx * next.m11 + self.dy * next.m21 + next.dx,
            dy: self.dx * next.m12 + self.dy * next.m22 + next.dy,
        }
    }

    /// Returns the inverse transform, or `None` when the matrix is singular
    pub fn inverted(self) -> Option<Self> {
        let det = self.m11 * self.m22 - self.m12 * self.m21;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let m11 = self.m22 * inv;
        let m12 = -self.m12 * inv;
        let m21 = -self.m21 * inv;
        let m22 = self.m11 * inv;
        Some(Self {
            m11,
            m12,
            m21,
            m22,
            dx: -(self.dx * m11 + self.dy * m21),
            dy: -(self.dx * m12 + self.dy * m22),
        })
    }

    pub fn map_point(self, p: Point) -> Point {
        Point::new(
            self.m11 * p.x() + self.m21 * p.y() + self.dx,
            self.m12 * p.x() + self.m22 * p.y() + self.dy,
        )
    }

    /// Maps a rectangle and returns the bounding box of the mapped corners.
    pub fn map_rect(self, rect: Rect) -> Rect {
        if self.is_identity() {
            return rect;
        }
        let corners = [
            self.map_point(Point::new(rect.x(), rect.y())),
            self.map_point(Point::new(rect.right(), rect.y())),
            self.map_point(Point::new(rect.x(), rect.bottom())),
            self.map_point(Point::new(rect.right(), rect.bottom())),
        ];
        let (mut left, mut top) = (f32::INFINITY, f32::INFINITY);
        let (mut right, mut bottom) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for corner in corners {
            left = left.min(corner.x());
            top = top.min(corner.y());
            right = right.max(corner.x());
            bottom = bottom.max(corner.y());
        }
        Rect::from_ltrb(left, top, right, bottom)
    }
}
