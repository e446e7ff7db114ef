//! Integer pixel coordinates for the canvas world space.
//!
//! The canvas is unbounded in every direction, so all types here accept
//! negative values. Origin (0, 0) is the stagger origin of column zero, x grows
//! to the right and y grows downward.
//!
//! # Key Types
//!
//! - [`Px`] - a single signed pixel value
//! - [`PxPosition`] - a 2D point, also used for pan offsets
//! - [`PxSize`] - a width/height pair
//! - [`PxRect`] - an axis-aligned rectangle with half-open edges
//!
//! # Example
//!
//! ```
//! use mosaic_ui::px::{Px, PxPosition, PxRect, PxSize};
//!
//! let viewport = PxRect::from_position_size(
//!     PxPosition::new(Px(-200), Px(-200)),
//!     PxSize::new(Px(1400), Px(1200)),
//! );
//! let card = PxRect::new(Px(0), Px(0), Px(240), Px(320));
//! assert!(viewport.intersects(&card));
//! ```

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A signed physical pixel value.
///
/// Arithmetic through the operator traits wraps like plain `i32`; use the
/// `saturating_*` helpers where values come from user input or unbounded
/// accumulation.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// The largest representable pixel value.
    pub const MAX: Self = Self(i32::MAX);

    /// The smallest representable pixel value.
    pub const MIN: Self = Self(i32::MIN);

    /// Creates a new `Px` from a raw value.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Returns the raw i32 value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Converts to `f32`.
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }

    /// Converts from `f32`, truncating toward zero and clamping to the i32
    /// range. `NaN` maps to zero.
    ///
    /// ```
    /// use mosaic_ui::px::Px;
    ///
    /// assert_eq!(Px::saturating_from_f32(12.9), Px(12));
    /// assert_eq!(Px::saturating_from_f32(f32::MAX), Px::MAX);
    /// assert_eq!(Px::saturating_from_f32(f32::NAN), Px::ZERO);
    /// ```
    pub fn saturating_from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Px::ZERO;
        }
        let clamped_value = value.clamp(i32::MIN as f32, i32::MAX as f32);
        Px(clamped_value as i32)
    }

    /// Converts from `i64`, clamping to the i32 range.
    pub fn saturating_from_i64(value: i64) -> Self {
        if value > i64::from(i32::MAX) {
            Px::MAX
        } else if value < i64::from(i32::MIN) {
            Px::MIN
        } else {
            Px(value as i32)
        }
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }

    /// Saturating multiplication by a signed integer factor.
    pub fn saturating_mul(self, times: i64) -> Self {
        Px::saturating_from_i64(i64::from(self.0).saturating_mul(times))
    }

    /// Scales by a floating point factor, saturating at the i32 bounds.
    pub fn mul_f32(self, rhs: f32) -> Self {
        Px::saturating_from_f32(self.0 as f32 * rhs)
    }
}

impl Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Px(self.0 + rhs.0)
    }
}

impl Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Px(self.0 - rhs.0)
    }
}

impl Neg for Px {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Px(-self.0)
    }
}

impl Mul<i32> for Px {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        Px(self.0 * rhs)
    }
}

impl Div<i32> for Px {
    type Output = Self;

    fn div(self, rhs: i32) -> Self::Output {
        Px(self.0 / rhs)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Px(value)
    }
}

impl From<u32> for Px {
    fn from(value: u32) -> Self {
        Px(value.min(i32::MAX as u32) as i32)
    }
}

/// A 2D point in pixel space.
///
/// Pan offsets are stored as positions too: an offset of `(-300, 0)` means the
/// world has been dragged 300px to the left, so world x = 300 sits at the left
/// edge of the screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PxPosition {
    /// Horizontal coordinate.
    pub x: Px,
    /// Vertical coordinate.
    pub y: Px,
}

impl PxPosition {
    /// The origin.
    pub const ZERO: Self = Self {
        x: Px::ZERO,
        y: Px::ZERO,
    };

    /// Creates a new position.
    pub const fn new(x: Px, y: Px) -> Self {
        Self { x, y }
    }

    /// Returns a copy moved by the given amounts, saturating at the bounds.
    pub fn saturating_offset(self, dx: Px, dy: Px) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Component-wise saturating difference `self - other`.
    pub fn saturating_sub(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_sub(other.x),
            y: self.y.saturating_sub(other.y),
        }
    }
}

impl Add for PxPosition {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        PxPosition {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for PxPosition {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        PxPosition {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl From<[i32; 2]> for PxPosition {
    fn from(pos: [i32; 2]) -> Self {
        PxPosition {
            x: Px(pos[0]),
            y: Px(pos[1]),
        }
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PxSize {
    /// Horizontal extent.
    pub width: Px,
    /// Vertical extent.
    pub height: Px,
}

impl PxSize {
    /// An empty size.
    pub const ZERO: Self = Self {
        width: Px::ZERO,
        height: Px::ZERO,
    };

    /// Creates a new size.
    pub const fn new(width: Px, height: Px) -> Self {
        Self { width, height }
    }
}

impl From<[i32; 2]> for PxSize {
    fn from(size: [i32; 2]) -> Self {
        Self {
            width: Px(size[0]),
            height: Px(size[1]),
        }
    }
}

/// An axis-aligned rectangle.
///
/// Edges are half-open: a rectangle covers `[x, x + width) × [y, y + height)`.
/// Two rectangles that only touch along an edge do not intersect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PxRect {
    /// Left edge.
    pub x: Px,
    /// Top edge.
    pub y: Px,
    /// Width, expected to be non-negative.
    pub width: Px,
    /// Height, expected to be non-negative.
    pub height: Px,
}

impl PxRect {
    /// A zero-sized rectangle at the origin.
    pub const ZERO: Self = Self {
        x: Px::ZERO,
        y: Px::ZERO,
        width: Px::ZERO,
        height: Px::ZERO,
    };

    /// Creates a new rectangle.
    pub const fn new(x: Px, y: Px, width: Px, height: Px) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from its top-left corner and size.
    pub fn from_position_size(position: PxPosition, size: PxSize) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> Px {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> Px {
        self.y.saturating_add(self.height)
    }

    /// Grows the rectangle by `margin` on every side.
    ///
    /// ```
    /// use mosaic_ui::px::{Px, PxRect};
    ///
    /// let rect = PxRect::new(Px(0), Px(0), Px(100), Px(50)).inflate(Px(10));
    /// assert_eq!(rect, PxRect::new(Px(-10), Px(-10), Px(120), Px(70)));
    /// ```
    pub fn inflate(&self, margin: Px) -> Self {
        Self {
            x: self.x.saturating_sub(margin),
            y: self.y.saturating_sub(margin),
            width: self.width.saturating_add(margin.saturating_mul(2)),
            height: self.height.saturating_add(margin.saturating_mul(2)),
        }
    }

    /// Whether the horizontal span `[left, left + width)` overlaps this
    /// rectangle's horizontal span.
    pub fn overlaps_x(&self, left: Px, width: Px) -> bool {
        left < self.right() && left.saturating_add(width) > self.x
    }

    /// Whether the vertical span `[top, top + height)` overlaps this
    /// rectangle's vertical span.
    ///
    /// A zero-height span counts as overlapping when it lies strictly inside.
    pub fn overlaps_y(&self, top: Px, height: Px) -> bool {
        top < self.bottom() && top.saturating_add(height) > self.y
    }

    /// Whether the two rectangles share any area.
    pub fn intersects(&self, other: &Self) -> bool {
        self.overlaps_x(other.x, other.width) && self.overlaps_y(other.y, other.height)
    }

    /// Whether the point lies inside the rectangle.
    pub fn contains(&self, point: PxPosition) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}
