//! Two-dimensional shape descriptor.
//!
//! A [`Shape2`] is an immutable `(height, width)` pair. Its area is the
//! number of elements a tensor of that shape holds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Tensor2Pos;

/// Dimensions of a 2D tensor.
///
/// Two shapes are equal iff both dimensions match.
///
/// # Example
///
/// ```rust
/// use tensor2d::shape::Shape2;
///
/// let s = Shape2::new(2, 3);
/// assert_eq!(s.area(), 6);
/// assert_eq!(s.to_string(), "2x3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape2 {
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
}

impl Shape2 {
    /// Create a shape from its dimensions.
    pub const fn new(height: usize, width: usize) -> Self {
        Shape2 { height, width }
    }

    /// Total number of elements (`height * width`).
    ///
    /// # Panics
    ///
    /// Panics if the product overflows `usize`. Use [`Shape2::checked_area`]
    /// when the dimensions come from untrusted input.
    pub fn area(&self) -> usize {
        match self.checked_area() {
            Some(area) => area,
            None => panic!("shape {} area overflows usize", self),
        }
    }

    /// Total number of elements, or `None` if the product overflows `usize`.
    pub fn checked_area(&self) -> Option<usize> {
        self.height.checked_mul(self.width)
    }

    /// Whether `pos` addresses an element of a tensor with this shape.
    pub fn contains(&self, pos: Tensor2Pos) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Row-major flat offset of `pos`: `row * width + col`.
    ///
    /// Not bounds checked; pair with [`Shape2::contains`].
    pub fn offset(&self, pos: Tensor2Pos) -> usize {
        pos.row * self.width + pos.col
    }
}

impl fmt::Display for Shape2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

impl From<(usize, usize)> for Shape2 {
    fn from((height, width): (usize, usize)) -> Self {
        Shape2::new(height, width)
    }
}
