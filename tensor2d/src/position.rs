//! Element addresses within a 2D tensor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `(row, col)` address.
///
/// Carries no shape of its own; whether it is in range depends on the
/// tensor it is used with (see [`crate::shape::Shape2::contains`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tensor2Pos {
    /// Row index (y).
    pub row: usize,
    /// Column index (x).
    pub col: usize,
}

impl Tensor2Pos {
    /// Create a position from a row and a column.
    pub const fn new(row: usize, col: usize) -> Self {
        Tensor2Pos { row, col }
    }
}

impl fmt::Display for Tensor2Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Tensor2Pos {
    fn from((row, col): (usize, usize)) -> Self {
        Tensor2Pos::new(row, col)
    }
}
