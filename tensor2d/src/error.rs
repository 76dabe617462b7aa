//! Error types for tensor2d.
//!
//! Failures surfaced at API boundaries:
//! - Shape mismatches (buffer length vs. area, matmul inner dimensions)
//! - Checked positional access outside a tensor
//! - Shapes whose area does not fit in `usize`
//! - Malformed serialized tensors

use thiserror::Error;

/// Main error type for tensor2d.
///
/// Constructors, matrix multiplication and deserialization return
/// `Result<T, Tensor2Error>`. The unchecked positional accessors panic instead.
#[derive(Error, Debug)]
pub enum Tensor2Error {
    /// Shape mismatch between a buffer and its shape, or between matmul operands.
    ///
    /// Example: a `2x3` shape paired with a 5-element buffer.
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected dimensions
        expected: Vec<usize>,
        /// Dimensions actually received
        got: Vec<usize>,
    },

    /// Position outside the tensor's shape.
    #[error("Position ({row}, {col}) out of range for shape {height}x{width}")]
    PositionOutOfRange {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Tensor height
        height: usize,
        /// Tensor width
        width: usize,
    },

    /// `height * width` overflows `usize`.
    #[error("Shape area overflow: {height}x{width}")]
    AreaOverflow {
        /// Declared height
        height: usize,
        /// Declared width
        width: usize,
    },

    /// JSON parsing error.
    ///
    /// Wraps serde_json errors when decoding a serialized tensor.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tensor2d.
pub type Result<T> = std::result::Result<T, Tensor2Error>;
