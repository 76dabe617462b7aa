//! tensor2d
//!
//! Fixed-shape, row-major, reference-counted 2D `f32` tensors: the arithmetic
//! substrate for CPU inference layers. Provides positional access, elementwise
//! scalar transforms and dense matrix multiplication.

#![warn(missing_docs)]

pub mod error;
pub mod ops;
pub mod position;
pub mod shape;
pub mod tensor;

pub use error::Tensor2Error;
pub use ops::{add_to_elems, divide_elems, multiply, multiply_elems, sub_from_elems, transform};
pub use position::Tensor2Pos;
pub use shape::Shape2;
pub use tensor::{shared_float_vec, SharedFloatVec, Tensor2};
