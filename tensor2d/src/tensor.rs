//! Core 2D tensor type.
//!
//! A [`Tensor2`] couples an immutable [`Shape2`] with a reference-counted,
//! contiguous, row-major `f32` buffer.
//!
//! # Aliasing
//!
//! The buffer is shared, not owned: [`Clone`] copies the handle, and
//! [`Tensor2::from_shared`] wraps a buffer that other tensors may already
//! hold. Writes through [`Tensor2::set`] or [`Tensor2::cell`] land in the
//! shared buffer and are visible to every alias. Use [`Tensor2::deep_copy`]
//! for an independent tensor.
//!
//! The buffer is an `Rc<[Cell<f32>]>`. Its length is fixed when it is
//! allocated, so no holder can grow or shrink it behind a tensor's back.
//! Element writes need no borrow bookkeeping, and the handle is `!Send`, so
//! aliases never cross threads.
//!
//! # Example
//!
//! ```rust
//! use tensor2d::shape::Shape2;
//! use tensor2d::tensor::Tensor2;
//!
//! let t = Tensor2::from_vec(Shape2::new(2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! assert_eq!(t.get_at(1, 2), 6.0);
//!
//! let alias = Tensor2::from_shared(t.shape(), t.underlying_buffer().clone()).unwrap();
//! alias.set_at(0, 0, 10.0);
//! assert_eq!(t.get_at(0, 0), 10.0);
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, Tensor2Error};
use crate::position::Tensor2Pos;
use crate::shape::Shape2;

/// Shared, reference-counted, fixed-length float buffer backing one or more tensors.
pub type SharedFloatVec = Rc<[Cell<f32>]>;

/// Move owned values into a new shared buffer.
///
/// # Example
///
/// ```rust
/// use tensor2d::tensor::shared_float_vec;
///
/// let buf = shared_float_vec(vec![1.0, 2.0]);
/// assert_eq!(buf.len(), 2);
/// assert_eq!(buf[1].get(), 2.0);
/// ```
pub fn shared_float_vec(values: Vec<f32>) -> SharedFloatVec {
    values.into_iter().map(Cell::new).collect()
}

/// Fixed-shape, row-major 2D tensor over a shared `f32` buffer.
///
/// Invariant: `buffer.len() == shape.area()`.
#[derive(Clone)]
pub struct Tensor2 {
    shape: Shape2,
    values: SharedFloatVec,
}

impl Tensor2 {
    /// Wrap an existing shared buffer without copying it.
    ///
    /// The new tensor aliases `values`: every other holder of the same
    /// `Rc` sees writes made through it, and vice versa.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the buffer length differs from `shape.area()`,
    /// or `AreaOverflow` if the area does not fit in `usize`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tensor2d::shape::Shape2;
    /// use tensor2d::tensor::{shared_float_vec, Tensor2};
    ///
    /// let buf = shared_float_vec(vec![0.0; 4]);
    /// let t = Tensor2::from_shared(Shape2::new(2, 2), buf.clone()).unwrap();
    /// buf[3].set(7.0);
    /// assert_eq!(t.get_at(1, 1), 7.0);
    /// ```
    pub fn from_shared(shape: Shape2, values: SharedFloatVec) -> Result<Self> {
        check_area(shape, values.len())?;
        Ok(Tensor2 { shape, values })
    }

    /// Adopt an owned buffer, moving it into shared storage.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `values.len()` differs from `shape.area()`,
    /// or `AreaOverflow` if the area does not fit in `usize`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tensor2d::shape::Shape2;
    /// use tensor2d::tensor::Tensor2;
    ///
    /// assert!(Tensor2::from_vec(Shape2::new(2, 3), vec![0.0; 6]).is_ok());
    /// assert!(Tensor2::from_vec(Shape2::new(2, 3), vec![0.0; 5]).is_err());
    /// ```
    pub fn from_vec(shape: Shape2, values: Vec<f32>) -> Result<Self> {
        check_area(shape, values.len())?;
        Ok(Tensor2 {
            shape,
            values: shared_float_vec(values),
        })
    }

    /// Allocate a fresh buffer with every element set to `value`.
    ///
    /// # Errors
    ///
    /// Returns `AreaOverflow` if `shape.area()` does not fit in `usize`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tensor2d::shape::Shape2;
    /// use tensor2d::tensor::Tensor2;
    ///
    /// let t = Tensor2::filled(Shape2::new(3, 2), 0.5).unwrap();
    /// assert_eq!(t.to_vec(), vec![0.5; 6]);
    /// ```
    pub fn filled(shape: Shape2, value: f32) -> Result<Self> {
        let area = checked_area(shape)?;
        Ok(Tensor2::from_vec_unchecked(shape, vec![value; area]))
    }

    /// Allocate a zero-initialized tensor.
    pub fn zeros(shape: Shape2) -> Result<Self> {
        Tensor2::filled(shape, 0.0)
    }

    /// Build a tensor from a buffer already known to match `shape`.
    ///
    /// Used by transforms that preserve the element count.
    pub(crate) fn from_vec_unchecked(shape: Shape2, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), shape.area(), "invalid number of values");
        Tensor2 {
            shape,
            values: shared_float_vec(values),
        }
    }

    /// Shape of the tensor.
    pub fn shape(&self) -> Shape2 {
        self.shape
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tensor has no elements (either dimension is zero).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shared buffer handle, for zero-copy handoff to other tensors or consumers.
    ///
    /// Holders can overwrite elements but never change the length.
    pub fn underlying_buffer(&self) -> &SharedFloatVec {
        &self.values
    }

    /// The element cells in row-major order, without copying.
    pub fn as_cells(&self) -> &[Cell<f32>] {
        &self.values
    }

    /// Copy the values out in row-major order.
    pub fn to_vec(&self) -> Vec<f32> {
        self.values.iter().map(Cell::get).collect()
    }

    /// Read the element at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the tensor's shape.
    pub fn get(&self, pos: Tensor2Pos) -> f32 {
        self.cell(pos).get()
    }

    /// Read the element at `(row, col)`.
    pub fn get_at(&self, row: usize, col: usize) -> f32 {
        self.get(Tensor2Pos::new(row, col))
    }

    /// Read-write handle to the element at `pos`.
    ///
    /// The cell lives in the shared buffer, so writes through it are visible
    /// to every alias, and it observes writes made through them.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the tensor's shape.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tensor2d::position::Tensor2Pos;
    /// use tensor2d::shape::Shape2;
    /// use tensor2d::tensor::Tensor2;
    ///
    /// let t = Tensor2::filled(Shape2::new(2, 2), 1.0).unwrap();
    /// let c = t.cell(Tensor2Pos::new(0, 1));
    /// c.set(c.get() + 2.0);
    /// assert_eq!(t.get_at(0, 1), 3.0);
    /// ```
    pub fn cell(&self, pos: Tensor2Pos) -> &Cell<f32> {
        &self.values[self.index_of(pos)]
    }

    /// Read-write handle to the element at `(row, col)`.
    pub fn cell_at(&self, row: usize, col: usize) -> &Cell<f32> {
        self.cell(Tensor2Pos::new(row, col))
    }

    /// Overwrite the element at `pos` in the shared buffer.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the tensor's shape.
    pub fn set(&self, pos: Tensor2Pos, value: f32) {
        self.cell(pos).set(value);
    }

    /// Overwrite the element at `(row, col)`.
    pub fn set_at(&self, row: usize, col: usize, value: f32) {
        self.set(Tensor2Pos::new(row, col), value);
    }

    /// Checked read.
    ///
    /// # Errors
    ///
    /// Returns `PositionOutOfRange` if `pos` is outside the tensor's shape.
    pub fn try_get(&self, pos: Tensor2Pos) -> Result<f32> {
        self.check_pos(pos)?;
        Ok(self.values[self.shape.offset(pos)].get())
    }

    /// Checked write.
    ///
    /// # Errors
    ///
    /// Returns `PositionOutOfRange` if `pos` is outside the tensor's shape.
    pub fn try_set(&self, pos: Tensor2Pos, value: f32) -> Result<()> {
        self.check_pos(pos)?;
        self.values[self.shape.offset(pos)].set(value);
        Ok(())
    }

    /// Copy into a tensor with its own, unaliased buffer.
    pub fn deep_copy(&self) -> Tensor2 {
        Tensor2::from_vec_unchecked(self.shape, self.to_vec())
    }

    /// Whether both tensors hold the same buffer.
    pub fn shares_buffer_with(&self, other: &Tensor2) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
    }

    /// Parse a tensor from its JSON form:
    /// `{"shape": {"height": H, "width": W}, "values": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns `Json` if the text is malformed or the value count does not
    /// match the declared shape.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tensor2d::tensor::Tensor2;
    ///
    /// let t = Tensor2::from_json(r#"{"shape":{"height":1,"width":2},"values":[1.5,2.5]}"#).unwrap();
    /// assert_eq!(t.get_at(0, 1), 2.5);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let tensor: Tensor2 = serde_json::from_str(json)?;
        Ok(tensor)
    }

    /// Serialize to the JSON form accepted by [`Tensor2::from_json`].
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn check_pos(&self, pos: Tensor2Pos) -> Result<()> {
        if !self.shape.contains(pos) {
            return Err(Tensor2Error::PositionOutOfRange {
                row: pos.row,
                col: pos.col,
                height: self.shape.height,
                width: self.shape.width,
            });
        }
        Ok(())
    }

    fn index_of(&self, pos: Tensor2Pos) -> usize {
        assert!(
            self.shape.contains(pos),
            "position {} out of range for shape {}",
            pos,
            self.shape
        );
        self.shape.offset(pos)
    }
}

fn checked_area(shape: Shape2) -> Result<usize> {
    shape.checked_area().ok_or(Tensor2Error::AreaOverflow {
        height: shape.height,
        width: shape.width,
    })
}

fn check_area(shape: Shape2, len: usize) -> Result<()> {
    let area = checked_area(shape)?;
    if len != area {
        log::debug!("rejecting {} tensor backed by {} values", shape, len);
        return Err(Tensor2Error::ShapeMismatch {
            expected: vec![area],
            got: vec![len],
        });
    }
    Ok(())
}

/// Observational equality: same shape and same values.
impl PartialEq for Tensor2 {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.values[..] == other.values[..]
    }
}

impl fmt::Debug for Tensor2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor2")
            .field("shape", &self.shape)
            .field("values", &self.to_vec())
            .finish()
    }
}

#[derive(Serialize)]
struct Tensor2Ref<'a> {
    shape: Shape2,
    values: &'a [Cell<f32>],
}

#[derive(Deserialize)]
struct Tensor2Owned {
    shape: Shape2,
    values: Vec<f32>,
}

impl Serialize for Tensor2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let repr = Tensor2Ref {
            shape: self.shape,
            values: &self.values,
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tensor2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Tensor2Owned::deserialize(deserializer)?;
        Tensor2::from_vec(raw.shape, raw.values).map_err(serde::de::Error::custom)
    }
}
