//! Pure operations over [`Tensor2`].
//!
//! Every function here reads its inputs and returns a tensor with a freshly
//! allocated buffer; nothing aliases the source.
//!
//! # Example
//!
//! ```rust
//! use tensor2d::ops::{add_to_elems, multiply};
//! use tensor2d::shape::Shape2;
//! use tensor2d::tensor::Tensor2;
//!
//! let a = Tensor2::from_vec(Shape2::new(2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! let b = Tensor2::from_vec(Shape2::new(2, 2), vec![5.0, 6.0, 7.0, 8.0]).unwrap();
//!
//! let c = multiply(&a, &b).unwrap();
//! assert_eq!(c.to_vec(), vec![19.0, 22.0, 43.0, 50.0]);
//!
//! let d = add_to_elems(&c, 1.0);
//! assert_eq!(d.to_vec(), vec![20.0, 23.0, 44.0, 51.0]);
//! ```

use std::time::Instant;

use crate::error::{Result, Tensor2Error};
use crate::shape::Shape2;
use crate::tensor::Tensor2;

/// Apply `f` to every element in buffer order.
///
/// The result has the same shape as `t` and its own buffer.
///
/// # Example
///
/// ```rust
/// use tensor2d::ops::transform;
/// use tensor2d::shape::Shape2;
/// use tensor2d::tensor::Tensor2;
///
/// let t = Tensor2::from_vec(Shape2::new(1, 3), vec![-1.0, 0.0, 2.0]).unwrap();
/// let relu = transform(|e| e.max(0.0), &t);
/// assert_eq!(relu.to_vec(), vec![0.0, 0.0, 2.0]);
/// ```
pub fn transform<F>(f: F, t: &Tensor2) -> Tensor2
where
    F: Fn(f32) -> f32,
{
    let values: Vec<f32> = t.as_cells().iter().map(|e| f(e.get())).collect();
    Tensor2::from_vec_unchecked(t.shape(), values)
}

/// `e -> x + e`
pub fn add_to_elems(t: &Tensor2, x: f32) -> Tensor2 {
    transform(|e| x + e, t)
}

/// `e -> e - x`
///
/// Tensor minus scalar, despite the name: the scalar is subtracted from each
/// element, not the other way round.
pub fn sub_from_elems(t: &Tensor2, x: f32) -> Tensor2 {
    transform(|e| e - x, t)
}

/// `e -> x * e`
pub fn multiply_elems(t: &Tensor2, x: f32) -> Tensor2 {
    transform(|e| x * e, t)
}

/// `e -> e / x`
///
/// # Note
///
/// `x == 0.0` is not special-cased: results follow IEEE 754 (`inf`, `-inf`
/// or `NaN`).
pub fn divide_elems(t: &Tensor2, x: f32) -> Tensor2 {
    transform(|e| e / x, t)
}

/// Dense matrix multiplication: `a @ b`.
///
/// `[M, K] @ [K, N] -> [M, N]`
///
/// # Errors
///
/// Returns `ShapeMismatch` if `a.width != b.height`, or `AreaOverflow` if
/// the `[M, N]` result cannot be addressed.
///
/// # Algorithm
///
/// ```ignore
/// for i in 0..M {
///     for k in 0..K {
///         for j in 0..N {
///             out[i][j] += a[i][k] * b[k][j]
///         }
///     }
/// }
/// ```
///
/// The innermost loop walks a row of `b` and a row of the output
/// sequentially. Accumulation is plain `f32` in exactly this order, so
/// results are bit-for-bit reproducible against any implementation using the
/// same loop nest.
///
/// # Performance
///
/// O(M*K*N), single-threaded, no blocking or SIMD. Sized for layer weights
/// at inference time, not large-scale linear algebra.
pub fn multiply(a: &Tensor2, b: &Tensor2) -> Result<Tensor2> {
    let start = if log::log_enabled!(log::Level::Trace) {
        Some(Instant::now())
    } else {
        None
    };

    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape.width != b_shape.height {
        log::debug!("multiply: invalid tensor shapes {} @ {}", a_shape, b_shape);
        return Err(Tensor2Error::ShapeMismatch {
            expected: vec![a_shape.height, a_shape.width, a_shape.width, b_shape.width],
            got: vec![a_shape.height, a_shape.width, b_shape.height, b_shape.width],
        });
    }

    let m = a_shape.height;
    let k = a_shape.width;
    let n = b_shape.width;
    let out_shape = Shape2::new(m, n);
    // Only reachable with k == 0, where m and n are unconstrained by the inputs.
    let area = out_shape.checked_area().ok_or(Tensor2Error::AreaOverflow {
        height: m,
        width: n,
    })?;
    let mut out = vec![0.0f32; area];

    {
        let lhs = a.as_cells();
        let rhs = b.as_cells();
        // chunks_exact rejects a zero chunk size; with k == 0 or n == 0 the
        // zero-initialized output is already the answer.
        if k > 0 && n > 0 {
            for (lhs_row, out_row) in lhs.chunks_exact(k).zip(out.chunks_exact_mut(n)) {
                for (k_idx, a_ik) in lhs_row.iter().enumerate() {
                    let a_ik = a_ik.get();
                    let rhs_row = &rhs[k_idx * n..(k_idx + 1) * n];
                    for (acc, b_kj) in out_row.iter_mut().zip(rhs_row) {
                        *acc += a_ik * b_kj.get();
                    }
                }
            }
        }
    }

    let result = Tensor2::from_vec_unchecked(out_shape, out);
    if let Some(start) = start {
        log::trace!(
            "[perf] tensor2::multiply {}@{}->{} {:.3}ms",
            a_shape,
            b_shape,
            out_shape,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    Ok(result)
}
