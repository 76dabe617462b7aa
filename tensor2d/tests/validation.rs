//! Validation of tensor2d against independent references.
//!
//! - Matrix multiplication is checked against `ndarray` (different kernel,
//!   different accumulation order, so compared within tolerance) and against
//!   a plain i-k-j loop nest (same order, so compared bit for bit).
//! - Elementwise laws, aliasing and the area invariant are checked over a
//!   spread of shapes, with inputs drawn from a seeded `StdRng`.
//!
//! # Tolerance Thresholds
//!
//! - Max absolute error vs. ndarray: 1e-4 for inputs in [-1, 1]
//! - Scalar divide/multiply round trip: relative 1e-6

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tensor2d::{
    add_to_elems, divide_elems, multiply, multiply_elems, sub_from_elems, Shape2, Tensor2,
    Tensor2Error, Tensor2Pos,
};

const SHAPES: &[(usize, usize)] = &[(1, 1), (1, 7), (7, 1), (2, 3), (5, 5), (16, 9), (33, 64)];

fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Seeded values in [-1, 1).
fn random_vec(seed: u64, len: usize) -> Vec<f32> {
    let mut rng = seeded_rng(seed);
    (0..len).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
}

fn random_tensor(seed: u64, h: usize, w: usize) -> Tensor2 {
    Tensor2::from_vec(Shape2::new(h, w), random_vec(seed, h * w)).unwrap()
}

fn identity(n: usize) -> Tensor2 {
    let t = Tensor2::zeros(Shape2::new(n, n)).unwrap();
    for i in 0..n {
        t.set_at(i, i, 1.0);
    }
    t
}

fn to_ndarray(t: &Tensor2) -> Array2<f32> {
    let s = t.shape();
    Array2::from_shape_vec((s.height, s.width), t.to_vec()).unwrap()
}

/// Same loop nest and accumulation order as `multiply`, over raw vectors.
fn reference_ikj(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; m * n];
    for i in 0..m {
        for kk in 0..k {
            let a_ik = a[i * k + kk];
            for j in 0..n {
                out[i * n + j] += a_ik * b[kk * n + j];
            }
        }
    }
    out
}

// ========== Construction ==========

#[test]
fn fill_constructor_sets_every_position() {
    for &(h, w) in SHAPES {
        let shape = Shape2::new(h, w);
        let t = Tensor2::filled(shape, -3.5).unwrap();
        assert_eq!(t.len(), shape.area());
        for row in 0..h {
            for col in 0..w {
                assert_eq!(t.get(Tensor2Pos::new(row, col)), -3.5);
            }
        }
    }
}

#[test]
fn buffer_length_must_match_area() {
    let shape = Shape2::new(2, 3);
    assert!(matches!(
        Tensor2::from_vec(shape, vec![0.0; 5]),
        Err(Tensor2Error::ShapeMismatch { .. })
    ));
    assert!(Tensor2::from_vec(shape, vec![0.0; 6]).is_ok());
}

#[test]
fn set_get_round_trip_every_position() {
    for &(h, w) in SHAPES {
        let t = Tensor2::zeros(Shape2::new(h, w)).unwrap();
        let values = random_vec((h * 100 + w) as u64, h * w);
        for row in 0..h {
            for col in 0..w {
                let pos = Tensor2Pos::new(row, col);
                t.set(pos, values[row * w + col]);
                assert_eq!(t.get(pos), values[row * w + col]);
            }
        }
        assert_eq!(t.to_vec(), values);
    }
}

#[test]
fn tensors_on_same_buffer_see_each_others_writes() {
    let a = random_tensor(7, 4, 4);
    let b = Tensor2::from_shared(a.shape(), a.underlying_buffer().clone()).unwrap();

    a.set_at(3, 2, 42.0);
    assert_eq!(b.get_at(3, 2), 42.0);

    b.set(Tensor2Pos::new(0, 0), -42.0);
    assert_eq!(a.get_at(0, 0), -42.0);
    assert_eq!(a, b);
}

#[test]
fn every_derived_tensor_matches_its_area() {
    for (seed, &(h, w)) in SHAPES.iter().enumerate() {
        let t = random_tensor(800 + seed as u64, h, w);
        let handle = t.underlying_buffer().clone();
        for cell in handle.iter() {
            cell.set(cell.get() + 1.0);
        }
        assert_eq!(handle.len(), t.shape().area());

        let derived = [
            add_to_elems(&t, 1.0),
            sub_from_elems(&t, 1.0),
            multiply_elems(&t, 2.0),
            divide_elems(&t, 2.0),
            multiply(&t, &identity(w)).unwrap(),
            multiply(&identity(h), &t).unwrap(),
        ];
        for d in derived.iter() {
            assert_eq!(d.len(), d.shape().area());
        }
        assert_eq!(derived[4], t);
    }
}

// ========== Elementwise Laws ==========

#[test]
fn elementwise_identities() {
    for (seed, &(h, w)) in SHAPES.iter().enumerate() {
        let t = random_tensor(seed as u64, h, w);
        assert_eq!(add_to_elems(&t, 0.0), t);
        assert_eq!(sub_from_elems(&t, 0.0), t);
        assert_eq!(multiply_elems(&t, 1.0), t);
        assert_eq!(divide_elems(&t, 1.0), t);
    }
}

#[test]
fn divide_undoes_multiply() {
    for (seed, &(h, w)) in SHAPES.iter().enumerate() {
        let t = random_tensor(100 + seed as u64, h, w);
        for k in [3.0f32, -0.5, 1e-3, 7.25] {
            let back = divide_elems(&multiply_elems(&t, k), k);
            for (r, e) in back.to_vec().iter().zip(t.to_vec()) {
                assert_relative_eq!(*r, e, max_relative = 1e-6);
            }
        }
    }
}

#[test]
fn add_then_sub_restores_values() {
    let t = random_tensor(11, 6, 3);
    let back = sub_from_elems(&add_to_elems(&t, 2.0), 2.0);
    for (r, e) in back.to_vec().iter().zip(t.to_vec()) {
        assert_abs_diff_eq!(*r, e, epsilon = 1e-6);
    }
}

// ========== Matrix Multiplication ==========

#[test]
fn multiply_concrete_2x2() {
    let a = Tensor2::from_vec(Shape2::new(2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let b = Tensor2::from_vec(Shape2::new(2, 2), vec![5.0, 6.0, 7.0, 8.0]).unwrap();
    let c = multiply(&a, &b).unwrap();
    assert_eq!(c.get_at(0, 0), 19.0);
    assert_eq!(c.get_at(0, 1), 22.0);
    assert_eq!(c.get_at(1, 0), 43.0);
    assert_eq!(c.get_at(1, 1), 50.0);
}

#[test]
fn multiply_dimension_check() {
    let a = Tensor2::zeros(Shape2::new(2, 3)).unwrap();
    assert!(multiply(&a, &Tensor2::zeros(Shape2::new(4, 5)).unwrap()).is_err());

    let c = multiply(&a, &Tensor2::zeros(Shape2::new(3, 5)).unwrap()).unwrap();
    assert_eq!(c.shape(), Shape2::new(2, 5));
}

#[test]
fn multiply_by_identity_on_both_sides() {
    for (seed, &(h, w)) in SHAPES.iter().enumerate() {
        let t = random_tensor(200 + seed as u64, h, w);
        assert_eq!(multiply(&t, &identity(w)).unwrap(), t);
        assert_eq!(multiply(&identity(h), &t).unwrap(), t);
    }
}

#[test]
fn multiply_matches_ndarray() {
    let dims = [(1, 1, 1), (2, 3, 4), (8, 8, 8), (17, 5, 31), (64, 33, 16)];
    for (seed, &(m, k, n)) in dims.iter().enumerate() {
        let a = random_tensor(300 + seed as u64, m, k);
        let b = random_tensor(400 + seed as u64, k, n);

        let ours = multiply(&a, &b).unwrap();
        let expected = to_ndarray(&a).dot(&to_ndarray(&b));

        assert_eq!(ours.shape(), Shape2::new(m, n));
        let max_abs_diff = ours
            .to_vec()
            .iter()
            .zip(expected.iter())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f32, f32::max);
        assert!(
            max_abs_diff < 1e-4,
            "{}x{}x{}: max abs diff {}",
            m,
            k,
            n,
            max_abs_diff
        );
    }
}

#[test]
fn multiply_is_bit_exact_with_ikj_order() {
    let (m, k, n) = (13, 29, 7);
    let a = random_tensor(500, m, k);
    let b = random_tensor(501, k, n);

    let ours = multiply(&a, &b).unwrap().to_vec();
    let reference = reference_ikj(&a.to_vec(), &b.to_vec(), m, k, n);

    let ours_bits: Vec<u32> = ours.iter().map(|v| v.to_bits()).collect();
    let ref_bits: Vec<u32> = reference.iter().map(|v| v.to_bits()).collect();
    assert_eq!(ours_bits, ref_bits);
}

#[test]
fn multiply_leaves_operands_untouched() {
    let a = random_tensor(600, 3, 4);
    let b = random_tensor(601, 4, 2);
    let (a_before, b_before) = (a.to_vec(), b.to_vec());

    let c = multiply(&a, &b).unwrap();
    c.set_at(0, 0, 1e9);

    assert_eq!(a.to_vec(), a_before);
    assert_eq!(b.to_vec(), b_before);
}

// ========== Serialization ==========

#[test]
fn json_round_trip_for_weights() {
    let w = random_tensor(700, 4, 3);
    let json = w.to_json().unwrap();
    let back = Tensor2::from_json(&json).unwrap();
    assert_eq!(back.shape(), w.shape());
    for (r, e) in back.to_vec().iter().zip(w.to_vec()) {
        assert_relative_eq!(*r, e);
    }
}
