//! This module contains the pure, stateless kernels that recode signed sample
//! arrays branch by branch.
//!
//! Every branch-dependent recoding in the codec (folding negatives into the
//! unsigned range, undoing that fold, re-signing a noise magnitude) is
//! expressed through one mechanism: `multi_linear_transform`, which picks a
//! `(a, b)` pair per element from an index array and evaluates `a * x + b`.
//! The kernels are generic over the array dimension so they work equally on
//! full images and on the 1-D sequences used in tests.

use ndarray::{Array, Dimension, Zip};

use crate::error::PatchError;
use crate::types::BitDepth;

/// Offsets applied to the (non-negative, negative) branches by `signed`.
pub const DEFAULT_OFFSETS: (i32, i32) = (0, 0);
/// Factors applied to the (non-negative, negative) branches by `signed`.
pub const DEFAULT_FACTORS: (i32, i32) = (1, -1);

//==================================================================================
// 1. Private Core Logic
//==================================================================================

fn ensure_same_shape(expected: &[usize], actual: &[usize]) -> Result<(), PatchError> {
    if expected != actual {
        return Err(PatchError::shape_mismatch(expected, actual));
    }
    Ok(())
}

/// Selects branch 1 wherever `x < 0`, branch 0 otherwise.
fn negative_transform<D: Dimension>(
    x: &Array<i32, D>,
    negative_coefficients: (i32, i32),
) -> Result<Array<i32, D>, PatchError> {
    let is_negative = x.mapv(|v| usize::from(v < 0));
    multi_linear_transform(&is_negative, x, &[(1, 0), negative_coefficients])
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Evaluates `a * x + b` per element, where `(a, b) = coefficients[index]`.
///
/// # Errors
/// * `ShapeMismatch` if `index` and `x` differ in shape.
/// * `CoefficientIndexOutOfRange` if any index has no coefficient pair.
pub fn multi_linear_transform<D: Dimension>(
    index: &Array<usize, D>,
    x: &Array<i32, D>,
    coefficients: &[(i32, i32)],
) -> Result<Array<i32, D>, PatchError> {
    ensure_same_shape(index.shape(), x.shape())?;
    if let Some(&bad) = index.iter().find(|&&i| i >= coefficients.len()) {
        return Err(PatchError::CoefficientIndexOutOfRange(bad, coefficients.len()));
    }
    Ok(Zip::from(index).and(x).map_collect(|&i, &v| {
        let (a, b) = coefficients[i];
        a * v + b
    }))
}

/// Turns a boolean map into a 0/1 coefficient index.
pub fn bool_index<D: Dimension>(map: &Array<bool, D>) -> Array<usize, D> {
    map.mapv(usize::from)
}

/// Per element `value >= 0`. This is the meaning of every SignMap.
pub fn is_non_negative<D: Dimension>(x: &Array<i32, D>) -> Array<bool, D> {
    x.mapv(|v| v >= 0)
}

/// Folds negative values into the unsigned range of `depth` by adding
/// `depth.max_value() + 1`. Non-negative values pass through untouched.
pub fn sign_shift<D: Dimension>(x: &Array<i32, D>, depth: BitDepth) -> Result<Array<i32, D>, PatchError> {
    negative_transform(x, (1, depth.modulus()))
}

/// Inverse of `sign_shift`. The fold is ambiguous on its own (a shifted `-1`
/// and a genuine `max` look identical), so the caller supplies the sign map
/// recorded before shifting.
pub fn sign_unshift<D: Dimension>(
    is_positive: &Array<bool, D>,
    x: &Array<i32, D>,
    depth: BitDepth,
) -> Result<Array<i32, D>, PatchError> {
    let is_negative = is_positive.mapv(|p| usize::from(!p));
    multi_linear_transform(&is_negative, x, &[(1, 0), (1, -depth.modulus())])
}

/// Rebuilds a signed array from a magnitude and a sign map:
/// `(m + offsets.0) * factors.0` where positive, `(m + offsets.1) * factors.1`
/// elsewhere.
pub fn signed_reconstruct<D: Dimension>(
    is_positive: &Array<bool, D>,
    magnitude: &Array<i32, D>,
    offsets: (i32, i32),
    factors: (i32, i32),
) -> Result<Array<i32, D>, PatchError> {
    let is_negative = is_positive.mapv(|p| usize::from(!p));
    let (positive_offset, negative_offset) = offsets;
    let (positive_factor, negative_factor) = factors;
    multi_linear_transform(
        &is_negative,
        magnitude,
        &[
            (positive_factor, positive_offset * positive_factor),
            (negative_factor, negative_offset * negative_factor),
        ],
    )
}

/// `signed_reconstruct` with the default offsets and factors: `+m` where
/// positive, `-m` elsewhere.
pub fn signed<D: Dimension>(
    is_positive: &Array<bool, D>,
    magnitude: &Array<i32, D>,
) -> Result<Array<i32, D>, PatchError> {
    signed_reconstruct(is_positive, magnitude, DEFAULT_OFFSETS, DEFAULT_FACTORS)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
