//! This module contains the pure kernel that fingerprints an image's content
//! into a generator seed.
//!
//! Encoder and decoder never exchange randomness. They both derive it from
//! pixels they already share, so the fingerprint must depend on nothing but
//! sample values and shape.

use ndarray::Array3;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Seeds are reduced into `[0, 2^32 - 1)`.
pub const SEED_MODULUS: i128 = u32::MAX as i128;

const FIRST_STRIDE: usize = 17;
const SECOND_STRIDE: usize = 23;
const SECOND_OFFSET: usize = 1;

/// Computes the content seed of a sample grid.
///
/// `w*h*(max - min) + sum - s17*channels - s23`, where `s17` sums every 17th
/// flattened sample from offset 0 and `s23` every 23rd from offset 1, reduced
/// with a non-negative modulo.
pub fn compute_seed(samples: &Array3<u16>) -> u64 {
    let (height, width, channels) = samples.dim();
    let minimum = samples.iter().min().copied().unwrap_or(0) as i128;
    let maximum = samples.iter().max().copied().unwrap_or(0) as i128;
    let summation: i128 = samples.iter().map(|&v| v as i128).sum();
    let first_partial: i128 = samples
        .iter()
        .step_by(FIRST_STRIDE)
        .map(|&v| v as i128)
        .sum();
    let second_partial: i128 = samples
        .iter()
        .skip(SECOND_OFFSET)
        .step_by(SECOND_STRIDE)
        .map(|&v| v as i128)
        .sum();

    let seed = (width * height) as i128 * (maximum - minimum) + summation
        - first_partial * channels as i128
        - second_partial;
    seed.rem_euclid(SEED_MODULUS) as u64
}

/// Builds a fresh generator keyed by the content of `samples`.
///
/// Each caller owns its generator, so noise synthesis and the shuffle filters
/// never share or disturb each other's sequences.
pub fn seeded_generator(samples: &Array3<u16>) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(compute_seed(samples))
}
