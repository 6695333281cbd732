//! This module contains the kernel that synthesizes the NoiseMask.
//!
//! The mask is never stored: the encoder subtracts it from the true
//! difference and the decoder regenerates the exact same array from the
//! resized original, so determinism here is load-bearing.

use ndarray::{s, Array3};
use rand::Rng;

use crate::error::PatchError;
use crate::kernels::seed::seeded_generator;
use crate::types::Image;

/// Largest accepted variance bound, in 8-bit sample units. At 16-bit depth
/// the bound is scaled by 256, which keeps the mask inside the sample range.
pub const MAX_NOISE_VARIANCE: u32 = u8::MAX as u32;

const ALPHA_CHANNEL: usize = 3;

/// Draws one uniform value per sample of `reference`, scaled into
/// `[0, variance * depth.noise_scale())`, with the alpha channel zeroed.
///
/// # Errors
/// Returns `VarianceOutOfRange` if `variance > MAX_NOISE_VARIANCE`.
pub fn synthesize_noise(reference: &Image, variance: u32) -> Result<Array3<u16>, PatchError> {
    if variance > MAX_NOISE_VARIANCE {
        return Err(PatchError::VarianceOutOfRange(variance, MAX_NOISE_VARIANCE));
    }

    let mut rng = seeded_generator(reference.samples());
    let scale = f64::from(variance * reference.depth().noise_scale());

    // Draw in row-major order, alpha included, so the sequence only depends on
    // the shape and not on which channels are kept.
    let mut noise = Array3::<u16>::zeros(reference.dim());
    for value in noise.iter_mut() {
        *value = (rng.random::<f64>() * scale) as u16;
    }
    if reference.has_alpha() {
        noise.slice_mut(s![.., .., ALPHA_CHANNEL]).fill(0);
    }

    log_metric!("event" = "synthesize_noise", "variance" = variance, "depth" = reference.depth());
    Ok(noise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BitDepth;

    fn gradient(height: usize, width: usize, channels: usize, depth: BitDepth) -> Image {
        let max = depth.max_value() as usize;
        let samples = Array3::from_shape_fn((height, width, channels), |(y, x, c)| {
            ((y * 37 + x * 11 + c * 5) % (max + 1)) as u16
        });
        Image::new(samples, depth).unwrap()
    }

    #[test]
    fn test_noise_is_deterministic() {
        let image = gradient(6, 5, 4, BitDepth::Eight);
        let first = synthesize_noise(&image, 96).unwrap();
        let second = synthesize_noise(&image.clone(), 96).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_noise_respects_bounds_and_alpha() {
        let image = gradient(8, 8, 4, BitDepth::Eight);
        let noise = synthesize_noise(&image, 96).unwrap();
        assert!(noise.iter().all(|&v| v < 96));
        assert!(noise.slice(s![.., .., 3]).iter().all(|&v| v == 0));
        assert!(noise.slice(s![.., .., 0]).iter().any(|&v| v > 0));
    }

    #[test]
    fn test_sixteen_bit_noise_is_scaled() {
        let image = gradient(8, 8, 3, BitDepth::Sixteen);
        let noise = synthesize_noise(&image, 96).unwrap();
        assert!(noise.iter().all(|&v| (v as u32) < 96 * 256));
        assert!(noise.iter().any(|&v| v >= 256));
    }

    #[test]
    fn test_zero_variance_yields_zero_mask() {
        let image = gradient(3, 3, 3, BitDepth::Eight);
        let noise = synthesize_noise(&image, 0).unwrap();
        assert!(noise.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_variance_out_of_range() {
        let image = gradient(2, 2, 3, BitDepth::Eight);
        let result = synthesize_noise(&image, 256);
        assert!(matches!(result, Err(PatchError::VarianceOutOfRange(256, 255))));
    }
}
