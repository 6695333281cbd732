// In: src/pipeline/resample.rs

//! Resampling of the original onto the modified image's grid.
//!
//! Encoder and decoder both call this with the same inputs, so it only has to
//! be deterministic, not accurate.

use ndarray::s;

use super::io::{dimension, from_dynamic, to_dynamic};
use crate::config::ResizeFilter;
use crate::error::PatchError;
use crate::types::Image;

/// Returns `image` resampled to `shape = (height, width, channels)`.
///
/// The first `channels` channels of the source are kept. When height and width
/// already match, the samples are returned untouched; otherwise `filter` is
/// used and results are saturated into the depth range by the codec.
///
/// # Errors
/// `UnsupportedImage` if the source has fewer channels than requested or the
/// target has an empty side.
pub fn resized_to_shape(
    image: &Image,
    shape: (usize, usize, usize),
    filter: ResizeFilter,
) -> Result<Image, PatchError> {
    let (height, width, channels) = shape;
    if image.channels() < channels {
        return Err(PatchError::UnsupportedImage(format!(
            "cannot take {} channels from a {}-channel image",
            channels,
            image.channels()
        )));
    }

    let source = if image.channels() == channels {
        image.clone()
    } else {
        Image::new(
            image.samples().slice(s![.., .., ..channels]).to_owned(),
            image.depth(),
        )?
    };
    if source.height() == height && source.width() == width {
        return Ok(source);
    }
    if height == 0 || width == 0 {
        return Err(PatchError::UnsupportedImage(format!(
            "cannot resample to {}x{}",
            height, width
        )));
    }

    log::debug!(
        "resampling {}x{} -> {}x{} with {:?}",
        source.height(),
        source.width(),
        height,
        width,
        filter
    );
    let resized = to_dynamic(&source)?.resize_exact(
        dimension(width)?,
        dimension(height)?,
        filter.to_filter_type(),
    );
    from_dynamic(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BitDepth;
    use ndarray::Array3;

    fn image(shape: (usize, usize, usize), depth: BitDepth) -> Image {
        let samples = Array3::from_shape_fn(shape, |(y, x, c)| ((y * 23 + x * 9 + c * 50) % 256) as u16);
        Image::new(samples, depth).unwrap()
    }

    #[test]
    fn test_same_size_is_identity() {
        let source = image((6, 5, 3), BitDepth::Eight);
        let resized = resized_to_shape(&source, (6, 5, 3), ResizeFilter::CatmullRom).unwrap();
        assert_eq!(resized, source);
    }

    #[test]
    fn test_alpha_is_dropped_when_target_is_rgb() {
        let source = image((4, 4, 4), BitDepth::Eight);
        let resized = resized_to_shape(&source, (4, 4, 3), ResizeFilter::CatmullRom).unwrap();
        assert_eq!(resized.dim(), (4, 4, 3));
        assert_eq!(
            resized.samples(),
            &source.samples().slice(s![.., .., ..3]).to_owned()
        );
    }

    #[test]
    fn test_resampling_hits_target_shape_at_both_depths() {
        for depth in [BitDepth::Eight, BitDepth::Sixteen] {
            let source = image((10, 8, 4), depth);
            let resized = resized_to_shape(&source, (7, 13, 4), ResizeFilter::CatmullRom).unwrap();
            assert_eq!(resized.dim(), (7, 13, 4));
            assert_eq!(resized.depth(), depth);
            let again = resized_to_shape(&source, (7, 13, 4), ResizeFilter::CatmullRom).unwrap();
            assert_eq!(again, resized);
        }
    }

    #[test]
    fn test_missing_channels_are_rejected() {
        let source = image((4, 4, 3), BitDepth::Eight);
        let err = resized_to_shape(&source, (4, 4, 4), ResizeFilter::Nearest).unwrap_err();
        assert!(err.is_precondition_violation());
    }
}
