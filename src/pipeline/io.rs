// In: src/pipeline/io.rs

//! The image codec boundary. Everything outside this file sees `Image`;
//! everything inside talks to the `image` crate.
//!
//! Only 8/16-bit RGB and RGBA are accepted, and output is always PNG so a
//! container survives the trip to disk bit for bit.

use std::fs;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat};
use ndarray::Array3;
use num_traits::NumCast;

use crate::error::PatchError;
use crate::types::{BitDepth, Image};

/// Converts an image dimension into the `u32` the codec expects.
pub(crate) fn dimension(value: usize) -> Result<u32, PatchError> {
    u32::try_from(value)
        .map_err(|_| PatchError::UnsupportedImage(format!("dimension {} is too large", value)))
}

fn widen<S: Into<u16>>(raw: Vec<S>) -> Vec<u16> {
    raw.into_iter().map(Into::into).collect()
}

fn narrow<S: NumCast>(samples: &Array3<u16>, depth: BitDepth) -> Result<Vec<S>, PatchError> {
    samples
        .iter()
        .map(|&v| {
            <S as NumCast>::from(v).ok_or_else(|| PatchError::SampleOutOfRange {
                depth: depth.to_string(),
                min: 0,
                max: v.into(),
                limit: depth.max_value(),
            })
        })
        .collect()
}

/// Unwraps a decoded image into the codec's sample grid.
pub(crate) fn from_dynamic(dynamic: DynamicImage) -> Result<Image, PatchError> {
    let width = dynamic.width() as usize;
    let height = dynamic.height() as usize;
    let (depth, channels, raw) = match dynamic {
        DynamicImage::ImageRgb8(buffer) => (BitDepth::Eight, 3, widen(buffer.into_raw())),
        DynamicImage::ImageRgba8(buffer) => (BitDepth::Eight, 4, widen(buffer.into_raw())),
        DynamicImage::ImageRgb16(buffer) => (BitDepth::Sixteen, 3, buffer.into_raw()),
        DynamicImage::ImageRgba16(buffer) => (BitDepth::Sixteen, 4, buffer.into_raw()),
        other => {
            return Err(PatchError::UnsupportedImage(format!(
                "color type {:?} is not 8/16-bit RGB or RGBA",
                other.color()
            )))
        }
    };
    let samples = Array3::from_shape_vec((height, width, channels), raw)
        .map_err(|e| PatchError::UnsupportedImage(e.to_string()))?;
    Image::new(samples, depth)
}

/// Wraps the sample grid into a codec buffer of the matching pixel type.
pub(crate) fn to_dynamic(image: &Image) -> Result<DynamicImage, PatchError> {
    let (height, width, channels) = image.dim();
    let (w, h) = (dimension(width)?, dimension(height)?);
    let depth = image.depth();
    let samples = image.samples();

    let dynamic = match (depth, channels) {
        (BitDepth::Eight, 3) => {
            ImageBuffer::from_raw(w, h, narrow::<u8>(samples, depth)?).map(DynamicImage::ImageRgb8)
        }
        (BitDepth::Eight, 4) => {
            ImageBuffer::from_raw(w, h, narrow::<u8>(samples, depth)?).map(DynamicImage::ImageRgba8)
        }
        (BitDepth::Sixteen, 3) => {
            ImageBuffer::from_raw(w, h, narrow::<u16>(samples, depth)?).map(DynamicImage::ImageRgb16)
        }
        (BitDepth::Sixteen, 4) => {
            ImageBuffer::from_raw(w, h, narrow::<u16>(samples, depth)?).map(DynamicImage::ImageRgba16)
        }
        _ => None,
    };
    dynamic.ok_or_else(|| {
        PatchError::UnsupportedImage(format!(
            "cannot build a {} buffer of {}x{}x{}",
            depth, height, width, channels
        ))
    })
}

/// Decodes the image at `path`.
///
/// # Errors
/// * `NotFound` if `path` does not exist.
/// * `UnsupportedImage` for anything but 8/16-bit RGB or RGBA.
pub fn read_image(path: &Path) -> Result<Image, PatchError> {
    if !path.is_file() {
        return Err(PatchError::NotFound(path.to_path_buf()));
    }
    let image = from_dynamic(image::open(path)?)?;
    log::debug!(
        "read {} ({}x{}x{}, {})",
        path.display(),
        image.height(),
        image.width(),
        image.channels(),
        image.depth()
    );
    Ok(image)
}

/// Encodes `image` losslessly as PNG at `path`, creating parent directories.
pub fn write_image(path: &Path, image: &Image) -> Result<(), PatchError> {
    let dynamic = to_dynamic(image)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    dynamic.save_with_format(path, ImageFormat::Png)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
