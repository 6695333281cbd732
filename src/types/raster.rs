//! This module defines the canonical, type-safe representation of a raster
//! image as seen by the patch codec: a `height x width x channels` grid of
//! unsigned samples plus the bit depth those samples were decoded at.

use std::fmt;

use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};

use crate::error::PatchError;

/// The sample depth of an image. Both depths are stored in `u16` samples;
/// the tag decides the valid range and the container word layout.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    /// The largest sample value representable at this depth.
    pub fn max_value(self) -> u32 {
        match self {
            Self::Eight => u8::MAX as u32,
            Self::Sixteen => u16::MAX as u32,
        }
    }

    /// `max_value() + 1`, the modulus used when folding negative values
    /// into the unsigned range.
    pub fn modulus(self) -> i32 {
        self.max_value() as i32 + 1
    }

    /// Multiplier that maps an 8-bit noise variance onto this depth.
    pub fn noise_scale(self) -> u32 {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 256,
        }
    }

    /// Number of samples needed to hold one 16-bit container word.
    pub fn samples_per_word(self) -> usize {
        match self {
            Self::Eight => 2,
            Self::Sixteen => 1,
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eight => write!(f, "8-bit"),
            Self::Sixteen => write!(f, "16-bit"),
        }
    }
}

/// A decoded RGB or RGBA image.
///
/// Invariants (checked by every constructor): the channel count is 3 or 4 and
/// every sample is `<= depth.max_value()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    samples: Array3<u16>,
    depth: BitDepth,
}

impl Image {
    pub fn new(samples: Array3<u16>, depth: BitDepth) -> Result<Self, PatchError> {
        let (_, _, channels) = samples.dim();
        if channels != 3 && channels != 4 {
            return Err(PatchError::UnsupportedImage(format!(
                "expected 3 or 4 channels, got {}",
                channels
            )));
        }
        if let Some(&max) = samples.iter().max() {
            if max as u32 > depth.max_value() {
                return Err(PatchError::SampleOutOfRange {
                    depth: depth.to_string(),
                    min: samples.iter().min().map_or(0, |&v| v as i64),
                    max: max as i64,
                    limit: depth.max_value(),
                });
            }
        }
        Ok(Self { samples, depth })
    }

    /// Narrows a signed working array back into an image, failing instead of
    /// clamping when any value leaves `[0, depth.max_value()]`.
    pub fn from_signed(values: &Array3<i32>, depth: BitDepth) -> Result<Self, PatchError> {
        ensure_in_range(values, depth)?;
        Self::new(values.mapv(|v| v as u16), depth)
    }

    /// Widens the samples into the signed working domain used by the pipeline.
    pub fn to_signed(&self) -> Array3<i32> {
        self.samples.mapv(i32::from)
    }

    pub fn samples(&self) -> &Array3<u16> {
        &self.samples
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    /// `(height, width, channels)`
    pub fn dim(&self) -> (usize, usize, usize) {
        self.samples.dim()
    }

    pub fn height(&self) -> usize {
        self.samples.dim().0
    }

    pub fn width(&self) -> usize {
        self.samples.dim().1
    }

    pub fn channels(&self) -> usize {
        self.samples.dim().2
    }

    pub fn has_alpha(&self) -> bool {
        self.channels() == 4
    }

    /// Number of samples in one row (`width * channels`).
    pub fn row_len(&self) -> usize {
        self.width() * self.channels()
    }
}

/// Fails with `SampleOutOfRange` if any value leaves `[0, depth.max_value()]`.
pub(crate) fn ensure_in_range(values: &Array3<i32>, depth: BitDepth) -> Result<(), PatchError> {
    let limit = depth.max_value() as i64;
    let (min, max) = min_max(values);
    if min < 0 || max > limit {
        return Err(PatchError::SampleOutOfRange {
            depth: depth.to_string(),
            min,
            max,
            limit: depth.max_value(),
        });
    }
    Ok(())
}

/// Returns `(min, max)` of a signed array, `(0, 0)` when empty.
pub(crate) fn min_max(values: &Array3<i32>) -> (i64, i64) {
    let mut bounds: Option<(i64, i64)> = None;
    Zip::from(values).for_each(|&v| {
        let v = v as i64;
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    });
    bounds.unwrap_or((0, 0))
}
