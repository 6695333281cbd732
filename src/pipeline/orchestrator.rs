// In: src/pipeline/orchestrator.rs

//! The patch pipeline: `create_patch`, `apply_patch` and `reverse_original`,
//! plus the file-level wrappers and the in-memory self test.
//!
//! Every operation is a pure function of its inputs. The noise mask is never
//! stored; both sides regenerate it from the resized original.

use std::path::Path;

use ndarray::Array3;

use super::io::{read_image, write_image};
use super::resample::resized_to_shape;
use crate::config::PatchConfig;
use crate::container::{pack, unpack, Unpacked};
use crate::error::PatchError;
use crate::filters::{apply_filters, FilterKind};
use crate::kernels::{is_non_negative, sign_shift, sign_unshift, signed, synthesize_noise};
use crate::types::raster::{ensure_in_range, min_max};
use crate::types::{BitDepth, Image};

//==================================================================================
// 1. Pipeline Steps
//==================================================================================

/// The masked difference and the two sign maps that make it reversible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDifference {
    /// `sign_shift(hashed)`, inside `[0, depth.max_value()]`.
    pub shifted: Array3<i32>,
    /// `difference >= 0`
    pub diff_positive: Array3<bool>,
    /// `hashed >= 0`
    pub hashed_positive: Array3<bool>,
}

/// Hides `difference` behind `noise` and folds it into the depth range.
///
/// # Errors
/// * `ShapeMismatch` if `noise` differs in shape.
/// * `SampleOutOfRange` if a shifted value leaves `[0, depth.max_value()]`.
pub fn encode_difference(
    difference: &Array3<i32>,
    noise: &Array3<i32>,
    depth: BitDepth,
) -> Result<EncodedDifference, PatchError> {
    let diff_positive = is_non_negative(difference);
    let hashed = difference - &signed(&diff_positive, noise)?;
    let hashed_positive = is_non_negative(&hashed);
    let shifted = sign_shift(&hashed, depth)?;
    ensure_in_range(&shifted, depth)?;
    Ok(EncodedDifference {
        shifted,
        diff_positive,
        hashed_positive,
    })
}

/// Inverse of `encode_difference` given the same `noise`.
pub fn decode_difference(
    shifted: &Array3<i32>,
    diff_positive: &Array3<bool>,
    hashed_positive: &Array3<bool>,
    noise: &Array3<i32>,
    depth: BitDepth,
) -> Result<Array3<i32>, PatchError> {
    if diff_positive.dim() != shifted.dim() {
        return Err(PatchError::shape_mismatch(shifted.shape(), diff_positive.shape()));
    }
    let hashed = sign_unshift(hashed_positive, shifted, depth)?;
    Ok(&hashed + &signed(diff_positive, noise)?)
}

/// Resamples `original` onto the grid of `target`, which fixes the depth.
fn resized_original(
    original: &Image,
    target: &Image,
    config: &PatchConfig,
) -> Result<Image, PatchError> {
    if original.depth() != target.depth() {
        return Err(PatchError::UnsupportedImage(format!(
            "original is {} but the target is {}",
            original.depth(),
            target.depth()
        )));
    }
    resized_to_shape(original, target.dim(), config.resize_filter)
}

fn noise_for(resized: &Image, config: &PatchConfig) -> Result<Array3<i32>, PatchError> {
    Ok(synthesize_noise(resized, config.noise_variance)?.mapv(i32::from))
}

fn difference_range(reference: &Array3<i32>, other: &Array3<i32>) -> (i32, i32) {
    let (min, max) = min_max(&(reference - other));
    (min as i32, max as i32)
}

//==================================================================================
// 2. Public Orchestration API
//==================================================================================

/// Encodes `modified` as a patch against `original`.
///
/// The returned container has the modified image's width, channel count and
/// depth, and is shuffled by `filters` keyed on `original`.
pub fn create_patch(
    original: &Image,
    modified: &Image,
    filters: &[FilterKind],
    config: &PatchConfig,
) -> Result<Image, PatchError> {
    let depth = modified.depth();

    // 1. Bring the original onto the modified grid.
    let resized = resized_original(original, modified, config)?;

    // 2. Widen both sides into the signed working domain.
    let difference = &modified.to_signed() - &resized.to_signed();

    // 3. Regenerable noise from the resized original.
    let noise = noise_for(&resized, config)?;

    // 4. Mask, fold and range-check.
    let encoded = encode_difference(&difference, &noise, depth)?;

    // 5. Serialize and shuffle.
    let payload = Image::from_signed(&encoded.shifted, depth)?;
    let container = pack(&payload, &[encoded.diff_positive, encoded.hashed_positive])?;
    let patch = apply_filters(&container, original, filters, false)?;

    log_metric!(
        "event" = "create_patch",
        "depth" = depth,
        "payload_rows" = payload.height(),
        "container_rows" = patch.height(),
        "filters" = filters.len()
    );
    Ok(patch)
}

/// Rebuilds the modified image from `original` and a patch made by
/// `create_patch` with the same `filters` and `config`.
pub fn apply_patch(
    original: &Image,
    patch: &Image,
    filters: &[FilterKind],
    config: &PatchConfig,
) -> Result<Image, PatchError> {
    // 1. Undo the shuffle, then split the container.
    let container = apply_filters(patch, original, filters, true)?;
    let Unpacked {
        payload,
        maps: [diff_positive, hashed_positive],
    } = unpack(&container)?;
    let depth = payload.depth();

    // 2. Regenerate the identical noise.
    let resized = resized_original(original, &payload, config)?;
    let noise = noise_for(&resized, config)?;

    // 3. Recover the difference and add it back.
    let difference = decode_difference(
        &payload.to_signed(),
        &diff_positive,
        &hashed_positive,
        &noise,
        depth,
    )?;
    let patched = &difference + &resized.to_signed();

    log_metric!("event" = "apply_patch", "depth" = depth, "rows" = payload.height());
    Image::from_signed(&patched, depth)
}

/// Approximates the resized original from `modified` and an unfiltered patch
/// using only the sign maps, with a zero noise contribution.
///
/// The result is saturated into the depth range; the number of saturated
/// samples is logged. Out-of-range samples are clamped, never wrapped modulo
/// the depth.
pub fn reverse_original(modified: &Image, patch: &Image) -> Result<Image, PatchError> {
    let Unpacked {
        payload,
        maps: [diff_positive, hashed_positive],
    } = unpack(patch)?;
    let depth = payload.depth();
    if modified.depth() != depth {
        return Err(PatchError::UnsupportedImage(format!(
            "modified is {} but the patch is {}",
            modified.depth(),
            depth
        )));
    }
    if modified.dim() != payload.dim() {
        return Err(PatchError::shape_mismatch(
            payload.samples().shape(),
            modified.samples().shape(),
        ));
    }

    let zero_noise = Array3::<i32>::zeros(payload.dim());
    let difference = decode_difference(
        &payload.to_signed(),
        &diff_positive,
        &hashed_positive,
        &zero_noise,
        depth,
    )?;
    let reversed = &modified.to_signed() - &difference;

    let limit = depth.max_value() as i32;
    let saturated = reversed.iter().filter(|&&v| v < 0 || v > limit).count();
    if saturated > 0 {
        log::info!("reverse_original saturated {} samples", saturated);
    }
    Image::from_signed(&reversed.mapv(|v| v.clamp(0, limit)), depth)
}

/// Returns `(min, max)` of `reference - patched` after resampling `reference`
/// onto the patched grid. `(0, 0)` means identical.
pub fn compare_images(
    reference: &Image,
    patched: &Image,
    config: &PatchConfig,
) -> Result<(i32, i32), PatchError> {
    let resized = resized_original(reference, patched, config)?;
    Ok(difference_range(&resized.to_signed(), &patched.to_signed()))
}

/// Outcome of `self_test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestReport {
    /// `compare_images(modified, apply_patch(create_patch(..)))`
    pub patched_difference: (i32, i32),
    /// `compare_images(original, reverse_original(modified, patch))`
    pub reversed_difference: (i32, i32),
}

impl SelfTestReport {
    pub fn is_exact(&self) -> bool {
        self.patched_difference == (0, 0)
    }
}

/// Runs create, apply, compare and reverse in memory.
pub fn self_test(
    original: &Image,
    modified: &Image,
    config: &PatchConfig,
) -> Result<SelfTestReport, PatchError> {
    let patch = create_patch(original, modified, &config.filters, config)?;
    let patched = apply_patch(original, &patch, &config.filters, config)?;
    let patched_difference = compare_images(modified, &patched, config)?;

    let unfiltered = apply_filters(&patch, original, &config.filters, true)?;
    let reversed = reverse_original(modified, &unfiltered)?;
    let reversed_difference = compare_images(original, &reversed, config)?;

    let report = SelfTestReport {
        patched_difference,
        reversed_difference,
    };
    log::info!("self test: {:?}", report);
    Ok(report)
}

//==================================================================================
// 3. File-Level Wrappers
//==================================================================================

/// Reads both images, creates the patch with `config.filters` and writes it.
pub fn create_patch_file(
    original_path: &Path,
    modified_path: &Path,
    patch_path: &Path,
    config: &PatchConfig,
) -> Result<(), PatchError> {
    let original = read_image(original_path)?;
    let modified = read_image(modified_path)?;
    let patch = create_patch(&original, &modified, &config.filters, config)?;
    write_image(patch_path, &patch)
}

/// Reads the original and the patch, applies it and writes the patched image.
pub fn apply_patch_file(
    original_path: &Path,
    patch_path: &Path,
    patched_path: &Path,
    config: &PatchConfig,
) -> Result<(), PatchError> {
    let original = read_image(original_path)?;
    let patch = read_image(patch_path)?;
    let patched = apply_patch(&original, &patch, &config.filters, config)?;
    write_image(patched_path, &patched)
}

/// Reads the modified image and an unfiltered patch and writes the
/// approximate original.
pub fn reverse_original_file(
    modified_path: &Path,
    patch_path: &Path,
    reversed_path: &Path,
) -> Result<(), PatchError> {
    let modified = read_image(modified_path)?;
    let patch = read_image(patch_path)?;
    let reversed = reverse_original(&modified, &patch)?;
    write_image(reversed_path, &reversed)
}

/// `compare_images` over two files.
pub fn compare_image_files(
    reference_path: &Path,
    patched_path: &Path,
    config: &PatchConfig,
) -> Result<(i32, i32), PatchError> {
    let reference = read_image(reference_path)?;
    let patched = read_image(patched_path)?;
    compare_images(&reference, &patched, config)
}
