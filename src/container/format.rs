// In: src/container/format.rs

//! Defines the on-disk constants and the fixed trailing region of the patch
//! container. This is the single source of truth for the container layout;
//! `codec` only decides what goes in front of the tail.
//!
//! A *word* is a little-endian `u16`. At 16-bit depth it occupies one sample;
//! at 8-bit depth it is split over two samples, low byte first.

use crate::error::PatchError;
use crate::types::BitDepth;

//==================================================================================
// I. Layout Constants
//==================================================================================

/// Number of sign maps every container carries. There is no version field,
/// so this is fixed for binary compatibility.
pub const MAP_COUNT: usize = 2;
/// Booleans packed into one map sample (one byte per sample at any depth).
pub const BITS_PER_MAP_SAMPLE: usize = 8;
/// `height`, `width`, `channels`
pub const FOOTER_WORDS: usize = 3;
pub const PADDING_COUNT_WORDS: usize = 1;
pub const FLAG_SAMPLES: usize = 1;

/// Length of the fixed trailing region, in samples of `depth`.
pub fn tail_len(depth: BitDepth) -> usize {
    FLAG_SAMPLES + (PADDING_COUNT_WORDS + FOOTER_WORDS) * depth.samples_per_word()
}

/// Samples used by one packed sign map over `payload_len` booleans.
pub fn packed_map_len(payload_len: usize) -> usize {
    payload_len.div_ceil(BITS_PER_MAP_SAMPLE)
}

/// The map count `unpack` infers from a map region of `total_map_len` samples.
pub fn inferred_map_count(total_map_len: usize, payload_len: usize) -> usize {
    if payload_len == 0 {
        return 0;
    }
    total_map_len * BITS_PER_MAP_SAMPLE / payload_len
}

/// Smallest `n` such that `value + n` is a multiple of `multiple`.
pub fn remainder_to_multiple(value: usize, multiple: usize) -> usize {
    match value % multiple {
        0 => 0,
        remainder => multiple - remainder,
    }
}

//==================================================================================
// II. The Container Tail
//==================================================================================

/// The decoded trailing region: flag, padding count and shape footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerTail {
    /// `(height, width, channels)` of the payload.
    pub shape: (usize, usize, usize),
    /// Zero samples inserted before the tail.
    pub padding: usize,
    /// Set when the payload bit count is not a multiple of 8, i.e. the last
    /// packed map sample carries over-run bits that must be dropped.
    pub overrun: bool,
}

impl ContainerTail {
    /// Serializes the tail as `[flag][padding count][height][width][channels]`.
    pub fn encode(&self, depth: BitDepth) -> Result<Vec<u16>, PatchError> {
        let (height, width, channels) = self.shape;
        let words = [
            to_word(self.padding, "padding count")?,
            to_word(height, "height")?,
            to_word(width, "width")?,
            to_word(channels, "channels")?,
        ];
        let mut samples = Vec::with_capacity(tail_len(depth));
        samples.push(u16::from(self.overrun));
        samples.extend(words_to_samples(&words, depth));
        Ok(samples)
    }

    /// Parses the last `tail_len(depth)` samples of a container.
    pub fn decode(trailing: &[u16], depth: BitDepth) -> Result<Self, PatchError> {
        if trailing.len() != tail_len(depth) {
            return Err(PatchError::ContainerFormat(format!(
                "tail must be {} samples, got {}",
                tail_len(depth),
                trailing.len()
            )));
        }
        let overrun = match trailing[0] {
            0 => false,
            1 => true,
            other => {
                return Err(PatchError::ContainerFormat(format!(
                    "invalid over-run flag {}",
                    other
                )))
            }
        };
        let words = samples_to_words(&trailing[FLAG_SAMPLES..], depth)?;
        let &[padding, height, width, channels] = words.as_slice() else {
            return Err(PatchError::ContainerFormat(
                "tail holds the wrong number of words".to_string(),
            ));
        };
        Ok(Self {
            shape: (height as usize, width as usize, channels as usize),
            padding: padding as usize,
            overrun,
        })
    }
}

fn to_word(value: usize, what: &str) -> Result<u16, PatchError> {
    u16::try_from(value).map_err(|_| {
        PatchError::ContainerFormat(format!("{} {} does not fit a 16-bit word", what, value))
    })
}

/// Lays words out as samples of `depth`.
fn words_to_samples(words: &[u16], depth: BitDepth) -> Vec<u16> {
    match depth {
        BitDepth::Sixteen => words.to_vec(),
        BitDepth::Eight => {
            let little_endian: Vec<u16> = words.iter().map(|w| w.to_le()).collect();
            bytemuck::cast_slice::<u16, u8>(&little_endian)
                .iter()
                .map(|&b| u16::from(b))
                .collect()
        }
    }
}

/// Inverse of `words_to_samples`.
fn samples_to_words(samples: &[u16], depth: BitDepth) -> Result<Vec<u16>, PatchError> {
    match depth {
        BitDepth::Sixteen => Ok(samples.to_vec()),
        BitDepth::Eight => {
            if samples.len() % 2 != 0 || samples.iter().any(|&s| s > u8::MAX as u16) {
                return Err(PatchError::ContainerFormat(
                    "8-bit word samples must be byte pairs".to_string(),
                ));
            }
            let bytes: Vec<u8> = samples.iter().map(|&s| s as u8).collect();
            Ok(bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le(bytemuck::pod_read_unaligned::<u16>(pair)))
                .collect())
        }
    }
}
