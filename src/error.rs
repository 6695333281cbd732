// In: src/error.rs

//! This module defines the single, unified error type for the entire texpatch library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    // =========================================================================
    // === Precondition Violations (always fatal to the current call)
    // =========================================================================
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Noise variance {0} is outside the supported range [0, {1}]")]
    VarianceOutOfRange(u32, u32),

    #[error("Container holds {0} sign maps, exactly 2 are supported")]
    UnsupportedMapCount(usize),

    #[error("Sample value out of range for {depth}: min {min}, max {max} (allowed [0, {limit}])")]
    SampleOutOfRange {
        depth: String,
        min: i64,
        max: i64,
        limit: u32,
    },

    #[error("Coefficient index {0} is out of range for {1} coefficient pairs")]
    CoefficientIndexOutOfRange(usize, usize),

    #[error("Unknown or disallowed filter: {0}")]
    UnknownFilter(String),

    #[error("Malformed patch container: {0}")]
    ContainerFormat(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    // =========================================================================
    // === Resource Errors (recoverable per file in batch mode)
    // =========================================================================
    #[error("File does not exist: {}", .0.display())]
    NotFound(PathBuf),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the image codec while decoding or encoding a PNG.
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// An error from the Serde JSON library, typically while loading a config file.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl PatchError {
    /// Returns `true` for errors caused by inputs that violate a codec precondition.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. }
                | Self::VarianceOutOfRange(..)
                | Self::UnsupportedMapCount(_)
                | Self::SampleOutOfRange { .. }
                | Self::CoefficientIndexOutOfRange(..)
                | Self::UnknownFilter(_)
                | Self::ContainerFormat(_)
                | Self::UnsupportedImage(_)
        )
    }

    /// Returns `true` when a companion file is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub(crate) fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
