// In: src/config.rs

//! The single source of truth for all texpatch configuration.
//!
//! `PatchConfig` is created once at the application boundary (e.g., from a
//! JSON file or a caller's defaults) and passed down by reference. Nothing in
//! the codec reads configuration from anywhere else.

use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::error::PatchError;
use crate::filters::FilterKind;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// Interpolation used when the original has to be resampled to the modified
/// image's dimensions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    /// **Default:** cubic interpolation.
    #[default]
    CatmullRom,
    Lanczos3,
}

impl ResizeFilter {
    pub fn to_filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

//==================================================================================
// II. The Unified PatchConfig
//==================================================================================

/// The single, unified configuration for creating and applying patches.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PatchConfig {
    /// Upper bound of the noise mask, in 8-bit sample units. Encoder and
    /// decoder must agree on it.
    #[serde(default = "default_noise_variance")]
    pub noise_variance: u32,

    /// Forward filter chain applied to the container (`roll-h`, `roll-v`).
    #[serde(default)]
    pub filters: Vec<FilterKind>,

    /// File suffixes (without the dot, case-insensitive) visited in batch mode.
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,

    /// Resampling filter for the original.
    #[serde(default)]
    pub resize_filter: ResizeFilter,

    /// In batch apply mode, compare every patched file with its counterpart in
    /// the modified tree when one is supplied.
    #[serde(default = "default_true")]
    pub verify_against_modified: bool,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            noise_variance: default_noise_variance(),
            filters: Vec::new(),
            suffixes: default_suffixes(),
            resize_filter: ResizeFilter::default(),
            verify_against_modified: true,
        }
    }
}

impl PatchConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, PatchError> {
        if !path.exists() {
            return Err(PatchError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Returns `true` if `path` carries one of the configured suffixes.
    pub fn matches_suffix(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.suffixes.iter().any(|s| s.eq_ignore_ascii_case(ext)))
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

fn default_noise_variance() -> u32 {
    96
}

fn default_suffixes() -> Vec<String> {
    vec!["png".to_string()]
}
