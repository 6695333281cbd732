//! This module defines the core, strongly-typed data representations used
//! throughout the texpatch pipeline.
//!
//! It currently includes the canonical `Image` sample grid and the `BitDepth`
//! tag that replaces loose "is this 8 or 16 bit" checks scattered over the
//! arithmetic code.

pub mod raster;

// Re-export the main type(s) for easier access.
pub use self::raster::{BitDepth, Image};
