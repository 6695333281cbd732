//! This file is the root of the `texpatch` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`pipeline`,
//!     `container`, `kernels`, etc.) so the Rust compiler knows they exist.
//! 2.  Re-exporting the handful of types and entry points most callers need.
//!
//! Layering, leaf-first: `kernels` (sample transforms, seed, noise) ->
//! `container` (pack/unpack) -> `filters` (reversible shuffles) -> `pipeline`
//! (create/apply/reverse, image I/O) -> `batch` (directory trees).

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod batch;
pub mod config;
pub mod container;
pub mod error;
pub mod filters;
pub mod kernels;
pub mod pipeline;
pub mod types;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use config::PatchConfig;
pub use error::PatchError;
pub use filters::FilterKind;
pub use pipeline::{apply_patch, create_patch, reverse_original};
pub use types::{BitDepth, Image};
