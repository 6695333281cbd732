// In: src/pipeline/mod.rs

//! The patch pipeline: image I/O, resampling, and the create/apply/reverse
//! orchestration that ties the kernels, the container codec and the filter
//! layer together.
//!
//! This is the only layer that touches the filesystem. Everything below it
//! works on in-memory `Image`s.

pub mod io;
pub mod orchestrator;
pub mod resample;


pub use self::io::{read_image, write_image};
pub use self::orchestrator::{
    apply_patch, apply_patch_file, compare_image_files, compare_images, create_patch,
    create_patch_file, decode_difference, encode_difference, reverse_original,
    reverse_original_file, self_test, EncodedDifference, SelfTestReport,
};
pub use self::resample::resized_to_shape;
