//! This module is the public entry point for all pure, stateless array kernels
//! used by the patch pipeline.
//!
//! Every kernel here is PURE RUST and panic-free on shape-matched inputs. They
//! know nothing about files, containers, or filters; the `pipeline` module is
//! the only place that decides the order they run in.
//!
//! * `transform`: branch-dependent linear recoding of signed sample arrays.
//! * `seed`: the content fingerprint every deterministic generator is keyed by.
//! * `noise`: the regenerable noise mask that hides the raw difference.

pub mod noise;
pub mod seed;
pub mod transform;

pub use self::noise::{synthesize_noise, MAX_NOISE_VARIANCE};
pub use self::seed::{compute_seed, seeded_generator};
pub use self::transform::{
    bool_index, is_non_negative, multi_linear_transform, sign_shift, sign_unshift, signed,
    signed_reconstruct,
};
