// In: src/container/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Patch Container
// ====================================================================================
//
// A patch is persisted as an ordinary lossless image. Its samples are not
// pixels: they are a flat, row-major byte stream that happens to be shaped like
// an image so any PNG codec can carry it.
//
//   [payload][sign map 1][sign map 2][zero padding][flag][padding count][shape footer]
//    ^ P samples         ^ ceil(P/8) each          ^ fixed-size tail, read from the end
//
// Nothing in the stream records the number of sign maps or their size. The
// decoder reads the tail, recovers the payload shape, and infers everything
// else from the total length. That inference only works for exactly two maps,
// so the two-map rule is checked on both sides.
//
// ====================================================================================

pub mod codec;
pub mod format;

pub use self::codec::{pack, unpack, Unpacked};
pub use self::format::{ContainerTail, MAP_COUNT};
