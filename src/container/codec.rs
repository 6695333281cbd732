// In: src/container/codec.rs

//! This module contains the pack/unpack pair that serializes a payload image
//! and exactly two sign maps into one image-shaped container, and back.
//!
//! Sign maps are bit-packed MSB-first with `bitvec`, one byte per container
//! sample regardless of depth. The container row length is the payload row
//! length, so zero padding is inserted to make the stream rectangular.

use bitvec::prelude::*;
use ndarray::Array3;

use super::format::{
    inferred_map_count, packed_map_len, remainder_to_multiple, tail_len, ContainerTail,
    BITS_PER_MAP_SAMPLE, MAP_COUNT,
};
use crate::error::PatchError;
use crate::types::Image;

/// The result of `unpack`: the payload and the two sign maps, in pack order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    pub payload: Image,
    pub maps: [Array3<bool>; MAP_COUNT],
}

//==================================================================================
// 1. Private Core Logic
//==================================================================================

/// Packs a boolean map into `ceil(len / 8)` byte-valued samples, MSB first.
fn pack_bits(map: &Array3<bool>) -> Vec<u16> {
    let mut bits: BitVec<u8, Msb0> = map.iter().copied().collect();
    // Zero the over-run bits of the last byte explicitly.
    bits.resize(packed_map_len(map.len()) * BITS_PER_MAP_SAMPLE, false);
    bits.as_raw_slice().iter().map(|&b| u16::from(b)).collect()
}

/// Unpacks byte-valued samples into exactly `payload_len` booleans.
fn unpack_bits(
    samples: &[u16],
    payload_len: usize,
    overrun: bool,
) -> Result<Vec<bool>, PatchError> {
    let mut bytes = Vec::with_capacity(samples.len());
    for &sample in samples {
        let byte = u8::try_from(sample).map_err(|_| {
            PatchError::ContainerFormat(format!("sign map sample {} is not a byte", sample))
        })?;
        bytes.push(byte);
    }
    let bits = BitSlice::<u8, Msb0>::from_slice(&bytes);

    let overrun_bits = bits.len().checked_sub(payload_len).ok_or_else(|| {
        PatchError::ContainerFormat(format!(
            "sign map holds {} bits, payload needs {}",
            bits.len(),
            payload_len
        ))
    })?;
    let consistent = if overrun {
        overrun_bits > 0 && overrun_bits < BITS_PER_MAP_SAMPLE
    } else {
        overrun_bits == 0
    };
    if !consistent {
        return Err(PatchError::ContainerFormat(format!(
            "over-run flag {} disagrees with {} spare bits",
            overrun, overrun_bits
        )));
    }
    Ok(bits[..payload_len].iter().by_vals().collect())
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Serializes `payload` and `maps` into one container image of the payload's
/// width, channel count and depth.
///
/// # Errors
/// * `UnsupportedMapCount` unless exactly two maps are given.
/// * `ShapeMismatch` if a map's shape differs from the payload's.
/// * `ContainerFormat` if the payload is too small for the map count to be
///   inferred back, or a dimension does not fit a footer word.
pub fn pack(payload: &Image, maps: &[Array3<bool>]) -> Result<Image, PatchError> {
    if maps.len() != MAP_COUNT {
        return Err(PatchError::UnsupportedMapCount(maps.len()));
    }
    let shape = payload.dim();
    for map in maps {
        if map.dim() != shape {
            return Err(PatchError::shape_mismatch(payload.samples().shape(), map.shape()));
        }
    }

    let (_, width, channels) = shape;
    let depth = payload.depth();
    let payload_len = payload.samples().len();
    let row_len = width * channels;
    let map_len = packed_map_len(payload_len);

    if inferred_map_count(MAP_COUNT * map_len, payload_len) != MAP_COUNT {
        return Err(PatchError::ContainerFormat(format!(
            "a payload of {} samples is too small to carry {} sign maps",
            payload_len, MAP_COUNT
        )));
    }

    let mut stream: Vec<u16> = Vec::with_capacity(payload_len + MAP_COUNT * map_len + row_len);
    stream.extend(payload.samples().iter().copied());
    for map in maps {
        stream.extend(pack_bits(map));
    }

    let padding = remainder_to_multiple(stream.len() + tail_len(depth), row_len);
    stream.resize(stream.len() + padding, 0);

    let tail = ContainerTail {
        shape,
        padding,
        overrun: payload_len % BITS_PER_MAP_SAMPLE != 0,
    };
    stream.extend(tail.encode(depth)?);

    let rows = stream.len() / row_len;
    log_metric!(
        "event" = "pack",
        "payload_len" = payload_len,
        "map_len" = map_len,
        "padding" = padding,
        "container_rows" = rows
    );

    let samples = Array3::from_shape_vec((rows, width, channels), stream)
        .map_err(|e| PatchError::ContainerFormat(e.to_string()))?;
    Image::new(samples, depth)
}

/// Recovers the payload and both sign maps from a container image.
///
/// # Errors
/// * `UnsupportedMapCount` if the map region implies anything but two maps.
/// * `ContainerFormat` for a truncated, inconsistent or corrupted container.
pub fn unpack(container: &Image) -> Result<Unpacked, PatchError> {
    let depth = container.depth();
    let (_, width, channels) = container.dim();
    let stream: Vec<u16> = container.samples().iter().copied().collect();

    let tail_len = tail_len(depth);
    if stream.len() < tail_len {
        return Err(PatchError::ContainerFormat(format!(
            "container of {} samples is shorter than its {}-sample tail",
            stream.len(),
            tail_len
        )));
    }
    let tail = ContainerTail::decode(&stream[stream.len() - tail_len..], depth)?;

    let (height, payload_width, payload_channels) = tail.shape;
    if payload_width != width || payload_channels != channels {
        return Err(PatchError::ContainerFormat(format!(
            "footer shape {:?} does not match container rows of {}x{}",
            tail.shape, width, channels
        )));
    }
    let payload_len = height * width * channels;
    if payload_len == 0 {
        return Err(PatchError::ContainerFormat("empty payload".to_string()));
    }

    let fixed_len = payload_len + tail.padding + tail_len;
    let total_map_len = stream.len().checked_sub(fixed_len).ok_or_else(|| {
        PatchError::ContainerFormat(format!(
            "container of {} samples cannot hold a {}-sample payload",
            stream.len(),
            payload_len
        ))
    })?;
    let map_count = inferred_map_count(total_map_len, payload_len);
    if map_count != MAP_COUNT {
        return Err(PatchError::UnsupportedMapCount(map_count));
    }
    if total_map_len % MAP_COUNT != 0 {
        return Err(PatchError::ContainerFormat("uneven sign-map region".to_string()));
    }
    let map_len = total_map_len / MAP_COUNT;

    let padding_start = payload_len + total_map_len;
    if stream[padding_start..padding_start + tail.padding]
        .iter()
        .any(|&s| s != 0)
    {
        return Err(PatchError::ContainerFormat("non-zero padding".to_string()));
    }

    log_metric!(
        "event" = "unpack",
        "payload_len" = payload_len,
        "map_len" = map_len,
        "padding" = tail.padding,
        "overrun" = tail.overrun
    );

    let payload_samples = Array3::from_shape_vec(tail.shape, stream[..payload_len].to_vec())
        .map_err(|e| PatchError::ContainerFormat(e.to_string()))?;
    let payload = Image::new(payload_samples, depth)?;

    let mut maps = Vec::with_capacity(MAP_COUNT);
    for index in 0..MAP_COUNT {
        let offset = payload_len + index * map_len;
        let bits = unpack_bits(&stream[offset..offset + map_len], payload_len, tail.overrun)?;
        let map = Array3::from_shape_vec(tail.shape, bits)
            .map_err(|e| PatchError::ContainerFormat(e.to_string()))?;
        maps.push(map);
    }
    let maps: [Array3<bool>; MAP_COUNT] = maps
        .try_into()
        .map_err(|_| PatchError::UnsupportedMapCount(map_count))?;

    Ok(Unpacked { payload, maps })
}

//==================================================================================
// 3. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::format::ContainerTail;
    use crate::types::BitDepth;

    fn payload(shape: (usize, usize, usize), depth: BitDepth) -> Image {
        let modulus = depth.max_value() as usize + 1;
        let samples = Array3::from_shape_fn(shape, |(y, x, c)| {
            ((y * 7919 + x * 104_729 + c * 31) % modulus) as u16
        });
        Image::new(samples, depth).unwrap()
    }

    fn map(shape: (usize, usize, usize), salt: usize) -> Array3<bool> {
        Array3::from_shape_fn(shape, |(y, x, c)| (y * 3 + x * 5 + c + salt) % 3 != 0)
    }

    fn assert_roundtrip(shape: (usize, usize, usize), depth: BitDepth) {
        let payload = payload(shape, depth);
        let maps = [map(shape, 0), map(shape, 1)];
        let container = pack(&payload, &maps).unwrap();

        assert_eq!(container.width(), shape.1);
        assert_eq!(container.channels(), shape.2);
        assert_eq!(container.depth(), depth);

        let unpacked = unpack(&container).unwrap();
        assert_eq!(unpacked.payload, payload);
        assert_eq!(unpacked.maps, maps);
    }

    #[test]
    fn test_roundtrip_eight_bit_shapes() {
        // 64 samples (multiple of 8), 48 samples, and 75 samples (over-run).
        assert_roundtrip((4, 4, 4), BitDepth::Eight);
        assert_roundtrip((4, 4, 3), BitDepth::Eight);
        assert_roundtrip((5, 5, 3), BitDepth::Eight);
        assert_roundtrip((17, 9, 4), BitDepth::Eight);
    }

    #[test]
    fn test_roundtrip_sixteen_bit_shapes() {
        assert_roundtrip((4, 4, 4), BitDepth::Sixteen);
        assert_roundtrip((5, 5, 3), BitDepth::Sixteen);
        assert_roundtrip((13, 2, 3), BitDepth::Sixteen);
    }

    #[test]
    fn test_container_layout_for_small_rgba() {
        let shape = (4, 4, 4);
        let payload = payload(shape, BitDepth::Eight);
        let maps = [Array3::from_elem(shape, true), Array3::from_elem(shape, false)];
        let container = pack(&payload, &maps).unwrap();

        // 64 payload + 2*8 map + 9 tail = 89, padded to 96 = 6 rows of 16.
        assert_eq!(container.dim(), (6, 4, 4));
        let stream: Vec<u16> = container.samples().iter().copied().collect();
        assert!(stream[64..72].iter().all(|&s| s == 0xFF));
        assert!(stream[72..80].iter().all(|&s| s == 0));
        assert!(stream[80..87].iter().all(|&s| s == 0));
        let tail = ContainerTail::decode(&stream[87..], BitDepth::Eight).unwrap();
        assert_eq!(tail.shape, shape);
        assert_eq!(tail.padding, 7);
        assert!(!tail.overrun);
    }

    #[test]
    fn test_overrun_bits_are_zeroed_and_flagged() {
        let shape = (5, 5, 3); // 75 samples -> 10 bytes, 5 spare bits
        let payload = payload(shape, BitDepth::Eight);
        let maps = [Array3::from_elem(shape, true), Array3::from_elem(shape, true)];
        let container = pack(&payload, &maps).unwrap();
        let stream: Vec<u16> = container.samples().iter().copied().collect();
        assert_eq!(stream[75 + 9], 0b1110_0000);

        let tail = ContainerTail::decode(&stream[stream.len() - 9..], BitDepth::Eight).unwrap();
        assert!(tail.overrun);
    }

    #[test]
    fn test_pack_rejects_wrong_map_count() {
        let shape = (4, 4, 3);
        let payload = payload(shape, BitDepth::Eight);
        let three = [map(shape, 0), map(shape, 1), map(shape, 2)];
        assert!(matches!(
            pack(&payload, &three),
            Err(PatchError::UnsupportedMapCount(3))
        ));
        assert!(matches!(
            pack(&payload, &three[..1]),
            Err(PatchError::UnsupportedMapCount(1))
        ));
    }

    #[test]
    fn test_pack_rejects_shape_mismatch() {
        let payload = payload((4, 4, 3), BitDepth::Eight);
        let maps = [map((4, 4, 3), 0), map((4, 4, 4), 1)];
        assert!(matches!(
            pack(&payload, &maps),
            Err(PatchError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_pack_rejects_uninferable_payload() {
        // 9 samples -> 2 bytes per map -> 32 bits / 9 = 3 inferred maps.
        let payload = payload((3, 1, 3), BitDepth::Eight);
        let maps = [map((3, 1, 3), 0), map((3, 1, 3), 1)];
        assert!(matches!(
            pack(&payload, &maps),
            Err(PatchError::ContainerFormat(_))
        ));
    }

    #[test]
    fn test_unpack_rejects_third_map() {
        let shape = (4, 4, 4);
        let payload = payload(shape, BitDepth::Eight);
        let mut stream: Vec<u16> = payload.samples().iter().copied().collect();
        for salt in 0..3 {
            stream.extend(pack_bits(&map(shape, salt)));
        }
        // 64 + 24 + 9 = 97 -> pad to 112
        let padding = remainder_to_multiple(stream.len() + 9, 16);
        stream.resize(stream.len() + padding, 0);
        let tail = ContainerTail {
            shape,
            padding,
            overrun: false,
        };
        stream.extend(tail.encode(BitDepth::Eight).unwrap());
        let rows = stream.len() / 16;
        let container = Image::new(
            Array3::from_shape_vec((rows, 4, 4), stream).unwrap(),
            BitDepth::Eight,
        )
        .unwrap();

        assert!(matches!(
            unpack(&container),
            Err(PatchError::UnsupportedMapCount(3))
        ));
    }

    #[test]
    fn test_unpack_rejects_uneven_map_region() {
        let shape = (4, 4, 4);
        let payload = payload(shape, BitDepth::Eight);
        let mut stream: Vec<u16> = payload.samples().iter().copied().collect();
        // 17 map samples still infer two maps (136 bits / 64) but cannot split evenly.
        stream.extend(pack_bits(&map(shape, 0)));
        stream.extend(pack_bits(&map(shape, 1)));
        stream.push(0);
        // 64 + 17 + 9 = 90 -> pad to 96
        let padding = remainder_to_multiple(stream.len() + 9, 16);
        stream.resize(stream.len() + padding, 0);
        let tail = ContainerTail {
            shape,
            padding,
            overrun: false,
        };
        stream.extend(tail.encode(BitDepth::Eight).unwrap());
        let rows = stream.len() / 16;
        let container = Image::new(
            Array3::from_shape_vec((rows, 4, 4), stream).unwrap(),
            BitDepth::Eight,
        )
        .unwrap();

        match unpack(&container) {
            Err(PatchError::ContainerFormat(message)) => assert!(message.contains("uneven")),
            other => panic!("expected ContainerFormat, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unpack_rejects_footer_width_mismatch() {
        let payload = payload((4, 4, 4), BitDepth::Eight);
        let container = pack(&payload, &[map((4, 4, 4), 0), map((4, 4, 4), 1)]).unwrap();
        let (rows, width, channels) = container.dim();
        let stream: Vec<u16> = container.samples().iter().copied().collect();
        let reshaped = Image::new(
            Array3::from_shape_vec((rows * 2, width / 2, channels), stream).unwrap(),
            BitDepth::Eight,
        )
        .unwrap();
        assert!(matches!(
            unpack(&reshaped),
            Err(PatchError::ContainerFormat(_))
        ));
    }

    #[test]
    fn test_unpack_rejects_tiny_container() {
        let container = Image::new(Array3::zeros((1, 2, 3)), BitDepth::Eight).unwrap();
        assert!(matches!(
            unpack(&container),
            Err(PatchError::ContainerFormat(_))
        ));
    }
}
