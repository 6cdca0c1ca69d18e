// In: src/bits.rs

//! This module contains the pure, stateless bit-unpacking kernel: packed
//! bytes to one output byte per bit, most-significant bit first. It has no
//! dependency on decoding and no failure modes for well-formed inputs.

/// Unpacks `src` into `dst`, writing `src.len() * 8` bytes, each 0 or 1.
/// For input byte `v` at index `i`, `dst[8*i + k] = (v >> (7 - k)) & 1`.
///
/// # Panics
/// Panics if `dst` is shorter than `src.len() * 8`; the C boundary guarantees
/// the capacity, and Rust callers should prefer [`unpack_bits`].
pub fn unpack_bits_into(src: &[u8], dst: &mut [u8]) {
    for (i, &value) in src.iter().enumerate() {
        let out = &mut dst[i * 8..i * 8 + 8];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = (value >> (7 - k)) & 1;
        }
    }
}

/// Allocating convenience wrapper around [`unpack_bits_into`].
pub fn unpack_bits(src: &[u8]) -> Vec<u8> {
    let mut dst = vec![0u8; src.len() * 8];
    unpack_bits_into(src, &mut dst);
    dst
}
