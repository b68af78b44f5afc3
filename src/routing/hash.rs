//! Token hash seed.
//!
//! A 31-multiplier rolling hash over UTF-16 code units with 32-bit signed
//! wraparound at every step. The seed must be bit-identical across
//! implementations, so all arithmetic is explicit wrapping `i32`.

/// Fold one UTF-16 code unit into the running hash.
#[inline]
fn mix(hash: i32, unit: u16) -> i32 {
    hash.wrapping_shl(5)
        .wrapping_sub(hash)
        .wrapping_add(i32::from(unit))
}

/// Compute the routing seed for `text`.
///
/// Returns the absolute value of the signed 32-bit hash, so `i32::MIN`
/// becomes `2^31`. Empty text hashes to `0`.
pub fn token_hash(text: &str) -> u32 {
    text.encode_utf16().fold(0, mix).unsigned_abs()
}
