//! IFC-compressed GUIDs.
//!
//! A 128-bit UUID written as 22 base-64 digits: the first digit carries the
//! top two bits, each following digit six bits.

use uuid::Uuid;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Fresh random global id.
pub fn new_global_id() -> String {
    compress_global_id(Uuid::new_v4().as_u128())
}

/// Compress a 128-bit value into its 22-character form.
pub fn compress_global_id(value: u128) -> String {
    let mut out = String::with_capacity(22);
    out.push(ALPHABET[(value >> 126) as usize] as char);
    for digit in (0..21).rev() {
        let index = ((value >> (digit * 6)) & 0x3f) as usize;
        out.push(ALPHABET[index] as char);
    }
    out
}

/// Expand a 22-character global id, or `None` if it is malformed.
pub fn expand_global_id(text: &str) -> Option<u128> {
    if text.len() != 22 {
        return None;
    }
    let mut digits = text.bytes().map(|b| ALPHABET.iter().position(|a| *a == b));
    let first = digits.next()??;
    if first > 3 {
        return None;
    }
    digits.try_fold(first as u128, |acc, d| Some((acc << 6) | d? as u128))
}
