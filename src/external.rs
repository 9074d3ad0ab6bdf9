//! The external codec: wraps the binary form in a URL-safe textual form, a
//! 2-character checksum, and an XOR mask over the variable body
//! (`spec.md` §4.4).
//!
//! Pipeline on encode: mask the body with a keystream derived from
//! `shard_id`, base-64-encode the masked bytes with a `-`/`_` URL-safe,
//! unpadded alphabet, compute a 2-character checksum over the *pre-mask*
//! bytes, and prepend it. Decode reverses each step and rejects any
//! mismatch as [`Error::CorruptExternal`].
//!
//! The checksum sits in front so a validator can reject garbage without
//! ever base-64-decoding the body; do not move it. The mask is diffusion,
//! not secrecy — it exists so two keys differing only in record id look
//! unrelated as external strings; do not strengthen it into a keyed MAC.

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Smallest possible binary form: 1-byte header, 1-byte arity-1 metadata,
/// a 1-byte fixed-width payload, 4-byte tail.
const MIN_BINARY_LEN: usize = 7;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

fn alphabet_index(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

/// XOR an in-place keystream derived from `shard_id` over `data`. Masking
/// and unmasking are the same operation (XOR is self-inverse). This exact
/// keystream is part of the wire format and must never change.
fn mask(data: &mut [u8], shard_id: i16) {
    let [lo, hi] = shard_id.to_le_bytes();
    for (i, byte) in data.iter_mut().enumerate() {
        let k = match i % 4 {
            0 => lo,
            1 => hi,
            2 => lo ^ hi,
            _ => lo.wrapping_add(hi),
        };
        *byte ^= k ^ (i as u8);
    }
}

/// A saturating 12-bit rolling sum over the pre-mask binary form. Stable
/// forever once shipped; not a MAC, just accidental-corruption detection.
fn checksum12(data: &[u8]) -> u16 {
    let mut acc: u32 = 0x1F3B;
    for &b in data {
        acc = acc.wrapping_mul(131).wrapping_add(b as u32 + 1);
    }
    ((acc ^ (acc >> 16)) & 0x0FFF) as u16
}

fn checksum_chars(data: &[u8]) -> [u8; 2] {
    let c = checksum12(data);
    [ALPHABET[((c >> 6) & 0x3F) as usize], ALPHABET[(c & 0x3F) as usize]]
}

/// Encode `binary` (a complete, already-validated binary form) as an
/// external string, masking the body with `shard_id`'s derived keystream.
pub fn to_external_string(binary: &[u8], shard_id: i16) -> String {
    let checksum = checksum_chars(binary);
    let mut masked = binary.to_vec();
    if masked.len() > 5 {
        mask(&mut masked[1..masked.len() - 4], shard_id);
    }
    let mut out = String::with_capacity(2 + (4 * binary.len()).div_ceil(3));
    out.push(checksum[0] as char);
    out.push(checksum[1] as char);
    URL_SAFE_NO_PAD.encode_string(&masked, &mut out);
    out
}

/// Decode an external string back into the original (pre-mask) binary
/// form, validating the checksum. The tail (origin, shard id, reserved
/// byte) is never masked, so `shard_id` can be read straight out of the
/// decoded bytes and used to unmask the body — callers don't need to know
/// it ahead of time.
pub fn from_external_string(s: &str) -> Result<Vec<u8>> {
    if s.len() < 2 {
        return Err(Error::CorruptExternal);
    }
    let (checksum_str, body) = s.split_at(2);
    let mut checksum = [0u8; 2];
    for (i, c) in checksum_str.bytes().enumerate() {
        checksum[i] = alphabet_index(c).ok_or(Error::CorruptExternal)?;
    }
    let masked = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|_| Error::CorruptExternal)?;
    if masked.len() < MIN_BINARY_LEN {
        return Err(Error::CorruptExternal);
    }
    // The tail carries shard_id unmasked, so it can be read before the
    // body is unmasked.
    let shard_id = {
        let tail = &masked[masked.len() - 4..];
        i16::from_le_bytes([tail[1], tail[2]])
    };
    let mut unmasked = masked;
    mask(&mut unmasked[1..unmasked.len() - 4], shard_id);
    let expected = checksum_chars(&unmasked);
    let expected_idx = [
        alphabet_index(expected[0]).unwrap(),
        alphabet_index(expected[1]).unwrap(),
    ];
    if checksum != expected_idx {
        return Err(Error::CorruptExternal);
    }
    Ok(unmasked)
}

/// UTF-8 byte form of the external string.
pub fn to_utf8(binary: &[u8], shard_id: i16) -> Vec<u8> {
    to_external_string(binary, shard_id).into_bytes()
}

/// Inverse of [`to_utf8`]: `from_utf8(bytes)` is exactly
/// `from_external_string(utf8_decode(bytes))`.
pub fn from_utf8(bytes: &[u8]) -> Result<Vec<u8>> {
    let s = std::str::from_utf8(bytes).map_err(|_| Error::CorruptExternal)?;
    from_external_string(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let binary = vec![0x81u8, 0x40, 7, b'a', 5, 0, 0];
        let s = to_external_string(&binary, 5);
        let decoded = from_external_string(&s).unwrap();
        assert_eq!(decoded, binary);
    }

    #[test]
    fn alphabet_is_url_safe() {
        let binary = vec![0x81u8, 0x40, 7, b'a', 5, 0, 0];
        let s = to_external_string(&binary, 5);
        assert!(s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn single_char_flip_is_detected() {
        let binary = vec![0x81u8, 0x40, 7, b'a', 5, 0, 0];
        let s = to_external_string(&binary, 5);
        let mut failures = 0;
        let chars: Vec<char> = s.chars().collect();
        for i in 2..chars.len() {
            let mut flipped = chars.clone();
            let orig_idx = ALPHABET.iter().position(|&a| a == flipped[i] as u8).unwrap();
            let new_idx = (orig_idx + 1) % 64;
            flipped[i] = ALPHABET[new_idx] as char;
            let candidate: String = flipped.into_iter().collect();
            if from_external_string(&candidate).is_err() {
                failures += 1;
            }
        }
        let total = chars.len() - 2;
        assert!(
            failures * 100 >= total * 99,
            "expected >=99% detection, got {failures}/{total}"
        );
    }

    #[test]
    fn too_short_is_corrupt() {
        assert!(matches!(from_external_string("a"), Err(Error::CorruptExternal)));
        assert!(matches!(from_external_string(""), Err(Error::CorruptExternal)));
    }

    #[test]
    fn invalid_character_is_corrupt() {
        assert!(matches!(from_external_string("AA+++"), Err(Error::CorruptExternal)));
    }
}
