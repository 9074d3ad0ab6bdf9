//! The binary codec: composes the 1-byte header, the packed metadata, the
//! in-order component payloads, and the 4-byte tail into one contiguous
//! buffer, and validates that structure symmetrically on decode
//! (`spec.md` §4.3).
//!
//! ```text
//! byte 0     : header    — high bit = version tag (must be 1); low 2 bits = arity - 1
//! bytes 1..m : metadata  — type codes, see metadata.rs
//! bytes m..n : payloads, in order: record, child, grandchild, great_grandchild
//! final 4    : origin (1 byte) + shard_id (2 bytes LE) + reserved (1 byte, 0)
//! ```
//!
//! The header's low 2 bits hold `arity - 1`, not the literal arity — see
//! `metadata.rs` and `DESIGN.md` for why a literal arity of 4 can't survive
//! a 2-bit field.

use crate::error::{Error, Result};
use crate::metadata;
use byteorder::{ByteOrder, LittleEndian};

const TAIL_LEN: usize = 4;
const VERSION_BIT: u8 = 0x80;

/// The result of structurally validating a binary form: the tail fields,
/// plus the still-undecoded payload region (the caller decodes each
/// component's payload from this slice in order, since only the caller
/// knows the component types).
pub struct Decoded<'a> {
    pub origin: u8,
    pub shard_id: i16,
    pub payload: &'a [u8],
}

/// Compose a complete binary form from its parts. `type_codes` and
/// `payloads` must be the same length as `arity` and in component order.
pub fn encode(arity: u8, type_codes: &[u8], payloads: &[Vec<u8>], origin: u8, shard_id: i16) -> Vec<u8> {
    debug_assert_eq!(arity as usize, type_codes.len());
    debug_assert_eq!(arity as usize, payloads.len());
    let metadata = metadata::pack(arity, type_codes);
    let payload_len: usize = payloads.iter().map(Vec::len).sum();
    let mut buf = Vec::with_capacity(1 + metadata.len() + payload_len + TAIL_LEN);
    buf.push(VERSION_BIT | (arity - 1));
    buf.extend_from_slice(&metadata);
    for payload in payloads {
        buf.extend_from_slice(payload);
    }
    buf.push(origin);
    let mut shard_bytes = [0u8; 2];
    LittleEndian::write_i16(&mut shard_bytes, shard_id);
    buf.extend_from_slice(&shard_bytes);
    buf.push(0);
    buf
}

/// Structurally validate `buf` against `expected_arity`/`expected_codes`
/// and split it into its tail fields and undecoded payload region.
pub fn decode<'a>(buf: &'a [u8], expected_arity: u8, expected_codes: &[u8]) -> Result<Decoded<'a>> {
    if buf.len() < 1 + TAIL_LEN {
        return Err(Error::InvalidBinary { reason: "buffer shorter than minimum header and tail" });
    }
    let header = buf[0];
    if header & VERSION_BIT == 0 {
        return Err(Error::InvalidBinary { reason: "version bit not set" });
    }
    let arity = (header & 0x03) + 1;
    if arity != expected_arity {
        return Err(Error::InvalidMetadata { expected_type: "arity" });
    }
    let meta_consumed = metadata::unpack(&buf[1..], arity, expected_codes)?;
    let payload_start = 1 + meta_consumed;
    if buf.len() < payload_start + TAIL_LEN {
        return Err(Error::InvalidBinary { reason: "buffer too short for tail" });
    }
    let payload_end = buf.len() - TAIL_LEN;
    let payload = &buf[payload_start..payload_end];
    let tail = &buf[payload_end..];
    let reserved = tail[3];
    if reserved != 0 {
        return Err(Error::InvalidBinary { reason: "reserved tail byte nonzero" });
    }
    let origin = tail[0];
    let shard_id = LittleEndian::read_i16(&tail[1..3]);
    Ok(Decoded { origin, shard_id, payload })
}
