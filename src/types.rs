//! The type registry: one 5-bit type code, fixed/variable width, and an
//! encode/decode routine, per supported shard-key payload type.
//!
//! Codes are hard-coded and stable forever once shipped — adding a type
//! takes a new code, and a retired code is never reused. There is no
//! dynamic dispatch here: each type is a distinct Rust type implementing
//! [`ShardValue`], so the compiler picks the encoding at the call site.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Maximum encoded length of a variable-width payload (string, blob).
pub const MAX_VARIABLE_LEN: usize = u16::MAX as usize;

/// A supported shard-key component type.
///
/// This is a closed set: every supported payload type in `spec.md` §3 has
/// exactly one impl below, and no downstream crate can add another (the
/// trait is not `pub`-implementable outside this crate, enforced by
/// `TYPE_CODE` being part of a hard-coded registry rather than a derive).
pub trait ShardValue: Clone + std::fmt::Debug {
    /// The type's 5-bit code. Unique across all supported types, stable
    /// across versions.
    const TYPE_CODE: u8;

    /// Human-readable name, used in `InvalidMetadata` messages.
    const TYPE_NAME: &'static str;

    /// Encoded size of `self`, in bytes. Constant for fixed-width types.
    fn encoded_size(&self) -> usize;

    /// Append the encoded form of `self` to `buf`. Fails only for
    /// variable-width types whose payload exceeds [`MAX_VARIABLE_LEN`].
    fn encode(&self, buf: &mut Vec<u8>) -> Result<()>;

    /// Decode a value from the front of `buf`, returning the value and the
    /// number of bytes consumed. Rejects buffers too short for the
    /// declared width.
    fn decode(buf: &[u8]) -> Result<(Self, usize)>
    where
        Self: Sized;

    /// The type's canonical empty value.
    fn empty() -> Self;

    /// Whether `self` equals this type's canonical empty value.
    fn is_empty(&self) -> bool {
        self.key_eq(&Self::empty())
    }

    /// Identifier-style equality: bit-pattern equality for floats, so
    /// `NaN == NaN`, ordinary equality otherwise.
    fn key_eq(&self, other: &Self) -> bool;

    /// Identifier-style hash, consistent with [`ShardValue::key_eq`].
    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H);
}

fn need(buf: &[u8], len: usize, reason: &'static str) -> Result<()> {
    if buf.len() < len {
        Err(Error::InvalidBinary { reason })
    } else {
        Ok(())
    }
}

macro_rules! impl_fixed_int {
    ($ty:ty, $code:expr, $name:expr, $width:expr, $read:ident, $write:ident) => {
        impl ShardValue for $ty {
            const TYPE_CODE: u8 = $code;
            const TYPE_NAME: &'static str = $name;

            fn encoded_size(&self) -> usize {
                $width
            }

            fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
                let mut tmp = [0u8; $width];
                LittleEndian::$write(&mut tmp, *self);
                buf.extend_from_slice(&tmp);
                Ok(())
            }

            fn decode(buf: &[u8]) -> Result<(Self, usize)> {
                need(buf, $width, concat!("buffer too short for ", $name))?;
                Ok((LittleEndian::$read(&buf[..$width]), $width))
            }

            fn empty() -> Self {
                0
            }

            fn key_eq(&self, other: &Self) -> bool {
                self == other
            }

            fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(self, state);
            }
        }
    };
}

impl_fixed_int!(i16, 1, "i16", 2, read_i16, write_i16);
impl_fixed_int!(i32, 2, "i32", 4, read_i32, write_i32);
impl_fixed_int!(i64, 3, "i64", 8, read_i64, write_i64);
impl_fixed_int!(u16, 5, "u16", 2, read_u16, write_u16);
impl_fixed_int!(u32, 6, "u32", 4, read_u32, write_u32);
impl_fixed_int!(u64, 7, "u64", 8, read_u64, write_u64);

impl ShardValue for i8 {
    const TYPE_CODE: u8 = 0;
    const TYPE_NAME: &'static str = "i8";

    fn encoded_size(&self) -> usize {
        1
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.push(*self as u8);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 1, "buffer too short for i8")?;
        Ok((buf[0] as i8, 1))
    }

    fn empty() -> Self {
        0
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(self, state);
    }
}

impl ShardValue for u8 {
    const TYPE_CODE: u8 = 4;
    const TYPE_NAME: &'static str = "u8";

    fn encoded_size(&self) -> usize {
        1
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.push(*self);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 1, "buffer too short for u8")?;
        Ok((buf[0], 1))
    }

    fn empty() -> Self {
        0
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(self, state);
    }
}

impl ShardValue for bool {
    const TYPE_CODE: u8 = 8;
    const TYPE_NAME: &'static str = "bool";

    fn encoded_size(&self) -> usize {
        1
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.push(*self as u8);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 1, "buffer too short for bool")?;
        Ok((buf[0] != 0, 1))
    }

    fn empty() -> Self {
        false
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(self, state);
    }
}

impl ShardValue for f32 {
    const TYPE_CODE: u8 = 9;
    const TYPE_NAME: &'static str = "f32";

    fn encoded_size(&self) -> usize {
        4
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let mut tmp = [0u8; 4];
        LittleEndian::write_u32(&mut tmp, self.to_bits());
        buf.extend_from_slice(&tmp);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 4, "buffer too short for f32")?;
        Ok((f32::from_bits(LittleEndian::read_u32(&buf[..4])), 4))
    }

    fn empty() -> Self {
        0.0
    }

    fn key_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl ShardValue for f64 {
    const TYPE_CODE: u8 = 10;
    const TYPE_NAME: &'static str = "f64";

    fn encoded_size(&self) -> usize {
        8
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let mut tmp = [0u8; 8];
        LittleEndian::write_u64(&mut tmp, self.to_bits());
        buf.extend_from_slice(&tmp);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 8, "buffer too short for f64")?;
        Ok((f64::from_bits(LittleEndian::read_u64(&buf[..8])), 8))
    }

    fn empty() -> Self {
        0.0
    }

    fn key_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl ShardValue for char {
    const TYPE_CODE: u8 = 11;
    const TYPE_NAME: &'static str = "char";

    fn encoded_size(&self) -> usize {
        4
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let mut tmp = [0u8; 4];
        LittleEndian::write_u32(&mut tmp, *self as u32);
        buf.extend_from_slice(&tmp);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 4, "buffer too short for char")?;
        let scalar = LittleEndian::read_u32(&buf[..4]);
        let c = char::from_u32(scalar)
            .ok_or(Error::InvalidBinary { reason: "char payload is not a valid unicode scalar" })?;
        Ok((c, 4))
    }

    fn empty() -> Self {
        '\u{0}'
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(self, state);
    }
}

/// 128-bit fixed-point decimal: sign, 96-bit mantissa, and a base-10 scale.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decimal {
    pub negative: bool,
    /// Low 96 bits significant; the top 32 bits are always zero.
    pub mantissa: u128,
    pub scale: u8,
}

const U96_MASK: u128 = (1u128 << 96) - 1;

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative
            && (self.mantissa & U96_MASK) == (other.mantissa & U96_MASK)
            && self.scale == other.scale
    }
}

impl ShardValue for Decimal {
    const TYPE_CODE: u8 = 12;
    const TYPE_NAME: &'static str = "decimal";

    fn encoded_size(&self) -> usize {
        16
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.push(self.negative as u8);
        let mantissa = self.mantissa & U96_MASK;
        buf.extend_from_slice(&mantissa.to_be_bytes()[4..16]);
        buf.push(self.scale);
        buf.extend_from_slice(&[0, 0]);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 16, "buffer too short for decimal")?;
        let negative = match buf[0] {
            0 => false,
            1 => true,
            _ => return Err(Error::InvalidBinary { reason: "decimal sign byte not 0 or 1" }),
        };
        let mut mantissa_be = [0u8; 16];
        mantissa_be[4..16].copy_from_slice(&buf[1..13]);
        let mantissa = u128::from_be_bytes(mantissa_be);
        let scale = buf[13];
        if buf[14] != 0 || buf[15] != 0 {
            return Err(Error::InvalidBinary { reason: "decimal reserved bytes nonzero" });
        }
        Ok((Decimal { negative, mantissa, scale }, 16))
    }

    fn empty() -> Self {
        Decimal { negative: false, mantissa: 0, scale: 0 }
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.negative.hash(state);
        (self.mantissa & U96_MASK).hash(state);
        self.scale.hash(state);
    }
}

/// An opaque 16-byte identifier (UUID/GUID). Stored and compared byte-for-byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Guid(pub [u8; 16]);

impl ShardValue for Guid {
    const TYPE_CODE: u8 = 13;
    const TYPE_NAME: &'static str = "guid";

    fn encoded_size(&self) -> usize {
        16
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend_from_slice(&self.0);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 16, "buffer too short for guid")?;
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&buf[..16]);
        Ok((Guid(bytes), 16))
    }

    fn empty() -> Self {
        Guid([0u8; 16])
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// How a [`Timestamp`]'s tick count should be interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TimestampKind {
    #[default]
    Unspecified = 0,
    Utc = 1,
    Local = 2,
}

impl TimestampKind {
    fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(TimestampKind::Unspecified),
            1 => Ok(TimestampKind::Utc),
            2 => Ok(TimestampKind::Local),
            _ => Err(Error::InvalidBinary { reason: "timestamp kind byte not 0, 1, or 2" }),
        }
    }
}

/// 100-nanosecond ticks since the reference epoch, with a kind discriminator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub ticks: i64,
    pub kind: TimestampKind,
}

impl ShardValue for Timestamp {
    const TYPE_CODE: u8 = 14;
    const TYPE_NAME: &'static str = "timestamp";

    fn encoded_size(&self) -> usize {
        9
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let mut tmp = [0u8; 8];
        LittleEndian::write_i64(&mut tmp, self.ticks);
        buf.extend_from_slice(&tmp);
        buf.push(self.kind as u8);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 9, "buffer too short for timestamp")?;
        let ticks = LittleEndian::read_i64(&buf[..8]);
        let kind = TimestampKind::from_u8(buf[8])?;
        Ok((Timestamp { ticks, kind }, 9))
    }

    fn empty() -> Self {
        Timestamp { ticks: 0, kind: TimestampKind::Unspecified }
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ticks.hash(state);
        self.kind.hash(state);
    }
}

/// Days since the reference epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Date(pub i32);

impl ShardValue for Date {
    const TYPE_CODE: u8 = 15;
    const TYPE_NAME: &'static str = "date";

    fn encoded_size(&self) -> usize {
        4
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let mut tmp = [0u8; 4];
        LittleEndian::write_i32(&mut tmp, self.0);
        buf.extend_from_slice(&tmp);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 4, "buffer too short for date")?;
        Ok((Date(LittleEndian::read_i32(&buf[..4])), 4))
    }

    fn empty() -> Self {
        Date(0)
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Ticks since midnight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TimeOfDay(pub i64);

impl ShardValue for TimeOfDay {
    const TYPE_CODE: u8 = 16;
    const TYPE_NAME: &'static str = "time";

    fn encoded_size(&self) -> usize {
        8
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let mut tmp = [0u8; 8];
        LittleEndian::write_i64(&mut tmp, self.0);
        buf.extend_from_slice(&tmp);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 8, "buffer too short for time")?;
        Ok((TimeOfDay(LittleEndian::read_i64(&buf[..8])), 8))
    }

    fn empty() -> Self {
        TimeOfDay(0)
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// A signed duration, in ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Timespan(pub i64);

impl ShardValue for Timespan {
    const TYPE_CODE: u8 = 17;
    const TYPE_NAME: &'static str = "timespan";

    fn encoded_size(&self) -> usize {
        8
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        let mut tmp = [0u8; 8];
        LittleEndian::write_i64(&mut tmp, self.0);
        buf.extend_from_slice(&tmp);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        need(buf, 8, "buffer too short for timespan")?;
        Ok((Timespan(LittleEndian::read_i64(&buf[..8])), 8))
    }

    fn empty() -> Self {
        Timespan(0)
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

fn encode_variable(bytes: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    if bytes.len() > MAX_VARIABLE_LEN {
        return Err(Error::InvalidBinary { reason: "variable-width payload exceeds 65535 bytes" });
    }
    let mut len_bytes = [0u8; 2];
    LittleEndian::write_u16(&mut len_bytes, bytes.len() as u16);
    buf.extend_from_slice(&len_bytes);
    buf.extend_from_slice(bytes);
    Ok(())
}

fn decode_variable(buf: &[u8], what: &'static str) -> Result<(&[u8], usize)> {
    need(buf, 2, "buffer too short for length prefix")?;
    let len = LittleEndian::read_u16(&buf[..2]) as usize;
    need(&buf[2..], len, what)?;
    Ok((&buf[2..2 + len], 2 + len))
}

impl ShardValue for String {
    const TYPE_CODE: u8 = 18;
    const TYPE_NAME: &'static str = "string";

    fn encoded_size(&self) -> usize {
        2 + self.len()
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        encode_variable(self.as_bytes(), buf)
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let (bytes, consumed) = decode_variable(buf, "buffer too short for string payload")?;
        let s = std::str::from_utf8(bytes)
            .map_err(|_| Error::InvalidBinary { reason: "string payload is not valid utf-8" })?
            .to_owned();
        Ok((s, consumed))
    }

    fn empty() -> Self {
        String::new()
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(self, state);
    }
}

impl ShardValue for Vec<u8> {
    const TYPE_CODE: u8 = 19;
    const TYPE_NAME: &'static str = "blob";

    fn encoded_size(&self) -> usize {
        2 + self.len()
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        encode_variable(self, buf)
    }

    fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let (bytes, consumed) = decode_variable(buf, "buffer too short for blob payload")?;
        Ok((bytes.to_vec(), consumed))
    }

    fn empty() -> Self {
        Vec::new()
    }

    fn key_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn key_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(self, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: ShardValue + PartialEq>(v: T) {
        let mut buf = Vec::new();
        v.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), v.encoded_size());
        let (decoded, consumed) = T::decode(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert!(v.key_eq(&decoded));
    }

    #[test]
    fn fixed_width_round_trips() {
        round_trip(-42i8);
        round_trip(12345i16);
        round_trip(-1234567i32);
        round_trip(9_000_000_000i64);
        round_trip(200u8);
        round_trip(60000u16);
        round_trip(4_000_000_000u32);
        round_trip(18_000_000_000_000_000_000u64);
        round_trip(true);
        round_trip(false);
        round_trip('λ');
    }

    #[test]
    fn float_nan_is_key_equal_to_itself() {
        let nan = f64::NAN;
        assert!(nan.key_eq(&f64::NAN));
        let mut buf = Vec::new();
        nan.encode(&mut buf).unwrap();
        let (decoded, _) = f64::decode(&buf).unwrap();
        assert!(decoded.is_nan());
        assert!(nan.key_eq(&decoded));
    }

    #[test]
    fn string_round_trip_and_empty() {
        round_trip("hello shard".to_owned());
        assert!(String::empty().is_empty());
        let max = "x".repeat(MAX_VARIABLE_LEN);
        round_trip(max);
        let too_long = "x".repeat(MAX_VARIABLE_LEN + 1);
        let mut buf = Vec::new();
        assert!(too_long.encode(&mut buf).is_err());
    }

    #[test]
    fn blob_round_trip() {
        round_trip(vec![1u8, 2, 3, 4, 5]);
        round_trip(Vec::<u8>::new());
    }

    #[test]
    fn decimal_round_trip() {
        round_trip(Decimal { negative: true, mantissa: 123_456_789, scale: 2 });
        assert!(Decimal::empty().is_empty());
    }

    #[test]
    fn guid_round_trip() {
        round_trip(Guid([7u8; 16]));
        assert!(Guid::empty().is_empty());
    }

    #[test]
    fn timestamp_round_trip() {
        round_trip(Timestamp { ticks: 123_456, kind: TimestampKind::Utc });
        assert!(Timestamp::empty().is_empty());
    }

    #[test]
    fn type_codes_are_five_bit() {
        let codes = [
            i8::TYPE_CODE, i16::TYPE_CODE, i32::TYPE_CODE, i64::TYPE_CODE,
            u8::TYPE_CODE, u16::TYPE_CODE, u32::TYPE_CODE, u64::TYPE_CODE,
            bool::TYPE_CODE, f32::TYPE_CODE, f64::TYPE_CODE, char::TYPE_CODE,
            Decimal::TYPE_CODE, Guid::TYPE_CODE, Timestamp::TYPE_CODE,
            Date::TYPE_CODE, TimeOfDay::TYPE_CODE, Timespan::TYPE_CODE,
            String::TYPE_CODE, Vec::<u8>::TYPE_CODE,
        ];
        for c in codes {
            assert!(c < 32, "type code {c} does not fit in 5 bits");
        }
        let mut sorted = codes;
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len(), "type codes must be unique");
    }
}
