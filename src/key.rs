//! `ShardKey` variants: compound identifiers of the form
//! `(origin, shard, record[, child[, grandchild[, great_grandchild]]])`
//! (`spec.md` §3). Arity is a compile-time property — there are four
//! distinct generic structs, one per arity, rather than one struct with a
//! runtime-variable component count.
//!
//! All four variants share the same shape of API; the `shard_key!` macro
//! below generates it once per arity so the five pieces (constructor,
//! accessors, empty handling, the three codec pairs, equality/hash) stay
//! in lockstep across variants instead of drifting as hand-copied code.

use crate::algebra::HasShardId;
use crate::binary;
use crate::error::{Error, Result};
use crate::external;
use crate::types::ShardValue;

fn validate_origin(origin: char) -> Result<()> {
    if !origin.is_ascii() {
        return Err(Error::InvalidShardArguments);
    }
    Ok(())
}

macro_rules! shard_key {
    ($name:ident, $arity:literal, $doc:literal, $( $field:ident : $ty:ident ),+ ) => {
        #[doc = $doc]
        #[derive(Clone, Debug)]
        pub struct $name<$($ty: ShardValue),+> {
            origin: char,
            shard_id: i16,
            $($field: $ty),+
        }

        impl<$($ty: ShardValue),+> $name<$($ty),+> {
            /// Construct a new key. Fails if `origin` isn't a single ASCII
            /// character, or if `origin` is `'0'` (the Empty marker) while
            /// some payload is non-empty.
            pub fn new(origin: char, shard_id: i16, $($field: $ty),+) -> Result<Self> {
                validate_origin(origin)?;
                let all_empty = true $(&& $field.is_empty())+;
                if origin == '0' && !all_empty {
                    return Err(Error::InvalidShardArguments);
                }
                Ok(Self { origin, shard_id, $($field),+ })
            }

            /// The origin character classifying the kind of entity this key names.
            pub fn origin(&self) -> char {
                self.origin
            }

            /// The physical shard this record lives on.
            pub fn shard_id(&self) -> i16 {
                self.shard_id
            }

            $(
                #[doc = concat!("The `", stringify!($field), "` component.")]
                pub fn $field(&self) -> &$ty {
                    &self.$field
                }
            )+

            /// Whether this key is the variant's `Empty` value: origin `'0'`
            /// and every payload equal to its type's canonical empty value.
            pub fn is_empty(&self) -> bool {
                self.origin == '0' $(&& self.$field.is_empty())+
            }

            /// This variant's `Empty` constant.
            pub fn empty() -> Self {
                Self {
                    origin: '0',
                    shard_id: 0,
                    $($field: $ty::empty()),+
                }
            }

            fn type_codes() -> Vec<u8> {
                vec![$($ty::TYPE_CODE),+]
            }

            /// Encode this key to its binary form (`spec.md` §4.3).
            pub fn to_binary(&self) -> Result<Vec<u8>> {
                let mut payloads: Vec<Vec<u8>> = Vec::new();
                $(
                    {
                        let mut buf = Vec::with_capacity(self.$field.encoded_size());
                        self.$field.encode(&mut buf)?;
                        payloads.push(buf);
                    }
                )+
                Ok(binary::encode($arity, &Self::type_codes(), &payloads, self.origin as u8, self.shard_id))
            }

            /// Decode a key from its binary form. The exact inverse of
            /// [`Self::to_binary`].
            pub fn from_binary(buf: &[u8]) -> Result<Self> {
                let decoded = binary::decode(buf, $arity, &Self::type_codes())?;
                let mut rest = decoded.payload;
                $(
                    let ($field, consumed) = $ty::decode(rest)?;
                    rest = &rest[consumed..];
                )+
                if !rest.is_empty() {
                    return Err(Error::InvalidBinary { reason: "trailing bytes after payloads" });
                }
                let origin = decoded.origin as char;
                let all_empty = true $(&& $field.is_empty())+;
                if origin == '0' && !all_empty {
                    return Err(Error::InvalidShardArguments);
                }
                Ok(Self { origin, shard_id: decoded.shard_id, $($field),+ })
            }

            /// Non-throwing decode: `(true, value)` for any well-formed
            /// input of this arity, `(false, Self::empty())` otherwise.
            pub fn try_parse(buf: &[u8]) -> (bool, Self) {
                match Self::from_binary(buf) {
                    Ok(v) => (true, v),
                    Err(_) => (false, Self::empty()),
                }
            }

            /// Encode this key as a URL-safe external string (`spec.md` §4.4).
            pub fn to_external_string(&self) -> Result<String> {
                let binary = self.to_binary()?;
                Ok(external::to_external_string(&binary, self.shard_id))
            }

            /// Decode a key from its external-string form.
            pub fn from_external_string(s: &str) -> Result<Self> {
                let binary = external::from_external_string(s)?;
                Self::from_binary(&binary)
            }

            /// The external string, as UTF-8 bytes.
            pub fn to_utf8(&self) -> Result<Vec<u8>> {
                let binary = self.to_binary()?;
                Ok(external::to_utf8(&binary, self.shard_id))
            }

            /// `from_utf8(bytes)` is exactly `from_external_string(utf8_decode(bytes))`.
            pub fn from_utf8(bytes: &[u8]) -> Result<Self> {
                let binary = external::from_utf8(bytes)?;
                Self::from_binary(&binary)
            }
        }

        impl<$($ty: ShardValue),+> PartialEq for $name<$($ty),+> {
            fn eq(&self, other: &Self) -> bool {
                self.origin == other.origin
                    && self.shard_id == other.shard_id
                    $(&& self.$field.key_eq(&other.$field))+
            }
        }

        impl<$($ty: ShardValue),+> Eq for $name<$($ty),+> {}

        impl<$($ty: ShardValue),+> std::hash::Hash for $name<$($ty),+> {
            fn hash<St: std::hash::Hasher>(&self, state: &mut St) {
                self.origin.hash(state);
                self.shard_id.hash(state);
                $(self.$field.key_hash(state);)+
            }
        }

        impl<$($ty: ShardValue),+> HasShardId for $name<$($ty),+> {
            fn shard_id(&self) -> i16 {
                self.shard_id
            }
        }
    };
}

shard_key!(
    ShardKey1,
    1,
    "A shard key naming a record by `(origin, shard, record)`.",
    record_id: R
);

shard_key!(
    ShardKey2,
    2,
    "A shard key naming a record by `(origin, shard, record, child)`.",
    record_id: R,
    child_id: C
);

shard_key!(
    ShardKey3,
    3,
    "A shard key naming a record by `(origin, shard, record, child, grandchild)`.",
    record_id: R,
    child_id: C,
    grandchild_id: G
);

shard_key!(
    ShardKey4,
    4,
    "A shard key naming a record by `(origin, shard, record, child, grandchild, great_grandchild)`.",
    record_id: R,
    child_id: C,
    grandchild_id: G,
    great_grandchild_id: H
);

/// Check that a decoded key's origin matches the origin a specific API
/// endpoint expects (`spec.md` §6, §7 `InvalidDataOrigin`).
pub fn check_origin(expected: char, actual: char) -> Result<()> {
    if expected != actual {
        return Err(Error::InvalidDataOrigin { expected, actual });
    }
    Ok(())
}
