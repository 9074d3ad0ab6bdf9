//! A compact, versioned, tamper-evident codec for compound shard
//! identifiers: `(origin, shard, record[, child[, grandchild[,
//! great_grandchild]]])`.
//!
//! This crate implements only the shard-key subsystem of a larger
//! sharded-database access library — the attribute-driven object mapper,
//! the batch/transaction executor, the statement loader, and all
//! provider I/O live elsewhere and are not part of this crate's surface.
//!
//! # Layout
//!
//! - [`types`] — the type registry: one Rust type per supported payload,
//!   each with a stable 5-bit code and an encode/decode routine.
//! - [`metadata`] — packs a key's arity and component type codes into a
//!   short bit-packed prefix.
//! - [`binary`] — composes header, metadata, payloads, and tail into one
//!   buffer, and validates that structure on decode.
//! - [`external`] — wraps the binary form in a checksummed, masked,
//!   URL-safe textual form.
//! - [`key`] — the four `ShardKey` arities built on top of the above.
//! - [`algebra`] — `foreign_shards` and `merge`, the two collection
//!   operations the rest of the library needs.
//!
//! All of it is pure: no I/O, no logging, no shared state, no panics on
//! malformed input. Every codec function is safe to call from any number
//! of threads with no coordination.

pub mod algebra;
pub mod binary;
pub mod error;
pub mod external;
pub mod key;
pub mod metadata;
pub mod types;

pub use algebra::{foreign_shards, merge, HasShardId, Keyed};
pub use error::{Error, Result};
pub use key::{check_origin, ShardKey1, ShardKey2, ShardKey3, ShardKey4};
pub use types::{Date, Decimal, Guid, ShardValue, Timespan, Timestamp, TimestampKind, TimeOfDay};
