//! Key algebra: the handful of collection operations the rest of the
//! library needs on top of a shard key's value semantics
//! (`spec.md` §4.5). Both operations are pure functions of their inputs —
//! they allocate their own output containers and never mutate arguments,
//! and neither can fail on well-typed inputs.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// Anything that carries a physical shard id, independent of its arity or
/// component types.
pub trait HasShardId {
    fn shard_id(&self) -> i16;
}

/// Group `keys` by shard, excluding any key on `key`'s own shard. Keys on
/// the same foreign shard retain their input order; duplicates are kept.
pub fn foreign_shards<K>(key: &K, keys: &[K]) -> BTreeMap<i16, Vec<K>>
where
    K: HasShardId + Clone,
{
    let caller_shard = key.shard_id();
    let mut grouped: BTreeMap<i16, Vec<K>> = BTreeMap::new();
    for k in keys {
        let shard = k.shard_id();
        if shard == caller_shard {
            continue;
        }
        grouped.entry(shard).or_default().push(k.clone());
    }
    grouped
}

/// A model keyed by a shard-key (or any other equality/hash-able key).
pub trait Keyed<K> {
    fn key(&self) -> &K;
}

/// Replace-by-key merge: for each element of `original`, substitute the
/// first `replacements` element with the same key, if any; otherwise keep
/// the original. If `append_unmatched`, every replacement whose key has no
/// occurrence anywhere in `original` is appended to the tail, in input
/// order.
pub fn merge<T, K>(original: &[T], replacements: &[T], append_unmatched: bool) -> Vec<T>
where
    T: Clone + Keyed<K>,
    K: Eq + Hash,
{
    let mut first_by_key: HashMap<&K, &T> = HashMap::new();
    for r in replacements {
        first_by_key.entry(r.key()).or_insert(r);
    }

    let mut out = Vec::with_capacity(original.len());
    for o in original {
        match first_by_key.get(o.key()) {
            Some(r) => out.push((*r).clone()),
            None => out.push(o.clone()),
        }
    }

    if append_unmatched {
        let original_keys: HashSet<&K> = original.iter().map(Keyed::key).collect();
        for r in replacements {
            if !original_keys.contains(r.key()) {
                out.push(r.clone());
            }
        }
    }

    out
}
