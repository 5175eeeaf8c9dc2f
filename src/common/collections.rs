//! Hash collections used throughout the crate. Keys are small strings and
//! integers, so the non-cryptographic Fx hasher is a better fit than SipHash.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

pub use std::collections::hash_map;
