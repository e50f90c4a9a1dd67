use std::hash::{Hash, Hasher};

pub mod logger;
pub mod macros;
pub mod rand;
pub mod saveload;

use rustc_hash::FxHasher;

pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type FastSet<V> = rustc_hash::FxHashSet<V>;

#[inline]
pub fn hash_u64<T>(obj: T) -> u64
where
    T: Hash,
{
    let mut hasher = FxHasher::default();
    obj.hash(&mut hasher);
    hasher.finish()
}
