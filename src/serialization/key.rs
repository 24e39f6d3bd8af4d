//! Equality, hash, and byte-stability contract for lookup keys.

use crate::error::Result;
use std::hash::{Hash, Hasher};

use super::data_serializable::{DataSerializable, ObjectWriter};
use super::ObjectDataOutput;

/// Marker contract for objects used as lookup or partition keys by an
/// associative store.
///
/// Implementors promise:
///
/// 1. `a == b` implies `hash(a) == hash(b)`;
/// 2. hash is a pure function of exactly the fields written by
///    [`DataSerializable::write_data`] — no field participates in
///    equality but not in serialization, or vice versa;
/// 3. equal keys serialize to identical bytes, so a key round-tripped
///    through the wire remains a valid lookup key.
///
/// Deriving `PartialEq, Eq, Hash` over the full field set and writing
/// every field in `write_data` satisfies all three. Mutating a key's
/// contributing fields after first use is caller discipline; the codec
/// does not detect it.
pub trait CacheKey: DataSerializable + Eq + Hash + Sized + 'static {
    /// Returns the key's canonical fixed-layout encoding (type id plus
    /// fields), the bytes an associative store indexes by.
    fn key_bytes(&self) -> Result<Vec<u8>> {
        let mut output = ObjectDataOutput::new();
        let mut writer = ObjectWriter::new(&mut output);
        writer.write_object(self)?;
        Ok(output.into_bytes())
    }
}

/// Hashes a key with the standard hasher.
pub fn key_hash<K: CacheKey>(key: &K) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Derives a partition index for a key.
///
/// Pure hash derivation only; routing a request to the owning node is a
/// collaborator concern. A zero `partition_count` is treated as one.
pub fn partition_for<K: CacheKey>(key: &K, partition_count: u32) -> u32 {
    (key_hash(key) % u64::from(partition_count.max(1))) as u32
}
