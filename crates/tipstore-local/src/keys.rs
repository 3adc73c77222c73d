//! Key layout shared by the index and the cache.
//!
//! - `<kind>_index` holds the whole id → index-entry map of one kind
//! - `<kind>_cache_<id>` holds the cached value of one entity

use tipstore_types::EntityKind;

pub fn index_key(kind: EntityKind) -> String {
    format!("{}_index", kind.namespace())
}

pub fn cache_prefix(kind: EntityKind) -> String {
    format!("{}_cache_", kind.namespace())
}

pub fn cache_key(kind: EntityKind, id: &str) -> String {
    format!("{}{id}", cache_prefix(kind))
}
