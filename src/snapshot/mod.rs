//! Cache snapshots and how they merge
//!
//! A snapshot is the serialized form of a client's normalized cache: a JSON
//! object keyed by entity identity. Only its shape (objects, arrays, scalars)
//! is interpreted, never its meaning.

mod merge;

pub use merge::{merge_sequences, merge_snapshots};

/// Serialized contents of a client cache
pub type CacheSnapshot = gql_client::NormalizedCacheObject;
