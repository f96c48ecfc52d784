//! # hashkv Storage
//!
//! Hash-oriented key-value store abstraction for hashkv.
//!
//! Stores are **opaque byte stores** offering the primitives the key-value
//! adapter needs: hash write/read by key, set membership, and key-prefix
//! scans. They know nothing about paths, type hints, or keyspaces.
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and embedded use
//!
//! ## Example
//!
//! ```rust
//! use hashkv_storage::{HashStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store
//!     .hset_all(b"persons:1", &[(b"firstname".to_vec(), b"rand".to_vec())])
//!     .unwrap();
//! let hash = store.hget_all(b"persons:1").unwrap();
//! assert_eq!(hash.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;

pub use backend::{HashEntries, HashStore};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStore;
