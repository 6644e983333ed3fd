//! Paramstore core — a process-wide hierarchical parameter store.
//!
//! Collaborators read configuration defaults, stash transient results under
//! well-known top-level keys, and save or discard whole sessions through
//! snapshots. Serializing a snapshot to disk is the caller's job; see the
//! `pstore` binary for one such caller.
//!
//! ```
//! use paramstore_core::namespace::{KeyPath, Param, ParameterStore};
//! use serde_json::json;
//!
//! let mut store = ParameterStore::new();
//! let sep = KeyPath::single("sep");
//! assert_eq!(store.get(&sep).unwrap().unwrap().as_scalar(), Some(&json!("\t")));
//!
//! store.set(&sep, Param::from(json!(","))).unwrap();
//! assert_eq!(store.get(&sep).unwrap().unwrap().as_scalar(), Some(&json!(",")));
//! ```

pub mod config;
pub mod errors;
pub mod namespace;

pub use config::StoreConfig;
pub use errors::{DefaultError, StoreError};
pub use namespace::{Call, KeyPath, Param, ParameterStore, Request, Response, SharedParameterStore};
