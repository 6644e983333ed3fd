//! Namespace and parameter store — the hierarchical state model.
//!
//! Provides key-path addressing (e.g. `vars/x[2]`), an insertion-ordered
//! tree of values with per-value attributes, schema defaults for top-level
//! keys, snapshot/restore, selective clears, and a locked shared handle.

pub mod path;
pub mod value;
pub mod defaults;
pub mod store;
pub mod request;
pub mod shared;

pub use path::{Key, KeyPath, PathParseError};
pub use value::{Param, ParamValue, Table};
pub use defaults::{DefaultFactory, DefaultValue, Defaults, DEFAULT_DIR_ENV};
pub use store::{ParameterStore, Resolution, Snapshot};
pub use request::{Call, Request, Response};
pub use shared::SharedParameterStore;
