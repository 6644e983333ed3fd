//! Request — the typed forms of the store's single entry point.
//!
//! Callers that hold the loose argument set (path, value, attribute name,
//! clear flags, replacement table) build a `Call` and classify it with
//! `Call::into_request()`. Precedence, highest first:
//!
//! | Call shape | Request |
//! |------------|---------|
//! | `clear_data` or `clear_proj` | `Clear` (nothing else processed) |
//! | `replace_all` present | `ReplaceAll` |
//! | no path | `Snapshot` |
//! | path, no value, no attribute | `Get` |
//! | path + attribute, no value | `GetAttr` |
//! | path + value (+ attribute) | `Set` |
//!
//! Requests and responses serialize as JSON objects tagged by `"op"`. A
//! path travels as its key array, names as strings and positions as
//! numbers:
//!
//! ```json
//! {"op": "get", "path": ["vars", "x", 2]}
//! {"op": "clear", "data": true, "project": false}
//! ```

use serde::{Deserialize, Serialize};
use super::path::KeyPath;
use super::store::Snapshot;
use super::value::{Param, Table};


/// One classified operation against a `ParameterStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Return the entire store contents.
    Snapshot,
    /// Query a value, with schema default fallback.
    Get { path: KeyPath },
    /// Query one attribute, with the same default fallback as `Get`.
    GetAttr { path: KeyPath, attr: String },
    /// Set a value, or an attribute when `attr` is given.
    Set {
        path: KeyPath,
        value: Param,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attr: Option<String>,
    },
    /// Replace the store contents wholesale.
    ReplaceAll { table: Table },
    /// Selective clear. `data` takes priority over `project`.
    Clear {
        #[serde(default)]
        data: bool,
        #[serde(default)]
        project: bool,
    },
}


/// Result of executing a `Request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "result", rename_all = "snake_case")]
pub enum Response {
    Snapshot(Snapshot),
    Value(Option<Param>),
    Attr(Option<Param>),
    Done,
}


/// The loose argument set of the polymorphic entry point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    pub path: Option<KeyPath>,
    pub value: Option<Param>,
    pub which_attr: Option<String>,
    pub clear_data: bool,
    pub clear_proj: bool,
    pub replace_all: Option<Table>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<KeyPath>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn value(mut self, value: impl Into<Param>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn which_attr(mut self, attr: impl Into<String>) -> Self {
        self.which_attr = Some(attr.into());
        self
    }

    pub fn clear_data(mut self) -> Self {
        self.clear_data = true;
        self
    }

    pub fn clear_proj(mut self) -> Self {
        self.clear_proj = true;
        self
    }

    pub fn replace_all(mut self, table: Table) -> Self {
        self.replace_all = Some(table);
        self
    }

    /// Classify into exactly one request.
    pub fn into_request(self) -> Request {
        if self.clear_data || self.clear_proj {
            return Request::Clear {
                data: self.clear_data,
                project: self.clear_proj,
            };
        }
        if let Some(table) = self.replace_all {
            return Request::ReplaceAll { table };
        }
        let Some(path) = self.path else {
            return Request::Snapshot;
        };
        match (self.value, self.which_attr) {
            (None, None) => Request::Get { path },
            (None, Some(attr)) => Request::GetAttr { path, attr },
            (Some(value), attr) => Request::Set { path, value, attr },
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
