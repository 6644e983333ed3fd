//! Shared handle for hosts that touch the store from several threads.
//!
//! Every call takes the one exclusive lock, reads included: a query can
//! run a default factory, so readers and writers are not distinguished.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::path::KeyPath;
use super::request::{Request, Response};
use super::store::{ParameterStore, Snapshot};
use super::value::{Param, Table};
use crate::errors::StoreError;


#[derive(Debug, Clone)]
pub struct SharedParameterStore {
    inner: Arc<Mutex<ParameterStore>>,
}

impl SharedParameterStore {
    pub fn new(store: ParameterStore) -> Self {
        SharedParameterStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn execute(&self, request: Request) -> Result<Response, StoreError> {
        self.inner.lock().execute(request)
    }

    pub fn get(&self, path: &KeyPath) -> Result<Option<Param>, StoreError> {
        self.inner.lock().get(path)
    }

    pub fn get_attr(&self, path: &KeyPath, attr: &str) -> Result<Option<Param>, StoreError> {
        self.inner.lock().get_attr(path, attr)
    }

    pub fn set(&self, path: &KeyPath, value: Param) -> Result<(), StoreError> {
        self.inner.lock().set(path, value)
    }

    pub fn set_attr(&self, path: &KeyPath, attr: &str, value: Value) -> Result<(), StoreError> {
        self.inner.lock().set_attr(path, attr, value)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().snapshot()
    }

    pub fn restore_all(&self, table: impl Into<Table>) {
        self.inner.lock().restore_all(table)
    }

    pub fn clear_data(&self) {
        self.inner.lock().clear_data()
    }

    pub fn clear_project(&self) {
        self.inner.lock().clear_project()
    }

    /// Run `f` with the lock held, for multi-step updates that must not
    /// interleave with other callers.
    pub fn with<R>(&self, f: impl FnOnce(&mut ParameterStore) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<ParameterStore> for SharedParameterStore {
    fn from(store: ParameterStore) -> Self {
        SharedParameterStore::new(store)
    }
}
