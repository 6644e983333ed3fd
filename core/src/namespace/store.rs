//! The parameter store.
//!
//! Holds an insertion-ordered tree of `Param`s plus the schema defaults.
//! Path resolution walks as far as the path matches and stops at the first
//! miss; queries and mutations branch on how far it got:
//!
//! - fully resolved: read or overwrite in place,
//! - one key short under a table: create the final entry,
//! - one key short at top level with a named schema key: return the default,
//! - anything else: absent on read, `InvalidPath` on write.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::defaults::Defaults;
use super::path::{Key, KeyPath};
use super::request::{Request, Response};
use super::value::{Param, Table};
use crate::config::{default_config, StoreConfig};
use crate::errors::StoreError;


/// The whole store contents, as returned by a no-path query.
///
/// A snapshot is a deep copy; later mutation of the store does not show
/// through it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Table);

impl Snapshot {
    pub fn new(table: Table) -> Self {
        Snapshot(table)
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn into_table(self) -> Table {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Table> for Snapshot {
    fn from(table: Table) -> Self {
        Snapshot(table)
    }
}

impl From<Snapshot> for Table {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.0
    }
}


/// How far a path resolved against the current data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Positions (0-based) of each resolved key, one per level.
    pub location: Vec<usize>,
}

impl Resolution {
    /// Number of path keys that resolved.
    pub fn depth(&self) -> usize {
        self.location.len()
    }

    pub fn is_full(&self, path: &KeyPath) -> bool {
        self.depth() == path.len()
    }
}


/// Hierarchical parameter store with schema defaults.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    data: Table,
    defaults: Defaults,
    config: StoreConfig,
}

impl ParameterStore {
    /// Empty store with the standard schema and default configuration.
    pub fn new() -> Self {
        Self::with_config(Defaults::standard(), default_config())
    }

    pub fn with_defaults(defaults: Defaults) -> Self {
        Self::with_config(defaults, default_config())
    }

    pub fn with_config(defaults: Defaults, config: StoreConfig) -> Self {
        ParameterStore {
            data: Table::new(),
            defaults,
            config,
        }
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Top-level keys in current order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    // -------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------

    /// Run one request.
    ///
    /// A set on an unusable path is a no-op returning `Response::Done`
    /// unless `strict_paths` is configured, in which case the
    /// `InvalidPath` error is returned.
    pub fn execute(&mut self, request: Request) -> Result<Response, StoreError> {
        match request {
            Request::Clear { data, project } => {
                if data {
                    self.clear_data();
                } else if project {
                    self.clear_project();
                }
                Ok(Response::Done)
            }
            Request::ReplaceAll { table } => {
                self.restore_all(table);
                Ok(Response::Done)
            }
            Request::Snapshot => Ok(Response::Snapshot(self.snapshot())),
            Request::Get { path } => Ok(Response::Value(self.get(&path)?)),
            Request::GetAttr { path, attr } => Ok(Response::Attr(self.get_attr(&path, &attr)?)),
            Request::Set { path, value, attr } => {
                let result = match attr {
                    Some(name) => self.set_attr(&path, &name, value.to_json()),
                    None => self.set(&path, value),
                };
                match result {
                    Ok(()) => Ok(Response::Done),
                    Err(err) if err.is_invalid_path() && !self.config.strict_paths => {
                        debug!(error = %err, "ignoring set on invalid path");
                        Ok(Response::Done)
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    // -------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------

    /// Resolve `path` as far as it matches. Never fails; a miss just
    /// yields a shorter location.
    pub fn resolve(&self, path: &KeyPath) -> Resolution {
        let mut location = Vec::with_capacity(path.len());
        let mut table = Some(&self.data);

        for key in path.keys() {
            let Some(current) = table else { break };
            let Some(pos) = position_of(current, key) else { break };
            location.push(pos);
            table = current.get_index(pos).and_then(|(_, p)| p.as_table());
        }

        Resolution { location }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Value at `path`, falling back to the schema default for a single
    /// named top-level key. Absent otherwise.
    pub fn get(&self, path: &KeyPath) -> Result<Option<Param>, StoreError> {
        let resolution = self.resolve(path);
        if resolution.is_full(path) {
            return Ok(self.entry_at(&resolution.location).cloned());
        }
        self.default_for(path)
    }

    /// Named attribute on the value at `path`, as a scalar `Param`.
    ///
    /// An unresolved single named key answers with its schema default, the
    /// same as `get`.
    pub fn get_attr(&self, path: &KeyPath, attr: &str) -> Result<Option<Param>, StoreError> {
        let resolution = self.resolve(path);
        if !resolution.is_full(path) {
            return self.default_for(path);
        }
        Ok(self
            .entry_at(&resolution.location)
            .and_then(|param| param.attr(attr))
            .map(|value| Param::from(value.clone())))
    }

    /// Deep copy of the whole store.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.data.clone())
    }

    // -------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------

    /// Write `value` at `path`, replacing an existing value (attributes
    /// kept) or creating a new entry one level below existing data.
    pub fn set(&mut self, path: &KeyPath, value: Param) -> Result<(), StoreError> {
        self.write(path, |slot| match slot {
            Slot::Existing(param) => param.replace_with(value),
            Slot::Vacant(table, name) => {
                table.insert(name, value);
            }
        })
    }

    /// Set one attribute at `path`. A new entry created this way carries a
    /// null payload.
    pub fn set_attr(&mut self, path: &KeyPath, attr: &str, value: Value) -> Result<(), StoreError> {
        self.write(path, |slot| match slot {
            Slot::Existing(param) => param.set_attr(attr, value),
            Slot::Vacant(table, name) => {
                table.insert(name, Param::null().with_attr(attr, value));
            }
        })
    }

    /// Replace all data.
    pub fn restore_all(&mut self, table: impl Into<Table>) {
        self.data = table.into();
        info!(entries = self.data.len(), "store contents replaced");
    }

    /// Keep only top-level keys that are also schema defaults.
    pub fn clear_data(&mut self) {
        let before = self.data.len();
        let defaults = &self.defaults;
        self.data.retain(|key, _| defaults.contains(key));
        info!(before, after = self.data.len(), "cleared data entries");
    }

    /// Keep only the configured project keys (window placement and
    /// working directory by default).
    pub fn clear_project(&mut self) {
        let before = self.data.len();
        let keep = &self.config.project_keys;
        self.data.retain(|key, _| keep.iter().any(|k| k == key));
        info!(before, after = self.data.len(), "cleared project entries");
    }

    // -------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------

    /// Schema default for an unresolved path; only a single named key has
    /// one.
    fn default_for(&self, path: &KeyPath) -> Result<Option<Param>, StoreError> {
        let Some(name) = path.as_single_name() else {
            return Ok(None);
        };
        match self.defaults.resolve(name) {
            None => Ok(None),
            Some(Ok(param)) => Ok(Some(param)),
            Some(Err(source)) => {
                warn!(key = name, error = %source, "default factory failed");
                Err(StoreError::Default {
                    key: name.to_string(),
                    source,
                })
            }
        }
    }

    fn entry_at(&self, location: &[usize]) -> Option<&Param> {
        let (last, parents) = location.split_last()?;
        let mut table = &self.data;
        for &pos in parents {
            table = table.get_index(pos)?.1.as_table()?;
        }
        table.get_index(*last).map(|(_, p)| p)
    }

    fn entry_at_mut(&mut self, location: &[usize]) -> Option<&mut Param> {
        let (last, parents) = location.split_last()?;
        let table = self.table_at_mut(parents)?;
        table.get_index_mut(*last).map(|(_, p)| p)
    }

    /// The table at `location`; the root table for an empty location.
    fn table_at_mut(&mut self, location: &[usize]) -> Option<&mut Table> {
        let mut table = &mut self.data;
        for &pos in location {
            table = table.get_index_mut(pos)?.1.as_table_mut()?;
        }
        Some(table)
    }

    fn write<F>(&mut self, path: &KeyPath, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(Slot<'_>),
    {
        let resolution = self.resolve(path);
        let depth = resolution.depth();

        if depth == path.len() {
            let param = self
                .entry_at_mut(&resolution.location)
                .ok_or_else(|| StoreError::invalid(path, "resolved location vanished"))?;
            apply(Slot::Existing(param));
            return Ok(());
        }

        if depth + 1 < path.len() {
            return Err(StoreError::invalid(
                path,
                format!("only {} of {} keys exist", depth, path.len()),
            ));
        }

        let parent = self
            .table_at_mut(&resolution.location)
            .ok_or_else(|| StoreError::invalid(path, "parent is not a table"))?;
        let name = match &path.keys()[depth] {
            Key::Name(name) => name.clone(),
            Key::Index(index) => new_index_name(parent, *index)
                .ok_or_else(|| StoreError::invalid(path, format!("cannot create index [{}]", index)))?,
        };
        apply(Slot::Vacant(parent, name));
        Ok(())
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}


/// Target of a write: an existing entry, or a free name in a table.
enum Slot<'a> {
    Existing(&'a mut Param),
    Vacant(&'a mut Table, String),
}


/// 0-based position of `key` in `table`.
fn position_of(table: &Table, key: &Key) -> Option<usize> {
    match key {
        Key::Name(name) => table.get_index_of(name.as_str()),
        Key::Index(i) if *i >= 1 && *i <= table.len() => Some(i - 1),
        Key::Index(_) => None,
    }
}

/// Name for a child appended by position. Only `len + 1` is accepted, and
/// the decimal name must be free.
fn new_index_name(table: &Table, index: usize) -> Option<String> {
    if index != table.len() + 1 {
        return None;
    }
    let name = index.to_string();
    if table.contains_key(&name) {
        return None;
    }
    Some(name)
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
