//! Schema defaults — the fallback values for top-level keys.
//!
//! Each entry is either a literal `Param` or a zero-argument factory run
//! at query time. Factories are invoked once per query and never cached.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use super::value::{Param, Table};
use crate::errors::DefaultError;


/// Environment override for the `default.dir` schema default.
pub const DEFAULT_DIR_ENV: &str = "PARAMSTORE_DEFAULT_DIR";

/// Zero-argument generator for a default value.
pub type DefaultFactory = Arc<dyn Fn() -> Result<Param, DefaultError> + Send + Sync>;


#[derive(Clone)]
pub enum DefaultValue {
    Literal(Param),
    Factory(DefaultFactory),
}

impl DefaultValue {
    /// Produce the default, running the factory if there is one.
    pub fn produce(&self) -> Result<Param, DefaultError> {
        match self {
            DefaultValue::Literal(p) => Ok(p.clone()),
            DefaultValue::Factory(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(p) => f.debug_tuple("Literal").field(p).finish(),
            DefaultValue::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}


/// The defaults table, fixed once the store is built.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    entries: IndexMap<String, DefaultValue>,
}

impl Defaults {
    /// An empty table.
    pub fn new() -> Self {
        Defaults {
            entries: IndexMap::new(),
        }
    }

    /// The application schema: GUI preferences, import settings, and
    /// plotting defaults.
    pub fn standard() -> Self {
        Defaults::new()
            .with_factory("default.dir", default_dir)
            .with_literal("sep", json!("\t"))
            .with_literal("nlevels", json!(20))
            .with_literal("width", json!(7))
            .with_literal("cex.pts", json!(1))
            .with_literal("asp.yx", Value::Null)
            .with_literal("asp.zx", Value::Null)
            .with_literal("vmax", Value::Null)
            .with_literal("vxby", Value::Null)
            .with_literal("vyby", Value::Null)
            .with_literal("rkey", json!(0))
            .with_literal("show.poly", json!(0))
            .with_literal("img.contour", json!(0))
            .with_literal("show.lines", json!(0))
            .with_literal("show.points", json!(0))
            .with_literal("vuni", json!(0))
            .with_literal("date.fmt", json!("%Y-%m-%d %H:%M:%S"))
            .with_literal("polar.axes", json!(0))
            .with_literal("useRaster", json!(1))
            .with_literal("crs", Value::Null)
            .with_factory("palette.pts", || Ok(palette("sunset")))
            .with_factory("palette.grd", || Ok(palette("smooth rainbow")))
    }

    pub fn with_literal(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .insert(key.into(), DefaultValue::Literal(Param::from(value.into())));
        self
    }

    pub fn with_factory<F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Param, DefaultError> + Send + Sync + 'static,
    {
        self.entries
            .insert(key.into(), DefaultValue::Factory(Arc::new(factory)));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce the default for `key`, or `None` if the schema has no entry.
    pub fn resolve(&self, key: &str) -> Option<Result<Param, DefaultError>> {
        let entry = self.entries.get(key)?;
        if let DefaultValue::Factory(_) = entry {
            debug!(key, "invoking default factory");
        }
        Some(entry.produce())
    }
}


// ---------------------------------------------------------------------------
// Standard factories
// ---------------------------------------------------------------------------

/// Working directory preference: env override, then home, then cwd.
fn default_dir() -> Result<Param, DefaultError> {
    match std::env::var(DEFAULT_DIR_ENV) {
        Ok(dir) => return Ok(Param::from(Value::String(dir))),
        Err(std::env::VarError::NotPresent) => {}
        Err(source) => {
            return Err(DefaultError::Env {
                var: DEFAULT_DIR_ENV,
                source,
            })
        }
    }
    let dir = match dirs::home_dir() {
        Some(home) => home,
        None => std::env::current_dir()?,
    };
    Ok(Param::from(Value::String(dir.to_string_lossy().into_owned())))
}

/// Palette descriptor: scheme name plus its anchor colors.
fn palette(scheme: &str) -> Param {
    let colors: &[&str] = match scheme {
        "sunset" => &SUNSET[..],
        _ => &SMOOTH_RAINBOW[..],
    };
    let mut table = Table::new();
    table.insert("scheme".into(), Param::from(json!(scheme)));
    table.insert("colors".into(), Param::from(json!(colors)));
    Param::from(table)
}

const SUNSET: [&str; 11] = [
    "#364B9A", "#4A7BB7", "#6EA6CD", "#98CAE1", "#C2E4EF", "#EAECCC",
    "#FEDA8B", "#FDB366", "#F67E4B", "#DD3D2D", "#A50026",
];

const SMOOTH_RAINBOW: [&str; 12] = [
    "#E8ECFB", "#CAACCB", "#AA6F9E", "#882E72", "#437DBF", "#7BAFDE",
    "#4EB265", "#CAE0AB", "#F7F056", "#F4A736", "#E65518", "#A5170E",
];


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
