//! Stored values: a payload plus a side-table of named attributes.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;


/// A nested, insertion-ordered mapping of named parameters.
pub type Table = IndexMap<String, Param>;


/// The payload of a stored parameter.
///
/// Only `Table` payloads are walked by path resolution. Any JSON object
/// converted through `Param::from` becomes a `Table`, so a `Scalar` never
/// holds an object.
///
/// Serialized untagged: a table is an object of `Param`s, a scalar is the
/// bare JSON value. On input, an object that is not a table of `Param`s is
/// read as plain JSON and converted the same way `Param::from` does.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Table(Table),
    Scalar(Value),
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if raw.is_object() {
            if let Ok(table) = serde_json::from_value::<Table>(raw.clone()) {
                return Ok(ParamValue::Table(table));
            }
        }
        Ok(Param::from(raw).value)
    }
}


/// A stored parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Param {
    value: ParamValue,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    attrs: IndexMap<String, Value>,
}

impl Param {
    pub fn new(value: ParamValue) -> Self {
        Param {
            value,
            attrs: IndexMap::new(),
        }
    }

    /// An empty table.
    pub fn table() -> Self {
        Param::new(ParamValue::Table(Table::new()))
    }

    /// A null scalar, used as the carrier when only an attribute is set.
    pub fn null() -> Self {
        Param::new(ParamValue::Scalar(Value::Null))
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match &self.value {
            ParamValue::Scalar(v) => Some(v),
            ParamValue::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match &self.value {
            ParamValue::Table(t) => Some(t),
            ParamValue::Scalar(_) => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.value {
            ParamValue::Table(t) => Some(t),
            ParamValue::Scalar(_) => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self.value, ParamValue::Table(_))
    }

    pub fn attrs(&self) -> &IndexMap<String, Value> {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Set one attribute, leaving the payload and other attributes alone.
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) {
        self.attrs.insert(name.into(), value);
    }

    /// Builder form of `set_attr`.
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Replace the payload with `other`'s. Existing attributes survive
    /// unless `other` carries an attribute of the same name.
    pub fn replace_with(&mut self, other: Param) {
        self.value = other.value;
        self.attrs.extend(other.attrs);
    }

    /// Plain JSON view of the payload. Attributes are dropped at every level.
    pub fn to_json(&self) -> Value {
        match &self.value {
            ParamValue::Scalar(v) => v.clone(),
            ParamValue::Table(t) => Value::Object(
                t.iter().map(|(k, p)| (k.clone(), p.to_json())).collect(),
            ),
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Param::from(
                map.into_iter()
                    .map(|(k, v)| (k, Param::from(v)))
                    .collect::<Table>(),
            ),
            other => Param::new(ParamValue::Scalar(other)),
        }
    }
}

impl From<Table> for Param {
    fn from(table: Table) -> Self {
        Param::new(ParamValue::Table(table))
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_become_tables() {
        let p = Param::from(json!({"a": 1, "b": {"c": "x"}}));
        let table = match p.value() {
            ParamValue::Table(t) => t,
            ParamValue::Scalar(v) => panic!("expected table, got {}", v),
        };
        assert_eq!(table.len(), 2);
        assert_eq!(table["a"].as_scalar(), Some(&json!(1)));
        assert!(table["b"].is_table());
        assert!(p.attrs().is_empty());
    }

    #[test]
    fn arrays_stay_scalar() {
        let p = Param::from(json!([1, 2, 3]));
        assert_eq!(p.as_scalar(), Some(&json!([1, 2, 3])));
        assert!(p.as_table().is_none());
    }

    #[test]
    fn to_json_preserves_order() {
        let p = Param::from(json!({"z": 1, "a": 2, "m": {"y": 0, "b": 1}}));
        let text = serde_json::to_string(&p.to_json()).unwrap();
        assert_eq!(text, r#"{"z":1,"a":2,"m":{"y":0,"b":1}}"#);
    }

    #[test]
    fn replace_keeps_other_attrs() {
        let mut p = Param::from(json!(1))
            .with_attr("units", json!("m"))
            .with_attr("label", json!("depth"));
        p.replace_with(Param::from(json!(2)).with_attr("label", json!("elev")));
        assert_eq!(p.as_scalar(), Some(&json!(2)));
        assert_eq!(p.attr("units"), Some(&json!("m")));
        assert_eq!(p.attr("label"), Some(&json!("elev")));
        assert_eq!(p.attrs().keys().collect::<Vec<_>>(), vec!["units", "label"]);
    }

    #[test]
    fn serde_keeps_attrs_and_tables_distinct() {
        let p = Param::from(json!({"value": 3})).with_attr("note", json!("kept"));
        let text = serde_json::to_string(&p).unwrap();
        let back: Param = serde_json::from_str(&text).unwrap();
        assert_eq!(back, p);

        let bare = serde_json::to_value(Param::from(json!(5))).unwrap();
        assert_eq!(bare, json!({"value": 5}));
        let nested = serde_json::to_value(Param::from(json!({"nx": 10}))).unwrap();
        assert_eq!(nested, json!({"value": {"nx": {"value": 10}}}));
    }

    #[test]
    fn hand_written_json_reads_naturally() {
        let text = r#"{
            "sep": {"value": ","},
            "grid": {"value": {"nx": {"value": 10}}, "attrs": {"units": "m"}},
            "win": {"value": {"w": 640, "h": 480}}
        }"#;
        let table: Table = serde_json::from_str(text).unwrap();
        assert_eq!(table["sep"].as_scalar(), Some(&json!(",")));
        assert_eq!(table["grid"].to_json(), json!({"nx": 10}));
        assert_eq!(table["grid"].attr("units"), Some(&json!("m")));
        assert_eq!(table["win"].as_table().unwrap()["h"].as_scalar(), Some(&json!(480)));
    }

    #[test]
    fn hand_written_yaml_reads_naturally() {
        let text = "sep:\n  value: ','\ngrid:\n  value:\n    nx:\n      value: 10\n";
        let table: Table = serde_yaml::from_str(text).unwrap();
        assert_eq!(table["sep"].as_scalar(), Some(&json!(",")));
        assert_eq!(table["grid"].to_json(), json!({"nx": 10}));

        let yaml = serde_yaml::to_string(&table).unwrap();
        assert!(!yaml.contains('!'));
        let back: Table = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, table);
    }
}
