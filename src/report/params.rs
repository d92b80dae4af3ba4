//! Bind parameters.
//!
//! Every literal that reaches a report statement (pivot keys, filter values,
//! pagination bounds) goes through a [`ParameterCollector`] and is rendered
//! as a named placeholder.

use rusqlite::types::{Null, ToSql, ToSqlOutput};
use serde::{Serialize, Serializer};

/// A bound value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Null,
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<Option<String>> for ParamValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(ParamValue::Null, ParamValue::Text)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Integer(n)
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            ParamValue::Integer(n) => write!(f, "{}", n),
            ParamValue::Null => f.write_str("NULL"),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Text(s) => serializer.serialize_str(s),
            ParamValue::Integer(n) => serializer.serialize_i64(*n),
            ParamValue::Null => serializer.serialize_unit(),
        }
    }
}

impl ToSql for ParamValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            ParamValue::Text(s) => ToSqlOutput::from(s.as_str()),
            ParamValue::Integer(n) => ToSqlOutput::from(*n),
            ParamValue::Null => ToSqlOutput::from(Null),
        })
    }
}

/// Ordered mapping of placeholder name to value.
///
/// Generated names are `p0`, `p1`, ... and increase across a whole compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterCollector {
    values: Vec<(String, ParamValue)>,
}

impl ParameterCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value under a freshly minted name and return the name.
    pub fn add(&mut self, value: impl Into<ParamValue>) -> String {
        let name = format!("p{}", self.values.len());
        self.values.push((name.clone(), value.into()));
        name
    }

    /// Bind a value under an explicit name, replacing any previous binding.
    pub fn bind(&mut self, name: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n.as_str() == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Named bindings in the `:name` form rusqlite expects.
    pub fn to_named(&self) -> Vec<(String, &dyn ToSql)> {
        self.values
            .iter()
            .map(|(n, v)| (format!(":{}", n), v as &dyn ToSql))
            .collect()
    }
}

impl Serialize for ParameterCollector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
