// File: crates/chart-optimize/src/record.rs
// Summary: Flat record model (ordered field -> scalar) and the axis schema describing it.
// Notes:
// - Records are dynamically shaped; the `Schema` pins which field is X and
//   which fields are numeric series so aggregation never guesses beyond that.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A scalar cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
}

impl Value {
    /// Finite numbers only; NaN and infinities never participate in aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Number(n) if n.is_finite() => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Number(n as f64) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Text(s) }
}

/// Ordered mapping from field name to value. Field order is preserved on
/// insert and replacement keeps the original position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self { Self { fields: Vec::new() } }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Numeric view of a field (finite numbers only).
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn contains(&self, name: &str) -> bool { self.get(name).is_some() }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize { self.fields.len() }

    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut r = Record::new();
        for (k, v) in iter {
            r.set(k, v);
        }
        r
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(k, v)| (k, v)))
    }
}

/// Deserializes from a JSON object, keeping document field order.
impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a flat object of scalar fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Record, A::Error> {
                let mut r = Record::new();
                while let Some((k, v)) = map.next_entry::<String, Value>()? {
                    r.set(k, v);
                }
                Ok(r)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Ordered sequence of records.
pub type Dataset = Vec<Record>;

/// How the x-field should be treated when choosing a sampling path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalHint {
    /// Scan the first record for a recognized time field name.
    #[default]
    Auto,
    /// The x-field holds timestamps.
    Temporal,
    /// Never take the time-window path.
    Categorical,
}

/// Declared axes of a dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub x_field: String,
    pub y_fields: Vec<String>,
    #[serde(default)]
    pub temporal: TemporalHint,
}

impl Schema {
    pub fn new<I, S>(x_field: impl Into<String>, y_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            x_field: x_field.into(),
            y_fields: y_fields.into_iter().map(Into::into).collect(),
            temporal: TemporalHint::Auto,
        }
    }

    pub fn with_temporal(mut self, hint: TemporalHint) -> Self {
        self.temporal = hint;
        self
    }

    pub fn is_y_field(&self, name: &str) -> bool {
        self.y_fields.iter().any(|f| f == name)
    }
}
