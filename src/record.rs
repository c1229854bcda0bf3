use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::schema::FIELD_NAMES;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Missing,
    Present(Value),
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Missing => None,
            FieldValue::Present(v) => Some(v),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }
}

impl From<Option<&Value>> for FieldValue {
    fn from(value: Option<&Value>) -> Self {
        match value {
            Some(v) => FieldValue::Present(v.clone()),
            None => FieldValue::Missing,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Present(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Present(Value::String(value.to_string()))
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Missing => serializer.serialize_none(),
            FieldValue::Present(v) => v.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    values: Vec<FieldValue>,
}

impl Default for VehicleRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleRecord {
    pub fn new() -> Self {
        Self {
            values: vec![FieldValue::Missing; FIELD_NAMES.len()],
        }
    }

    fn index_of(name: &str) -> Option<usize> {
        FIELD_NAMES.iter().position(|f| *f == name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        Self::index_of(name).map(|i| &self.values[i])
    }

    // Names outside the schema are refused so the key set stays fixed.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        match Self::index_of(name) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => {
                log::debug!("ignoring unknown record field {}", name);
                false
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        FIELD_NAMES.iter().copied().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }
}

impl Serialize for VehicleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// Stored `null`s read back as `Missing`; keys outside the schema are dropped.
impl<'de> Deserialize<'de> for VehicleRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut record = VehicleRecord::new();
        for (name, value) in raw {
            if !value.is_null() {
                record.set(&name, FieldValue::Present(value));
            }
        }
        Ok(record)
    }
}
