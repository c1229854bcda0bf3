//! Numeric projection of a vehicle record for modelling.

use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

use crate::record::{FieldValue, VehicleRecord};

pub const MODEL_FEATURES: &[&str] = &[
    "manufactured_year",
    "mileage",
    "engine_size",
    "top_speed",
    "engine_power",
    "engine_torque",
    "height",
    "length",
    "wheelbase",
    "width",
    "fuel_tank_capacity",
    "boot_space_seats_up",
    "urban",
    "extra_urban",
    "co2_emissions",
];

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").unwrap());

/// Best-effort numeric reading of a field: numbers pass through, strings
/// yield their first number once thousands separators are dropped.
pub fn coerce_number(value: &FieldValue) -> Option<f64> {
    match value.as_value()? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.replace(',', "");
            NUMBER_RE.find(&cleaned)?.as_str().parse().ok()
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureValues(pub Vec<(&'static str, Option<f64>)>);

impl FeatureValues {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(n, _)| *n == name).and_then(|(_, v)| *v)
    }
}

impl Serialize for FeatureValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureRow {
    pub advert_id: FieldValue,
    pub features: FeatureValues,
}

impl FeatureRow {
    /// Feature names the record schema does not carry are always `None`.
    pub fn from_record(record: &VehicleRecord) -> Self {
        let features = MODEL_FEATURES
            .iter()
            .map(|name| (*name, record.get(name).and_then(coerce_number)))
            .collect();

        Self {
            advert_id: record.get("advert_id").cloned().unwrap_or_default(),
            features: FeatureValues(features),
        }
    }
}
