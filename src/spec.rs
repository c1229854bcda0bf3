//! Technical-spec normalization and the final merge into the vehicle record.

use serde_json::{Map, Value};

use crate::path::{is_empty_document, parse_document};
use crate::record::VehicleRecord;
use crate::schema::{self, SPEC_FIELDS};

const PERFORMANCE_GROUP: &str = "Performance";
const DIMENSIONS_GROUP: &str = "Dimensions";

/// Normalized spec name → value, built per spec document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecTable {
    entries: Map<String, Value>,
}

impl SpecTable {
    pub fn build(document: &Value) -> Self {
        let mut table = Self::default();
        if is_empty_document(document) {
            return table;
        }

        let Some(groups) = document.get("techSpecs").and_then(Value::as_array) else {
            log::debug!("spec document has no techSpecs array");
            return table;
        };

        for group in groups {
            let normalize: fn(&str) -> String = match group.get("specName").and_then(Value::as_str) {
                Some(PERFORMANCE_GROUP) => normalize_performance_name,
                Some(DIMENSIONS_GROUP) => normalize_dimension_name,
                _ => continue,
            };
            let Some(specs) = group.get("specs").and_then(Value::as_array) else {
                continue;
            };
            for spec in specs {
                let Some(name) = spec.get("name").and_then(name_text) else {
                    continue;
                };
                let Some(value) = spec.get("value") else {
                    continue;
                };
                table.entries.insert(normalize(&name), value.clone());
            }
        }

        table
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_document(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

fn name_text(name: &Value) -> Option<String> {
    match name {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub fn normalize_performance_name(name: &str) -> String {
    name.replace("0 - 60 mph", "zero_to_sixty")
        .replace("0 - 62 mph", "zero_to_sixty_two")
        .to_lowercase()
        .replace(' ', "_")
}

pub fn normalize_dimension_name(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "_")
        .replace(['(', ')'], "")
}

pub fn merge_spec(body: &str, mut record: VehicleRecord) -> VehicleRecord {
    let document = parse_document(body);
    let table = SpecTable::build(&document);
    log::debug!("spec table has {} entries", table.len());

    schema::apply_table(SPEC_FIELDS, &table.as_document(), &mut record);
    record
}
