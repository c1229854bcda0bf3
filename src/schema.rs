//! Static field tables for the flat vehicle record. Adding, removing or
//! renaming an entry is a breaking change for consumers.

use serde_json::Value;

use crate::path;
use crate::record::{FieldValue, VehicleRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Trim,
}

impl Transform {
    pub fn apply(self, value: FieldValue) -> FieldValue {
        match (self, value) {
            (Transform::Trim, FieldValue::Present(Value::String(s))) => {
                FieldValue::Present(Value::String(s.trim().to_string()))
            }
            (_, other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub path: &'static [&'static str],
    pub transform: Option<Transform>,
}

impl FieldSpec {
    const fn new(name: &'static str, path: &'static [&'static str]) -> Self {
        Self { name, path, transform: None }
    }

    const fn trimmed(name: &'static str, path: &'static [&'static str]) -> Self {
        Self { name, path, transform: Some(Transform::Trim) }
    }

    pub fn resolve(&self, document: &Value) -> FieldValue {
        let value = path::resolve(document, self.path);
        match self.transform {
            Some(t) => t.apply(value),
            None => value,
        }
    }
}

pub fn apply_table(table: &[FieldSpec], document: &Value, record: &mut VehicleRecord) {
    for field in table {
        let value = field.resolve(document);
        if value.is_missing() {
            log::debug!("field {} missing at {:?}", field.name, field.path);
        }
        record.set(field.name, value);
    }
}

pub const TIME_SCRAPED: &str = "time_scraped";
pub const DATE_SCRAPED: &str = "date_scraped";
pub const DERIVATIVE_ID: &str = "derivative_id";

pub const STAMPED_FIELDS: &[&str] = &[TIME_SCRAPED, DATE_SCRAPED];

// Upstream quirks: latitude and longitude both read the combined `latLong`,
// `manufactured_year_identifier` reads the `manufactured_year` key and
// `seller_longlat` reads `seller.longitude`.
pub const PRIMARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("advert_id", &["pageData", "ods", "advertId"]),
    FieldSpec::new("make", &["vehicle", "make"]),
    FieldSpec::new("model", &["vehicle", "model"]),
    FieldSpec::new("trim", &["vehicle", "trim"]),
    FieldSpec::new("manufactured_year", &["vehicle", "keyFacts", "manufactured-year"]),
    FieldSpec::new("manufactured_year_identifier", &["vehicle", "keyFacts", "manufactured-year"]),
    FieldSpec::new("body_type", &["vehicle", "keyFacts", "body-type"]),
    FieldSpec::new("mileage", &["vehicle", "keyFacts", "mileage"]),
    FieldSpec::new("engine_size", &["vehicle", "keyFacts", "engine-size"]),
    FieldSpec::new("transmission", &["vehicle", "keyFacts", "transmission"]),
    FieldSpec::new("fuel_type", &["vehicle", "keyFacts", "fuel-type"]),
    FieldSpec::new("doors", &["vehicle", "keyFacts", "doors"]),
    FieldSpec::new("seats", &["vehicle", "keyFacts", "seats"]),
    FieldSpec::new("number_of_owners", &["vehicle", "keyFacts", "owners"]),
    FieldSpec::new("emission_scheme", &["vehicle", "keyFacts", "emission-scheme"]),
    FieldSpec::new("vehicle_location_postcode", &["vehicle", "vehicleLocation", "postcode"]),
    FieldSpec::new("vehicle_location_latitude", &["vehicle", "vehicleLocation", "latLong"]),
    FieldSpec::new("vehicle_location_longitude", &["vehicle", "vehicleLocation", "latLong"]),
    FieldSpec::new("vehicle_registration_mark", &["vehicle", "vrm"]),
    FieldSpec::new(DERIVATIVE_ID, &["vehicle", "derivativeId"]),
    FieldSpec::new("condition", &["vehicle", "condition"]),
    FieldSpec::new("imported", &["vehicle", "imported"]),
    FieldSpec::new("average_mileage", &["vehicle", "mileageDeviation", "predictedMileage"]),
    FieldSpec::new("mileage_deviation", &["vehicle", "mileageDeviation", "deviation"]),
    FieldSpec::new("mileage_deviation_type", &["vehicle", "mileageDeviation", "type"]),
    FieldSpec::trimmed("ad_description", &["advert", "description"]),
    FieldSpec::new("price", &["advert", "price"]),
    FieldSpec::new("price_excluding_fees", &["advert", "priceExcludingFees"]),
    FieldSpec::new("no_admin_fees", &["advert", "noAdminFees"]),
    FieldSpec::new("price_deviation", &["advert", "marketAveragePriceDeviation", "deviation"]),
    FieldSpec::new("price_deviation_type", &["advert", "marketAveragePriceDeviation", "type"]),
    FieldSpec::new("price_rating", &["advert", "priceIndicator", "rating"]),
    FieldSpec::new("price_rating_label", &["advert", "priceIndicator", "ratingLabel"]),
    FieldSpec::trimmed("seller_name", &["seller", "name"]),
    FieldSpec::new("seller_id", &["seller", "id"]),
    FieldSpec::new("is_dealer_trusted", &["seller", "isTrustedDealer"]),
    FieldSpec::new("seller_longlat", &["seller", "longitude"]),
    FieldSpec::new("seller_segment", &["seller", "segment"]),
    FieldSpec::new("seller_rating", &["seller", "ratingStars"]),
    FieldSpec::new("total_reviews", &["seller", "ratingTotalReviews"]),
    FieldSpec::new("seller_postcode", &["seller", "location", "postcode"]),
    FieldSpec::trimmed("seller_address_one", &["seller", "location", "addressOne"]),
    FieldSpec::trimmed("seller_address_two", &["seller", "location", "addressTwo"]),
    FieldSpec::new("page_url", &["pageData", "canonical"]),
    FieldSpec::new("number_of_photos", &["pageData", "tracking", "number_of_photos"]),
    FieldSpec::new("co2_emissions", &["vehicle", "co2Emissions"]),
    FieldSpec::new("tax", &["vehicle", "tax"]),
];

pub const SPEC_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("zero_to_sixty", &["zero_to_sixty"]),
    FieldSpec::new("zero_to_sixty_two", &["zero_to_sixty_two"]),
    FieldSpec::new("top_speed", &["top_speed"]),
    FieldSpec::new("cylinders", &["cylinders"]),
    FieldSpec::new("valves", &["valves"]),
    FieldSpec::new("engine_power", &["engine_power"]),
    FieldSpec::new("engine_torque", &["engine_torque"]),
    FieldSpec::new("height", &["height"]),
    FieldSpec::new("length", &["length"]),
    FieldSpec::new("wheelbase", &["wheelbase"]),
    FieldSpec::new("width", &["width"]),
    FieldSpec::new("fuel_tank_capacity", &["fuel_tank_capacity"]),
    FieldSpec::new("gross_vehicle_weight", &["gross_vehicle_weight"]),
    FieldSpec::new("boot_space_seats_up", &["boot_space_seats_up"]),
    FieldSpec::new("boot_space_seats_down", &["boot_space_seats_down"]),
    FieldSpec::new("max_loading_weight", &["max_loading_weight"]),
    FieldSpec::new("minimum_kerb_weight", &["minimum_kerb_weight"]),
];

// Output order: stamped, primary, spec.
pub const FIELD_NAMES: &[&str] = &[
    TIME_SCRAPED,
    DATE_SCRAPED,
    "advert_id",
    "make",
    "model",
    "trim",
    "manufactured_year",
    "manufactured_year_identifier",
    "body_type",
    "mileage",
    "engine_size",
    "transmission",
    "fuel_type",
    "doors",
    "seats",
    "number_of_owners",
    "emission_scheme",
    "vehicle_location_postcode",
    "vehicle_location_latitude",
    "vehicle_location_longitude",
    "vehicle_registration_mark",
    DERIVATIVE_ID,
    "condition",
    "imported",
    "average_mileage",
    "mileage_deviation",
    "mileage_deviation_type",
    "ad_description",
    "price",
    "price_excluding_fees",
    "no_admin_fees",
    "price_deviation",
    "price_deviation_type",
    "price_rating",
    "price_rating_label",
    "seller_name",
    "seller_id",
    "is_dealer_trusted",
    "seller_longlat",
    "seller_segment",
    "seller_rating",
    "total_reviews",
    "seller_postcode",
    "seller_address_one",
    "seller_address_two",
    "page_url",
    "number_of_photos",
    "co2_emissions",
    "tax",
    "zero_to_sixty",
    "zero_to_sixty_two",
    "top_speed",
    "cylinders",
    "valves",
    "engine_power",
    "engine_torque",
    "height",
    "length",
    "wheelbase",
    "width",
    "fuel_tank_capacity",
    "gross_vehicle_weight",
    "boot_space_seats_up",
    "boot_space_seats_down",
    "max_loading_weight",
    "minimum_kerb_weight",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_cover_every_table_in_order() {
        let expected: Vec<&str> = STAMPED_FIELDS
            .iter()
            .copied()
            .chain(PRIMARY_FIELDS.iter().map(|f| f.name))
            .chain(SPEC_FIELDS.iter().map(|f| f.name))
            .collect();
        assert_eq!(FIELD_NAMES, expected.as_slice());
        assert_eq!(FIELD_NAMES.len(), 66);
    }

    #[test]
    fn test_field_names_are_unique() {
        let unique: HashSet<&str> = FIELD_NAMES.iter().copied().collect();
        assert_eq!(unique.len(), FIELD_NAMES.len());
    }

    #[test]
    fn test_spec_fields_are_single_key_paths() {
        for field in SPEC_FIELDS {
            assert_eq!(field.path, &[field.name], "{}", field.name);
        }
    }

    // Both coordinates read the combined latLong value. This mirrors the
    // upstream mapping and is asserted so any change to it is deliberate.
    #[test]
    fn test_latitude_and_longitude_share_the_combined_path() {
        let lat = PRIMARY_FIELDS.iter().find(|f| f.name == "vehicle_location_latitude").unwrap();
        let lon = PRIMARY_FIELDS.iter().find(|f| f.name == "vehicle_location_longitude").unwrap();
        assert_eq!(lat.path, lon.path);
        assert_eq!(lat.path, &["vehicle", "vehicleLocation", "latLong"]);
    }

    #[test]
    fn test_trim_transform() {
        let doc = json!({"advert": {"description": "  Lovely car \n"}});
        let field = PRIMARY_FIELDS.iter().find(|f| f.name == "ad_description").unwrap();
        assert_eq!(field.resolve(&doc), FieldValue::Present(json!("Lovely car")));

        assert!(field.resolve(&json!({})).is_missing());
        assert_eq!(
            Transform::Trim.apply(FieldValue::Present(json!(12))),
            FieldValue::Present(json!(12))
        );
    }

    #[test]
    fn test_apply_table_fills_known_fields() {
        let doc = json!({"vehicle": {"make": "Ford", "derivativeId": "X1"}});
        let mut record = VehicleRecord::new();
        apply_table(PRIMARY_FIELDS, &doc, &mut record);
        assert_eq!(record.get("make").unwrap().as_str(), Some("Ford"));
        assert_eq!(record.get(DERIVATIVE_ID).unwrap().as_str(), Some("X1"));
        assert!(record.get("price").unwrap().is_missing());
        assert_eq!(record.len(), FIELD_NAMES.len());
    }
}
