use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use url::Url;

use crate::config::SiteConfig;
use crate::error::Result;
use crate::path::parse_document;
use crate::record::{FieldValue, VehicleRecord};
use crate::schema::{self, DATE_SCRAPED, DERIVATIVE_ID, PRIMARY_FIELDS, TIME_SCRAPED};

/// Request for the technical-spec endpoint, carrying the partially built
/// record to the merge stage.
#[derive(Debug, Clone)]
pub struct SpecRequest {
    pub url: Url,
    pub record: VehicleRecord,
}

#[derive(Debug, Clone)]
pub enum PrimaryOutcome {
    FollowSpec(SpecRequest),
    /// Derivative id is missing: the record is final with spec fields missing.
    Finished(VehicleRecord),
}

pub fn handle_detail(site: &SiteConfig, body: &str) -> Result<PrimaryOutcome> {
    let document = parse_document(body);
    let record = build_record(&document, Local::now().naive_local());

    let derivative = record.get(DERIVATIVE_ID).and_then(derivative_param);
    match derivative {
        Some(derivative) => {
            let url = spec_url(site, &derivative)?;
            Ok(PrimaryOutcome::FollowSpec(SpecRequest { url, record }))
        }
        None => {
            log::info!(
                "no derivative id for advert {:?}, finishing without spec data",
                record.get("advert_id").and_then(FieldValue::as_value)
            );
            Ok(PrimaryOutcome::Finished(record))
        }
    }
}

pub fn build_record(document: &Value, scraped_at: NaiveDateTime) -> VehicleRecord {
    let mut record = VehicleRecord::new();
    record.set(TIME_SCRAPED, scraped_at.format("%H:%M:%S%.6f").to_string().as_str());
    record.set(DATE_SCRAPED, scraped_at.format("%Y-%m-%d").to_string().as_str());
    schema::apply_table(PRIMARY_FIELDS, document, &mut record);
    record
}

/// Renders the derivative id as a query value. Only a missing id yields
/// `None`; strings go through verbatim and other values as JSON text.
pub fn derivative_param(value: &FieldValue) -> Option<String> {
    match value.as_value()? {
        Value::String(s) => Some(s.clone()),
        other => {
            if !other.is_number() {
                log::warn!("unexpected derivative id {}", other);
            }
            Some(other.to_string())
        }
    }
}

pub fn spec_url(site: &SiteConfig, derivative: &str) -> Result<Url> {
    let mut url = site.endpoint("/json/taxonomy/technical-specification")?;
    url.query_pairs_mut()
        .append_pair("derivative", derivative)
        .append_pair("channel", &site.channel);
    Ok(url)
}
