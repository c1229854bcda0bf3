use kuchiki::traits::*;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::config::SiteConfig;
use crate::error::{ExtractionError, Result};

const CORRELATION_MARKER: &str = "window.AT.correlationId";

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+-\w+-\w+-\w+-\w+").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct DetailRequest {
    pub listing_id: String,
    pub correlation_id: String,
    pub url: Url,
}

pub fn handle_page(site: &SiteConfig, page_url: &Url, html: &str) -> Result<DetailRequest> {
    let listing_id = listing_id(page_url)?;
    let correlation_id = correlation_id(html)
        .ok_or_else(|| ExtractionError::MissingCorrelationToken(page_url.to_string()))?;
    let url = detail_url(site, &listing_id, &correlation_id)?;

    log::debug!("listing {} correlation {}", listing_id, correlation_id);

    Ok(DetailRequest {
        listing_id,
        correlation_id,
        url,
    })
}

/// The trailing non-empty path segment of the listing URL.
pub fn listing_id(page_url: &Url) -> Result<String, ExtractionError> {
    page_url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::MissingListingId(page_url.to_string()))
}

/// Finds the first script block assigning the correlation id and returns the
/// first UUID-like token after the assignment.
pub fn correlation_id(html: &str) -> Option<String> {
    let document = kuchiki::parse_html().one(html);
    let scripts = document.select("script").ok()?;

    for script in scripts {
        let text = script.as_node().text_contents();
        if let Some(pos) = text.find(CORRELATION_MARKER) {
            let rest = &text[pos + CORRELATION_MARKER.len()..];
            return TOKEN_RE.find(rest).map(|m| m.as_str().to_string());
        }
    }
    None
}

pub fn detail_url(site: &SiteConfig, listing_id: &str, correlation_id: &str) -> Result<Url> {
    let mut url = site.endpoint(&format!("/json/fpa/initial/{}", listing_id))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("advertising-location", &site.advertising_location)
            .append_pair("guid", correlation_id)
            .append_pair("include-delivery-option", &site.include_delivery_option);
        for condition in &site.conditions {
            query.append_pair("onesearchad", condition);
        }
        query
            .append_pair("page", "1")
            .append_pair("postcode", &site.postcode)
            .append_pair("radius", &site.radius.to_string())
            .append_pair("sort", &site.sort);
    }
    Ok(url)
}
