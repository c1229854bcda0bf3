use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::Result;

pub const BASE_URL_ENV: &str = "AUTOTRADER_BASE_URL";

/// Site endpoints and the fixed query parameters sent with them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub postcode: String,
    pub radius: u32,
    pub sort: String,
    pub advertising_location: String,
    pub include_delivery_option: String,
    pub conditions: Vec<String>,
    pub channel: String,
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.autotrader.co.uk".to_string(),
            postcode: "n14an".to_string(),
            radius: 1501,
            sort: "relevance".to_string(),
            advertising_location: "at_cars".to_string(),
            include_delivery_option: "on".to_string(),
            conditions: vec!["New".to_string(), "Nearly New".to_string(), "Used".to_string()],
            channel: "cars".to_string(),
            user_agent: concat!("autotrader-scraper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SiteConfig {
    /// Parses `base_url`, tolerating a trailing slash.
    pub fn base(&self) -> Result<Url> {
        Ok(Url::parse(self.base_url.trim_end_matches('/'))?)
    }

    /// Appends `path` to the base path, so a `base_url` behind a proxy prefix
    /// keeps its prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base()?;
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        Ok(url)
    }

    pub fn search_url(&self, page: u32) -> Result<Url> {
        let mut url = self.endpoint("/car-search")?;
        url.query_pairs_mut()
            .append_pair("postcode", &self.postcode)
            .append_pair("make", "")
            .append_pair("include-delivery-option", &self.include_delivery_option)
            .append_pair("advertising-location", &self.advertising_location)
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub site: SiteConfig,
    pub max_pages: u32,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            max_pages: 1,
            concurrency: 4,
            request_timeout_secs: 30,
        }
    }
}

impl CrawlConfig {
    /// Reads a JSON config file; fields left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_env(mut self) -> Self {
        if let Ok(base) = env::var(BASE_URL_ENV) {
            if !base.is_empty() {
                self.site.base_url = base;
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(&self.site.user_agent)
            .timeout(self.request_timeout())
            .build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_defaults() {
        let url = SiteConfig::default().search_url(3).unwrap();
        assert_eq!(url.path(), "/car-search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("postcode".to_string(), "n14an".to_string())));
        assert!(pairs.contains(&("make".to_string(), String::new())));
        assert!(pairs.contains(&("page".to_string(), "3".to_string())));
    }

    #[test]
    fn test_base_tolerates_trailing_slash() {
        let site = SiteConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..Default::default()
        };
        let url = site.endpoint("/json/fpa/initial/1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/json/fpa/initial/1");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let site = SiteConfig {
            base_url: "http://h/proxy/at".to_string(),
            ..Default::default()
        };
        let url = site.endpoint("/json/fpa/initial/1").unwrap();
        assert_eq!(url.as_str(), "http://h/proxy/at/json/fpa/initial/1");

        let slash = SiteConfig {
            base_url: "http://h/proxy/at/".to_string(),
            ..Default::default()
        };
        assert_eq!(slash.search_url(1).unwrap().path(), "/proxy/at/car-search");
    }

    #[test]
    fn test_partial_json_config_keeps_defaults() {
        let config: CrawlConfig =
            serde_json::from_str(r#"{"max_pages": 5, "site": {"postcode": "sw1a1aa"}}"#).unwrap();
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.site.postcode, "sw1a1aa");
        assert_eq!(config.site.radius, 1501);
        assert_eq!(config.concurrency, 4);
    }
}
