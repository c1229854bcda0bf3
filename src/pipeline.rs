use reqwest::Client;
use url::Url;

use crate::config::SiteConfig;
use crate::error::{Result, ScrapeError};
use crate::page;
use crate::primary::{self, PrimaryOutcome};
use crate::record::VehicleRecord;
use crate::spec;

/// Runs one listing through page → detail endpoint → spec endpoint.
///
/// Each call owns its in-flight record; nothing is shared between listings,
/// so many calls may run concurrently on the same pipeline.
#[derive(Debug, Clone)]
pub struct ListingPipeline {
    client: Client,
    site: SiteConfig,
}

impl ListingPipeline {
    pub fn new(client: Client, site: SiteConfig) -> Self {
        Self { client, site }
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub async fn process(&self, page_url: &Url) -> Result<VehicleRecord> {
        let html = self.fetch_text(page_url).await?;
        self.process_page(page_url, &html).await
    }

    pub async fn process_page(&self, page_url: &Url, html: &str) -> Result<VehicleRecord> {
        let detail = page::handle_page(&self.site, page_url, html)?;
        let body = self.fetch_document(&detail.url).await;

        match primary::handle_detail(&self.site, &body)? {
            PrimaryOutcome::Finished(record) => Ok(record),
            PrimaryOutcome::FollowSpec(request) => {
                let body = self.fetch_document(&request.url).await;
                Ok(spec::merge_spec(&body, request.record))
            }
        }
    }

    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        log::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatusCode(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    // A JSON endpoint that cannot be fetched reads as an empty document.
    async fn fetch_document(&self, url: &Url) -> String {
        match self.fetch_text(url).await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("treating {} as empty: {}", url, e);
                String::new()
            }
        }
    }
}
