use futures::stream::{self, StreamExt};
use kuchiki::traits::*;
use std::collections::HashSet;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::Result;
use crate::pipeline::ListingPipeline;
use crate::sink::RecordSink;

const RESULT_LINK_SELECTOR: &str = "li.search-page__result a[href]";
const LISTING_PATH: &str = "/car-details/";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: u32,
    pub listings: usize,
    pub emitted: usize,
    pub failed: usize,
}

/// Walks search-result pages and feeds every discovered listing through the
/// pipeline, handing finished records to a sink.
pub struct SearchCrawler {
    config: CrawlConfig,
    pipeline: ListingPipeline,
}

impl SearchCrawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = config.http_client()?;
        let pipeline = ListingPipeline::new(client, config.site.clone());
        Ok(Self { config, pipeline })
    }

    pub fn pipeline(&self) -> &ListingPipeline {
        &self.pipeline
    }

    /// Crawls up to `max_pages` search pages. Pagination stops at the first
    /// page without result links or that cannot be fetched.
    pub async fn run<S: RecordSink>(&self, sink: &mut S) -> Result<CrawlSummary> {
        let mut summary = CrawlSummary::default();

        for page in 1..=self.config.max_pages {
            let search_url = self.config.site.search_url(page)?;
            let html = match self.pipeline.fetch_text(&search_url).await {
                Ok(html) => html,
                Err(e) => {
                    log::error!("search page {} failed: {}", search_url, e);
                    break;
                }
            };

            let listings = discover_listings(&search_url, &html);
            if listings.is_empty() {
                log::info!("no listings on search page {}, stopping", page);
                break;
            }

            log::info!("search page {}: {} listings", page, listings.len());
            summary.pages += 1;
            self.process_listings(listings, sink, &mut summary).await?;
        }

        sink.finish()?;
        log::info!(
            "crawl finished: {} pages, {} listings, {} emitted, {} failed",
            summary.pages,
            summary.listings,
            summary.emitted,
            summary.failed
        );
        Ok(summary)
    }

    pub async fn crawl_listings<S: RecordSink>(
        &self,
        urls: Vec<Url>,
        sink: &mut S,
    ) -> Result<CrawlSummary> {
        let mut summary = CrawlSummary::default();
        self.process_listings(urls, sink, &mut summary).await?;
        sink.finish()?;
        Ok(summary)
    }

    async fn process_listings<S: RecordSink>(
        &self,
        urls: Vec<Url>,
        sink: &mut S,
        summary: &mut CrawlSummary,
    ) -> Result<()> {
        summary.listings += urls.len();
        let pipeline = &self.pipeline;

        let mut results = stream::iter(urls.into_iter().map(|url| async move {
            let result = pipeline.process(&url).await;
            (url, result)
        }))
        .buffer_unordered(self.config.concurrency.max(1));

        while let Some((url, result)) = results.next().await {
            match result {
                Ok(record) => {
                    sink.emit(record)?;
                    summary.emitted += 1;
                }
                Err(e) => {
                    log::error!("listing {} failed: {}", url, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(())
    }
}

/// Listing links inside search-result items, resolved against the page URL,
/// in page order without repeats.
pub fn discover_listings(page_url: &Url, html: &str) -> Vec<Url> {
    let document = kuchiki::parse_html().one(html);
    let Ok(anchors) = document.select(RESULT_LINK_SELECTOR) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in anchors {
        let href = {
            let attrs = anchor.attributes.borrow();
            match attrs.get("href") {
                Some(href) => href.to_string(),
                None => continue,
            }
        };
        if !href.contains(LISTING_PATH) {
            continue;
        }
        let Ok(mut url) = page_url.join(&href) else {
            log::debug!("skipping unparsable link {}", href);
            continue;
        };
        url.set_fragment(None);
        if seen.insert(url.clone()) {
            links.push(url);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovers_links_inside_result_items_only() {
        let page = Url::parse("https://www.autotrader.co.uk/car-search?page=1").unwrap();
        let html = r#"
        <html><body>
            <ul>
                <li class="search-page__result">
                    <a href="/car-details/111"><img></a>
                    <a href="/car-details/111#photos">Ford Focus</a>
                    <a href="/dealers/42">Dealer</a>
                </li>
                <li class="search-page__result">
                    <a href="https://www.autotrader.co.uk/car-details/222?sort=relevance">Kia Ceed</a>
                </li>
                <li class="promo"><a href="/car-details/999">Sponsored</a></li>
            </ul>
            <a href="/car-details/333">Footer link</a>
        </body></html>
        "#;

        let links = discover_listings(&page, html);
        let paths: Vec<&str> = links.iter().map(|u| u.path()).collect();
        assert_eq!(paths, vec!["/car-details/111", "/car-details/222"]);
        assert!(links.iter().all(|u| u.host_str() == Some("www.autotrader.co.uk")));
    }

    #[test]
    fn test_no_results_gives_no_links() {
        let page = Url::parse("https://www.autotrader.co.uk/car-search?page=9").unwrap();
        assert!(discover_listings(&page, "<html><body><p>No results</p></body></html>").is_empty());
    }
}
