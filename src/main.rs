use anyhow::{Context, Result};
use autotrader_scraper::config::CrawlConfig;
use autotrader_scraper::crawler::{CrawlSummary, SearchCrawler};
use autotrader_scraper::sink::{FeatureSink, JsonFileSink, JsonLinesSink, RecordSink};
use clap::{Parser, ValueEnum};
use log::{error, info};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape vehicle listings into flat records", long_about = None)]
struct Args {
    /// JSON config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Search postcode
    #[arg(long)]
    postcode: Option<String>,

    /// Search radius in miles
    #[arg(long)]
    radius: Option<u32>,

    /// Number of search pages to walk
    #[arg(short, long)]
    pages: Option<u32>,

    /// Listings processed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Output file path (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    /// Scrape these listing URLs instead of walking search pages
    #[arg(long = "listing")]
    listings: Vec<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum OutputFormat {
    Json,
    Jsonl,
    Features,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = build_config(&args)?;
    info!(
        "Scraping {} (postcode {}, {} page(s))",
        config.site.base_url, config.site.postcode, config.max_pages
    );

    let crawler = SearchCrawler::new(config)?;
    let mut sink = open_sink(&args)?;

    let summary = if args.listings.is_empty() {
        crawler.run(&mut sink).await?
    } else {
        let urls = args
            .listings
            .iter()
            .map(|u| Url::parse(u).with_context(|| format!("invalid listing url {}", u)))
            .collect::<Result<Vec<_>>>()?;
        crawler.crawl_listings(urls, &mut sink).await?
    };

    report(&summary);
    Ok(())
}

fn build_config(args: &Args) -> Result<CrawlConfig> {
    let mut config = match &args.config {
        Some(path) => CrawlConfig::from_file(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => CrawlConfig::default(),
    }
    .with_env();

    if let Some(postcode) = &args.postcode {
        config.site.postcode = postcode.clone();
    }
    if let Some(radius) = args.radius {
        config.site.radius = radius;
    }
    if let Some(pages) = args.pages {
        config.max_pages = pages;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    Ok(config)
}

fn open_sink(args: &Args) -> Result<Box<dyn RecordSink>> {
    let writer: Box<dyn Write> = match (&args.output, args.format) {
        (Some(path), OutputFormat::Json) => return Ok(Box::new(JsonFileSink::new(path))),
        (None, OutputFormat::Json) => {
            anyhow::bail!("--format json needs --output; use jsonl for stdout")
        }
        (Some(path), _) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {:?}", path))?,
        )),
        (None, _) => Box::new(io::stdout().lock()),
    };

    let sink: Box<dyn RecordSink> = match args.format {
        OutputFormat::Features => Box::new(FeatureSink::new(writer)),
        _ => Box::new(JsonLinesSink::new(writer)),
    };
    Ok(sink)
}

fn report(summary: &CrawlSummary) {
    if summary.failed > 0 {
        error!("{} listing(s) failed", summary.failed);
    }
    eprintln!(
        "Scraped {} listing(s) from {} page(s): {} written, {} failed",
        summary.listings, summary.pages, summary.emitted, summary.failed
    );
}
