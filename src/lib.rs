use scraper::Html;
use std::fmt::Display;
use tracing::{debug, info, warn};

pub mod events;
pub mod feed;
pub mod fetch;
pub mod settings;

mod data;
mod error;
mod utils;

pub use data::Table;
pub use error::{CrawlerError, FetchError};
pub use fetch::Fetcher;

pub trait Crawler {
    type Record: Display + Send;

    fn name(&self) -> &str;
    fn start_urls(&self) -> Vec<String>;
    fn crawl(&self, doc: &Html) -> Vec<Self::Record>;
}

#[async_trait::async_trait]
pub trait Sink {
    type Record: Send;

    /// Stores the records scraped from `url`, returning how many were written.
    async fn insert(&mut self, url: &str, records: Vec<Self::Record>)
        -> Result<usize, CrawlerError>;
    async fn finish(&mut self) -> Result<(), CrawlerError>;
}

/// Discards everything; used when no feed is requested.
pub struct NullSink<R>(std::marker::PhantomData<fn(R)>);

impl<R> Default for NullSink<R> {
    fn default() -> Self {
        NullSink(std::marker::PhantomData)
    }
}

#[async_trait::async_trait]
impl<R: Send + 'static> Sink for NullSink<R> {
    type Record = R;

    async fn insert(&mut self, _url: &str, records: Vec<R>) -> Result<usize, CrawlerError> {
        Ok(records.len())
    }

    async fn finish(&mut self) -> Result<(), CrawlerError> {
        Ok(())
    }
}

/// Crawl identifiers known to [`events_crawler`] and the CLI.
pub fn crawler_names() -> &'static [&'static str] {
    &[events::EventsCrawler::NAME]
}

pub fn events_crawler(
    name: &str,
    crawler: events::EventsCrawler,
) -> Result<events::EventsCrawler, CrawlerError> {
    if crawler_names().contains(&name) {
        Ok(crawler)
    } else {
        Err(CrawlerError::UnknownCrawler(name.to_string()))
    }
}

/// Fetches every start URL once, extracts its records and hands them to `sink`.
///
/// Returns the number of records written.
pub async fn run_crawler<C, S>(
    crawler: &C,
    fetcher: &Fetcher,
    sink: &mut S,
) -> Result<usize, CrawlerError>
where
    C: Crawler + Sync,
    S: Sink<Record = C::Record> + Send,
{
    info!("Crawler opened: {}", crawler.name());

    // The sink is finished whether or not crawling succeeded.
    let crawled = async {
        let mut total = 0;
        for url in crawler.start_urls() {
            let html = fetcher.fetch(&url).await?;

            let records = {
                let doc = Html::parse_document(&html);
                crawler.crawl(&doc)
            };

            if records.is_empty() {
                warn!("No records extracted: {}", url);
            }
            for record in &records {
                debug!("Scraped from {}\n{}", url, record);
            }

            total += sink.insert(&url, records).await?;
        }
        Ok::<_, CrawlerError>(total)
    }
    .await;

    let finished = sink.finish().await;
    let total = crawled?;
    finished?;

    info!("Crawler closed: {} ({} items)", crawler.name(), total);
    Ok(total)
}
