use rand::Rng;
use scraper::Html;
use serde::Serialize;
use std::fmt::Display;
use tokio::{sync::watch, time::Duration};
use tracing::{debug, info, trace, warn};

pub mod transfermarkt;

mod data;
mod error;
mod fetcher;
mod utils;

pub use data::Aggregator;
pub use error::{ScraperError, SkipReason};
pub use fetcher::{Fetcher, FetcherConfig, HttpTransport, RawResponse, RetryPolicy, Transport};

pub enum CrawlerResult<R> {
    /// No results table, or one without rows.
    NoResults,
    Rows(Vec<Result<R, SkipReason>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub proceed: bool,
    pub total_pages: u32,
}

pub trait Crawler {
    type Record: Serialize + Display;

    fn crawl(&self, doc: &Html) -> CrawlerResult<Self::Record>;
    fn next_page(&self, doc: &Html, current_page: u32, total_pages: u32) -> PageCursor;
}

/// Delay between two page requests.
#[derive(Debug, Clone)]
pub enum Pacing {
    Fixed(Duration),
    Jitter { min: Duration, max: Duration },
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Jitter {
            min: Duration::from_secs(2),
            max: Duration::from_secs(3),
        }
    }
}

impl Pacing {
    pub fn delay(&self) -> Duration {
        match self {
            Pacing::Fixed(d) => *d,
            Pacing::Jitter { min, max } if min < max => rand::thread_rng().gen_range(*min..=*max),
            Pacing::Jitter { min, .. } => *min,
        }
    }
}

#[derive(Debug)]
pub enum StopReason {
    LastPage,
    NoResults,
    Failed(ScraperError),
    Interrupted,
}

pub struct ScrapeReport<R> {
    pub collected: Aggregator<R>,
    /// Pages fetched and parsed.
    pub pages: u32,
    pub stop: StopReason,
}

/// Walks the listing page by page until the crawler reports the last page,
/// a page fails, or `shutdown` flips.
pub async fn run_scraper<C, T>(
    crawler: &C,
    fetcher: &Fetcher<T>,
    pacing: &Pacing,
    mut shutdown: watch::Receiver<bool>,
) -> ScrapeReport<C::Record>
where
    C: Crawler,
    T: Transport,
{
    let mut collected = Aggregator::new();
    let mut page = 1;
    let mut total_pages = 1;
    let mut pages = 0;

    let stop = loop {
        info!("Processing page {}/{}...", page, total_pages);

        let html = tokio::select! {
            biased;
            Ok(()) = shutdown.changed() => break StopReason::Interrupted,
            res = fetcher.fetch(page) => match res {
                Ok(html) => html,
                Err(e) => {
                    warn!("Error on page {}: {}", page, e);
                    break StopReason::Failed(e);
                }
            },
        };

        let (result, cursor) = {
            let doc = Html::parse_document(&html);
            (
                crawler.crawl(&doc),
                crawler.next_page(&doc, page, total_pages),
            )
        };
        pages += 1;

        let rows = match result {
            CrawlerResult::NoResults => {
                info!("No results on page {}", page);
                break StopReason::NoResults;
            }
            CrawlerResult::Rows(rows) => rows,
        };

        let before = collected.len();
        for row in rows {
            match row {
                Ok(record) => {
                    trace!("\n{}", record);
                    collected.push(record);
                }
                Err(reason) if reason.is_silent() => debug!("Skip row on page {}: {}", page, reason),
                Err(reason) => warn!("Error parsing row on page {}: {}", page, reason),
            }
        }
        info!(
            "[{}] Page {} done, {} players so far",
            collected.len() - before,
            page,
            collected.len()
        );

        total_pages = cursor.total_pages;
        if !cursor.proceed {
            break StopReason::LastPage;
        }
        page += 1;

        tokio::select! {
            biased;
            Ok(()) = shutdown.changed() => break StopReason::Interrupted,
            _ = tokio::time::sleep(pacing.delay()) => {}
        }
    };

    ScrapeReport {
        collected,
        pages,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::tests::ScriptedTransport;
    use crate::transfermarkt::RumoursCrawler;
    use reqwest::{StatusCode, Url};
    use std::fs;

    fn fetcher(responses: &[(u16, &str)]) -> Fetcher<ScriptedTransport> {
        let mut config = FetcherConfig::new(Url::parse("https://www.example.org/rumours").unwrap());
        config.retry.backoff_base = Duration::from_millis(1);
        Fetcher::new(config, ScriptedTransport::new(responses))
    }

    #[test]
    fn pacing_stays_in_range() {
        let pacing = Pacing::default();
        for _ in 0..50 {
            let d = pacing.delay();
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(3));
        }
        assert_eq!(Pacing::Fixed(Duration::ZERO).delay(), Duration::ZERO);
    }

    #[tokio::test]
    async fn keeps_records_when_a_later_page_fails() {
        let page = fs::read_to_string("tests/htmls/latest_rumours.html").unwrap();
        let fetcher = fetcher(&[(200, page.as_str()), (403, "forbidden")]);
        let (_tx, rx) = watch::channel(false);

        let report = run_scraper(
            &RumoursCrawler,
            &fetcher,
            &Pacing::Fixed(Duration::ZERO),
            rx,
        )
        .await;

        assert_eq!(report.collected.len(), 3);
        assert_eq!(report.pages, 1);
        assert!(matches!(
            report.stop,
            StopReason::Failed(ScraperError::Status { status, .. }) if status == StatusCode::FORBIDDEN
        ));
    }

    #[tokio::test]
    async fn interruption_stops_before_fetching() {
        let fetcher = fetcher(&[(200, "<html></html>")]);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let report = run_scraper(
            &RumoursCrawler,
            &fetcher,
            &Pacing::Fixed(Duration::ZERO),
            rx,
        )
        .await;

        assert!(matches!(report.stop, StopReason::Interrupted));
        assert!(report.collected.is_empty());
        assert_eq!(report.pages, 0);
    }

    #[tokio::test]
    async fn missing_table_ends_the_run() {
        let fetcher = fetcher(&[(200, "<html><body><p>Maintenance</p></body></html>")]);
        let (_tx, rx) = watch::channel(false);

        let report = run_scraper(
            &RumoursCrawler,
            &fetcher,
            &Pacing::Fixed(Duration::ZERO),
            rx,
        )
        .await;

        assert!(matches!(report.stop, StopReason::NoResults));
        assert!(report.collected.is_empty());
    }
}
