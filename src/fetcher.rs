use crate::ScraperError;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    StatusCode, Url,
};
use std::time::Duration;
use tracing::{debug, warn};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// A response reduced to what the fetcher looks at.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: Url) -> Result<RawResponse, reqwest::Error>;
}

/// Shared `reqwest::Client` with browser-like default headers.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<HttpTransport, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(HttpTransport { client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<RawResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub retry_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            backoff_base: Duration::from_secs(1),
            retry_statuses: vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay after the given failed attempt (1-based): base, 2*base, 4*base, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub base_url: Url,
    /// Adds `plus=1`, the detailed listing view.
    pub plus: bool,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl FetcherConfig {
    pub fn new(base_url: Url) -> FetcherConfig {
        FetcherConfig {
            base_url,
            plus: false,
            timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_plus(mut self, plus: bool) -> FetcherConfig {
        self.plus = plus;
        self
    }
}

pub struct Fetcher<T: Transport> {
    config: FetcherConfig,
    transport: T,
}

impl Fetcher<HttpTransport> {
    pub fn http(config: FetcherConfig) -> Result<Fetcher<HttpTransport>, ScraperError> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Fetcher { config, transport })
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(config: FetcherConfig, transport: T) -> Fetcher<T> {
        Fetcher { config, transport }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.config.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            if self.config.plus {
                query.append_pair("plus", "1");
            }
        }
        url
    }

    pub async fn fetch(&self, page: u32) -> Result<String, ScraperError> {
        let url = self.page_url(page);
        let retry = &self.config.retry;
        let mut attempt = 1;

        loop {
            debug!("Visit {} (attempt {})", url, attempt);
            match self.transport.get(url.clone()).await {
                Ok(response) if response.status.is_success() => return Ok(response.body),
                Ok(response) if retry.is_retryable(response.status) => {
                    if attempt >= retry.max_attempts {
                        return Err(ScraperError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            status: response.status,
                        });
                    }
                    warn!("{} returned {}, retrying", url, response.status);
                }
                Ok(response) => {
                    return Err(ScraperError::Status {
                        status: response.status,
                        url: url.to_string(),
                    })
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < retry.max_attempts => {
                    warn!("{} failed: {}, retrying", url, e);
                }
                Err(e) => return Err(e.into()),
            }

            tokio::time::sleep(retry.backoff(attempt)).await;
            attempt += 1;
        }
    }
}
