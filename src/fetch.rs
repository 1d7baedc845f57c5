use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::config::CrawlerConfig;

/// Why a page could not be fetched. The engines treat every variant the same
/// way (drop the task, no retry); the reason only feeds the log line.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("scheme {0:?} is not allowed")]
    Scheme(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http status {0}")]
    Status(u16),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// The fetch seam the crawl engines are generic over, so tests can drive
/// them with a fixed in-memory page graph.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP GET fetcher. Only `http`/`https` URLs are issued; everything else is
/// rejected before touching the network.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.fetch_timeout))
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url)?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(FetchError::Scheme(other.to_owned())),
        }

        let resp = self.client.get(parsed).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.text().await?)
    }
}
