use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::config::CrawlerConfig;
use crate::fetch::{Fetch, HttpFetcher};
use crate::frontier::{Frontier, StartingPoint};
use crate::keywords::KeywordMatcher;
use crate::links::{extract_links, is_non_relevant, starts_with_ignore_ascii_case};
use crate::result::CrawlResult;
use crate::session::{lock, run_pool, CrawlSession};

/// Hard ceiling on the worker cap, whatever the setting says.
pub const MAX_ALLOWED_WORKERS: usize = 99;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// A parallel run is already draining; wait for it to finish.
    #[error("a parallel crawl is already running ({active_workers} active workers)")]
    Busy { active_workers: usize },

    #[error("worker count {0} is outside the allowed range [1, {MAX_ALLOWED_WORKERS}]")]
    InvalidWorkerCount(usize),

    #[error("a crawl worker panicked; the run was abandoned")]
    WorkerPanicked,

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Crawl engine owner: holds the fetcher, the mutable worker-cap setting and
/// the currently active parallel session, if any.
///
/// With `max_workers == 1` the parallel engine is disabled and [`crawl`]
/// runs the single-threaded loop. Only one parallel run may be active per
/// `Crawler` at a time; the cap cannot change while a run is draining.
///
/// [`crawl`]: Crawler::crawl
pub struct Crawler<F = HttpFetcher> {
    fetcher: Arc<F>,
    // Lock order where both are taken: active, then max_workers.
    max_workers: Mutex<usize>,
    active: Mutex<Option<Arc<CrawlSession>>>,
}

impl Crawler<HttpFetcher> {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(config)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetch + 'static> Crawler<F> {
    /// Builds a crawler over any [`Fetch`] implementation; tests use this to
    /// crawl a fixed in-memory page graph.
    pub fn with_fetcher(config: &CrawlerConfig, fetcher: F) -> Result<Self, CrawlError> {
        if !(1..=MAX_ALLOWED_WORKERS).contains(&config.max_workers) {
            return Err(CrawlError::InvalidWorkerCount(config.max_workers));
        }
        Ok(Self {
            fetcher: Arc::new(fetcher),
            max_workers: Mutex::new(config.max_workers),
            active: Mutex::new(None),
        })
    }

    /// Runs one crawl over `starting_points`, dispatching on the current
    /// worker-cap setting.
    pub async fn crawl(
        &self,
        starting_points: &[StartingPoint],
        keywords: &[String],
    ) -> Result<CrawlResult, CrawlError> {
        if self.max_workers() == 1 {
            Ok(self.crawl_sequential(starting_points, keywords).await)
        } else {
            self.crawl_parallel(starting_points, keywords).await
        }
    }

    /// Single-threaded engine: drains the frontier task by task until it is
    /// empty.
    pub async fn crawl_sequential(
        &self,
        starting_points: &[StartingPoint],
        keywords: &[String],
    ) -> CrawlResult {
        let matcher = KeywordMatcher::new(keywords);
        let mut frontier = Frontier::seeded(starting_points);
        let mut result = CrawlResult::default();

        while let Some(task) = frontier.pop() {
            if is_non_relevant(&task.url) {
                log::debug!("Non-relevant content for keyword extraction, skip it: {}", task.url);
                log::debug!("    Remaining links: {}", frontier.len());
                continue;
            }
            if result.is_visited(&task.url) {
                log::debug!("Already visited link, skip it: {}", task.url);
                log::debug!("    Remaining links: {}", frontier.len());
                continue;
            }
            if !task.base_url.is_empty()
                && !starts_with_ignore_ascii_case(&task.url, &task.base_url)
            {
                log::debug!("URL doesn't match base URL, skip it: {}", task.url);
                log::debug!("    Base URL: {}", task.base_url);
                continue;
            }

            log::info!("Crawling: {}", task.url);
            result.first_visit(&task.url);

            let page = match self.fetcher.fetch(&task.url).await {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("    Page could not be fetched, skip it: {e}");
                    continue;
                }
            };

            let found = matcher.find_in(&page);
            if !found.is_empty() {
                log::info!(
                    "    Keywords found: {}",
                    found.iter().cloned().collect::<Vec<_>>().join(", ")
                );
                result.record_page(&task.url, found, &task.origin);
            }

            let mut new_links = 0;
            for link in extract_links(&page, &task.url) {
                if is_non_relevant(&link) {
                    log::debug!("    Non-relevant content for keyword extraction, skip it: {link}");
                    continue;
                }
                if result.is_visited(&link) {
                    log::debug!("    Already visited link found, skip it: {link}");
                    continue;
                }
                if let Some(child) = task.child_for(&link) {
                    frontier.push(child);
                    new_links += 1;
                }
            }
            if new_links > 0 {
                log::info!("    New links added: {new_links}");
            }
            log::debug!("    Remaining links: {}", frontier.len());
        }

        result
    }

    /// Parallel engine: an elastic pool of workers draining one shared
    /// frontier. Returns [`CrawlError::Busy`] when a run is already active,
    /// and never exposes a partial result.
    pub async fn crawl_parallel(
        &self,
        starting_points: &[StartingPoint],
        keywords: &[String],
    ) -> Result<CrawlResult, CrawlError> {
        let session = {
            let mut active = lock(&self.active);
            if let Some(running) = active.as_ref() {
                return Err(CrawlError::Busy {
                    active_workers: running.active_workers(),
                });
            }
            let session = Arc::new(CrawlSession::new(starting_points));
            *active = Some(session.clone());
            session
        };

        let cap = self.max_workers();
        log::info!("Starting parallel crawl with up to {cap} workers");

        let outcome = run_pool(
            session.clone(),
            self.fetcher.clone(),
            Arc::new(KeywordMatcher::new(keywords)),
            cap,
        )
        .await;

        *lock(&self.active) = None;

        outcome.map(|()| session.take_result())
    }

    /// Changes the worker cap. Rejected outside `[1, MAX_ALLOWED_WORKERS]`
    /// and while a parallel run is active; the previous value is kept on
    /// rejection.
    pub fn set_max_workers(&self, count: usize) -> Result<(), CrawlError> {
        let active = lock(&self.active);
        if let Some(running) = active.as_ref() {
            return Err(CrawlError::Busy {
                active_workers: running.active_workers(),
            });
        }
        if !(1..=MAX_ALLOWED_WORKERS).contains(&count) {
            return Err(CrawlError::InvalidWorkerCount(count));
        }
        *lock(&self.max_workers) = count;
        Ok(())
    }

    pub fn max_workers(&self) -> usize {
        *lock(&self.max_workers)
    }

    /// Worker count of the active parallel run, or 0 when idle.
    pub fn active_workers(&self) -> usize {
        lock(&self.active)
            .as_ref()
            .map(|session| session.active_workers())
            .unwrap_or(0)
    }
}
