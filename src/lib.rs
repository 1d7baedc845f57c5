mod config;
mod crawler;
mod fetch;
mod frontier;
mod keywords;
mod links;
mod result;
mod session;

pub use config::CrawlerConfig;
pub use crawler::{CrawlError, Crawler, MAX_ALLOWED_WORKERS};
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use frontier::{CrawlTask, Frontier, StartingPoint};
pub use keywords::KeywordMatcher;
pub use links::{base_domain, extract_links, is_non_relevant, without_fragment};
pub use result::{CrawlResult, KeywordPages, PageKeywords};
pub use session::CrawlSession;
