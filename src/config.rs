use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Worker cap for the parallel engine; 1 disables it and the sequential
    /// engine is used instead.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            fetch_timeout: default_fetch_timeout(),
            max_workers: default_max_workers(),
        }
    }
}

fn default_user_agent() -> String {
    String::from("KwSpider")
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_workers() -> usize {
    1
}
