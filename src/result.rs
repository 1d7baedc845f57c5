use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::links::without_fragment;

/// Keywords found on one page, tagged with the starting point that reached it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageKeywords {
    pub keywords: HashSet<String>,
    pub origin: String,
}

/// Pages on which one keyword was found, tagged with the starting point that
/// first hit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordPages {
    pub urls: HashSet<String>,
    pub origin: String,
}

/// Accumulated outcome of one crawl run. Owned by the engine while the run
/// is in flight and handed to the caller only once the run is quiescent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Every fetched URL, fragment-stripped.
    pub visited: HashSet<String>,
    /// URL to the keywords found on it; only pages with at least one hit.
    pub url_keywords: HashMap<String, PageKeywords>,
    /// Keyword to the URLs it was found on.
    pub keyword_urls: HashMap<String, KeywordPages>,
}

impl CrawlResult {
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(without_fragment(url))
    }

    /// Marks `url` visited. Returns false when its fragment-stripped form was
    /// already present; callers rely on check and mark being one step.
    pub fn first_visit(&mut self, url: &str) -> bool {
        self.visited.insert(without_fragment(url).to_owned())
    }

    /// Records a page's keyword hits into both maps under the originating
    /// starting point name.
    pub fn record_page(&mut self, url: &str, found: HashSet<String>, origin: &str) {
        for keyword in &found {
            self.keyword_urls
                .entry(keyword.clone())
                .or_insert_with(|| KeywordPages {
                    urls: HashSet::new(),
                    origin: origin.to_owned(),
                })
                .urls
                .insert(url.to_owned());
        }
        self.url_keywords.insert(
            url.to_owned(),
            PageKeywords {
                keywords: found,
                origin: origin.to_owned(),
            },
        );
    }
}
