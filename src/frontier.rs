use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::links::{base_domain, starts_with_ignore_ascii_case};

/// A named crawl origin with its depth budgets, as supplied by the caller.
/// `base_url` scopes internal expansion to URLs under that prefix; an empty
/// string means unconstrained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartingPoint {
    pub name: String,
    pub url: String,
    pub internal_depth: u32,
    pub external_depth: u32,
    pub base_url: String,
}

/// One pending fetch. Tasks are consumed exactly once and never mutated;
/// expanding a link produces a fresh task with a decremented budget.
#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub url: String,
    /// Internal-link budget left on this branch.
    pub internal_left: u32,
    /// External-link budget left on this branch.
    pub external_left: u32,
    /// Name of the starting point this branch grew from.
    pub origin: String,
    /// Active base-URL constraint; cleared once the branch went external.
    pub base_url: String,
    /// Seed URL of the starting point; anchors internal/external
    /// classification for the whole branch.
    pub root_url: String,
}

impl CrawlTask {
    pub fn seed(sp: &StartingPoint) -> Self {
        Self {
            url: sp.url.clone(),
            internal_left: sp.internal_depth,
            external_left: sp.external_depth,
            origin: sp.name.clone(),
            base_url: sp.base_url.clone(),
            root_url: sp.url.clone(),
        }
    }

    /// Classifies `link` against this task's starting point and returns the
    /// child task to enqueue, or `None` when the link is out of budget or
    /// out of base-URL scope.
    ///
    /// A link is internal iff its domain equals the *seed's* domain, not the
    /// domain of the page it was found on. External children drop the
    /// base-URL constraint.
    pub fn child_for(&self, link: &str) -> Option<CrawlTask> {
        let seed_domain = base_domain(&self.root_url);
        let link_domain = base_domain(link);

        if seed_domain.eq_ignore_ascii_case(&link_domain) {
            if self.internal_left == 0 {
                log::debug!("    New internal link found, but skipped (too far from the starting point): {link}");
                return None;
            }
            if !self.base_url.is_empty() && !starts_with_ignore_ascii_case(link, &self.base_url) {
                log::debug!("    New internal link found, but skipped (URL doesn't match base URL): {link}");
                log::debug!("    Base URL: {}", self.base_url);
                return None;
            }
            log::debug!("    New internal link found and added: {link}");
            Some(CrawlTask {
                url: link.to_owned(),
                internal_left: self.internal_left - 1,
                external_left: self.external_left,
                origin: self.origin.clone(),
                base_url: self.base_url.clone(),
                root_url: self.root_url.clone(),
            })
        } else if self.external_left > 0 {
            log::debug!("    New external link found and added: {link}");
            Some(CrawlTask {
                url: link.to_owned(),
                internal_left: self.internal_left,
                external_left: self.external_left - 1,
                origin: self.origin.clone(),
                // External subtrees are never base-URL-scoped.
                base_url: String::new(),
                root_url: self.root_url.clone(),
            })
        } else {
            log::debug!("    New external link found, but skipped (too far from the starting point): {link}");
            None
        }
    }
}

/// FIFO work queue of crawl tasks.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
}

impl Frontier {
    pub fn seeded(starting_points: &[StartingPoint]) -> Self {
        let queue = starting_points.iter().map(CrawlTask::seed).collect();
        Self { queue }
    }

    pub fn push(&mut self, task: CrawlTask) {
        self.queue.push_back(task);
    }

    pub fn pop(&mut self) -> Option<CrawlTask> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
