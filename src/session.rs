use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future;
use tokio::task::JoinHandle;

use crate::crawler::CrawlError;
use crate::fetch::Fetch;
use crate::frontier::{CrawlTask, Frontier, StartingPoint};
use crate::keywords::KeywordMatcher;
use crate::links::{extract_links, is_non_relevant, starts_with_ignore_ascii_case};
use crate::result::CrawlResult;

/// Delay between supervisor inspections of the pool. Crawl latency is
/// dominated by network I/O, so a short fixed poll is enough.
pub(crate) const SUPERVISOR_POLL: Duration = Duration::from_millis(10);

/// Frontier and worker count live under one lock: quiescence is
/// "frontier empty AND zero workers" observed in a single critical section.
pub(crate) struct Pool {
    pub frontier: Frontier,
    pub active_workers: usize,
}

/// Shared state of one parallel crawl run. Each run owns its session; worker
/// tasks hold a handle to it and nothing else, so independent sessions can
/// coexist and tests run in isolation.
pub struct CrawlSession {
    pool: Mutex<Pool>,
    result: Mutex<CrawlResult>,
}

impl CrawlSession {
    pub fn new(starting_points: &[StartingPoint]) -> Self {
        Self {
            pool: Mutex::new(Pool {
                frontier: Frontier::seeded(starting_points),
                active_workers: 0,
            }),
            result: Mutex::new(CrawlResult::default()),
        }
    }

    pub fn active_workers(&self) -> usize {
        lock(&self.pool).active_workers
    }

    pub(crate) fn take_result(&self) -> CrawlResult {
        std::mem::take(&mut *lock(&self.result))
    }
}

/// A worker panic is surfaced through its join handle; a poisoned lock must
/// not take the rest of the pool down with it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Supervisor loop: spawns one worker per tick while there is queued work
/// and spare capacity, and stops once the run is quiescent.
///
/// Locks are never nested and never held across an await.
pub(crate) async fn run_pool<F: Fetch + 'static>(
    session: Arc<CrawlSession>,
    fetcher: Arc<F>,
    matcher: Arc<KeywordMatcher>,
    cap: usize,
) -> Result<(), CrawlError> {
    let mut handles: Vec<JoinHandle<()>> = Vec::new();

    let outcome = loop {
        if reap_panicked(&mut handles).await {
            break Err(CrawlError::WorkerPanicked);
        }

        let spawn = {
            let mut pool = lock(&session.pool);
            if pool.frontier.is_empty() && pool.active_workers == 0 {
                break Ok(());
            }
            if !pool.frontier.is_empty() && pool.active_workers < cap {
                // Registered before the task exists, so the count never
                // under-reports a worker that is about to pop.
                pool.active_workers += 1;
                true
            } else {
                false
            }
        };
        if spawn {
            handles.push(tokio::spawn(run_worker(
                session.clone(),
                fetcher.clone(),
                matcher.clone(),
            )));
        }

        tokio::time::sleep(SUPERVISOR_POLL).await;
    };

    match outcome {
        Ok(()) => {
            // Quiescent: every worker has already deregistered itself, so
            // joining cannot block.
            for joined in future::join_all(handles).await {
                if joined.is_err() {
                    return Err(CrawlError::WorkerPanicked);
                }
            }
            Ok(())
        }
        Err(e) => {
            for handle in &handles {
                handle.abort();
            }
            Err(e)
        }
    }
}

async fn reap_panicked(handles: &mut Vec<JoinHandle<()>>) -> bool {
    let mut panicked = false;
    let mut i = 0;
    while i < handles.len() {
        if handles[i].is_finished() {
            if let Err(e) = handles.swap_remove(i).await {
                panicked |= e.is_panic();
            }
        } else {
            i += 1;
        }
    }
    panicked
}

async fn run_worker<F: Fetch + 'static>(
    session: Arc<CrawlSession>,
    fetcher: Arc<F>,
    matcher: Arc<KeywordMatcher>,
) {
    loop {
        let task = {
            let mut pool = lock(&session.pool);
            match pool.frontier.pop() {
                Some(task) => task,
                None => {
                    // Exit and deregister in the same critical section, so
                    // the supervisor can never observe an empty frontier
                    // together with a phantom worker.
                    pool.active_workers -= 1;
                    return;
                }
            }
        };
        process_task(&session, fetcher.as_ref(), &matcher, task).await;
    }
}

async fn process_task<F: Fetch>(
    session: &CrawlSession,
    fetcher: &F,
    matcher: &KeywordMatcher,
    task: CrawlTask,
) {
    if is_non_relevant(&task.url) {
        log::debug!("Non-relevant content for keyword extraction, skip it: {}", task.url);
        return;
    }
    if !task.base_url.is_empty() && !starts_with_ignore_ascii_case(&task.url, &task.base_url) {
        log::debug!("URL doesn't match base URL, skip it: {}", task.url);
        return;
    }
    {
        // Check and mark are one critical section; two workers can never
        // both claim the same URL.
        let mut result = lock(&session.result);
        if !result.first_visit(&task.url) {
            log::debug!("Already visited link, skip it: {}", task.url);
            return;
        }
    }

    log::info!("Crawling: {}", task.url);
    let page = match fetcher.fetch(&task.url).await {
        Ok(page) => page,
        Err(e) => {
            log::warn!("    Page could not be fetched, skip it: {} ({e})", task.url);
            return;
        }
    };

    let found = matcher.find_in(&page);
    if !found.is_empty() {
        log::info!(
            "    Keywords found: {}",
            found.iter().cloned().collect::<Vec<_>>().join(", ")
        );
        lock(&session.result).record_page(&task.url, found, &task.origin);
    }

    for link in extract_links(&page, &task.url) {
        if is_non_relevant(&link) {
            continue;
        }
        if lock(&session.result).is_visited(&link) {
            continue;
        }
        if let Some(child) = task.child_for(&link) {
            lock(&session.pool).frontier.push(child);
        }
    }
}
