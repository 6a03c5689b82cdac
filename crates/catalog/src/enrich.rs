//! Concurrent enrichment of the snapshot with language statistics.
//!
//! The snapshot is split into slots (position + record) and pushed onto a
//! bounded FIFO queue with room for every slot, so queueing never waits.
//! The queue is then closed and a fixed number of workers drain it. Each
//! slot is taken by exactly one worker, which owns that record outright
//! while it resolves the language breakdown:
//!
//! 1. **Cache hit**: the cached map is written into the record; no remote
//!    call is made.
//! 2. **Cache miss**: the fetcher is called outside any lock. On success the
//!    result is stored in the cache first and then written into the record.
//! 3. **Failure**: logged and absorbed; the record keeps no language data.
//!
//! [`Pipeline::run`] returns only once every worker has been joined, with
//! each record back in its original position.

use crate::cache::LanguageCache;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use repolang_github::{FetcherHandle, Languages, Repository};
use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::instrument;

pub const DEFAULT_WORKERS: usize = 10;

/// Counts of how each record was enriched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichReport {
    /// Records filled from the cache without a remote call.
    pub cache_hits: usize,
    /// Records filled from a fresh remote lookup.
    pub fetched: usize,
    /// Records left without language data.
    pub failed: usize,
}
impl EnrichReport {
    pub fn total(&self) -> usize {
        self.cache_hits + self.fetched + self.failed
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::CacheHit => self.cache_hits += 1,
            Outcome::Fetched => self.fetched += 1,
            Outcome::Failed => self.failed += 1,
        }
    }
}
impl AddAssign for EnrichReport {
    fn add_assign(&mut self, other: Self) {
        self.cache_hits += other.cache_hits;
        self.fetched += other.fetched;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    CacheHit,
    Fetched,
    Failed,
}

/// A record and the position it must return to.
struct Slot {
    index: usize,
    repository: Repository,
}

type Queue = Arc<Mutex<mpsc::Receiver<Slot>>>;

#[derive(Default)]
struct WorkerOutput {
    slots: Vec<Slot>,
    report: EnrichReport,
}

/// Fixed-size worker pool that attaches language data to every record.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: FetcherHandle,
    cache: Arc<LanguageCache>,
    workers: usize,
    timeout: Option<Duration>,
}

impl Pipeline {
    /// Create a pipeline with `workers` concurrent workers (at least one).
    pub fn new(fetcher: FetcherHandle, cache: Arc<LanguageCache>, workers: usize) -> Self {
        Self {
            fetcher,
            cache,
            workers: workers.max(1),
            timeout: None,
        }
    }

    /// Give up on any single lookup after `timeout`, treating it as failed.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Enrich every record, returning them in their original order.
    ///
    /// Per-record failures never fail the run; they are logged and counted
    /// in the report. An error is returned only if a worker task dies.
    #[instrument(skip_all, fields(repositories = repositories.len(), workers = self.workers))]
    pub async fn run(&self, repositories: Vec<Repository>) -> Result<(Vec<Repository>, EnrichReport)> {
        let total = repositories.len();
        let (sender, receiver) = mpsc::channel(total.max(1));
        for (index, repository) in repositories.into_iter().enumerate() {
            if sender.try_send(Slot { index, repository }).is_err() {
                // Unreachable while capacity matches the number of slots.
                exn::bail!(ErrorKind::Pipeline);
            }
        }
        drop(sender);

        let queue: Queue = Arc::new(Mutex::new(receiver));
        let mut workers = JoinSet::new();
        for id in 0..self.workers {
            workers.spawn(self.clone().work(id, Arc::clone(&queue)));
        }

        let mut positions: Vec<Option<Repository>> = (0..total).map(|_| None).collect();
        let mut report = EnrichReport::default();
        while let Some(joined) = workers.join_next().await {
            let output = joined.or_raise(|| ErrorKind::Pipeline)?;
            report += output.report;
            for Slot { index, repository } in output.slots {
                positions[index] = Some(repository);
            }
        }
        let repositories = positions.into_iter().collect::<Option<Vec<_>>>().ok_or_raise(|| ErrorKind::Pipeline)?;
        Ok((repositories, report))
    }

    async fn work(self, id: usize, queue: Queue) -> WorkerOutput {
        let mut output = WorkerOutput::default();
        loop {
            // The sender is gone before any worker starts, so this never
            // parks while holding the lock.
            let Some(mut slot) = queue.lock().await.recv().await else {
                break;
            };
            let outcome = self.enrich(&mut slot.repository).await;
            tracing::debug!(worker = id, repository = %slot.repository.full_name, ?outcome, "Enriched repository");
            output.report.record(outcome);
            output.slots.push(slot);
        }
        output
    }

    async fn enrich(&self, repository: &mut Repository) -> Outcome {
        if let Some(cached) = self.cache.get(&repository.full_name) {
            repository.languages = Some(cached);
            return Outcome::CacheHit;
        }
        match self.lookup(&repository.full_name).await {
            Ok(languages) => {
                self.cache.set(repository.full_name.clone(), languages.clone());
                repository.languages = Some(languages);
                Outcome::Fetched
            },
            Err(err) => {
                tracing::warn!(repository = %repository.full_name, error = ?err, "Could not fetch languages; leaving language data empty");
                Outcome::Failed
            },
        }
    }

    async fn lookup(&self, full_name: &str) -> Result<Languages> {
        let request = self.fetcher.languages(full_name);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.or_raise(|| ErrorKind::Timeout)?,
            None => request.await,
        };
        response.or_raise(|| ErrorKind::Lookup)
    }
}
