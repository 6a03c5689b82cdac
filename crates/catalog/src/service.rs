use crate::cache::LanguageCache;
use crate::enrich::{DEFAULT_WORKERS, EnrichReport, Pipeline};
use crate::error::{ErrorKind, Result};
use crate::query::{self, ListQuery};
use crate::store::Store;
use crate::summary::{self, LanguageSummary};
use exn::ResultExt;
use repolang_github::{FetcherHandle, Repository};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// How the initial snapshot is collected and enriched.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub max_repositories: usize,
    pub workers: usize,
    /// Per-lookup timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}
impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            max_repositories: 100,
            workers: DEFAULT_WORKERS,
            timeout: None,
        }
    }
}

/// Read-only query surface over an enriched snapshot.
#[derive(Debug)]
pub struct Service {
    store: Store,
    cache: Arc<LanguageCache>,
    report: EnrichReport,
}

impl Service {
    /// Fetch the snapshot, enrich it, and publish the result.
    ///
    /// Fails if the snapshot cannot be fetched. Individual enrichment
    /// failures do not fail the bootstrap.
    #[instrument(skip(fetcher))]
    pub async fn bootstrap(fetcher: FetcherHandle, options: &BootstrapOptions) -> Result<Self> {
        let snapshot = fetcher.snapshot(options.max_repositories).await.or_raise(|| ErrorKind::Snapshot)?;
        tracing::info!(repositories = snapshot.len(), "Fetched repository snapshot");

        let cache = Arc::new(LanguageCache::default());
        let pipeline = Pipeline::new(fetcher, Arc::clone(&cache), options.workers).with_timeout(options.timeout);
        let (repositories, report) = pipeline.run(snapshot).await?;
        tracing::info!(
            cache_hits = report.cache_hits,
            fetched = report.fetched,
            failed = report.failed,
            cached = cache.len(),
            "Enriched repository snapshot"
        );
        Ok(Self { store: Store::new(repositories), cache, report })
    }

    /// Serve an already-enriched set of repositories as-is.
    pub fn from_repositories(repositories: Vec<Repository>) -> Self {
        Self {
            store: Store::new(repositories),
            cache: Arc::new(LanguageCache::default()),
            report: EnrichReport::default(),
        }
    }

    /// Filtered, paginated copy of the snapshot.
    pub async fn list(&self, query: &ListQuery) -> Vec<Repository> {
        query::list(self.store.read().await.iter(), query)
    }

    pub async fn summary(&self) -> LanguageSummary {
        summary::summarize(self.store.read().await.iter())
    }

    pub fn report(&self) -> EnrichReport {
        self.report
    }

    pub fn cache(&self) -> &LanguageCache {
        &self.cache
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolang_github::error::ErrorKind as FetchErrorKind;
    use repolang_github::{MockFetcher, languages};

    fn fetcher() -> MockFetcher {
        MockFetcher::default()
            .with_page(vec![Repository::new("x/a").with_license("MIT"), Repository::new("x/b")])
            .with_page(vec![Repository::new("x/c"), Repository::new("x/d")])
            .with_languages("x/a", languages([("Go", 100), ("Rust", 50)]))
            .with_languages("x/b", languages([("Go", 200)]))
            .with_languages("x/c", languages([("C", 10)]))
            .with_failure("x/d", FetchErrorKind::Network)
    }

    fn options(max_repositories: usize) -> BootstrapOptions {
        BootstrapOptions { max_repositories, workers: 3, ..BootstrapOptions::default() }
    }

    #[tokio::test]
    async fn test_bootstrap() {
        let fetcher = Arc::new(fetcher());
        let service = Service::bootstrap(fetcher.clone(), &options(100)).await.unwrap();

        assert_eq!(service.len().await, 4);
        assert_eq!(service.report(), EnrichReport { cache_hits: 0, fetched: 3, failed: 1 });
        assert_eq!(service.cache().len(), 3);
        assert_eq!(fetcher.total_language_calls(), 4);

        let all = service.list(&ListQuery::default()).await;
        let names: Vec<_> = all.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, ["x/a", "x/b", "x/c", "x/d"]);
        assert!(all[3].languages.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_respects_max_repositories() {
        let fetcher = Arc::new(fetcher());
        let service = Service::bootstrap(fetcher.clone(), &options(3)).await.unwrap();
        assert_eq!(service.len().await, 3);
        assert_eq!(fetcher.language_calls("x/d"), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_fails_without_snapshot() {
        let fetcher = Arc::new(fetcher().failing_search());
        let err = Service::bootstrap(fetcher, &options(100)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Snapshot);
    }

    #[tokio::test]
    async fn test_queries() {
        let service = Service::bootstrap(Arc::new(fetcher()), &options(100)).await.unwrap();

        let query = ListQuery { language: Some("Go".to_string()), min_bytes: 150, ..ListQuery::default() };
        let found = service.list(&query).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "x/b");

        let summary = service.summary().await;
        assert_eq!(summary.language_summary["Go"], 300);
        assert_eq!(summary.total_repositories_per_language["C"], 1);
        assert_eq!(summary.total_bytes(), 360);
    }

    #[tokio::test]
    async fn test_repeated_queries_are_identical() {
        let service = Service::bootstrap(Arc::new(fetcher()), &options(100)).await.unwrap();
        let query = ListQuery { page: 2, per_page: 2, ..ListQuery::default() };
        assert_eq!(service.list(&query).await, service.list(&query).await);
        assert_eq!(service.summary().await, service.summary().await);
    }

    #[tokio::test]
    async fn test_from_repositories() {
        let service = Service::from_repositories(Vec::new());
        assert!(service.is_empty().await);
        assert!(service.list(&ListQuery::default()).await.is_empty());
        assert_eq!(service.summary().await, LanguageSummary::default());
    }
}
