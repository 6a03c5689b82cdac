//! Remote fetcher trait and implementations.
//!
//! This module defines the `RemoteFetcher` trait, the interface the snapshot
//! bootstrap and the enrichment pipeline use to reach the code-hosting API.

mod github;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::github::{GithubFetcher, GithubOptions};
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockFetcher;
use crate::error::Result;
use crate::models::{Languages, Repository};
use async_trait::async_trait;

/// The search API never returns more results than this for one query.
const MAX_SEARCH_RESULTS: usize = 1000;

/// Unified interface for the code-hosting API.
///
/// Implementations are expected to be cheap to share between tasks; every
/// method takes `&self` and may be called concurrently from many enrichment
/// workers.
///
/// # Examples
///
/// ```
/// use repolang_github::{RemoteFetcher, error::Result};
///
/// async fn total_rust_bytes(fetcher: &dyn RemoteFetcher) -> Result<u64> {
///     let mut total = 0;
///     for repo in fetcher.snapshot(10).await? {
///         let languages = fetcher.languages(&repo.full_name).await?;
///         total += languages.get("Rust").map(|details| details.bytes).unwrap_or(0);
///     }
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Fetch one page (1-based) of repository search results.
    ///
    /// Returned records have their short name derived and no language data.
    /// An empty page means there are no further results.
    async fn search_page(&self, page: u32) -> Result<Vec<Repository>>;

    /// Resolve the language breakdown of a single repository.
    async fn languages(&self, full_name: &str) -> Result<Languages>;

    /// Page through search results until `max` records have been collected
    /// or a page comes back empty.
    ///
    /// The result never holds more than `max` records; any surplus from the
    /// final page is discarded. Any failed page fails the whole snapshot.
    async fn snapshot(&self, max: usize) -> Result<Vec<Repository>> {
        let mut repositories = Vec::with_capacity(max.min(MAX_SEARCH_RESULTS));
        let mut page = 1;
        while repositories.len() < max {
            let items = self.search_page(page).await?;
            tracing::debug!(page, items = items.len(), "Fetched search results page");
            if items.is_empty() {
                break;
            }
            repositories.extend(items);
            page += 1;
        }
        repositories.truncate(max);
        Ok(repositories)
    }
}
