//! In-memory remote fetcher for testing.

use crate::RemoteFetcher;
use crate::error::{ErrorKind, Result};
use crate::models::{Languages, Repository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory remote fetcher for testing.
///
/// Search pages and language maps are configured up front; every call is
/// counted so tests can assert how often the "network" was hit. Language
/// lookups for repositories that were never configured fail with a `404`
/// status, as the real API would.
#[derive(Default)]
pub struct MockFetcher {
    pages: Vec<Vec<Repository>>,
    languages: HashMap<String, Languages>,
    failing: HashMap<String, ErrorKind>,
    fail_search: bool,
    search_calls: AtomicUsize,
    language_calls: Mutex<HashMap<String, usize>>,
}

impl MockFetcher {
    /// Append a search results page. Pages are served in insertion order
    /// starting at page 1; any page past the last one is empty.
    pub fn with_page(mut self, page: Vec<Repository>) -> Self {
        self.pages.push(page);
        self
    }

    pub fn with_languages(mut self, full_name: impl Into<String>, languages: Languages) -> Self {
        self.languages.insert(full_name.into(), languages);
        self
    }

    /// Make language lookups for `full_name` fail with `kind`.
    pub fn with_failure(mut self, full_name: impl Into<String>, kind: ErrorKind) -> Self {
        self.failing.insert(full_name.into(), kind);
        self
    }

    /// Make every search call fail with a network error.
    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of language lookups issued for `full_name`.
    pub fn language_calls(&self, full_name: &str) -> usize {
        self.calls().get(full_name).copied().unwrap_or(0)
    }

    /// Number of language lookups issued across all repositories.
    pub fn total_language_calls(&self) -> usize {
        self.calls().values().sum()
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        // A panicking test thread must not hide the counts from the others.
        self.language_calls.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl RemoteFetcher for MockFetcher {
    async fn search_page(&self, page: u32) -> Result<Vec<Repository>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            exn::bail!(ErrorKind::Network);
        }
        let index = page.checked_sub(1).and_then(|i| usize::try_from(i).ok());
        Ok(index.and_then(|i| self.pages.get(i)).cloned().unwrap_or_default())
    }

    async fn languages(&self, full_name: &str) -> Result<Languages> {
        *self.calls().entry(full_name.to_string()).or_insert(0) += 1;
        if let Some(kind) = self.failing.get(full_name) {
            exn::bail!(kind.clone());
        }
        self.languages.get(full_name).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::Status(404)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::languages;

    #[tokio::test]
    async fn test_pages_are_one_based() {
        let fetcher = MockFetcher::default().with_page(vec![Repository::new("a/b")]);
        assert!(fetcher.search_page(0).await.unwrap().is_empty());
        assert_eq!(fetcher.search_page(1).await.unwrap().len(), 1);
        assert!(fetcher.search_page(2).await.unwrap().is_empty());
        assert_eq!(fetcher.search_calls(), 3);
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let fetcher = MockFetcher::default()
            .with_languages("a/b", languages([("Go", 1)]))
            .with_failure("a/b", ErrorKind::Decode);
        let err = fetcher.languages("a/b").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_unknown_repository_is_not_found() {
        let fetcher = MockFetcher::default();
        let err = fetcher.languages("nobody/nothing").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Status(404));
        assert_eq!(fetcher.language_calls("nobody/nothing"), 1);
    }

    #[tokio::test]
    async fn test_call_counts() {
        let fetcher = MockFetcher::default().with_languages("a/b", languages([("Go", 1)]));
        fetcher.languages("a/b").await.unwrap();
        fetcher.languages("a/b").await.unwrap();
        _ = fetcher.languages("a/c").await;
        assert_eq!(fetcher.language_calls("a/b"), 2);
        assert_eq!(fetcher.total_language_calls(), 3);
    }
}
