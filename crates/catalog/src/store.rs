//! The published, enriched repository snapshot.

use repolang_github::Repository;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Ordered, fixed-length collection of enriched repositories.
///
/// The store is only constructed from the output of a completed enrichment
/// run, so readers never observe a record mid-update. Order matches the
/// order of the original search results. All access goes through one
/// coarse lock; it is uncontended apart from concurrent readers.
#[derive(Debug, Default)]
pub struct Store {
    repositories: RwLock<Vec<Repository>>,
}

impl Store {
    pub fn new(repositories: Vec<Repository>) -> Self {
        Self { repositories: RwLock::new(repositories) }
    }

    /// Shared read access to the whole snapshot.
    ///
    /// Hold the guard only for the duration of a scan; clone whatever needs
    /// to outlive it.
    pub async fn read(&self) -> RwLockReadGuard<'_, Vec<Repository>> {
        self.repositories.read().await
    }

    pub async fn len(&self) -> usize {
        self.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.read().await.is_empty()
    }
}
