//! Remote collaborator for the repolang service.
//!
//! The [`RemoteFetcher`] trait is the only way the rest of the workspace
//! talks to the code-hosting API: one call pages through search results to
//! build the initial snapshot, the other resolves a single repository's
//! language breakdown. [`GithubFetcher`] implements it over the GitHub REST
//! API; `MockFetcher` (behind the `mock` feature) implements it in memory for
//! tests.

pub mod error;
pub mod fetcher;
mod models;

#[cfg(any(test, feature = "mock"))]
pub use crate::fetcher::MockFetcher;
pub use crate::fetcher::{GithubFetcher, GithubOptions, RemoteFetcher};
pub use crate::models::{LanguageDetails, Languages, License, Owner, Repository, languages};
use std::sync::Arc;

pub type FetcherHandle = Arc<dyn RemoteFetcher + Send + Sync>;
