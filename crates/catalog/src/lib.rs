//! Repository catalog: enrichment and queries over the snapshot.
//!
//! The catalog is built once and then only read:
//!
//! 1. **Bootstrap**: the snapshot is fetched through a
//!    [`RemoteFetcher`](repolang_github::RemoteFetcher) and handed to the
//!    enrichment [`Pipeline`], a fixed pool of workers that resolve each
//!    repository's language breakdown through the shared [`LanguageCache`].
//! 2. **Ready**: once every worker has been joined, the enriched records are
//!    published into the [`Store`] and the [`Service`] answers listing and
//!    summary queries against it.
//!
//! There is no way back from ready to bootstrap; a new snapshot means a new
//! [`Service`].

mod cache;
mod enrich;
pub mod error;
pub mod query;
mod service;
mod store;
mod summary;

pub use crate::cache::LanguageCache;
pub use crate::enrich::{EnrichReport, Pipeline};
pub use crate::query::{ListParams, ListQuery};
pub use crate::service::{BootstrapOptions, Service};
pub use crate::store::Store;
pub use crate::summary::{LanguageSummary, summarize};
