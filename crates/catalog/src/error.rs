//! Catalog Error Types

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a catalog failure.
///
/// ### Fatal
/// - [`ErrorKind::Snapshot`]: nothing can be served without the snapshot.
/// - [`ErrorKind::Pipeline`]: a worker died or a slot went missing.
///
/// ### Per repository (logged, never propagated out of the pipeline)
/// - [`ErrorKind::Lookup`]
/// - [`ErrorKind::Timeout`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The initial repository listing could not be fetched.
    #[display("could not fetch repository snapshot")]
    Snapshot,
    /// The enrichment worker pool did not complete.
    #[display("enrichment pipeline failed")]
    Pipeline,
    /// A single repository's language lookup failed.
    #[display("language lookup failed")]
    Lookup,
    /// A single repository's language lookup took too long.
    #[display("language lookup timed out")]
    Timeout,
}
