//! Language statistics for a snapshot of popular GitHub repositories.
//!
//! At startup the service fetches the most-starred repositories, resolves
//! each one's language breakdown with a bounded pool of workers, and then
//! serves the frozen result over a small read-only HTTP API ([`api`]).

pub mod api;
pub mod error;
