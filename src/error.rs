//! Service Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop the service from starting or serving.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration could not be loaded or is invalid.
    #[display("invalid configuration")]
    Config,
    /// The snapshot could not be built.
    #[display("could not bootstrap the repository catalog")]
    Bootstrap,
    /// The HTTP server could not bind or stopped unexpectedly.
    #[display("HTTP server failed")]
    Serve,
    /// A response body could not be encoded.
    #[display("could not encode response")]
    Encode,
}
