//! Errors raised while encoding or decoding response bodies.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input claimed to be compressed but could not be decoded.
    #[display("body is not valid {_0} data")]
    InvalidData(#[error(not(source))] &'static str),
    /// A configured encoding name that this crate does not implement.
    #[display("unknown compression `{_0}`")]
    UnsupportedFormat(#[error(not(source))] String),
    /// The encoder failed while writing its output.
    #[display("could not write compressed body")]
    Io,
}

impl ErrorKind {
    /// Only encoder failures are transient; bad input or names stay bad.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
