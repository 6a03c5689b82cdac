//! GitHub Client Error Types

use derive_more::{Display, Error};

/// A remote fetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure classes for a single API call.
///
/// [`ErrorKind::Status`] keeps the HTTP code so callers can tell rate
/// limiting (`403`, `429`) apart from a missing repository (`404`).
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP client could not be constructed (bad TLS setup, invalid header value).
    #[display("HTTP client configuration error")]
    Client,
    /// The request never produced a response (DNS, connect, reset, timeout).
    #[display("network error")]
    Network,
    /// The API answered with a non-success status.
    #[display("unexpected response status: {_0}")]
    Status(#[error(not(source))] u16),
    /// The response body was not the JSON shape we expected.
    #[display("invalid response body")]
    Decode,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            // Rate limiting and upstream hiccups.
            Self::Status(code) => *code == 403 || *code == 429 || *code >= 500,
            Self::Client | Self::Decode => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Status(404).to_string(), "unexpected response status: 404");
        assert_eq!(ErrorKind::Decode.to_string(), "invalid response body");
    }

    #[rstest]
    #[case(ErrorKind::Network, true)]
    #[case(ErrorKind::Status(502), true)]
    #[case(ErrorKind::Status(429), true)]
    #[case(ErrorKind::Status(404), false)]
    #[case(ErrorKind::Decode, false)]
    #[case(ErrorKind::Client, false)]
    fn error_kind_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }
}
