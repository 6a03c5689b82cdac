use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Compression {
    /// Name used in configuration files; always parses back to `self`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.aliases()[0]
    }

    /// `Content-Encoding` header value. `None` for uncompressed bodies,
    /// which go out without the header instead of with `identity`.
    #[must_use]
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some("gzip"),
        }
    }
}
