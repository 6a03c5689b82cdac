use crate::Compression;
use crate::error::{Error, ErrorKind};
use std::str::FromStr;

/// First two bytes of every gzip member (RFC 1952).
#[cfg(test)]
const GZIP_HEADER: &[u8] = &[0x1F, 0x8B];

/// Accepts the configuration names plus their `Content-Encoding` spellings,
/// ignoring case and surrounding whitespace.
impl FromStr for Compression {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.aliases().contains(&normalized.as_str()))
            .ok_or_else(|| Error::from(ErrorKind::UnsupportedFormat(name.to_string())))
    }
}

impl Compression {
    pub const ALL: [Compression; 2] = [Compression::None, Compression::Gzip];

    pub(crate) fn aliases(&self) -> &'static [&'static str] {
        match self {
            Compression::None => &["none", "identity"],
            Compression::Gzip => &["gzip", "gz", "x-gzip"],
        }
    }

    /// Guess the format of an encoded body from its leading bytes.
    ///
    /// Anything without a gzip header, including input too short to have
    /// one, is treated as uncompressed.
    #[cfg(test)]
    pub(crate) fn sniff(body: &[u8]) -> Self {
        if body.starts_with(GZIP_HEADER) { Compression::Gzip } else { Compression::None }
    }
}
