use crate::Compression;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};
use tracing::instrument;

impl Compression {
    /// Encode a complete response body.
    ///
    /// ```
    /// use repolang_compress::Compression;
    ///
    /// let body = Compression::Gzip.compress(br#"{"repositories":[]}"#).unwrap();
    /// assert_eq!(Compression::Gzip.decompress(&body).unwrap(), br#"{"repositories":[]}"#);
    /// ```
    #[instrument(level = "trace", skip_all, fields(format = %self, plain = input.len(), encoded))]
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let encoded = match self {
            Compression::None => input.to_vec(),
            Compression::Gzip => {
                // Bodies are encoded per request; the fastest level keeps latency flat.
                let mut encoder = GzEncoder::new(Vec::with_capacity(input.len() / 4), flate2::Compression::fast());
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?
            },
        };
        tracing::Span::current().record("encoded", encoded.len());
        Ok(encoded)
    }

    /// Decode a complete body produced by [`compress`](Self::compress).
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(input.to_vec()),
            Compression::Gzip => {
                let mut plain = Vec::new();
                GzDecoder::new(input).read_to_end(&mut plain).or_raise(|| ErrorKind::InvalidData("gzip"))?;
                Ok(plain)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use crate::error::ErrorKind;

    const BODY: &[u8] = br#"{"repositories":[{"full_name":"rust-lang/rust","languages":{"Rust":{"bytes":1}}}]}"#;

    #[test]
    fn test_gzip_is_readable_back() {
        let encoded = Compression::Gzip.compress(BODY).unwrap();
        assert_ne!(encoded, BODY);
        assert_eq!(Compression::Gzip.decompress(&encoded).unwrap(), BODY);
    }

    #[test]
    fn test_none_is_passthrough() {
        assert_eq!(Compression::None.compress(BODY).unwrap(), BODY);
        assert_eq!(Compression::None.decompress(BODY).unwrap(), BODY);
    }

    #[test]
    fn test_empty_body_still_has_header() {
        let encoded = Compression::Gzip.compress(b"").unwrap();
        assert_eq!(Compression::sniff(&encoded), Compression::Gzip);
        assert!(Compression::Gzip.decompress(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = Compression::Gzip.decompress(b"plainly not gzip").unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("gzip"));
    }
}
