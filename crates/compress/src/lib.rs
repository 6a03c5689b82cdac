//! Response body encodings for the repolang HTTP API.
//!
//! [`Compression`] names the encoding applied to every JSON body: it parses
//! from configuration, supplies the `Content-Encoding` header value and
//! encodes bodies in memory with [`flate2`]. Gzip is what clients get by
//! default; `none` leaves bodies readable with plain tools while debugging.

mod construct;
pub mod error;
mod ops;
mod util;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Sent as-is (`identity`).
    None,
    #[default]
    Gzip,
}
