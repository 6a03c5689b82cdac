//! Repository models.
//!
//! These types are both the decoded form of the GitHub search API and the
//! serialized form served by the repolang HTTP API, so their field names
//! follow the wire format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language name to byte count, as reported for a single repository.
pub type Languages = BTreeMap<String, LanguageDetails>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDetails {
    pub bytes: u64,
}
impl From<u64> for LanguageDetails {
    fn from(bytes: u64) -> Self {
        Self { bytes }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
}

/// A single repository in the snapshot.
///
/// Created when the snapshot is fetched, with `languages` left as `None`
/// until enrichment resolves it. A failed lookup leaves it `None` for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`, unique across the snapshot.
    pub full_name: String,
    pub owner: Owner,
    /// Short name, derived from `full_name`.
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub languages: Option<Languages>,
    pub license: Option<License>,
}
impl Repository {
    /// Create a repository record, deriving the owner and short name from
    /// `full_name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use repolang_github::Repository;
    ///
    /// let repo = Repository::new("rust-lang/rust");
    /// assert_eq!(repo.owner.login, "rust-lang");
    /// assert_eq!(repo.repository, "rust");
    /// assert!(repo.languages.is_none());
    /// ```
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let login = full_name.split('/').next().unwrap_or_default().to_string();
        let mut repo = Self {
            full_name,
            owner: Owner { login },
            repository: String::new(),
            languages: None,
            license: None,
        };
        repo.derive_short_name();
        repo
    }

    pub fn with_license(mut self, name: impl Into<String>) -> Self {
        self.license = Some(License { name: name.into() });
        self
    }

    pub fn with_languages(mut self, languages: Languages) -> Self {
        self.languages = Some(languages);
        self
    }

    /// Fill in the short name from `full_name`.
    ///
    /// Identifiers that do not split into exactly two parts on `/` keep
    /// whatever short name they already had.
    pub fn derive_short_name(&mut self) {
        let mut parts = self.full_name.split('/');
        if let (Some(_), Some(name), None) = (parts.next(), parts.next(), parts.next()) {
            self.repository = name.to_string();
        }
    }

    /// Bytes recorded for `language`, or `None` if the repository has no
    /// language data or does not use it.
    pub fn bytes_for(&self, language: &str) -> Option<u64> {
        self.languages.as_ref()?.get(language).map(|details| details.bytes)
    }

    pub fn license_name(&self) -> Option<&str> {
        self.license.as_ref().map(|license| license.name.as_str())
    }
}

/// Body of `GET /search/repositories`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<Repository>,
}

/// Build a [`Languages`] map from `(name, bytes)` pairs.
///
/// # Examples
///
/// ```
/// use repolang_github::languages;
///
/// let map = languages([("Rust", 1024), ("Shell", 12)]);
/// assert_eq!(map["Rust"].bytes, 1024);
/// ```
pub fn languages<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Languages {
    pairs.into_iter().map(|(name, bytes)| (name.into(), LanguageDetails::from(bytes))).collect()
}
