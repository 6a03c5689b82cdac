//! Per-language aggregation across the snapshot.

use repolang_github::Repository;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate language statistics.
///
/// The maps are keyed by every language reported by at least one enriched
/// repository; `language_percentage` is left empty when the byte total is
/// zero. Keys are sorted so the serialized form is stable between calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LanguageSummary {
    /// Total bytes per language.
    pub language_summary: BTreeMap<String, u64>,
    /// Share of all bytes per language, in percent (0 to 100).
    pub language_percentage: BTreeMap<String, f64>,
    /// Number of repositories reporting each language.
    pub total_repositories_per_language: BTreeMap<String, usize>,
}

impl LanguageSummary {
    /// Sum of bytes over every language.
    pub fn total_bytes(&self) -> u64 {
        self.language_summary.values().fold(0, |total, bytes| total.saturating_add(*bytes))
    }
}

/// Aggregate every repository's language data. Repositories without
/// language data contribute nothing.
pub fn summarize<'a, I>(repositories: I) -> LanguageSummary
where
    I: IntoIterator<Item = &'a Repository>,
{
    let mut summary = LanguageSummary::default();
    for languages in repositories.into_iter().filter_map(|repo| repo.languages.as_ref()) {
        for (name, details) in languages {
            let bytes = summary.language_summary.entry(name.clone()).or_default();
            *bytes = bytes.saturating_add(details.bytes);
            *summary.total_repositories_per_language.entry(name.clone()).or_default() += 1;
        }
    }

    // Nothing to divide by when every language reports zero bytes.
    let total = summary.total_bytes();
    if total > 0 {
        summary.language_percentage = summary
            .language_summary
            .iter()
            .map(|(name, bytes)| (name.clone(), *bytes as f64 / total as f64 * 100.0))
            .collect();
    }
    summary
}
