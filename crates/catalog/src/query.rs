//! Filtering and pagination of the enriched snapshot.

use repolang_github::Repository;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PER_PAGE: usize = 10;

/// Raw query-string parameters, exactly as received.
///
/// Everything is kept as text so that malformed values fall back to their
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub language: Option<String>,
    pub license: Option<String>,
    pub min_bytes: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Collect decoded `key=value` pairs. The first occurrence of a key wins;
/// repeats and unknown keys are ignored.
impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ListParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "language" => &mut params.language,
                "license" => &mut params.license,
                "min_bytes" => &mut params.min_bytes,
                "page" => &mut params.page,
                "per_page" => &mut params.per_page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}

/// A normalized listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Keep only repositories reporting this language (exact, case-sensitive).
    pub language: Option<String>,
    /// Keep only repositories whose license name equals this (exact).
    pub license: Option<String>,
    /// Minimum byte count for `language`; `0` disables the threshold.
    pub min_bytes: u64,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
}
impl Default for ListQuery {
    fn default() -> Self {
        Self {
            language: None,
            license: None,
            min_bytes: 0,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListQuery {
    /// Normalize raw parameters.
    ///
    /// | Parameter | Accepted | Otherwise |
    /// |-----------|----------|-----------|
    /// | `language`, `license` | any non-empty text | no filter |
    /// | `min_bytes` | leading decimal digits (`"500abc"` is `500`) | `0` |
    /// | `page`, `per_page` | a whole number greater than zero | `1` / `10` |
    pub fn from_params(params: ListParams) -> Self {
        Self {
            language: params.language.filter(|value| !value.is_empty()),
            license: params.license.filter(|value| !value.is_empty()),
            min_bytes: params.min_bytes.as_deref().map(leading_integer).unwrap_or(0),
            page: params.page.as_deref().and_then(positive).unwrap_or(DEFAULT_PAGE),
            per_page: params.per_page.as_deref().and_then(positive).unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    /// Whether `repository` passes every active filter.
    ///
    /// The byte threshold only applies together with a language filter.
    pub fn matches(&self, repository: &Repository) -> bool {
        if let Some(language) = &self.language {
            match repository.bytes_for(language) {
                None => return false,
                Some(bytes) if self.min_bytes > 0 && bytes < self.min_bytes => return false,
                Some(_) => {},
            }
        }
        if let Some(license) = &self.license
            && repository.license_name() != Some(license.as_str())
        {
            return false;
        }
        true
    }

    /// Index of the first record on the requested page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// Filter then paginate, preserving snapshot order.
pub fn list<'a, I>(repositories: I, query: &ListQuery) -> Vec<Repository>
where
    I: IntoIterator<Item = &'a Repository>,
{
    repositories
        .into_iter()
        .filter(|repo| query.matches(repo))
        .skip(query.offset())
        .take(query.per_page)
        .cloned()
        .collect()
}

fn positive(value: &str) -> Option<usize> {
    value.parse().ok().filter(|n| *n > 0)
}

/// Parse the leading run of ASCII digits, ignoring anything after it.
///
/// Leading whitespace and a `+` sign are tolerated. Negative, missing or
/// overflowing values give `0`.
fn leading_integer(value: &str) -> u64 {
    let value = value.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let end = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    value[..end].parse().unwrap_or(0)
}
