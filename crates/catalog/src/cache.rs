//! Memoization of per-repository language lookups.

use repolang_github::Languages;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Repository identifier to its resolved language breakdown.
///
/// One lock guards the whole map and is only ever held for a single map
/// operation; remote lookups happen in the caller, outside the lock. Two
/// workers that miss on the same key before either has stored its result
/// will both fetch it, and the later `set` wins. Both results come from a
/// complete lookup, so a record never sees a merge of the two.
///
/// # Examples
///
/// ```
/// use repolang_catalog::LanguageCache;
/// use repolang_github::languages;
///
/// let cache = LanguageCache::default();
/// assert!(cache.get("rust-lang/rust").is_none());
/// cache.set("rust-lang/rust", languages([("Rust", 4096)]));
/// assert_eq!(cache.get("rust-lang/rust").unwrap()["Rust"].bytes, 4096);
/// ```
#[derive(Debug, Default)]
pub struct LanguageCache {
    entries: Mutex<HashMap<String, Languages>>,
}

impl LanguageCache {
    pub fn get(&self, full_name: &str) -> Option<Languages> {
        self.entries().get(full_name).cloned()
    }

    pub fn set(&self, full_name: impl Into<String>, languages: Languages) {
        self.entries().insert(full_name.into(), languages);
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Languages>> {
        // Every critical section is a single map operation, so a panic while
        // holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
