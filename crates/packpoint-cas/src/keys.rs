//! Store-safe field keys for asset filenames.
//!
//! Keys are derived from the filename alone, so two files that sanitize to
//! the same base are told apart only by a numeric suffix assigned in
//! allocation order. Callers must feed filenames in a reproducible order
//! (the publisher sorts them) for the suffixes to be stable across runs.

use std::collections::HashSet;

use packpoint_types::{ASSET_KEY_PREFIX, MAX_FIELD_KEY_LEN};

/// Sanitize a filename into an asset field key, without uniqueness.
///
/// Every maximal run of characters outside `[A-Za-z0-9]` becomes a single
/// `_`, leading and trailing `_` are trimmed, an empty result becomes
/// `file`, and the result is prefixed with `asset_` and truncated to
/// [`MAX_FIELD_KEY_LEN`] characters.
pub fn sanitize_key(filename: &str) -> String {
    let mut core = String::with_capacity(filename.len());
    let mut in_run = false;
    for c in filename.chars() {
        if c.is_ascii_alphanumeric() {
            core.push(c);
            in_run = false;
        } else if !in_run {
            core.push('_');
            in_run = true;
        }
    }

    let core = core.trim_matches('_');
    let core = if core.is_empty() { "file" } else { core };

    let mut key = format!("{ASSET_KEY_PREFIX}{core}");
    // Only ASCII survives sanitizing, so byte length equals char count.
    key.truncate(MAX_FIELD_KEY_LEN);
    key
}

/// Allocates unique asset keys within one pack.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    used: HashSet<String>,
}

impl KeyAllocator {
    /// Create an allocator with no keys in use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a unique key for `filename` and mark it as used.
    ///
    /// On collision `_2`, `_3`, … is appended. The base is shortened as far
    /// as needed so base plus suffix never exceeds [`MAX_FIELD_KEY_LEN`].
    pub fn allocate(&mut self, filename: &str) -> String {
        let proposed = sanitize_key(filename);
        let mut key = proposed.clone();
        let mut n: u32 = 2;
        while self.used.contains(&key) {
            let suffix = format!("_{n}");
            let base_len = proposed.len().min(MAX_FIELD_KEY_LEN - suffix.len());
            key = format!("{}{suffix}", &proposed[..base_len]);
            n += 1;
        }
        self.used.insert(key.clone());
        key
    }

    /// Whether `key` has already been handed out.
    pub fn contains(&self, key: &str) -> bool {
        self.used.contains(key)
    }

    /// Number of keys handed out so far.
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether no key has been handed out yet.
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
