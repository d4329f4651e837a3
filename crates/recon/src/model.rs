use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Identity key
// ---------------------------------------------------------------------------

/// Canonical join key: trimmed, lower-cased email address.
///
/// The only way to build one is through [`IdentityKey::new`], so every key
/// stored in a mapping or set is already in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim surrounding whitespace and lower-case. Idempotent.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Key -> display label, built from the registration export.
/// Inserting an existing key overwrites its label (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryMapping {
    entries: BTreeMap<IdentityKey, String>,
}

impl RegistryMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous label when `key` was already present.
    pub fn insert(&mut self, key: IdentityKey, label: String) -> Option<String> {
        self.entries.insert(key, label)
    }

    pub fn label(&self, key: &IdentityKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &IdentityKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, L: Into<String>> FromIterator<(K, L)> for RegistryMapping {
    fn from_iter<I: IntoIterator<Item = (K, L)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (key, label) in iter {
            mapping.insert(IdentityKey::new(key.as_ref()), label.into());
        }
        mapping
    }
}

/// Keys known to exist in the comparison target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceKeySet {
    keys: BTreeSet<IdentityKey>,
}

impl ReferenceKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: IdentityKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    pub fn extend_from(&mut self, other: ReferenceKeySet) {
        self.keys.extend(other.keys);
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdentityKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ReferenceKeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(|s| IdentityKey::new(s.as_ref())).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load bookkeeping
// ---------------------------------------------------------------------------

/// Row accounting for a single registry load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Data rows seen (header excluded).
    pub rows_read: usize,
    pub rows_accepted: usize,
    /// Rows too short to carry every configured column.
    pub rows_skipped: usize,
    /// Accepted rows whose key was already present and got overwritten.
    pub duplicate_keys: usize,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingEntry {
    pub key: IdentityKey,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub registry_count: usize,
    pub reference_count: usize,
    pub missing_count: usize,
    /// Sorted ascending by key.
    pub missing: Vec<MissingEntry>,
}
