//! Instrument identifiers and canonical instrument sets.

use std::collections::BTreeSet;
use std::fmt;

/// Exchange-qualified equity code, e.g. `PETR4.SA`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for InstrumentId {
    fn from(code: String) -> Self {
        Self(code)
    }
}

/// Sorted, duplicate-free set of instruments.
///
/// Iteration order is canonical, so two sets built from the same codes in any
/// order compare and hash equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentSet(BTreeSet<InstrumentId>);

impl InstrumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: InstrumentId) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: &InstrumentId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentId> {
        self.0.iter()
    }

    /// Comma-joined codes, used in log lines and error messages.
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(InstrumentId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<I: Into<InstrumentId>> FromIterator<I> for InstrumentSet {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a InstrumentSet {
    type Item = &'a InstrumentId;
    type IntoIter = std::collections::btree_set::Iter<'a, InstrumentId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum InstrumentError {
    #[error("empty token in instrument list")]
    EmptyToken,
}

/// Parses a comma-separated instrument list. Codes are trimmed and
/// upper-cased; repeated codes collapse into one entry.
pub fn parse_instruments(input: &str) -> Result<InstrumentSet, InstrumentError> {
    let mut set = InstrumentSet::new();
    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(InstrumentError::EmptyToken);
        }
        set.insert(InstrumentId::new(trimmed.to_uppercase()));
    }
    Ok(set)
}
