use crate::error::{EditsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SCHEMA_VERSION: u32 = 1;

/// Separator between email and name in a contributor key.
pub const KEY_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub email: String,
    pub name: String,
}

impl Contributor {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }

    /// Same email with a different name spelling yields a different key.
    pub fn key(&self) -> String {
        format!("{}{}{}", self.email, KEY_SEPARATOR, self.name)
    }
}

/// Lines added plus lines deleted, keyed by contributor key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditCounts {
    counts: HashMap<String, u64>,
}

impl EditCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to `key`, starting new keys at zero.
    pub fn add(&mut self, key: &str, delta: u64) -> Result<()> {
        let total = checked_total(self.get(key).unwrap_or(0), delta, key)?;
        self.counts.insert(key.to_string(), total);
        Ok(())
    }

    pub fn merge(&mut self, other: EditCounts) -> Result<()> {
        for (key, delta) in other.counts {
            let total = checked_total(self.get(&key).unwrap_or(0), delta, &key)?;
            self.counts.insert(key, total);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn checked_total(total: u64, delta: u64, key: &str) -> Result<u64> {
    total
        .checked_add(delta)
        .ok_or_else(|| EditsError::Parse(format!("edit count for {key} overflows u64")))
}

/// Passed verbatim to `git log --since` / `--until`, so anything git's date
/// parser accepts works ("2024-01-01", "2 weeks ago", ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: String,
    pub until: String,
}

impl TimeWindow {
    pub fn new(since: impl Into<String>, until: impl Into<String>) -> Self {
        Self {
            since: since.into(),
            until: until.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorEdits {
    pub contributor: String,
    pub edits: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: String,
    pub until: String,
    pub branches: Vec<String>,
    pub entries: Vec<ContributorEdits>,
}
