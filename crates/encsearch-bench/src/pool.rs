//! Seed-data sampling for test values.
//!
//! Benchmark queries should hit real data, so search values are harvested
//! from records the gateway itself returns during a bootstrap search. A pool
//! at least as large as the iteration count is cycled deterministically so
//! every value gets used; a smaller pool is sampled at random.

use rand::Rng;

use encsearch_core::{CustomerRecord, MAX_LIMIT};

/// Category used for the bootstrap search. Present in every seed dataset.
pub const BOOTSTRAP_CATEGORY: &str = "retail";

/// Category values known to exist in the seed data.
pub const SEED_CATEGORIES: [&str; 5] = ["retail", "finance", "healthcare", "technology", "education"];

/// Status values known to exist in the seed data.
pub const SEED_STATUSES: [&str; 4] = ["active", "inactive", "pending", "suspended"];

const MIN_BOOTSTRAP: usize = 200;

/// Identifies one value pool inside [`SamplePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKey {
    Names,
    Emails,
    Phones,
    Categories,
    Statuses,
    EmailPrefixes,
    NameSubstrings,
}

/// Harvested search values, one list per searchable shape.
#[derive(Debug, Default)]
pub struct SamplePool {
    names: Vec<String>,
    emails: Vec<String>,
    phones: Vec<String>,
    categories: Vec<String>,
    statuses: Vec<String>,
    email_prefixes: Vec<String>,
    name_substrings: Vec<String>,
}

impl SamplePool {
    /// How many records the bootstrap search should request so that cycling
    /// covers the iteration count.
    pub fn bootstrap_limit(iterations: usize) -> usize {
        (iterations * 2).max(MIN_BOOTSTRAP).min(MAX_LIMIT)
    }

    /// Build the pool from bootstrap records. Category and status values are
    /// not carried on the canonical record, so those pools come from the
    /// known seed sets.
    pub fn from_records(records: &[CustomerRecord]) -> Self {
        let mut names = Vec::new();
        let mut emails = Vec::new();
        let mut phones = Vec::new();
        let mut email_prefixes = Vec::new();
        let mut name_substrings = Vec::new();

        for record in records {
            if !record.full_name.is_empty() {
                names.push(record.full_name.clone());
                if let Some(sub) = name_substring(&record.full_name) {
                    name_substrings.push(sub);
                }
            }
            if !record.email.is_empty() {
                emails.push(record.email.clone());
                if let Some(prefix) = email_prefix(&record.email) {
                    email_prefixes.push(prefix);
                }
            }
            if !record.phone.is_empty() {
                phones.push(record.phone.clone());
            }
        }

        Self {
            names,
            emails,
            phones,
            categories: SEED_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            statuses: SEED_STATUSES.iter().map(|s| s.to_string()).collect(),
            email_prefixes,
            name_substrings,
        }
    }

    pub fn values(&self, key: PoolKey) -> &[String] {
        match key {
            PoolKey::Names => &self.names,
            PoolKey::Emails => &self.emails,
            PoolKey::Phones => &self.phones,
            PoolKey::Categories => &self.categories,
            PoolKey::Statuses => &self.statuses,
            PoolKey::EmailPrefixes => &self.email_prefixes,
            PoolKey::NameSubstrings => &self.name_substrings,
        }
    }

    /// Pick a value for one iteration. Cycles when the pool covers the
    /// iteration count, samples at random otherwise. `None` when the pool
    /// for this key is empty.
    pub fn value_for(&self, key: PoolKey, iteration: usize, iterations: usize) -> Option<&str> {
        let values = self.values(key);
        if values.is_empty() {
            return None;
        }
        let index = if values.len() >= iterations {
            iteration % values.len()
        } else {
            rand::thread_rng().gen_range(0..values.len())
        };
        Some(&values[index])
    }

    /// Number of records the name/email pools were harvested from.
    pub fn record_count(&self) -> usize {
        self.names.len().max(self.emails.len())
    }
}

/// First four characters of the local part, the shape the prefix operator
/// indexes. Local parts shorter than the operator minimum are skipped.
fn email_prefix(email: &str) -> Option<String> {
    let local = email.split('@').next()?;
    let prefix: String = local.chars().take(4).collect();
    (prefix.chars().count() >= 3).then_some(prefix)
}

/// First name token, clamped to the substring operator maximum.
fn name_substring(name: &str) -> Option<String> {
    let token = name.split_whitespace().next()?;
    let sub: String = token.chars().take(10).collect();
    (sub.chars().count() >= 2).then_some(sub)
}
