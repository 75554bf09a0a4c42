//! Read-only lookup caches for the person directory and type labels.
//!
//! Both are owned by the collaborating API; this module only caches the
//! last fetched copy for display-name resolution.

use std::collections::HashMap;

use serde::Deserialize;

/// One entry of the person directory.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonRecord {
    pub id: i64,
    pub name: Option<String>,
}

/// One entry of the type/category-count listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeCount {
    pub key: String,
    pub label: Option<String>,
    pub count: u64,
}

/// Display-name resolution for person ids.
#[derive(Debug, Clone, Default)]
pub struct PersonDirectory {
    names: HashMap<i64, Option<String>>,
}

impl PersonDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<PersonRecord>) -> Self {
        let mut directory = Self::default();
        directory.replace(records);
        directory
    }

    /// Swap in a freshly fetched directory.
    pub fn replace(&mut self, records: Vec<PersonRecord>) {
        self.names = records.into_iter().map(|p| (p.id, p.name)).collect();
    }

    /// Name for display. Unknown ids and null names fall back to `#<id>`.
    pub fn display_name(&self, id: i64) -> String {
        match self.names.get(&id) {
            Some(Some(name)) => name.clone(),
            _ => format!("#{id}"),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Human labels for the `type` facet, keyed by the raw facet value.
#[derive(Debug, Clone, Default)]
pub struct TypeLabels {
    labels: HashMap<String, String>,
}

impl TypeLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, counts: Vec<TypeCount>) {
        self.labels = counts
            .into_iter()
            .filter_map(|t| t.label.map(|label| (t.key, label)))
            .collect();
    }

    /// Label for a type key, falling back to the raw key.
    pub fn label(&self, key: &str) -> String {
        self.labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
