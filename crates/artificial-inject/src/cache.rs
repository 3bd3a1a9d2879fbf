//! Build-scoped cache of compact schema strings, keyed by declared type name.
//!
//! Each name is computed at most once per build: the first writer wins and
//! later lookups read the stored string without calling the producer again.
use std::sync::{Arc, Mutex, PoisonError};

use artificial_core::error::Result;
use indexmap::{IndexMap, map::Entry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCache {
    entries: IndexMap<String, String>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, schema)| (name.as_str(), schema.as_str()))
    }

    /// Return the cached schema for `name`, computing it with `produce` on
    /// the first request. A failing `produce` leaves no entry behind.
    pub fn get_or_try_insert_with<F>(&mut self, name: &str, produce: F) -> Result<&str>
    where
        F: FnOnce() -> Result<String>,
    {
        match self.entries.entry(name.to_owned()) {
            Entry::Occupied(entry) => {
                tracing::debug!(ty = name, "schema cache hit");
                Ok(entry.into_mut().as_str())
            }
            Entry::Vacant(entry) => {
                let schema = produce()?;
                tracing::debug!(ty = name, %schema, "schema cached");
                Ok(entry.insert(schema).as_str())
            }
        }
    }
}

/// [`SchemaCache`] for hosts that analyze source units on several threads.
///
/// The lock is held while a schema is produced, so concurrent requests for
/// the same name wait for the first writer and then read its result.
#[derive(Debug, Clone, Default)]
pub struct SharedSchemaCache {
    inner: Arc<Mutex<SchemaCache>>,
}

impl SharedSchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_try_insert_with<F>(&self, name: &str, produce: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get_or_try_insert_with(name, produce).map(str::to_owned)
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(name).map(str::to_owned)
    }

    /// Copy of the current entries.
    pub fn snapshot(&self) -> SchemaCache {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
