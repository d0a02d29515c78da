//! Out-of-band storage for diagnostics and annotations keyed by green identity.
//!
//! Entries are removed when the owning green node or token is dropped, so a
//! table never keeps a tree alive and never outlives its key.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use razor_errors::Diagnostic;
use rustc_hash::FxHashMap;

use crate::Annotation;

pub(crate) static DIAGNOSTICS: Lazy<SideTable<Diagnostic>> = Lazy::new(SideTable::default);
pub(crate) static ANNOTATIONS: Lazy<SideTable<Annotation>> = Lazy::new(SideTable::default);

pub(crate) struct SideTable<T> {
    entries: RwLock<FxHashMap<usize, Arc<[T]>>>,
}

impl<T> Default for SideTable<T> {
    fn default() -> Self {
        Self { entries: RwLock::new(FxHashMap::default()) }
    }
}

impl<T> SideTable<T> {
    pub(crate) fn get(&self, key: usize) -> Option<Arc<[T]>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&key).cloned()
    }

    pub(crate) fn insert(&self, key: usize, values: Arc<[T]>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, values);
    }

    pub(crate) fn remove(&self, key: usize) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&key);
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: usize) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&key)
    }
}
