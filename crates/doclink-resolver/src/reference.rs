//! `Reference` values and the process-wide pool that interns them (§5
//! "Shared-resource policy"): entries are keyed by `(bundle_id, path,
//! fragment, sorted_source_languages)` behind a single mutex.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// A resolved, user-facing address: the bundle it lives in, its
/// documentation path, an optional fragment, and which source languages it
/// is available under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub bundle_id: String,
    pub path: String,
    pub fragment: Option<String>,
    pub source_languages: Vec<String>,
}

impl Reference {
    fn key(&self) -> ReferenceKey {
        let mut languages = self.source_languages.clone();
        languages.sort();
        ReferenceKey {
            bundle_id: self.bundle_id.clone(),
            path: self.path.clone(),
            fragment: self.fragment.clone(),
            sorted_source_languages: languages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReferenceKey {
    bundle_id: String,
    path: String,
    fragment: Option<String>,
    sorted_source_languages: Vec<String>,
}

#[derive(Debug, Default)]
struct ReferencePoolInner {
    by_key: HashMap<ReferenceKey, Reference>,
}

/// Shared, mutex-guarded intern pool for [`Reference`] values.
///
/// One pool is meant to be shared across an entire documentation build;
/// `resolve` on a [`crate::resolver::Resolver`] interns into a pool it
/// holds a clone of.
#[derive(Debug, Clone, Default)]
pub struct ReferencePool {
    inner: Arc<Mutex<ReferencePoolInner>>,
}

impl ReferencePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `reference`, returning the canonical (possibly pre-existing)
    /// value for its key.
    pub fn intern(&self, reference: Reference) -> Reference {
        let key = reference.key();
        let mut guard = self.inner.lock();
        guard.by_key.entry(key).or_insert(reference).clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every reference belonging to `bundle_id`, mirroring
    /// [`doclink_core::Hierarchy::remove_bundle`]'s lifecycle event.
    pub fn clear_bundle(&self, bundle_id: &str) {
        self.inner
            .lock()
            .by_key
            .retain(|key, _| key.bundle_id != bundle_id);
    }
}
