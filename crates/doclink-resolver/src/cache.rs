//! Per-parent resolution cache (§5): the resolver reads the hierarchy
//! without locking after build, but writes its memoized lookups into this
//! mutex-serialized cache. Cleared wholesale when a bundle is unregistered.

use std::collections::HashMap;

use doclink_core::Identifier;
use parking_lot::Mutex;

use crate::error::ResolutionError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    parent: Option<Identifier>,
    raw_path: String,
    only_symbols: bool,
}

type CachedResult = Result<Identifier, ResolutionError>;

/// Memoizes `resolve(raw_path, parent, only_symbols)` outcomes.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: Mutex<HashMap<CacheKey, CachedResult>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        parent: Option<Identifier>,
        raw_path: &str,
        only_symbols: bool,
    ) -> Option<CachedResult> {
        let key = CacheKey {
            parent,
            raw_path: raw_path.to_string(),
            only_symbols,
        };
        self.entries.lock().get(&key).cloned()
    }

    pub fn insert(
        &self,
        parent: Option<Identifier>,
        raw_path: &str,
        only_symbols: bool,
        result: CachedResult,
    ) {
        let key = CacheKey {
            parent,
            raw_path: raw_path.to_string(),
            only_symbols,
        };
        self.entries.lock().insert(key, result);
    }

    /// Clear every memoized result. Called when a bundle is unregistered,
    /// since a bundle's removal can change what any parent resolves to.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let cache = ResolutionCache::new();
        assert!(cache.get(None, "M/S", true).is_none());
        cache.insert(None, "M/S", true, Err(ResolutionError::NotFound {
            payload: Default::default(),
            available_top_level_names: vec![],
        }));
        assert!(cache.get(None, "M/S", true).is_some());
    }

    #[test]
    fn clear_drops_all_entries() {
        let cache = ResolutionCache::new();
        cache.insert(None, "M/S", true, Err(ResolutionError::NotFound {
            payload: Default::default(),
            available_top_level_names: vec![],
        }));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn distinct_only_symbols_flag_is_a_distinct_key() {
        let cache = ResolutionCache::new();
        cache.insert(None, "M/S", true, Err(ResolutionError::NotFound {
            payload: Default::default(),
            available_top_level_names: vec![],
        }));
        assert!(cache.get(None, "M/S", false).is_none());
    }
}
