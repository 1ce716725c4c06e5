//! Render-result cache shared across parsing runs.
//!
//! The cache maps a span's text and mode to a previously computed
//! outcome. It lives for the process (or as long as the host keeps
//! its renderer) and never evicts: for workloads that re-render a
//! bounded, repeating corpus this trades memory for never invoking
//! the engine twice on the same input.

use std::sync::Arc;

use dashmap::DashMap;

use crate::engine::Mode;
use crate::render::RenderError;

/// Keys own their bytes: the source buffer they were scanned from is
/// gone long before the cache is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    tex: Vec<u8>,
    mode: Mode,
}

/// A cached render outcome.
///
/// Failures are first-class values here: caching a `(output, error)`
/// pair means repeated identical failing input skips the engine just
/// like repeated succeeding input does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub output: Vec<u8>,
    pub error: Option<RenderError>,
}

/// Concurrent map from `(tex, mode)` to render outcomes.
///
/// Safe for simultaneous `load`/`store` from independent parsing
/// runs; on a key collision the last store wins, which is harmless
/// because renders for an identical key are identical in content.
/// A disabled cache always misses and drops stores, for callers that
/// do not want unbounded growth.
#[derive(Debug)]
pub struct RenderCache {
    map: Option<DashMap<CacheKey, Arc<CacheEntry>>>,
}

impl RenderCache {
    pub fn new() -> RenderCache {
        RenderCache {
            map: Some(DashMap::new()),
        }
    }

    /// A cache that never hits and never stores.
    pub fn disabled() -> RenderCache {
        RenderCache { map: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.map.is_some()
    }

    /// Number of cached outcomes. Zero when disabled.
    pub fn len(&self) -> usize {
        self.map.as_ref().map_or(0, DashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load(&self, tex: &[u8], mode: Mode) -> Option<Arc<CacheEntry>> {
        let map = self.map.as_ref()?;
        let key = CacheKey {
            tex: tex.to_vec(),
            mode,
        };
        let entry = map.get(&key).map(|entry| Arc::clone(&entry));
        if entry.is_some() {
            log::trace!("cache hit for {} math ({} bytes)", mode, tex.len());
        }
        entry
    }

    pub fn store(&self, tex: &[u8], mode: Mode, entry: CacheEntry) {
        if let Some(map) = &self.map {
            let key = CacheKey {
                tex: tex.to_vec(),
                mode,
            };
            map.insert(key, Arc::new(entry));
        }
    }
}

impl Default for RenderCache {
    fn default() -> RenderCache {
        RenderCache::new()
    }
}
