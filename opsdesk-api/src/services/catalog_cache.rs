use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use opsdesk_shared::errors::AppResult;

use crate::services::prompt::Catalog;

/// Time-bounded cache of the process/form catalog the assistant grounds
/// in. Owned by app state; refreshed on expiry or explicit invalidation.
pub struct CatalogCache {
    ttl: Duration,
    slot: RwLock<Option<(Instant, Arc<Catalog>)>>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Return the cached catalog, loading through `load` when the slot is
    /// empty or older than the TTL.
    pub fn get_or_load<F>(&self, load: F) -> AppResult<Arc<Catalog>>
    where
        F: FnOnce() -> AppResult<Catalog>,
    {
        if let Some((at, catalog)) = self.slot.read().expect("catalog cache poisoned").as_ref() {
            if at.elapsed() < self.ttl {
                return Ok(catalog.clone());
            }
        }

        let fresh = Arc::new(load()?);
        let mut slot = self.slot.write().expect("catalog cache poisoned");
        *slot = Some((Instant::now(), fresh.clone()));
        Ok(fresh)
    }

    /// Drop the cached value so the next read refetches.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().expect("catalog cache poisoned");
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_loader(calls: &AtomicUsize) -> impl FnOnce() -> AppResult<Catalog> + '_ {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Catalog::default())
        }
    }

    #[test]
    fn second_read_within_ttl_hits_the_cache() {
        let cache = CatalogCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        cache.get_or_load(counting_loader(&calls)).unwrap();
        cache.get_or_load(counting_loader(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_ttl_always_reloads() {
        let cache = CatalogCache::new(Duration::ZERO);
        let calls = AtomicUsize::new(0);

        cache.get_or_load(counting_loader(&calls)).unwrap();
        cache.get_or_load(counting_loader(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_a_refresh() {
        let cache = CatalogCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        cache.get_or_load(counting_loader(&calls)).unwrap();
        cache.invalidate();
        cache.get_or_load(counting_loader(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
