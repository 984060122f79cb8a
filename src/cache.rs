//! Rendered-page cache for the public site and the revalidation hook that clears it.

use std::{
    num::NonZeroUsize,
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use lru::LruCache;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    locks::{rw_read, rw_write},
    store::{Store, StoreError},
};

struct CachedPage {
    html: String,
    rendered_at: Instant,
}

/// Path → HTML, holding at most `capacity` pages (least recently used goes first).
/// Entries older than the ttl are treated as missing.
pub struct PageCache {
    ttl: Duration,
    pages: RwLock<LruCache<String, CachedPage>>,
}

impl PageCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            pages: RwLock::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub fn get(&self, path: &str) -> Option<String> {
        // LruCache::get bumps recency, so it needs the write lock
        let mut pages = rw_write(&self.pages, "page_cache.get");
        pages
            .get(path)
            .filter(|page| page.rendered_at.elapsed() < self.ttl)
            .map(|page| page.html.clone())
    }

    pub fn put(&self, path: &str, html: String) {
        rw_write(&self.pages, "page_cache.put").put(
            path.to_string(),
            CachedPage {
                html,
                rendered_at: Instant::now(),
            },
        );
    }

    /// Returns whether an entry was present.
    pub fn invalidate(&self, path: &str) -> bool {
        rw_write(&self.pages, "page_cache.invalidate").pop(path).is_some()
    }

    pub fn len(&self) -> usize {
        rw_read(&self.pages, "page_cache.len").len()
    }
}

#[derive(Debug, Error)]
pub enum RevalidateError {
    #[error("path must start with '/': {0}")]
    InvalidPath(String),
    #[error("cannot revalidate while the store is unreachable: {0}")]
    StoreUnavailable(#[source] StoreError),
}

/// Marks rendered output for a path as stale.
#[async_trait]
pub trait Revalidate: Send + Sync {
    async fn revalidate(&self, path: &str) -> Result<(), RevalidateError>;
}

pub struct Revalidator {
    cache: Arc<PageCache>,
    store: Store,
}

impl Revalidator {
    pub fn new(cache: Arc<PageCache>, store: Store) -> Self {
        Self { cache, store }
    }
}

#[async_trait]
impl Revalidate for Revalidator {
    async fn revalidate(&self, path: &str) -> Result<(), RevalidateError> {
        if !path.starts_with('/') {
            return Err(RevalidateError::InvalidPath(path.to_string()));
        }

        // keep serving the stale page rather than re-render against a dead store
        if let Err(err) = self.store.ping().await {
            warn!(path, error = %err, "Skipping revalidation, store unreachable");
            return Err(RevalidateError::StoreUnavailable(err));
        }

        if self.cache.invalidate(path) {
            info!(path, "Revalidated cached page");
        } else {
            debug!(path, "Revalidated path with nothing cached");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_the_ttl() {
        let cache = PageCache::new(Duration::from_millis(20), 8);
        cache.put("/", "<p>home</p>".to_string());
        assert_eq!(cache.get("/").as_deref(), Some("<p>home</p>"));

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("/"), None);
    }

    #[test]
    fn invalidate_only_touches_the_exact_path() {
        let cache = PageCache::new(Duration::from_secs(3600), 8);
        cache.put("/", "home".to_string());
        cache.put("/courses", "courses".to_string());

        assert!(cache.invalidate("/"));
        assert!(!cache.invalidate("/"));
        assert_eq!(cache.get("/"), None);
        assert_eq!(cache.get("/courses").as_deref(), Some("courses"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn least_recently_used_page_is_evicted_at_capacity() {
        let cache = PageCache::new(Duration::from_secs(3600), 2);
        cache.put("/", "home".to_string());
        cache.put("/courses", "courses".to_string());
        assert!(cache.get("/").is_some());

        cache.put("/experts", "experts".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("/courses"), None);
        assert_eq!(cache.get("/").as_deref(), Some("home"));
        assert_eq!(cache.get("/experts").as_deref(), Some("experts"));
    }

    #[actix_web::test]
    async fn revalidation_keeps_the_page_when_the_store_is_down() {
        let cache = Arc::new(PageCache::new(Duration::from_secs(3600), 8));
        let (store, memory) = Store::memory();
        let revalidator = Revalidator::new(cache.clone(), store);
        cache.put("/", "home".to_string());

        memory.set_offline(true);
        let err = revalidator.revalidate("/").await.unwrap_err();
        assert!(matches!(err, RevalidateError::StoreUnavailable(_)));
        assert_eq!(cache.get("/").as_deref(), Some("home"));

        memory.set_offline(false);
        revalidator.revalidate("/").await.unwrap();
        assert_eq!(cache.get("/"), None);
    }

    #[actix_web::test]
    async fn relative_paths_are_rejected() {
        let (store, _) = Store::memory();
        let revalidator = Revalidator::new(Arc::new(PageCache::new(Duration::from_secs(1), 8)), store);

        let err = revalidator.revalidate("courses").await.unwrap_err();
        assert!(matches!(err, RevalidateError::InvalidPath(path) if path == "courses"));
    }
}
