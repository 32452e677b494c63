//! In-memory cache for the stock listing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::data_source::{DataSource, SourceError};
use crate::Table;

/// Default lifetime of a cached listing.
pub const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct CacheEntry {
    table: Table,
    expires_at: Instant,
}

/// Thread-safe cache holding the most recent listing.
///
/// A zero TTL disables caching; every read goes to the source.
#[derive(Debug, Clone)]
pub struct ListingCache {
    inner: Arc<tokio::sync::RwLock<Option<CacheEntry>>>,
    ttl: Duration,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(DEFAULT_LISTING_TTL)
    }
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(None)),
            ttl,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Cached listing if present and not expired.
    pub async fn get(&self) -> Option<Table> {
        let entry = self.inner.read().await;
        entry
            .as_ref()
            .filter(|entry| Instant::now() <= entry.expires_at)
            .map(|entry| entry.table.clone())
    }

    pub async fn put(&self, table: Table) {
        if self.ttl == Duration::ZERO {
            return;
        }
        let mut entry = self.inner.write().await;
        *entry = Some(CacheEntry {
            table,
            expires_at: Instant::now() + self.ttl,
        });
    }

    pub async fn clear(&self) {
        self.inner.write().await.take();
    }

    /// Return the cached listing or fetch and cache a fresh one.
    ///
    /// Empty listings are not cached.
    pub async fn get_or_fetch(&self, source: &dyn DataSource) -> Result<Table, SourceError> {
        if let Some(table) = self.get().await {
            tracing::debug!(rows = table.len(), "listing cache hit");
            return Ok(table);
        }

        let table = source.listing().await?;
        tracing::debug!(rows = table.len(), source = source.id(), "listing fetched");
        if !table.is_empty() {
            self.put(table.clone()).await;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::data_source::{ReportRequest, SourceFuture};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl DataSource for CountingSource {
        fn id(&self) -> &'static str {
            "counting"
        }

        fn report<'a>(&'a self, _req: ReportRequest) -> SourceFuture<'a, Table> {
            Box::pin(async { Ok(Table::default()) })
        }

        fn listing<'a>(&'a self) -> SourceFuture<'a, Table> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let mut table = Table::new(["code", "name"]);
                table.push_row(vec![json!("600519"), json!("贵州茅台")]);
                Ok(table)
            })
        }
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = ListingCache::default();
        let source = CountingSource::default();

        let first = cache.get_or_fetch(&source).await.expect("listing");
        let second = cache.get_or_fetch(&source).await.expect("listing");

        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_cache_always_refetches() {
        let cache = ListingCache::disabled();
        let source = CountingSource::default();

        cache.get_or_fetch(&source).await.expect("listing");
        cache.get_or_fetch(&source).await.expect("listing");

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn clear_drops_the_entry() {
        let cache = ListingCache::default();
        cache.put(Table::new(["code"])).await;
        assert!(cache.get().await.is_some());

        cache.clear().await;
        assert!(cache.get().await.is_none());
    }
}
