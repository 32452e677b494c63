//! Runtime configuration for the tool server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::EastmoneyAdapter;
use crate::cache::{ListingCache, DEFAULT_LISTING_TTL};
use crate::data_source::DataSource;
use crate::http_client::ReqwestHttpClient;
use crate::sink::DataDirs;
use crate::tools::StockTools;

/// Server settings. Every field has a usable default.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Directory holding `data/` and `logs/`.
    pub data_root: PathBuf,
    /// Serve offline fixture data instead of calling Eastmoney.
    pub use_mock: bool,
    /// Per-request HTTP timeout.
    pub request_timeout_ms: u64,
    /// Outbound request budget.
    pub requests_per_second: u32,
    /// Cache files older than this are pruned at startup.
    pub cache_retention_days: u64,
    /// How long the stock listing stays cached in memory.
    pub listing_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            use_mock: false,
            request_timeout_ms: 10_000,
            requests_per_second: 10,
            cache_retention_days: 7,
            listing_ttl: DEFAULT_LISTING_TTL,
        }
    }
}

impl ServerConfig {
    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    pub fn with_mock(mut self, use_mock: bool) -> Self {
        self.use_mock = use_mock;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn with_requests_per_second(mut self, requests_per_second: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    pub fn with_cache_retention_days(mut self, days: u64) -> Self {
        self.cache_retention_days = days;
        self
    }

    pub fn with_listing_ttl(mut self, ttl: Duration) -> Self {
        self.listing_ttl = ttl;
        self
    }

    pub fn data_dirs(&self) -> DataDirs {
        DataDirs::new(&self.data_root)
    }

    /// Eastmoney adapter, offline when `use_mock` is set.
    pub fn build_source(&self) -> Arc<dyn DataSource> {
        let adapter = if self.use_mock {
            EastmoneyAdapter::default()
        } else {
            EastmoneyAdapter::with_http_client(Arc::new(ReqwestHttpClient::new()))
        };
        Arc::new(
            adapter
                .with_timeout_ms(self.request_timeout_ms)
                .with_rate_limit(self.requests_per_second),
        )
    }

    pub fn build_tools(&self) -> StockTools {
        StockTools::new(self.build_source(), self.data_dirs())
            .with_listing_cache(ListingCache::new(self.listing_ttl))
    }
}
