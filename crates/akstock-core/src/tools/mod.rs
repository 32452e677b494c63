//! Tool operations.
//!
//! Each operation validates its arguments, talks to the data source, and
//! returns the final text payload. Failures never escape as `Err`; they are
//! rendered with [`error_payload`](crate::format::error_payload) so the
//! caller always receives a JSON document.
//!
//! | Operation | Module |
//! |-----------|--------|
//! | financial indicators, statements, main indicators | `financial` |
//! | batch indicators | `batch_indicators` |
//! | export to file | `export` |
//! | search, full listing | `stock_info` |
//! | saved-file listing and cleanup | `files` |

mod batch_indicators;
mod export;
mod files;
mod financial;
mod stock_info;

use std::sync::Arc;

use crate::cache::ListingCache;
use crate::data_source::{DataSource, ReportRequest};
use crate::error::ToolError;
use crate::format::error_payload;
use crate::sink::{DataDirs, FileSink};
use crate::{ReportKind, Symbol, Table};

pub use batch_indicators::{BatchArgs, FILE_SAVED_SEPARATOR};
pub use financial::filter_period;
pub use stock_info::SEARCH_RESULT_LIMIT;

/// Shared context for every tool operation.
#[derive(Clone)]
pub struct StockTools {
    source: Arc<dyn DataSource>,
    sink: FileSink,
    listing: ListingCache,
}

impl StockTools {
    pub fn new(source: Arc<dyn DataSource>, dirs: DataDirs) -> Self {
        Self {
            source,
            sink: FileSink::new(dirs),
            listing: ListingCache::default(),
        }
    }

    pub fn with_listing_cache(mut self, listing: ListingCache) -> Self {
        self.listing = listing;
        self
    }

    pub fn sink(&self) -> &FileSink {
        &self.sink
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// Fetch one report, treating an empty table as [`ToolError::NoDataFound`].
    async fn fetch_report(&self, symbol: &Symbol, kind: ReportKind) -> Result<Table, ToolError> {
        let request = ReportRequest::new(symbol.clone(), kind);
        let table = self.source.report(request).await.map_err(|error| {
            tracing::warn!(symbol = %symbol, kind = kind.as_str(), error = %error, "fetch failed");
            ToolError::from(error)
        })?;

        if table.is_empty() {
            return Err(ToolError::NoDataFound {
                symbol: symbol.to_string(),
                what: kind.describe(),
            });
        }
        tracing::debug!(symbol = %symbol, kind = kind.as_str(), rows = table.len(), "fetched report");
        Ok(table)
    }
}

/// Collapse an operation result into its text payload.
fn render(result: Result<String, ToolError>, symbol: Option<&str>) -> String {
    result.unwrap_or_else(|error| {
        tracing::debug!(code = error.code(), %error, "tool failed");
        error_payload(&error.to_string(), symbol)
    })
}
