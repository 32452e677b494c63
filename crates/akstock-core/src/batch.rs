//! Bounded concurrent fan-out over a list of symbols.
//!
//! Every symbol gets its own task; at most [`BATCH_CONCURRENCY`] fetches are
//! in flight at once. A failure (including a panic inside the data source)
//! is recorded against its symbol and never aborts the other tasks.
//! Results come back in input order regardless of completion order.

use std::any::Any;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::data_source::{DataSource, ReportRequest};
use crate::projector::project;
use crate::{IndicatorCategory, LocalDateTime, ReportKind, Symbol, Table};

/// Maximum number of fetches in flight for one batch.
pub const BATCH_CONCURRENCY: usize = 5;

const NO_DATA_MESSAGE: &str = "no data found";

/// Outcome of one symbol in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Success { symbol: Symbol, data: Table },
    Failure { symbol: Symbol, error: String },
}

impl FetchResult {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::Success { symbol, .. } | Self::Failure { symbol, .. } => symbol,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    fn failure(symbol: Symbol, error: impl Into<String>) -> Self {
        Self::Failure {
            symbol,
            error: error.into(),
        }
    }
}

impl Serialize for FetchResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        match self {
            Self::Success { symbol, data } => {
                map.serialize_entry("symbol", symbol.as_str())?;
                map.serialize_entry("data", &data.records())?;
                map.serialize_entry("count", &data.len())?;
            }
            Self::Failure { symbol, error } => {
                map.serialize_entry("symbol", symbol.as_str())?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("data", &Value::Null)?;
            }
        }
        map.end()
    }
}

/// All per-symbol outcomes of one batch, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub results: Vec<FetchResult>,
    pub timestamp: LocalDateTime,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.success_count()
    }

    /// Every symbol of the batch, in input order.
    pub fn symbols(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.symbol().as_str()).collect()
    }

    /// Flatten successful tables into one, tagging each row with its symbol
    /// under `股票代码`.
    pub fn merged_table(&self) -> Table {
        let records = self
            .results
            .iter()
            .filter_map(|result| match result {
                FetchResult::Success { symbol, data } => {
                    let mut tagged = data.clone();
                    tagged.set_column("股票代码", Value::String(symbol.as_str().to_owned()));
                    Some(tagged.records())
                }
                FetchResult::Failure { .. } => None,
            })
            .flatten()
            .collect();
        Table::from_records(records)
    }
}

/// Runs indicator fetches for many symbols against one shared data source.
#[derive(Clone)]
pub struct BatchFetcher {
    source: Arc<dyn DataSource>,
}

impl BatchFetcher {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Fetch and project indicators for every symbol.
    ///
    /// Waits for all tasks; `results[i]` always belongs to `symbols[i]`.
    pub async fn fetch(&self, symbols: &[Symbol], category: IndicatorCategory) -> BatchReport {
        let semaphore = Arc::new(Semaphore::new(BATCH_CONCURRENCY));
        let mut tasks = JoinSet::new();

        for (index, symbol) in symbols.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                // Inner task so a panicking source surfaces as a JoinError here.
                let fetch = tokio::spawn(fetch_one(source, symbol.clone(), category));
                let result = match fetch.await {
                    Ok(result) => result,
                    Err(error) => {
                        let message = join_error_message(error);
                        tracing::error!(symbol = %symbol, error = %message, "batch task failed");
                        FetchResult::failure(symbol, message)
                    }
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<FetchResult>> = vec![None; symbols.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(error) => tracing::error!(error = %error, "batch worker aborted"),
            }
        }

        let results: Vec<FetchResult> = slots
            .into_iter()
            .zip(symbols)
            .map(|(slot, symbol)| {
                slot.unwrap_or_else(|| FetchResult::failure(symbol.clone(), "task did not complete"))
            })
            .collect();

        let report = BatchReport {
            results,
            timestamp: LocalDateTime::now(),
        };
        tracing::info!(
            source = self.source.id(),
            total = report.total(),
            success = report.success_count(),
            failed = report.failed_count(),
            category = category.as_str(),
            "batch fetch finished"
        );
        report
    }
}

async fn fetch_one(
    source: Arc<dyn DataSource>,
    symbol: Symbol,
    category: IndicatorCategory,
) -> FetchResult {
    let request = ReportRequest::new(symbol.clone(), ReportKind::Indicators);
    match source.report(request).await {
        Ok(table) if table.is_empty() => FetchResult::failure(symbol, NO_DATA_MESSAGE),
        Ok(table) => FetchResult::Success {
            symbol,
            data: project(table, category),
        },
        Err(error) => {
            tracing::warn!(symbol = %symbol, error = %error, "batch fetch failed");
            FetchResult::failure(symbol, error.message())
        }
    }
}

fn join_error_message(error: JoinError) -> String {
    if error.is_panic() {
        format!("fetch panicked: {}", panic_text(error.into_panic()))
    } else {
        String::from("fetch was cancelled")
    }
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        String::from("unknown panic")
    }
}
