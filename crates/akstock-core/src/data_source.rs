//! Data source trait and request/error types.
//!
//! A data source is the only place that talks to an upstream provider. Every
//! call returns a [`Table`] whose column labels are the provider's native
//! labels; an empty table means "no data" and is not an error at this layer.
//!
//! # Calls
//!
//! | Method | Request | Response |
//! |--------|---------|----------|
//! | [`report`](DataSource::report) | [`ReportRequest`] | one symbol's report rows |
//! | [`listing`](DataSource::listing) | - | the whole A-share universe (`code`, `name`) |
//!
//! # Example
//!
//! ```rust,ignore
//! use akstock_core::{DataSource, EastmoneyAdapter, ReportKind, ReportRequest, Symbol};
//!
//! async fn balance_sheet(adapter: &EastmoneyAdapter) -> Result<(), akstock_core::SourceError> {
//!     let request = ReportRequest::new(Symbol::parse("600519")?, ReportKind::BalanceSheet);
//!     let table = adapter.report(request).await?;
//!     println!("{} rows", table.len());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{ReportKind, Symbol, Table};

/// Boxed future returned by [`DataSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Parse,
    Internal,
}

/// Structured upstream failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Parse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Parse => "source.parse",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for per-symbol reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub symbol: Symbol,
    pub kind: ReportKind,
}

impl ReportRequest {
    pub fn new(symbol: Symbol, kind: ReportKind) -> Self {
        Self { symbol, kind }
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the batch fetcher shares one
/// instance across concurrently running tasks.
pub trait DataSource: Send + Sync {
    /// Short provider name used in logs.
    fn id(&self) -> &'static str;

    /// Fetches one report for one symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider is unreachable, rate limits
    /// the call, or answers with a payload that cannot be parsed.
    fn report<'a>(&'a self, req: ReportRequest) -> SourceFuture<'a, Table>;

    /// Fetches the full list of listed A-shares as `code` / `name` columns.
    fn listing<'a>(&'a self) -> SourceFuture<'a, Table>;
}
