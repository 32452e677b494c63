//! # akstock Core
//!
//! Validation, fetching, projection, batching, file export and response
//! rendering for Chinese A-share financial data.
//!
//! ## Overview
//!
//! - **Domain types** for symbols, indicator categories and tables
//! - **Data source trait** with an Eastmoney adapter (real or offline)
//! - **Batch fetcher** with bounded concurrency and input-order results
//! - **File sink** writing csv, xlsx and json under a data root
//! - **Tool operations** returning ready-to-send JSON text
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Eastmoney adapter and offline fixtures |
//! | [`batch`] | Concurrent multi-symbol fetching |
//! | [`cache`] | In-memory listing cache |
//! | [`config`] | Server configuration |
//! | [`data_source`] | Data source trait and error types |
//! | [`domain`] | Symbols, tables, categories, timestamps |
//! | [`error`] | Validation and tool errors |
//! | [`format`] | JSON payload rendering |
//! | [`http_client`] | HTTP client abstraction |
//! | [`projector`] | Category column projection |
//! | [`sink`] | File persistence |
//! | [`tools`] | One operation per exposed tool |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use akstock_core::{DataDirs, EastmoneyAdapter, StockTools};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tools = StockTools::new(Arc::new(EastmoneyAdapter::default()), DataDirs::new("."));
//!     println!("{}", tools.financial_indicators("600519", "profit").await);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Tool operation  │──────────────┐
//! └────────┬────────┘              │
//!          │                       ▼
//!          ▼              ┌──────────────────┐
//! ┌─────────────────┐     │  Batch Fetcher   │
//! │  Validation     │     │  (≤ 5 in flight) │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Data Source     │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest/none)   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Projector       │────▶│ File Sink /      │
//! │                 │     │ Formatter        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Tool operations never return `Err`; failures become an error payload:
//!
//! ```rust
//! use akstock_core::format::error_payload;
//!
//! let payload = error_payload("invalid stock symbol 'abc'", Some("abc"));
//! assert!(payload.contains("\"error\": true"));
//! ```

pub mod adapters;
pub mod batch;
pub mod cache;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod format;
pub mod http_client;
pub mod projector;
pub mod sink;
pub mod tools;

// Adapter implementations
pub use adapters::EastmoneyAdapter;

// Batch fetching
pub use batch::{BatchFetcher, BatchReport, FetchResult, BATCH_CONCURRENCY};

// Caching
pub use cache::ListingCache;

pub use config::ServerConfig;

// Data source trait and types
pub use data_source::{DataSource, ReportRequest, SourceError, SourceErrorKind, SourceFuture};

// Domain models
pub use domain::{
    capture_local_offset, cell_text, normalize_symbols, validate_symbol, validate_symbol_batch, IndicatorCategory,
    LocalDateTime, ReportKind, ReportPeriod, Symbol, Table, MAX_BATCH_SYMBOLS,
};

// Error types
pub use error::{BatchRejection, ToolError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};

pub use projector::project;

// File sink
pub use sink::{
    generate_filename, DataDir, DataDirs, ExportedFile, FileFormat, FileSink, FileType, SinkError,
    StoredFile,
};

// Tool operations
pub use tools::{BatchArgs, StockTools};
