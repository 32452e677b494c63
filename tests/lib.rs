// Shared imports for the behaviour and contract suites
pub use akstock_core::{
    adapters::EastmoneyAdapter,
    data_source::{DataSource, ReportRequest, SourceFuture},
    BatchFetcher, DataDirs, FileSink, StockTools, Symbol, Table,
};
pub use std::sync::Arc;
