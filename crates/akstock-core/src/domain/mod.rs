//! # Domain Models
//!
//! Value types shared by every layer of akstock.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated six-digit A-share code |
//! | [`Table`] | Column-ordered tabular result |
//! | [`IndicatorCategory`] | Indicator subset used by projection |
//! | [`ReportPeriod`] | Quarterly or annual statements |
//! | [`ReportKind`] | Upstream report family |
//! | [`LocalDateTime`] | Local wall-clock timestamp |
//!
//! Construction validates invariants, so a `Symbol` in hand is always
//! six ASCII digits:
//!
//! ```rust
//! use akstock_core::{Symbol, ValidationError};
//!
//! let symbol = Symbol::parse(" 600519 ").expect("valid");
//! assert_eq!(symbol.as_str(), "600519");
//! assert!(matches!(
//!     Symbol::parse("60051"),
//!     Err(ValidationError::InvalidSymbol { .. })
//! ));
//! ```

mod options;
mod symbol;
mod table;
mod timestamp;

pub use options::{IndicatorCategory, ReportKind, ReportPeriod};
pub use symbol::{
    normalize_symbols, validate_symbol, validate_symbol_batch, Symbol, MAX_BATCH_SYMBOLS,
};
pub use table::{cell_text, Table};
pub use timestamp::{capture_local_offset, LocalDateTime};
