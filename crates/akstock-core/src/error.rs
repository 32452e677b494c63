use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::data_source::SourceError;
use crate::sink::SinkError;

/// Reason a symbol batch was rejected before any fetch was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRejection {
    EmptyInput,
    TooMany { count: usize, max: usize },
    InvalidFormat { symbols: Vec<String> },
}

impl Display for BatchRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => f.write_str("symbol list must not be empty"),
            Self::TooMany { count, max } => {
                write!(f, "too many symbols: {count} given, at most {max} allowed")
            }
            Self::InvalidFormat { symbols } => write!(
                f,
                "the following symbols are malformed: {}",
                symbols.join(", ")
            ),
        }
    }
}

/// Validation errors raised before any upstream call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid stock symbol '{value}', expected 6 digits")]
    InvalidSymbol { value: String },
    #[error("invalid symbol batch: {0}")]
    InvalidSymbolBatch(BatchRejection),

    #[error("invalid indicator type '{value}', expected one of basic, profit, growth, debt, operation, all")]
    InvalidCategory { value: String },
    #[error("invalid report period '{value}', expected one of quarter, annual")]
    InvalidPeriod { value: String },
    #[error("invalid file format '{value}', expected one of csv, excel, json")]
    InvalidFileFormat { value: String },
    #[error("invalid data type '{value}', expected one of indicators, balance_sheet, income, cash_flow")]
    InvalidDataType { value: String },

    #[error("invalid directory '{value}', expected one of exports, cache, batch, all")]
    InvalidDirectory { value: String },

    #[error("search query must not be empty")]
    EmptyQuery,
}

/// Top-level error type for tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no {what} data found for {symbol}")]
    NoDataFound { symbol: String, what: &'static str },

    #[error("fetch failed: {0}")]
    FetchFailed(#[from] SourceError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ToolError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "tool.invalid_argument",
            Self::NoDataFound { .. } => "tool.no_data",
            Self::FetchFailed(_) => "tool.fetch_failed",
            Self::Sink(_) => "tool.write_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_format_message_lists_every_symbol_in_order() {
        let err = ValidationError::InvalidSymbolBatch(BatchRejection::InvalidFormat {
            symbols: vec![String::from("abc"), String::from("12345")],
        });
        assert_eq!(
            err.to_string(),
            "invalid symbol batch: the following symbols are malformed: abc, 12345"
        );
    }

    #[test]
    fn no_data_message_names_symbol_and_report() {
        let err = ToolError::NoDataFound {
            symbol: String::from("600519"),
            what: "balance sheet",
        };
        assert_eq!(err.to_string(), "no balance sheet data found for 600519");
        assert_eq!(err.code(), "tool.no_data");
    }
}
