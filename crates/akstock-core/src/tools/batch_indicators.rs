use std::path::Path;

use super::{render, StockTools};
use crate::batch::BatchFetcher;
use crate::error::ToolError;
use crate::format::{batch_payload, file_info_payload};
use crate::sink::{FileFormat, FileType};
use crate::{
    normalize_symbols, validate_symbol_batch, IndicatorCategory, Symbol, ValidationError,
    MAX_BATCH_SYMBOLS,
};

/// Separator between the batch JSON and the saved-file JSON.
pub const FILE_SAVED_SEPARATOR: &str = "\n\nFile saved:\n";

/// Arguments of [`StockTools::batch_indicators`].
#[derive(Debug, Clone, Copy)]
pub struct BatchArgs<'a> {
    pub symbols: &'a [String],
    pub indicator_type: &'a str,
    pub save_to_file: bool,
    pub output_path: Option<&'a str>,
    pub file_format: &'a str,
}

impl<'a> BatchArgs<'a> {
    /// All indicators, nothing saved.
    pub fn new(symbols: &'a [String]) -> Self {
        Self {
            symbols,
            indicator_type: "all",
            save_to_file: false,
            output_path: None,
            file_format: "csv",
        }
    }
}

impl StockTools {
    /// Indicators for up to [`MAX_BATCH_SYMBOLS`] symbols, optionally saved.
    ///
    /// The whole batch is rejected before any fetch when a symbol is
    /// malformed. With `save_to_file`, the merged table of successful
    /// symbols is written to `output_path`, or under a generated name in the
    /// batch directory when the path is missing or blank.
    pub async fn batch_indicators(&self, args: BatchArgs<'_>) -> String {
        render(self.try_batch_indicators(args).await, None)
    }

    async fn try_batch_indicators(&self, args: BatchArgs<'_>) -> Result<String, ToolError> {
        let normalized = normalize_symbols(args.symbols);
        validate_symbol_batch(&normalized, MAX_BATCH_SYMBOLS)
            .map_err(ValidationError::InvalidSymbolBatch)?;
        let symbols = normalized
            .iter()
            .map(|s| Symbol::parse(s))
            .collect::<Result<Vec<_>, _>>()?;

        let category = IndicatorCategory::parse(args.indicator_type)?;
        let format = if args.save_to_file {
            Some(FileFormat::parse(args.file_format).ok_or_else(|| {
                ValidationError::InvalidFileFormat {
                    value: args.file_format.to_owned(),
                }
            })?)
        } else {
            None
        };

        let report = BatchFetcher::new(self.source.clone())
            .fetch(&symbols, category)
            .await;
        let mut payload = batch_payload(&report);

        if let Some(format) = format {
            if report.success_count() > 0 {
                let merged = report.merged_table();
                let file = self.sink.save_table(
                    &merged,
                    FileType::Batch,
                    &report.symbols(),
                    format,
                    args.output_path
                        .filter(|p| !p.trim().is_empty())
                        .map(Path::new),
                )?;
                payload.push_str(FILE_SAVED_SEPARATOR);
                payload.push_str(&file_info_payload(&file));
            } else {
                tracing::info!("no successful symbols, batch file not written");
            }
        }

        Ok(payload)
    }
}
