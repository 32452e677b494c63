use std::path::Path;

use super::{render, StockTools};
use crate::error::ToolError;
use crate::format::file_info_payload;
use crate::sink::{FileFormat, FileType};
use crate::{ReportKind, Symbol, ValidationError};

impl StockTools {
    /// Fetch one report and write it to `output_path`.
    ///
    /// An empty or missing `output_path` writes to the exports directory
    /// under a generated name.
    pub async fn export_data(
        &self,
        data_type: &str,
        symbol: &str,
        output_path: Option<&str>,
        file_format: &str,
    ) -> String {
        let result = async {
            let symbol = Symbol::parse(symbol)?;
            let kind = ReportKind::parse_data_type(data_type)?;
            let format = FileFormat::parse(file_format).ok_or_else(|| {
                ValidationError::InvalidFileFormat {
                    value: file_format.to_owned(),
                }
            })?;

            let table = self.fetch_report(&symbol, kind).await?;
            let output_path = output_path.filter(|p| !p.trim().is_empty()).map(Path::new);
            let file = self.sink.save_table(
                &table,
                FileType::Export,
                &[symbol.as_str()],
                format,
                output_path,
            )?;
            Ok::<_, ToolError>(file_info_payload(&file))
        };
        render(result.await, Some(symbol))
    }
}
