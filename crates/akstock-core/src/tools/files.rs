use serde_json::json;

use super::{render, StockTools};
use crate::error::ToolError;
use crate::format::json_payload;
use crate::sink::DataDir;
use crate::{LocalDateTime, ValidationError};

fn parse_dir(value: &str) -> Result<DataDir, ValidationError> {
    DataDir::parse(value).ok_or_else(|| ValidationError::InvalidDirectory {
        value: value.to_owned(),
    })
}

impl StockTools {
    /// Most recently modified files in `directory`, newest first.
    pub async fn list_saved_files(&self, directory: &str, limit: usize) -> String {
        let result = async {
            let dir = parse_dir(directory)?;
            let files = self.sink.list_recent(dir, limit)?;
            let total_bytes = self.sink.directory_size(dir);
            Ok::<_, ToolError>(json_payload(&json!({
                "directory": dir.as_str(),
                "count": files.len(),
                "files": files,
                "total_size_bytes": total_bytes,
                "total_size_mb": (total_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
                "timestamp": LocalDateTime::now(),
            })))
        };
        render(result.await, None)
    }

    /// Delete files older than `max_age_days` from `directory`.
    pub async fn cleanup_saved_files(&self, directory: &str, max_age_days: u64) -> String {
        let result = async {
            let dir = parse_dir(directory)?;
            let removed = self.sink.cleanup_old(max_age_days, dir)?;
            Ok::<_, ToolError>(json_payload(&json!({
                "directory": dir.as_str(),
                "max_age_days": max_age_days,
                "removed": removed,
                "timestamp": LocalDateTime::now(),
            })))
        };
        render(result.await, None)
    }
}
