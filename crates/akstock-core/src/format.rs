//! Pretty JSON payloads returned to tool callers.
//!
//! Keys keep insertion order and non-ASCII text is written as-is.

use serde_json::{json, Map, Value};

use crate::batch::BatchReport;
use crate::sink::ExportedFile;
use crate::{LocalDateTime, Table};

const NO_DATA_MESSAGE: &str = "no data";

fn pretty(value: &Value) -> String {
    // Serialising a `Value` cannot fail: map keys are always strings.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn now() -> String {
    LocalDateTime::now().format_rfc3339()
}

/// `{data, count, columns, timestamp}`; nulls become `""`.
pub fn table_payload(table: &Table) -> String {
    if table.is_empty() {
        return pretty(&json!({
            "data": [],
            "message": NO_DATA_MESSAGE,
        }));
    }

    pretty(&json!({
        "data": table.filled_records(),
        "count": table.len(),
        "columns": table.columns(),
        "timestamp": now(),
    }))
}

/// `{total, success, failed, results, timestamp}`.
pub fn batch_payload(report: &BatchReport) -> String {
    pretty(&json!({
        "total": report.total(),
        "success": report.success_count(),
        "failed": report.failed_count(),
        "results": report.results,
        "timestamp": report.timestamp,
    }))
}

/// `{error: true, message, timestamp}` plus `symbol` when given.
pub fn error_payload(message: &str, symbol: Option<&str>) -> String {
    let mut payload = Map::new();
    payload.insert("error".into(), Value::Bool(true));
    payload.insert("message".into(), Value::String(message.to_owned()));
    payload.insert("timestamp".into(), Value::String(now()));
    if let Some(symbol) = symbol {
        payload.insert("symbol".into(), Value::String(symbol.to_owned()));
    }
    pretty(&Value::Object(payload))
}

pub fn file_info_payload(file: &ExportedFile) -> String {
    pretty(&json!({
        "file_path": file.path.display().to_string(),
        "record_count": file.record_count,
        "file_size_bytes": file.size_bytes,
        "file_size_mb": file.size_mb,
        "timestamp": now(),
    }))
}

/// Any serialisable value, pretty-printed.
pub fn json_payload(value: &Value) -> String {
    pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(payload: &str) -> Value {
        serde_json::from_str(payload).expect("payload is valid json")
    }

    #[test]
    fn empty_table_reports_no_data() {
        let payload = parse(&table_payload(&Table::new(["a"])));
        assert_eq!(payload, json!({"data": [], "message": "no data"}));
    }

    #[test]
    fn table_payload_fills_nulls_and_keeps_key_order() {
        let mut table = Table::new(["股票代码", "毛利率"]);
        table.push_row(vec![json!("600519"), Value::Null]);

        let payload = parse(&table_payload(&table));
        assert_eq!(payload["count"], json!(1));
        assert_eq!(payload["columns"], json!(["股票代码", "毛利率"]));
        assert_eq!(payload["data"][0]["毛利率"], json!(""));

        let keys: Vec<&String> = payload.as_object().expect("object").keys().collect();
        assert_eq!(keys, ["data", "count", "columns", "timestamp"]);
    }

    #[test]
    fn native_script_is_not_escaped() {
        let mut table = Table::new(["股票名称"]);
        table.push_row(vec![json!("贵州茅台")]);
        let text = table_payload(&table);
        assert!(text.contains("贵州茅台"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn error_payload_attaches_symbol_only_when_given() {
        let with_symbol = parse(&error_payload("boom", Some("600519")));
        assert_eq!(with_symbol["error"], json!(true));
        assert_eq!(with_symbol["symbol"], json!("600519"));

        let without = parse(&error_payload("boom", None));
        assert!(without.get("symbol").is_none());
        assert_eq!(without["message"], json!("boom"));
    }
}
