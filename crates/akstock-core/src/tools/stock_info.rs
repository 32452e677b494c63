use serde_json::Value;

use super::{render, StockTools};
use crate::error::ToolError;
use crate::format::table_payload;
use crate::{cell_text, Table, ValidationError};

/// Maximum number of rows returned by a search.
pub const SEARCH_RESULT_LIMIT: usize = 50;

impl StockTools {
    /// Case-insensitive substring search over code and name.
    pub async fn search(&self, query: &str) -> String {
        let result = async {
            let query = query.trim();
            if query.is_empty() {
                return Err(ToolError::from(ValidationError::EmptyQuery));
            }

            let listing = self.listing.get_or_fetch(self.source.as_ref()).await?;
            let matches = search_listing(listing, query);
            if matches.is_empty() {
                let mut table = Table::new(["message"]);
                table.push_row(vec![Value::String(format!(
                    "no stocks found matching '{query}'"
                ))]);
                return Ok(table_payload(&table));
            }
            Ok::<_, ToolError>(table_payload(&matches))
        };
        render(result.await, None)
    }

    /// The whole A-share universe.
    pub async fn all_stocks(&self) -> String {
        let result = async {
            let listing = self.listing.get_or_fetch(self.source.as_ref()).await?;
            Ok::<_, ToolError>(table_payload(&listing))
        };
        render(result.await, None)
    }
}

fn search_listing(mut listing: Table, query: &str) -> Table {
    let needle = query.to_lowercase();
    let columns: Vec<usize> = ["code", "name"]
        .iter()
        .filter_map(|name| listing.column_index(name))
        .collect();

    listing.retain_rows(|row| {
        columns
            .iter()
            .any(|&index| cell_text(&row[index]).to_lowercase().contains(&needle))
    });
    listing.truncate(SEARCH_RESULT_LIMIT);
    listing
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn listing() -> Table {
        let mut table = Table::new(["code", "name"]);
        for (code, name) in [("600519", "贵州茅台"), ("000002", "万科A"), ("000001", "平安银行")] {
            table.push_row(vec![json!(code), json!(name)]);
        }
        table
    }

    #[test]
    fn matches_code_or_name_ignoring_case() {
        assert_eq!(search_listing(listing(), "6005").len(), 1);
        assert_eq!(search_listing(listing(), "万科a").len(), 1);
        assert_eq!(search_listing(listing(), "0000").len(), 2);
    }

    #[test]
    fn caps_result_rows() {
        let mut table = Table::new(["code", "name"]);
        for i in 0..80 {
            table.push_row(vec![json!(format!("{:06}", 300_000 + i)), json!("创业板")]);
        }
        assert_eq!(search_listing(table, "创业").len(), SEARCH_RESULT_LIMIT);
    }
}
