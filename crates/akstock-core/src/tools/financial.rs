use serde_json::Value;

use super::{render, StockTools};
use crate::error::ToolError;
use crate::format::table_payload;
use crate::projector::project;
use crate::{IndicatorCategory, ReportKind, ReportPeriod, Symbol, Table};

const PERIOD_COLUMN: &str = "报告期";
const INTERIM_MARKERS: &[&str] = &["Q", "一季报", "中报", "三季报"];

impl StockTools {
    /// Financial indicators narrowed to `indicator_type`.
    pub async fn financial_indicators(&self, symbol: &str, indicator_type: &str) -> String {
        let result = async {
            let symbol = Symbol::parse(symbol)?;
            let category = IndicatorCategory::parse(indicator_type)?;
            let table = self.fetch_report(&symbol, ReportKind::Indicators).await?;
            Ok::<_, ToolError>(table_payload(&project(table, category)))
        };
        render(result.await, Some(symbol))
    }

    pub async fn balance_sheet(&self, symbol: &str, period: &str) -> String {
        self.statement(symbol, period, ReportKind::BalanceSheet).await
    }

    pub async fn income_statement(&self, symbol: &str, period: &str) -> String {
        self.statement(symbol, period, ReportKind::Income).await
    }

    pub async fn cash_flow(&self, symbol: &str, period: &str) -> String {
        self.statement(symbol, period, ReportKind::CashFlow).await
    }

    /// Company profile rows (`item` / `value`).
    pub async fn main_indicators(&self, symbol: &str) -> String {
        let result = async {
            let symbol = Symbol::parse(symbol)?;
            let table = self.fetch_report(&symbol, ReportKind::Profile).await?;
            Ok::<_, ToolError>(table_payload(&table))
        };
        render(result.await, Some(symbol))
    }

    async fn statement(&self, symbol: &str, period: &str, kind: ReportKind) -> String {
        let result = async {
            let symbol = Symbol::parse(symbol)?;
            let period = ReportPeriod::parse(period)?;
            let table = self.fetch_report(&symbol, kind).await?;
            Ok::<_, ToolError>(table_payload(&filter_period(table, period)))
        };
        render(result.await, Some(symbol))
    }
}

/// Keep interim reports for `Quarter`; `Annual` keeps every row.
///
/// Tables without a `报告期` column are returned unchanged.
pub fn filter_period(mut table: Table, period: ReportPeriod) -> Table {
    if period == ReportPeriod::Annual {
        return table;
    }
    let Some(index) = table.column_index(PERIOD_COLUMN) else {
        return table;
    };
    table.retain_rows(|row| match &row[index] {
        Value::String(label) => is_interim(label),
        _ => false,
    });
    table
}

fn is_interim(label: &str) -> bool {
    if INTERIM_MARKERS.iter().any(|marker| label.contains(marker)) {
        return true;
    }
    // Plain dates such as 2024-09-30 or 20240930.
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    digits.len() >= 8 && label.starts_with(|c: char| c.is_ascii_digit()) && &digits[4..8] != "1231"
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn periods(labels: &[&str]) -> Table {
        let mut table = Table::new(["报告期", "v"]);
        for label in labels {
            table.push_row(vec![json!(label), json!(1)]);
        }
        table
    }

    fn labels(table: &Table) -> Vec<String> {
        table.rows().iter().map(|row| crate::cell_text(&row[0])).collect()
    }

    #[test]
    fn annual_keeps_every_row() {
        let table = periods(&["2024三季报", "2023年报"]);
        assert_eq!(filter_period(table.clone(), ReportPeriod::Annual), table);
    }

    #[test]
    fn quarter_keeps_interim_labels() {
        let table = periods(&[
            "2024三季报",
            "2024中报",
            "2024一季报",
            "2023年报",
            "2023Q4",
            "2023-09-30",
            "2022-12-31",
            "20220630",
        ]);
        assert_eq!(
            labels(&filter_period(table, ReportPeriod::Quarter)),
            ["2024三季报", "2024中报", "2024一季报", "2023Q4", "2023-09-30", "20220630"]
        );
    }

    #[test]
    fn quarter_without_period_column_is_unchanged() {
        let mut table = Table::new(["item", "value"]);
        table.push_row(vec![json!("总股本"), json!(1)]);
        assert_eq!(filter_period(table.clone(), ReportPeriod::Quarter), table);
    }
}
