//! Narrow indicator tables to the columns of one category.

use crate::{IndicatorCategory, Table};

const BASIC: &[&str] = &["股票代码", "股票名称", "市盈率", "市净率", "市销率", "总市值"];
const PROFIT: &[&str] = &[
    "股票代码",
    "股票名称",
    "净利润",
    "净利润同比",
    "营业收入",
    "营业收入同比",
    "毛利率",
    "净利率",
];
const GROWTH: &[&str] = &[
    "股票代码",
    "股票名称",
    "营业收入同比",
    "净利润同比",
    "营业收入环比",
    "净利润环比",
];
const DEBT: &[&str] = &["股票代码", "股票名称", "资产负债率", "流动比率", "速动比率"];
const OPERATION: &[&str] = &[
    "股票代码",
    "股票名称",
    "总资产周转率",
    "存货周转率",
    "应收账款周转率",
];

impl IndicatorCategory {
    /// Ordered column list, `None` for [`IndicatorCategory::All`].
    pub const fn columns(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Basic => Some(BASIC),
            Self::Profit => Some(PROFIT),
            Self::Growth => Some(GROWTH),
            Self::Debt => Some(DEBT),
            Self::Operation => Some(OPERATION),
            Self::All => None,
        }
    }
}

/// Keep the category's columns that exist in `table`, in the category's order.
///
/// Returns the table unchanged for `All` or when none of the category's
/// columns are present.
pub fn project(table: Table, category: IndicatorCategory) -> Table {
    let Some(wanted) = category.columns() else {
        return table;
    };

    let present: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|column| table.has_column(column))
        .collect();
    if present.is_empty() {
        return table;
    }
    table.select(&present)
}
