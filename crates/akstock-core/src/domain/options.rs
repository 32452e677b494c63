use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Named subset of financial indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Basic,
    Profit,
    Growth,
    Debt,
    Operation,
    #[default]
    All,
}

impl IndicatorCategory {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "basic" => Ok(Self::Basic),
            "profit" => Ok(Self::Profit),
            "growth" => Ok(Self::Growth),
            "debt" => Ok(Self::Debt),
            "operation" => Ok(Self::Operation),
            "all" => Ok(Self::All),
            _ => Err(ValidationError::InvalidCategory {
                value: value.to_owned(),
            }),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Profit => "profit",
            Self::Growth => "growth",
            Self::Debt => "debt",
            Self::Operation => "operation",
            Self::All => "all",
        }
    }
}

impl Display for IndicatorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting period requested for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Quarter,
    #[default]
    Annual,
}

impl ReportPeriod {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "quarter" => Ok(Self::Quarter),
            "annual" => Ok(Self::Annual),
            _ => Err(ValidationError::InvalidPeriod {
                value: value.to_owned(),
            }),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quarter => "quarter",
            Self::Annual => "annual",
        }
    }
}

/// Upstream report families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Indicators,
    BalanceSheet,
    Income,
    CashFlow,
    /// Company profile: share capital, market value, industry, listing date.
    Profile,
}

impl ReportKind {
    /// Parse the `data_type` argument of the export tool.
    pub fn parse_data_type(value: &str) -> Result<Self, ValidationError> {
        match value {
            "indicators" => Ok(Self::Indicators),
            "balance_sheet" => Ok(Self::BalanceSheet),
            "income" => Ok(Self::Income),
            "cash_flow" => Ok(Self::CashFlow),
            _ => Err(ValidationError::InvalidDataType {
                value: value.to_owned(),
            }),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Indicators => "indicators",
            Self::BalanceSheet => "balance_sheet",
            Self::Income => "income",
            Self::CashFlow => "cash_flow",
            Self::Profile => "profile",
        }
    }

    /// Human-readable report name used in messages.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Indicators => "financial indicator",
            Self::BalanceSheet => "balance sheet",
            Self::Income => "income statement",
            Self::CashFlow => "cash flow statement",
            Self::Profile => "main indicator",
        }
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_category() {
        for name in ["basic", "profit", "growth", "debt", "operation", "all"] {
            let category = IndicatorCategory::parse(name).expect("known category");
            assert_eq!(category.as_str(), name);
        }
        assert!(matches!(
            IndicatorCategory::parse("ALL"),
            Err(ValidationError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn defaults_match_tool_schema() {
        assert_eq!(IndicatorCategory::default(), IndicatorCategory::All);
        assert_eq!(ReportPeriod::default(), ReportPeriod::Annual);
    }

    #[test]
    fn profile_is_not_an_exportable_data_type() {
        assert!(ReportKind::parse_data_type("profile").is_err());
        assert_eq!(
            ReportKind::parse_data_type("cash_flow").expect("valid"),
            ReportKind::CashFlow
        );
    }
}
