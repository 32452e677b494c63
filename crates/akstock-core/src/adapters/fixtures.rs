//! Deterministic offline data for a small fixed universe.

use serde_json::{json, Map, Value};

use super::eastmoney::labelled_table;
use crate::{ReportKind, Symbol, Table};

struct Company {
    code: &'static str,
    name: &'static str,
    industry: &'static str,
    listed: &'static str,
}

const UNIVERSE: &[Company] = &[
    Company { code: "000001", name: "平安银行", industry: "银行", listed: "19910403" },
    Company { code: "000002", name: "万科A", industry: "房地产开发", listed: "19910129" },
    Company { code: "000858", name: "五粮液", industry: "酿酒行业", listed: "19980427" },
    Company { code: "300750", name: "宁德时代", industry: "电池", listed: "20180611" },
    Company { code: "600000", name: "浦发银行", industry: "银行", listed: "19991110" },
    Company { code: "600036", name: "招商银行", industry: "银行", listed: "20020409" },
    Company { code: "600519", name: "贵州茅台", industry: "酿酒行业", listed: "20010827" },
    Company { code: "601318", name: "中国平安", industry: "保险", listed: "20070301" },
];

/// Report periods served for every company, newest first.
const PERIODS: &[(&str, &str)] = &[
    ("2024三季报", "2024-09-30 00:00:00"),
    ("2024中报", "2024-06-30 00:00:00"),
    ("2024一季报", "2024-03-31 00:00:00"),
    ("2023年报", "2023-12-31 00:00:00"),
    ("2022年报", "2022-12-31 00:00:00"),
];

fn company(symbol: &Symbol) -> Option<&'static Company> {
    UNIVERSE.iter().find(|company| company.code == symbol.as_str())
}

/// Per-company scale factor so figures differ between symbols.
fn seed(company: &Company) -> f64 {
    let digits: u32 = company
        .code
        .bytes()
        .map(|b| u32::from(b - b'0'))
        .sum();
    1.0 + f64::from(digits) / 10.0
}

fn round2(value: f64) -> Value {
    json!((value * 100.0).round() / 100.0)
}

pub(crate) fn report(symbol: &Symbol, kind: ReportKind) -> Table {
    let Some(company) = company(symbol) else {
        return Table::default();
    };

    if kind == ReportKind::Profile {
        return profile(company);
    }

    let scale = seed(company);
    let records = PERIODS
        .iter()
        .enumerate()
        .map(|(index, (name, date))| {
            let mut record = Map::new();
            record.insert("SECURITY_CODE".into(), json!(company.code));
            record.insert("SECURITY_NAME_ABBR".into(), json!(company.name));
            record.insert("REPORT_DATE_NAME".into(), json!(name));
            record.insert("REPORT_DATE".into(), json!(date));
            let step = 1.0 - 0.08 * index as f64;
            match kind {
                ReportKind::Indicators => indicator_fields(&mut record, scale, step),
                ReportKind::BalanceSheet => balance_fields(&mut record, scale, step),
                ReportKind::Income => income_fields(&mut record, scale, step),
                ReportKind::CashFlow => cash_flow_fields(&mut record, scale, step),
                ReportKind::Profile => {}
            }
            record
        })
        .collect();

    labelled_table(records, kind)
}

fn indicator_fields(record: &mut Map<String, Value>, scale: f64, step: f64) {
    let revenue = 1.2e10 * scale * step;
    let profit = revenue * 0.21;
    record.insert("EPSJB".into(), round2(2.5 * scale * step));
    record.insert("BPS".into(), round2(18.0 * scale));
    record.insert("TOTALOPERATEREVE".into(), round2(revenue));
    record.insert("TOTALOPERATEREVETZ".into(), round2(12.5 * step));
    record.insert("YYZSRGDHBZC".into(), round2(3.1 * step));
    record.insert("PARENTNETPROFIT".into(), round2(profit));
    record.insert("PARENTNETPROFITTZ".into(), round2(9.8 * step));
    record.insert("NETPROFITRPHBZC".into(), round2(2.4 * step));
    record.insert("ROEJQ".into(), round2(14.0 * step));
    record.insert("XSMLL".into(), round2(30.0 + 10.0 * scale));
    record.insert("XSJLL".into(), round2(21.0));
    record.insert("ZCFZL".into(), round2(40.0 + 5.0 * scale));
    record.insert("LD".into(), round2(1.1 + 0.2 * scale));
    record.insert("SD".into(), round2(0.8 + 0.2 * scale));
    record.insert("TOAZZL".into(), round2(0.4 * step));
    record.insert("CHZZL".into(), round2(2.0 * scale));
    // Some issuers do not disclose receivable turnover.
    let receivables = if scale > 3.0 { Value::Null } else { round2(9.0 * scale) };
    record.insert("YSZKZZL".into(), receivables);
}

fn balance_fields(record: &mut Map<String, Value>, scale: f64, step: f64) {
    let assets = 2.5e11 * scale * step;
    let liabilities = assets * 0.45;
    record.insert("MONETARYFUNDS".into(), round2(assets * 0.2));
    record.insert("ACCOUNTS_RECE".into(), round2(assets * 0.05));
    record.insert("INVENTORY".into(), round2(assets * 0.12));
    record.insert("TOTAL_ASSETS".into(), round2(assets));
    record.insert("TOTAL_LIABILITIES".into(), round2(liabilities));
    record.insert("TOTAL_EQUITY".into(), round2(assets - liabilities));
}

fn income_fields(record: &mut Map<String, Value>, scale: f64, step: f64) {
    let income = 1.2e10 * scale * step;
    record.insert("TOTAL_OPERATE_INCOME".into(), round2(income));
    record.insert("OPERATE_COST".into(), round2(income * 0.6));
    record.insert("OPERATE_PROFIT".into(), round2(income * 0.28));
    record.insert("NETPROFIT".into(), round2(income * 0.22));
    record.insert("PARENT_NETPROFIT".into(), round2(income * 0.21));
    record.insert("BASIC_EPS".into(), round2(2.5 * scale * step));
}

fn cash_flow_fields(record: &mut Map<String, Value>, scale: f64, step: f64) {
    let operating = 3.0e9 * scale * step;
    record.insert("NETCASH_OPERATE".into(), round2(operating));
    record.insert("NETCASH_INVEST".into(), round2(-operating * 0.4));
    record.insert("NETCASH_FINANCE".into(), round2(-operating * 0.3));
    record.insert("CCE_ADD".into(), round2(operating * 0.3));
}

fn profile(company: &Company) -> Table {
    let scale = seed(company);
    let total_shares = 1.5e9 * scale;
    let price = 20.0 * scale;

    let mut table = Table::new(["item", "value"]);
    for (item, value) in [
        ("股票代码", json!(company.code)),
        ("股票简称", json!(company.name)),
        ("总股本", round2(total_shares)),
        ("流通股", round2(total_shares * 0.9)),
        ("总市值", round2(total_shares * price)),
        ("流通市值", round2(total_shares * 0.9 * price)),
        ("行业", json!(company.industry)),
        ("上市时间", json!(company.listed)),
    ] {
        table.push_row(vec![json!(item), value]);
    }
    table
}

pub(crate) fn listing() -> Table {
    let mut table = Table::new(["code", "name"]);
    for company in UNIVERSE {
        table.push_row(vec![json!(company.code), json!(company.name)]);
    }
    table
}
