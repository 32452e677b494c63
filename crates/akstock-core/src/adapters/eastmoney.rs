use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::fixtures;
use crate::data_source::{DataSource, ReportRequest, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::{ReportKind, Symbol, Table};

const DATACENTER_URL: &str = "https://datacenter.eastmoney.com/securities/api/data/v1/get";
const QUOTE_URL: &str = "https://push2.eastmoney.com/api/qt/stock/get";
const LISTING_URL: &str = "https://82.push2.eastmoney.com/api/qt/clist/get";
const REFERER: &str = "https://emweb.securities.eastmoney.com/";

/// Market filter covering Shanghai and Shenzhen main boards, ChiNext, STAR and Beijing.
const A_SHARE_MARKETS: &str = "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23,m:0 t:81 s:2048";

const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Labels shared by every datacenter report.
const COMMON_LABELS: &[(&str, &str)] = &[
    ("SECURITY_CODE", "股票代码"),
    ("SECURITY_NAME_ABBR", "股票名称"),
    ("REPORT_DATE_NAME", "报告期"),
    ("REPORT_DATE", "报告日期"),
    ("REPORT_TYPE", "报告类型"),
    ("NOTICE_DATE", "公告日期"),
    ("CURRENCY", "币种"),
];

const INDICATOR_LABELS: &[(&str, &str)] = &[
    ("EPSJB", "基本每股收益"),
    ("BPS", "每股净资产"),
    ("MGJYXJJE", "每股经营现金流"),
    ("TOTALOPERATEREVE", "营业收入"),
    ("TOTALOPERATEREVETZ", "营业收入同比"),
    ("YYZSRGDHBZC", "营业收入环比"),
    ("PARENTNETPROFIT", "净利润"),
    ("PARENTNETPROFITTZ", "净利润同比"),
    ("NETPROFITRPHBZC", "净利润环比"),
    ("ROEJQ", "净资产收益率"),
    ("XSMLL", "毛利率"),
    ("XSJLL", "净利率"),
    ("ZCFZL", "资产负债率"),
    ("LD", "流动比率"),
    ("SD", "速动比率"),
    ("TOAZZL", "总资产周转率"),
    ("CHZZL", "存货周转率"),
    ("YSZKZZL", "应收账款周转率"),
];

const PROFILE_FIELDS: &[(&str, &str)] = &[
    ("f57", "股票代码"),
    ("f58", "股票简称"),
    ("f84", "总股本"),
    ("f85", "流通股"),
    ("f116", "总市值"),
    ("f117", "流通市值"),
    ("f127", "行业"),
    ("f189", "上市时间"),
];

impl ReportKind {
    const fn datacenter_report(self) -> Option<&'static str> {
        match self {
            Self::Indicators => Some("RPT_F10_FINANCE_MAINFINADATA"),
            Self::BalanceSheet => Some("RPT_F10_FINANCE_GBALANCE"),
            Self::Income => Some("RPT_F10_FINANCE_GINCOME"),
            Self::CashFlow => Some("RPT_F10_FINANCE_GCASHFLOW"),
            Self::Profile => None,
        }
    }
}

/// Eastmoney adapter supporting both real API calls and offline fixture mode.
#[derive(Clone)]
pub struct EastmoneyAdapter {
    http_client: Arc<dyn HttpClient>,
    limiter: Arc<DirectRateLimiter>,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for EastmoneyAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            limiter: Arc::new(rate_limiter(DEFAULT_REQUESTS_PER_SECOND)),
            timeout_ms: 10_000,
            use_real_api: false,
        }
    }
}

impl EastmoneyAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.limiter = Arc::new(rate_limiter(requests_per_second));
        self
    }

    pub fn is_real_client(&self) -> bool {
        self.use_real_api
    }

    async fn get_json<T>(&self, request: HttpRequest) -> Result<T, SourceError>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.limiter.until_ready().await;

        let request = request
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);
        tracing::debug!(url = %request.full_url(), "eastmoney request");

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.retryable() {
                SourceError::unavailable(format!("eastmoney transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("eastmoney transport error: {}", error.message()))
            }
        })?;

        if response.status == 429 {
            return Err(SourceError::rate_limited("eastmoney returned status 429"));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "eastmoney returned status {}",
                response.status
            )));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| SourceError::parse(format!("failed to parse eastmoney response: {e}")))
    }

    async fn fetch_datacenter(
        &self,
        symbol: &Symbol,
        kind: ReportKind,
        report_name: &str,
    ) -> Result<Table, SourceError> {
        let request = HttpRequest::get(DATACENTER_URL)
            .with_query("reportName", report_name)
            .with_query("columns", "ALL")
            .with_query("filter", format!("(SECUCODE=\"{}\")", symbol.secucode()))
            .with_query("pageNumber", "1")
            .with_query("pageSize", "200")
            .with_query("sortColumns", "REPORT_DATE")
            .with_query("sortTypes", "-1")
            .with_query("source", "HSF10")
            .with_query("client", "PC");

        let response: DatacenterResponse = self.get_json(request).await?;
        let records = match response.result {
            Some(result) => result.data,
            // The datacenter answers "no data" with success=false and a null result.
            None if !response.success => Vec::new(),
            None => {
                return Err(SourceError::parse(format!(
                    "eastmoney datacenter response without result: {}",
                    response.message.unwrap_or_default()
                )))
            }
        };

        Ok(labelled_table(records, kind))
    }

    async fn fetch_profile(&self, symbol: &Symbol) -> Result<Table, SourceError> {
        let fields = PROFILE_FIELDS
            .iter()
            .map(|(field, _)| *field)
            .collect::<Vec<_>>()
            .join(",");
        let request = HttpRequest::get(QUOTE_URL)
            .with_query("fltt", "2")
            .with_query("invt", "2")
            .with_query("fields", fields)
            .with_query("secid", symbol.secid());

        let response: QuoteResponse = self.get_json(request).await?;
        let mut table = Table::new(["item", "value"]);
        if let Some(data) = response.data {
            for (field, label) in PROFILE_FIELDS {
                let value = data.get(*field).cloned().unwrap_or(Value::Null);
                table.push_row(vec![Value::String((*label).to_owned()), value]);
            }
        }
        Ok(table)
    }

    async fn fetch_listing(&self) -> Result<Table, SourceError> {
        let request = HttpRequest::get(LISTING_URL)
            .with_query("pn", "1")
            .with_query("pz", "10000")
            .with_query("po", "1")
            .with_query("np", "1")
            .with_query("fltt", "2")
            .with_query("invt", "2")
            .with_query("fid", "f12")
            .with_query("fs", A_SHARE_MARKETS)
            .with_query("fields", "f12,f14");

        let response: ListingResponse = self.get_json(request).await?;
        let mut table = Table::new(["code", "name"]);
        for entry in response.data.map(|data| data.diff).unwrap_or_default() {
            table.push_row(vec![Value::String(entry.f12), Value::String(entry.f14)]);
        }
        Ok(table)
    }
}

impl DataSource for EastmoneyAdapter {
    fn id(&self) -> &'static str {
        "eastmoney"
    }

    fn report<'a>(&'a self, req: ReportRequest) -> SourceFuture<'a, Table> {
        Box::pin(async move {
            if !self.is_real_client() {
                return Ok(fixtures::report(&req.symbol, req.kind));
            }

            match req.kind.datacenter_report() {
                Some(report_name) => {
                    self.fetch_datacenter(&req.symbol, req.kind, report_name)
                        .await
                }
                None => self.fetch_profile(&req.symbol).await,
            }
        })
    }

    fn listing<'a>(&'a self) -> SourceFuture<'a, Table> {
        Box::pin(async move {
            if !self.is_real_client() {
                return Ok(fixtures::listing());
            }
            self.fetch_listing().await
        })
    }
}

fn rate_limiter(requests_per_second: u32) -> DirectRateLimiter {
    let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    RateLimiter::direct(Quota::per_second(per_second))
}

/// Build a table from datacenter records and swap field codes for native labels.
pub(crate) fn labelled_table(records: Vec<Map<String, Value>>, kind: ReportKind) -> Table {
    let mut table = Table::from_records(records);
    table.relabel(|code| {
        let specific: &[(&str, &str)] = match kind {
            ReportKind::Indicators => INDICATOR_LABELS,
            _ => &[],
        };
        COMMON_LABELS
            .iter()
            .chain(specific)
            .find(|(field, _)| *field == code)
            .map(|(_, label)| *label)
    });
    table
}

#[derive(Debug, Deserialize)]
struct DatacenterResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<DatacenterResult>,
}

#[derive(Debug, Deserialize)]
struct DatacenterResult {
    #[serde(default)]
    data: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    data: Option<ListingData>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    diff: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    f12: String,
    f14: String,
}
