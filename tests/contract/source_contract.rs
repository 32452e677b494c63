use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use akstock_core::{
    DataSource, EastmoneyAdapter, HttpClient, HttpError, HttpRequest, HttpResponse,
    ReportKind, ReportRequest, SourceErrorKind, Symbol, Table,
};

const ALL_KINDS: [ReportKind; 5] = [
    ReportKind::Indicators,
    ReportKind::BalanceSheet,
    ReportKind::Income,
    ReportKind::CashFlow,
    ReportKind::Profile,
];

fn offline_source() -> Arc<dyn DataSource> {
    Arc::new(EastmoneyAdapter::default())
}

fn request(code: &str, kind: ReportKind) -> ReportRequest {
    ReportRequest::new(Symbol::parse(code).expect("valid symbol"), kind)
}

fn assert_rectangular(table: &Table, context: &str) {
    for row in table.rows() {
        assert_eq!(row.len(), table.columns().len(), "{context}: ragged row");
    }
}

#[test]
fn every_report_kind_returns_rows_for_a_listed_symbol() {
    let source = offline_source();

    for kind in ALL_KINDS {
        let table = block_on(source.report(request("600519", kind)))
            .unwrap_or_else(|error| panic!("{kind} failed: {error}"));
        assert!(!table.is_empty(), "{kind}: expected rows");
        assert_rectangular(&table, kind.as_str());
    }
}

#[test]
fn unknown_symbols_yield_empty_tables_not_errors() {
    let source = offline_source();

    for kind in ALL_KINDS {
        let table = block_on(source.report(request("999999", kind)))
            .unwrap_or_else(|error| panic!("{kind} failed: {error}"));
        assert!(table.is_empty(), "{kind}: expected no rows");
    }
}

#[test]
fn statements_carry_identity_and_period_columns() {
    let source = offline_source();

    for kind in [ReportKind::Indicators, ReportKind::BalanceSheet, ReportKind::Income, ReportKind::CashFlow] {
        let table = block_on(source.report(request("000001", kind))).expect("report");
        for column in ["股票代码", "股票名称", "报告期"] {
            assert!(table.has_column(column), "{kind}: missing {column}");
        }
    }
}

#[test]
fn listing_has_code_and_name_columns() {
    let table = block_on(offline_source().listing()).expect("listing");

    assert_eq!(table.columns(), ["code", "name"]);
    assert!(table.len() >= 8);
    assert_rectangular(&table, "listing");
    for row in table.rows() {
        let code = row[0].as_str().expect("code is text");
        assert!(akstock_core::validate_symbol(code), "bad listed code {code}");
    }
}

#[test]
fn source_id_is_stable() {
    assert_eq!(offline_source().id(), "eastmoney");
}

// -----------------------------------------------------------------------------
// Real-client path against a canned transport
// -----------------------------------------------------------------------------

struct CannedTransport {
    status: u16,
    body: &'static str,
}

impl HttpClient for CannedTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let _ = request;
        Box::pin(async move {
            Ok(HttpResponse {
                status: self.status,
                body: self.body.to_owned(),
            })
        })
    }
}

struct FailingTransport;

impl HttpClient for FailingTransport {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async { Err(HttpError::new("connection refused")) })
    }
}

#[tokio::test]
async fn real_client_maps_transport_failures_to_unavailable() {
    let adapter = EastmoneyAdapter::with_http_client(Arc::new(FailingTransport));
    assert!(adapter.is_real_client());

    let error = adapter
        .report(request("600519", ReportKind::Income))
        .await
        .expect_err("transport failure must surface");
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(error.retryable());
}

#[tokio::test]
async fn real_client_maps_429_to_rate_limited() {
    let adapter = EastmoneyAdapter::with_http_client(Arc::new(CannedTransport {
        status: 429,
        body: "",
    }));

    let error = adapter.listing().await.expect_err("429 must surface");
    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
}

#[tokio::test]
async fn real_client_relabels_statement_identity_columns() {
    let adapter = EastmoneyAdapter::with_http_client(Arc::new(CannedTransport {
        status: 200,
        body: r#"{"success":true,"result":{"data":[
            {"SECURITY_CODE":"000001","SECURITY_NAME_ABBR":"平安银行","REPORT_DATE_NAME":"2024中报","TOTAL_ASSETS":5.7e12}
        ]}}"#,
    }));

    let table = adapter
        .report(request("000001", ReportKind::BalanceSheet))
        .await
        .expect("parsed");
    assert_eq!(table.columns(), ["股票代码", "股票名称", "报告期", "TOTAL_ASSETS"]);
}

fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
    unsafe { Waker::from_raw(noop_raw_waker()) }
}

fn noop_raw_waker() -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
}

unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
    noop_raw_waker()
}

unsafe fn noop_raw_waker_wake(_: *const ()) {}

unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

unsafe fn noop_raw_waker_drop(_: *const ()) {}

static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
    noop_raw_waker_clone,
    noop_raw_waker_wake,
    noop_raw_waker_wake_by_ref,
    noop_raw_waker_drop,
);
