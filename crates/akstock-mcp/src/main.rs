//! akstock MCP Server - A-share financial data via Model Context Protocol
//!
//! # Usage
//!
//! ```bash
//! akstock-mcp-server
//! akstock-mcp-server --mock             # offline sample data
//! akstock-mcp-server --data-root /srv/akstock --log-file
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use akstock_core::{DataDir, ServerConfig};
use akstock_mcp::server::AkStockMcpServer;

const LOG_FILE_NAME: &str = "akstock-mcp.log";

/// akstock MCP Server - A-share financial data
#[derive(Parser, Debug)]
#[command(name = "akstock-mcp-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding data/ and logs/
    #[arg(long, env = "AKSTOCK_DATA_ROOT", default_value = ".")]
    data_root: PathBuf,

    /// Serve offline sample data instead of calling Eastmoney
    #[arg(long, env = "AKSTOCK_MOCK")]
    mock: bool,

    /// Upstream request timeout in milliseconds
    #[arg(long, env = "AKSTOCK_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Maximum upstream requests per second
    #[arg(long, env = "AKSTOCK_REQUESTS_PER_SECOND", default_value_t = 10)]
    requests_per_second: u32,

    /// Cache files older than this many days are removed at startup
    #[arg(long, env = "AKSTOCK_CACHE_RETENTION_DAYS", default_value_t = 7)]
    cache_retention_days: u64,

    /// Seconds a fetched stock listing is reused before refetching
    #[arg(long, env = "AKSTOCK_LISTING_TTL_SECS", default_value_t = 3600)]
    listing_ttl_secs: u64,

    /// Write logs to logs/akstock-mcp.log instead of stderr
    #[arg(long, env = "AKSTOCK_LOG_FILE")]
    log_file: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    // Read the UTC offset before any runtime threads exist.
    akstock_core::capture_local_offset();
    let args = Args::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = ServerConfig::default()
        .with_data_root(&args.data_root)
        .with_mock(args.mock)
        .with_request_timeout_ms(args.timeout_ms)
        .with_requests_per_second(args.requests_per_second)
        .with_cache_retention_days(args.cache_retention_days)
        .with_listing_ttl(Duration::from_secs(args.listing_ttl_secs));

    let dirs = config.data_dirs();
    dirs.ensure()?;

    init_logging(&args, dirs.logs().join(LOG_FILE_NAME))?;

    tracing::info!(
        data_root = %dirs.base().display(),
        mock = config.use_mock,
        "Starting akstock MCP Server"
    );

    let tools = config.build_tools();
    match tools
        .sink()
        .cleanup_old(config.cache_retention_days, DataDir::Cache)
    {
        Ok(removed) => tracing::info!(removed, "pruned cache directory"),
        Err(error) => tracing::warn!(%error, "cache cleanup failed"),
    }

    let server = AkStockMcpServer::new(tools).with_mock(config.use_mock);
    run_stdio_server(server).await
}

fn init_logging(args: &Args, log_path: PathBuf) -> anyhow::Result<()> {
    let filter = if args.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("akstock_mcp=debug,akstock_core=debug,rmcp=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("akstock_mcp=info,akstock_core=info,rmcp=warn"))
    };

    // stdout carries the protocol, so logs go to stderr or a file.
    if args.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

/// Run the server with stdio transport
async fn run_stdio_server(server: AkStockMcpServer) -> anyhow::Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    tracing::info!("Using stdio transport");

    let service = server.serve(stdio()).await?;

    tracing::info!("akstock MCP Server ready");
    tracing::info!(
        "Available tools: get_stock_financial_indicators, get_stock_balance_sheet, \
         get_stock_income_statement, get_stock_cash_flow, get_stock_main_indicators, \
         get_batch_stock_indicators, export_data_to_file, search_stock, get_all_stocks, \
         list_saved_files, cleanup_saved_files"
    );

    service.waiting().await?;

    Ok(())
}
