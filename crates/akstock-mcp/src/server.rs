//! MCP server exposing the akstock tool operations.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::schemars::JsonSchema;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;

use akstock_core::{BatchArgs, StockTools};

use crate::{SERVER_NAME, SERVER_VERSION};

/// MCP server for A-share financial data
#[derive(Clone)]
pub struct AkStockMcpServer {
    tools: StockTools,
    mock: bool,
    tool_router: ToolRouter<Self>,
}

impl AkStockMcpServer {
    pub fn new(tools: StockTools) -> Self {
        Self {
            tools,
            mock: false,
            tool_router: Self::tool_router(),
        }
    }

    /// Mark the server as serving offline fixture data.
    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    pub fn tools(&self) -> &StockTools {
        &self.tools
    }

    /// Create a success result with text content
    pub fn text_result(text: impl Into<String>) -> CallToolResult {
        CallToolResult::success(vec![Content::text(text.into())])
    }
}

// ============================================================================
// Tool Parameter Types
// ============================================================================

fn default_indicator_type() -> String {
    String::from("all")
}

fn default_period() -> String {
    String::from("annual")
}

fn default_file_format() -> String {
    String::from("csv")
}

fn default_list_directory() -> String {
    String::from("exports")
}

fn default_cleanup_directory() -> String {
    String::from("cache")
}

fn default_list_limit() -> usize {
    10
}

fn default_max_age_days() -> u64 {
    7
}

/// Single-symbol indicator parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IndicatorParams {
    /// Six-digit stock code, e.g. 000001 or 600519
    pub symbol: String,
    /// One of basic, profit, growth, debt, operation, all
    #[serde(default = "default_indicator_type")]
    pub indicator_type: String,
}

/// Financial statement parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StatementParams {
    /// Six-digit stock code
    pub symbol: String,
    /// quarter or annual
    #[serde(default = "default_period")]
    pub period: String,
}

/// Symbol-only parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SymbolParams {
    /// Six-digit stock code
    pub symbol: String,
}

/// Batch indicator parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchIndicatorParams {
    /// Up to 20 six-digit stock codes
    pub symbols: Vec<String>,
    /// One of basic, profit, growth, debt, operation, all
    #[serde(default = "default_indicator_type")]
    pub indicator_type: String,
    /// Save the merged result to a file
    #[serde(default)]
    pub save_to_file: bool,
    /// Output path; generated under data/batch when omitted
    #[serde(default)]
    pub output_path: Option<String>,
    /// csv, excel or json
    #[serde(default = "default_file_format")]
    pub file_format: String,
}

/// Export parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExportParams {
    /// indicators, balance_sheet, income or cash_flow
    pub data_type: String,
    /// Six-digit stock code
    pub symbol: String,
    /// Output file path; generated under data/exports when empty
    #[serde(default)]
    pub output_path: Option<String>,
    /// csv, excel or json
    #[serde(default = "default_file_format")]
    pub file_format: String,
}

/// Search parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Code or name fragment
    pub query: String,
}

/// Saved-file listing parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListFilesParams {
    /// exports, cache, batch or all
    #[serde(default = "default_list_directory")]
    pub directory: String,
    /// Maximum number of files returned
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

/// Cleanup parameters
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CleanupParams {
    /// exports, cache, batch or all
    #[serde(default = "default_cleanup_directory")]
    pub directory: String,
    /// Files older than this many days are deleted
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl AkStockMcpServer {
    #[tool(
        description = "Get financial indicators for one A-share stock, optionally narrowed to a \
                       category: basic, profit, growth, debt, operation or all."
    )]
    pub async fn get_stock_financial_indicators(
        &self,
        Parameters(params): Parameters<IndicatorParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self
            .tools
            .financial_indicators(&params.symbol, &params.indicator_type)
            .await;
        Ok(Self::text_result(payload))
    }

    #[tool(description = "Get the balance sheet of an A-share stock (period: quarter or annual).")]
    pub async fn get_stock_balance_sheet(
        &self,
        Parameters(params): Parameters<StatementParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self.tools.balance_sheet(&params.symbol, &params.period).await;
        Ok(Self::text_result(payload))
    }

    #[tool(description = "Get the income statement of an A-share stock (period: quarter or annual).")]
    pub async fn get_stock_income_statement(
        &self,
        Parameters(params): Parameters<StatementParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self
            .tools
            .income_statement(&params.symbol, &params.period)
            .await;
        Ok(Self::text_result(payload))
    }

    #[tool(description = "Get the cash flow statement of an A-share stock (period: quarter or annual).")]
    pub async fn get_stock_cash_flow(
        &self,
        Parameters(params): Parameters<StatementParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self.tools.cash_flow(&params.symbol, &params.period).await;
        Ok(Self::text_result(payload))
    }

    #[tool(
        description = "Get main indicators of an A-share stock: share capital, market value, \
                       industry and listing date."
    )]
    pub async fn get_stock_main_indicators(
        &self,
        Parameters(params): Parameters<SymbolParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self.tools.main_indicators(&params.symbol).await;
        Ok(Self::text_result(payload))
    }

    #[tool(
        description = "Get financial indicators for up to 20 stocks concurrently. Failed symbols \
                       are reported individually. Optionally saves the merged table to a file."
    )]
    pub async fn get_batch_stock_indicators(
        &self,
        Parameters(params): Parameters<BatchIndicatorParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = BatchArgs {
            symbols: &params.symbols,
            indicator_type: &params.indicator_type,
            save_to_file: params.save_to_file,
            output_path: params.output_path.as_deref(),
            file_format: &params.file_format,
        };
        let payload = self.tools.batch_indicators(args).await;
        Ok(Self::text_result(payload))
    }

    #[tool(
        description = "Export indicators, balance_sheet, income or cash_flow data of a stock to \
                       a csv, excel or json file."
    )]
    pub async fn export_data_to_file(
        &self,
        Parameters(params): Parameters<ExportParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self
            .tools
            .export_data(
                &params.data_type,
                &params.symbol,
                params.output_path.as_deref(),
                &params.file_format,
            )
            .await;
        Ok(Self::text_result(payload))
    }

    #[tool(description = "Search A-share stocks by code or name fragment (at most 50 results).")]
    pub async fn search_stock(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self.tools.search(&params.query).await;
        Ok(Self::text_result(payload))
    }

    #[tool(description = "List every A-share stock code and name.")]
    pub async fn get_all_stocks(&self) -> Result<CallToolResult, McpError> {
        let payload = self.tools.all_stocks().await;
        Ok(Self::text_result(payload))
    }

    #[tool(description = "List recently saved files in exports, cache, batch or all directories.")]
    pub async fn list_saved_files(
        &self,
        Parameters(params): Parameters<ListFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self
            .tools
            .list_saved_files(&params.directory, params.limit)
            .await;
        Ok(Self::text_result(payload))
    }

    #[tool(description = "Delete saved files older than max_age_days from a data directory.")]
    pub async fn cleanup_saved_files(
        &self,
        Parameters(params): Parameters<CleanupParams>,
    ) -> Result<CallToolResult, McpError> {
        let payload = self
            .tools
            .cleanup_saved_files(&params.directory, params.max_age_days)
            .await;
        Ok(Self::text_result(payload))
    }
}

#[tool_handler]
impl ServerHandler for AkStockMcpServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = if self.mock {
            "A-share financial data server (MOCK MODE) - serves fixed sample data for a small \
             set of stocks such as 000001, 600519 and 300750."
        } else {
            "A-share financial data server - query indicators, statements and company profiles, \
             search stocks, batch-fetch indicators and export results to csv, excel or json."
        };

        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
                title: Some("A-share Financial Data".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(instructions.to_string()),
        }
    }
}
