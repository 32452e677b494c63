//! # akstock MCP Server
//!
//! Model Context Protocol server exposing Chinese A-share financial data
//! queries as tools: indicators, statements, company profile, search,
//! batch indicators, file export and saved-file maintenance.
//!
//! ## Quick Start
//!
//! ```bash
//! # Real Eastmoney data over stdio
//! akstock-mcp-server
//!
//! # Offline fixture data
//! akstock-mcp-server --mock --data-root /tmp/akstock
//! ```

pub mod server;

pub use server::AkStockMcpServer;

/// Server name for MCP protocol
pub const SERVER_NAME: &str = "akshare-stock-server";

/// Server version (same as crate version)
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
