//! Source adapters.
//!
//! | Adapter | Upstream |
//! |---------|----------|
//! | [`EastmoneyAdapter`] | Eastmoney datacenter, quote and list APIs |
//!
//! An adapter built without a real HTTP client serves deterministic fixture
//! data instead of calling out.

mod eastmoney;
mod fixtures;

pub use eastmoney::EastmoneyAdapter;
