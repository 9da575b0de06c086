pub mod context;
pub mod message_log;
pub mod trade_registry;

pub use context::{AnalysisContext, ChainContext};
pub use message_log::MessageLog;
pub use trade_registry::TradeRegistry;
