pub mod message;
pub mod trade;

pub use message::AgentMessage;
pub use trade::{CopyTrade, TradeStatus};
