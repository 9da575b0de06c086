pub mod client;
pub mod types;

pub use client::{PortfolioClient, PortfolioClientError};
pub use types::{PortfolioOverview, TokenInfo};
