//! Supported chain names and per-chain USDC contract addresses.

/// Chains the analysis flow understands, as (alias, chain id) pairs.
pub const SUPPORTED_CHAINS: &[(&str, u64)] = &[
    ("ethereum", 1),
    ("eth", 1),
    ("arbitrum", 42161),
    ("arb", 42161),
    ("bnb chain", 56),
    ("bnb", 56),
    ("bsc", 56),
    ("binance smart chain", 56),
    ("gnosis", 100),
    ("optimism", 10),
    ("polygon", 137),
    ("matic", 137),
    ("base", 8453),
    ("zksync era", 324),
    ("linea", 59144),
    ("avalanche", 43114),
    ("avax", 43114),
];

/// Default chain used when no analysis context is available.
pub const DEFAULT_CHAIN_NAME: &str = "polygon";
pub const DEFAULT_CHAIN_ID: u64 = 137;

/// Polygon Amoy, where fee payments are watched and rewards are settled.
pub const AMOY_CHAIN_ID: u64 = 80002;

/// Resolve a chain name (or alias) to its chain id.
pub fn chain_id_for_name(name: &str) -> Option<u64> {
    let name = name.trim().to_lowercase();
    SUPPORTED_CHAINS
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, id)| *id)
}

/// Canonical USDC contract address per chain, used as the stable reference
/// for price lookups.
pub fn usdc_address(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        137 => Some("0x3c499c542cEF5E3811e1192ce70d8cC03d59Cf01"),
        42161 => Some("0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
        10 => Some("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
        8453 => Some("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        43114 => Some("0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"),
        _ => None,
    }
}

/// All supported chain aliases, for LLM prompt construction.
pub fn supported_chain_names() -> Vec<&'static str> {
    SUPPORTED_CHAINS.iter().map(|(alias, _)| *alias).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_aliases_case_insensitively() {
        assert_eq!(chain_id_for_name("Polygon"), Some(137));
        assert_eq!(chain_id_for_name("MATIC"), Some(137));
        assert_eq!(chain_id_for_name("  eth "), Some(1));
    }

    #[test]
    fn unknown_chain_is_none() {
        assert_eq!(chain_id_for_name("dogechain"), None);
    }

    #[test]
    fn usdc_known_for_major_chains() {
        for id in [1, 137, 42161, 10, 8453, 43114] {
            assert!(usdc_address(id).is_some());
        }
        assert!(usdc_address(100).is_none());
    }
}
