use std::sync::LazyLock;

use regex::Regex;

/// Classified chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatIntent {
    /// Portfolio analysis of a wallet; the chain name is resolved from the
    /// full message text separately.
    Analyze { wallet: String },
    /// Copy-trade initiation for a token, paying from `user_wallet`.
    CopyTrade {
        token_symbol: String,
        user_wallet: String,
        volume_usd: Option<f64>,
    },
    /// Status query for a previously issued payment id.
    TradeStatus { payment_id: String },
    Unknown,
}

static ANALYZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)analyze\s+(0x[a-fA-F0-9]{40})").unwrap());

static COPY_TRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)copytrade\s+([a-zA-Z0-9]+)\s+with address\s+(0x[a-fA-F0-9]{40})(?:\s+with volume\s+([\d\.]+)\s+usd)?",
    )
    .unwrap()
});

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)status\s+(?:of\s+)?`?([0-9a-f]{10})`?").unwrap());

/// Match a chat message against the supported command shapes.
///
/// Copy-trade is checked before analysis so that a message containing both
/// verbs resolves to the more specific command.
pub fn parse_intent(message: &str) -> ChatIntent {
    if let Some(caps) = COPY_TRADE_RE.captures(message) {
        let volume_usd = caps.get(3).and_then(|m| m.as_str().parse::<f64>().ok());
        return ChatIntent::CopyTrade {
            token_symbol: caps[1].to_uppercase(),
            user_wallet: caps[2].to_string(),
            volume_usd,
        };
    }

    if let Some(caps) = ANALYZE_RE.captures(message) {
        return ChatIntent::Analyze {
            wallet: caps[1].to_string(),
        };
    }

    if let Some(caps) = STATUS_RE.captures(message) {
        return ChatIntent::TradeStatus {
            payment_id: caps[1].to_string(),
        };
    }

    ChatIntent::Unknown
}

/// Regex fallback for chain extraction when the LLM is unavailable:
/// looks for "on <chain name>" in the message.
pub fn chain_name_fallback(message: &str) -> Option<String> {
    static CHAIN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)on\s+(\w+\s*\w*)").unwrap());
    CHAIN_RE
        .captures(message)
        .map(|caps| caps[1].trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B";

    #[test]
    fn parses_analysis_request() {
        let intent = parse_intent(&format!("please analyze {WALLET} on polygon"));
        assert_eq!(
            intent,
            ChatIntent::Analyze {
                wallet: WALLET.to_string()
            }
        );
    }

    #[test]
    fn parses_copy_trade_without_volume() {
        let intent = parse_intent(&format!("copytrade pepe with address {WALLET}"));
        assert_eq!(
            intent,
            ChatIntent::CopyTrade {
                token_symbol: "PEPE".into(),
                user_wallet: WALLET.to_string(),
                volume_usd: None,
            }
        );
    }

    #[test]
    fn parses_copy_trade_with_volume() {
        let intent = parse_intent(&format!(
            "CopyTrade LINK with address {WALLET} with volume 250.5 usd"
        ));
        assert_eq!(
            intent,
            ChatIntent::CopyTrade {
                token_symbol: "LINK".into(),
                user_wallet: WALLET.to_string(),
                volume_usd: Some(250.5),
            }
        );
    }

    #[test]
    fn parses_status_query() {
        let intent = parse_intent("what is the status of `a1b2c3d4e5`?");
        assert_eq!(
            intent,
            ChatIntent::TradeStatus {
                payment_id: "a1b2c3d4e5".into()
            }
        );
    }

    #[test]
    fn short_wallet_is_not_an_analysis_request() {
        assert_eq!(parse_intent("analyze 0x1234"), ChatIntent::Unknown);
    }

    #[test]
    fn small_talk_is_unknown() {
        assert_eq!(parse_intent("hello there"), ChatIntent::Unknown);
    }

    #[test]
    fn chain_fallback_extracts_trailing_chain() {
        assert_eq!(
            chain_name_fallback("analyze 0xabc on bnb chain").as_deref(),
            Some("bnb chain")
        );
        assert_eq!(chain_name_fallback("copytrade pepe"), None);
    }
}
