use crate::errors::AgentError;

/// Decimal places of the payment token (USDC).
pub const USDC_DECIMALS: u32 = 6;

/// Minimum fee in USD after scaling.
const MIN_FEE_USD: f64 = 0.001;

/// A settlement fee derived from a notional trade size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fee {
    /// Fee in USD, used for display.
    pub usd: f64,
    /// Fee in the payment token's smallest unit, used for exact matching
    /// against on-chain transfer values.
    pub smallest_unit: u64,
}

/// Derive the copy-trade service fee from a notional USD amount.
///
/// Starts at 1 basis point of notional, then repeatedly divides by 10 while
/// the fee is at least $0.50, so large notionals are squeezed into a small
/// display-precision band instead of producing a proportionally large fee.
/// The scaled fee is floored at $0.001 and converted to smallest units by
/// truncation, so the output is always >= 1000.
///
/// A zero amount floors to the minimum fee. Negative input is a contract
/// violation and is rejected rather than silently absolute-valued.
pub fn copy_trade_fee(amount_usd: f64) -> Result<Fee, AgentError> {
    if amount_usd < 0.0 || !amount_usd.is_finite() {
        return Err(AgentError::InvalidAmount(format!(
            "notional must be non-negative, got {amount_usd}"
        )));
    }

    let mut fee = amount_usd * 0.0001;
    while fee >= 0.5 {
        fee /= 10.0;
    }
    let fee = fee.max(MIN_FEE_USD);

    let smallest_unit = (fee * 10f64.powi(USDC_DECIMALS as i32)) as u64;

    Ok(Fee {
        usd: fee,
        smallest_unit,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
