//! Slippage tolerance math.
//!
//! The tolerance is a decimal percentage so fractional values like `0.5`
//! stay exact. The minimum output is computed entirely in integers.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from slippage computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlippageError {
    #[error("invalid slippage {0}%: must be within [0, 100]")]
    InvalidSlippage(Decimal),
}

/// Returns `floor(expected * (100 - slippage_percent) / 100)`.
///
/// Fails with [`SlippageError::InvalidSlippage`] when the tolerance lies
/// outside `[0, 100]`; out-of-range values are never clamped.
pub fn min_output(expected: U256, slippage_percent: Decimal) -> Result<U256, SlippageError> {
    let negative = slippage_percent.is_sign_negative() && !slippage_percent.is_zero();
    if negative || slippage_percent > Decimal::ONE_HUNDRED {
        return Err(SlippageError::InvalidSlippage(slippage_percent));
    }

    // slippage = mantissa / 10^scale, so the kept fraction is
    // (100 * 10^scale - mantissa) / (100 * 10^scale).
    let mantissa = slippage_percent.mantissa().unsigned_abs();
    let denominator = 100u128 * 10u128.pow(slippage_percent.scale());
    let numerator = denominator - mantissa;

    let denominator = U256::from(denominator);
    let numerator = U256::from(numerator);

    // Split to keep every intermediate below 2^256.
    let quotient = expected / denominator;
    let remainder = expected % denominator;
    Ok(quotient * numerator + remainder * numerator / denominator)
}
