//! Constant-product swap math.
//!
//! Exact integer arithmetic in 256 bits, rounding down, so the quote never
//! promises more than the pool pays out.

use ethnum::U256;

use crate::error::{Error, Result};
use crate::types::{FeeRatio, ReserveSnapshot, SwapSide};

/// Basis-point denominator for slippage tolerances.
pub const BPS_DENOMINATOR: u64 = 10_000;

// ─── Quote ────────────────────────────────────────────────────────────────────

/// Output of a constant-product swap after the input-side fee.
///
/// ```text
/// net = amount_in * (den - num)
/// out = floor(reserve_out * net / (reserve_in * den + net))
/// ```
pub fn constant_product_out(
    amount_in:   u64,
    reserve_in:  u128,
    reserve_out: u128,
    fees:        FeeRatio,
) -> Result<u64> {
    if fees.denominator == 0 {
        return Err(Error::InvalidArgument("fee denominator is zero".into()));
    }
    if fees.numerator > fees.denominator {
        return Err(Error::InvalidArgument(format!(
            "fee {}/{} exceeds 100%",
            fees.numerator, fees.denominator
        )));
    }

    let den = U256::from(fees.denominator);
    let keep = U256::from(fees.denominator - fees.numerator);
    let net = U256::from(amount_in) * keep;

    let denominator = U256::from(reserve_in) * den + net;
    if denominator == U256::ZERO {
        return Err(Error::NoLiquidity);
    }
    let out = U256::from(reserve_out) * net / denominator;

    if out > U256::from(u64::MAX) {
        return Err(Error::MathOverflow);
    }
    Ok(out.as_u64())
}

/// Quote a swap of `amount_in` against a reserve snapshot.
///
/// [`SwapSide::Buy`] spends pc and receives coin; [`SwapSide::Sell`] the reverse.
pub fn amount_out(amount_in: u64, side: SwapSide, reserves: &ReserveSnapshot) -> Result<u64> {
    let (reserve_in, reserve_out) = match side {
        SwapSide::Buy => (reserves.pc, reserves.coin),
        SwapSide::Sell => (reserves.coin, reserves.pc),
    };
    constant_product_out(amount_in, reserve_in, reserve_out, reserves.fees)
}

// ─── Slippage ─────────────────────────────────────────────────────────────────

/// Lowest acceptable output given a slippage tolerance in basis points.
pub fn min_amount_out(estimated_out: u64, slippage_bps: u64) -> Result<u64> {
    if slippage_bps > BPS_DENOMINATOR {
        return Err(Error::InvalidArgument(format!(
            "slippage {slippage_bps} bps exceeds 100%"
        )));
    }
    let kept = estimated_out as u128 * (BPS_DENOMINATOR - slippage_bps) as u128
        / BPS_DENOMINATOR as u128;
    Ok(kept as u64)
}

/// Share of the input-side reserve consumed by the trade, in percent.
pub fn price_impact_pct(amount_in: u64, side: SwapSide, reserves: &ReserveSnapshot) -> f64 {
    let reserve_in = match side {
        SwapSide::Buy => reserves.pc,
        SwapSide::Sell => reserves.coin,
    } as f64;
    let amount = amount_in as f64;
    if reserve_in + amount == 0.0 {
        return 0.0;
    }
    amount / (reserve_in + amount) * 100.0
}
