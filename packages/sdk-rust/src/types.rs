//! Plain data types shared by the client, the session and the CLI.

use std::fmt;
use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use crate::error::Error;
use crate::pda::AssociatedAccounts;

// ─── Swap direction ───────────────────────────────────────────────────────────

/// Direction of a swap relative to the pool's coin (base) token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapSide {
    /// Spend pc (quote), receive coin (base).
    Buy,
    /// Spend coin (base), receive pc (quote).
    Sell,
}

impl FromStr for SwapSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(SwapSide::Buy),
            "sell" => Ok(SwapSide::Sell),
            other => Err(Error::InvalidArgument(format!(
                "side must be 'buy' or 'sell', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for SwapSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SwapSide::Buy => "buy",
            SwapSide::Sell => "sell",
        })
    }
}

// ─── Reserves ─────────────────────────────────────────────────────────────────

/// Swap fee as `numerator / denominator` of the input amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRatio {
    pub denominator: u64,
    pub numerator:   u64,
}

impl FeeRatio {
    /// The fee in basis points, for display only.
    pub fn bps(&self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.numerator as f64 * 10_000.0 / self.denominator as f64
    }
}

/// Effective pool reserves observed at one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub coin: u128,
    pub pc:   u128,
    pub fees: FeeRatio,
    pub slot: u64,
}

/// A priced swap against one reserve snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub side:             SwapSide,
    pub amount_in:        u64,
    pub amount_out:       u64,
    /// Share of the input-side reserve the trade consumes, in percent.
    pub price_impact_pct: f64,
    pub reserves:         ReserveSnapshot,
}

/// Parameters for [`crate::AmmClient::swap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapParams {
    pub side:             SwapSide,
    pub amount_in:        u64,
    /// `0` disables the on-chain minimum-output guard.
    pub max_slippage_bps: u64,
}

/// Outcome of a submitted swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapResult {
    pub signature:      String,
    pub pool:           Pubkey,
    pub side:           SwapSide,
    pub amount_in:      u64,
    pub estimated_out:  u64,
    pub min_amount_out: u64,
}

// ─── Pool info ────────────────────────────────────────────────────────────────

/// Every address needed to quote and swap against one AMM v4 pool.
///
/// Built once by [`crate::AmmClient::pool_info`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolInfo {
    pub id:                   Pubkey,
    pub base_mint:            Pubkey,
    pub quote_mint:           Pubkey,
    pub lp_mint:              Pubkey,
    pub version:              u8,
    pub program_id:           Pubkey,
    pub authority:            Pubkey,
    pub open_orders:          Pubkey,
    pub target_orders:        Pubkey,
    pub base_vault:           Pubkey,
    pub quote_vault:          Pubkey,
    pub withdraw_queue:       Pubkey,
    pub lp_vault:             Pubkey,
    pub market_version:       u8,
    pub market_program_id:    Pubkey,
    pub market_id:            Pubkey,
    pub market_authority:     Pubkey,
    pub market_base_vault:    Pubkey,
    pub market_quote_vault:   Pubkey,
    pub market_bids:          Pubkey,
    pub market_asks:          Pubkey,
    pub market_event_queue:   Pubkey,
    /// Addresses derived from the market id, for cross-checking.
    pub associated:           AssociatedAccounts,
}

impl PoolInfo {
    /// Roles where the derived address differs from the one stored on chain,
    /// as `(role, stored, derived)`.
    pub fn associated_mismatches(&self) -> Vec<(&'static str, Pubkey, Pubkey)> {
        let a = &self.associated;
        [
            ("amm_id", self.id, a.amm_id),
            ("coin_vault", self.base_vault, a.coin_vault),
            ("pc_vault", self.quote_vault, a.pc_vault),
            ("lp_mint", self.lp_mint, a.lp_mint),
            ("temp_lp_token", self.lp_vault, a.temp_lp_token),
            ("target_orders", self.target_orders, a.target_orders),
            ("withdraw", self.withdraw_queue, a.withdraw),
            ("open_orders", self.open_orders, a.open_orders),
        ]
        .into_iter()
        .filter(|(_, stored, derived)| stored != derived)
        .collect()
    }

    /// `true` when `mint` is this pool's coin (base) token.
    pub fn is_base(&self, mint: &Pubkey) -> bool {
        self.base_mint == *mint
    }
}
