//! Typed views over decoded on-chain accounts.
//!
//! Each `parse_*` function decodes raw bytes with the matching registry
//! layout and lifts the generic [`Record`] into a plain struct, so the rest
//! of the SDK never touches field names.

use solana_sdk::pubkey::Pubkey;

use crate::decode::{decode, FlagBits, Record};
use crate::error::Result;
use crate::schema::{AMM_INFO_V4, MARKET_STATE_V2, OPEN_ORDERS, TOKEN_ACCOUNT};

// ─── AMM v4 pool ──────────────────────────────────────────────────────────────

/// A numerator / denominator pair as stored on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub numerator:   u64,
    pub denominator: u64,
}

/// Deserialized Raydium AMM v4 pool state (752 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRecord {
    pub status:                  u64,
    pub nonce:                   u64,
    pub order_num:               u64,
    pub depth:                   u64,
    pub coin_decimals:           u64,
    pub pc_decimals:             u64,
    pub state:                   u64,
    pub reset_flag:              u64,
    pub min_size:                u64,
    pub vol_max_cut_ratio:       u64,
    pub amount_wave_ratio:       u64,
    pub coin_lot_size:           u64,
    pub pc_lot_size:             u64,
    pub min_price_multiplier:    u64,
    pub max_price_multiplier:    u64,
    pub system_decimals_value:   u64,
    pub min_separate:            Ratio,
    pub trade_fee:               Ratio,
    pub pnl:                     Ratio,
    pub swap_fee:                Ratio,
    /// PnL owed to the protocol but still sitting in the coin vault.
    pub need_take_pnl_coin:      u64,
    /// PnL owed to the protocol but still sitting in the pc vault.
    pub need_take_pnl_pc:        u64,
    pub total_pnl_pc:            u64,
    pub total_pnl_coin:          u64,
    pub pool_total_deposit_pc:   u128,
    pub pool_total_deposit_coin: u128,
    /// Cumulative coin swapped into the pool.
    pub swap_coin_in_amount:     u128,
    /// Cumulative pc paid out for coin-in swaps.
    pub swap_pc_out_amount:      u128,
    pub swap_coin_to_pc_fee:     u64,
    pub swap_pc_in_amount:       u128,
    pub swap_coin_out_amount:    u128,
    pub swap_pc_to_coin_fee:     u64,
    pub coin_vault:              Pubkey,
    pub pc_vault:                Pubkey,
    pub coin_mint:               Pubkey,
    pub pc_mint:                 Pubkey,
    pub lp_mint:                 Pubkey,
    pub open_orders:             Pubkey,
    pub market:                  Pubkey,
    pub market_program_id:       Pubkey,
    pub target_orders:           Pubkey,
    pub withdraw_queue:          Pubkey,
    pub temp_lp_token_account:   Pubkey,
    pub amm_owner:               Pubkey,
    pub pnl_owner:               Pubkey,
}

impl PoolRecord {
    pub fn from_record(r: &Record) -> Result<Self> {
        let ratio = |num: &str, den: &str| -> Result<Ratio> {
            Ok(Ratio { numerator: r.u64(num)?, denominator: r.u64(den)? })
        };
        Ok(Self {
            status:                  r.u64("status")?,
            nonce:                   r.u64("nonce")?,
            order_num:               r.u64("orderNum")?,
            depth:                   r.u64("depth")?,
            coin_decimals:           r.u64("coinDecimals")?,
            pc_decimals:             r.u64("pcDecimals")?,
            state:                   r.u64("state")?,
            reset_flag:              r.u64("resetFlag")?,
            min_size:                r.u64("minSize")?,
            vol_max_cut_ratio:       r.u64("volMaxCutRatio")?,
            amount_wave_ratio:       r.u64("amountWaveRatio")?,
            coin_lot_size:           r.u64("coinLotSize")?,
            pc_lot_size:             r.u64("pcLotSize")?,
            min_price_multiplier:    r.u64("minPriceMultiplier")?,
            max_price_multiplier:    r.u64("maxPriceMultiplier")?,
            system_decimals_value:   r.u64("systemDecimalsValue")?,
            min_separate:            ratio("minSeparateNumerator", "minSeparateDenominator")?,
            trade_fee:               ratio("tradeFeeNumerator", "tradeFeeDenominator")?,
            pnl:                     ratio("pnlNumerator", "pnlDenominator")?,
            swap_fee:                ratio("swapFeeNumerator", "swapFeeDenominator")?,
            need_take_pnl_coin:      r.u64("needTakePnlCoin")?,
            need_take_pnl_pc:        r.u64("needTakePnlPc")?,
            total_pnl_pc:            r.u64("totalPnlPc")?,
            total_pnl_coin:          r.u64("totalPnlCoin")?,
            pool_total_deposit_pc:   r.u128("poolTotalDepositPc")?,
            pool_total_deposit_coin: r.u128("poolTotalDepositCoin")?,
            swap_coin_in_amount:     r.u128("swapCoinInAmount")?,
            swap_pc_out_amount:      r.u128("swapPcOutAmount")?,
            swap_coin_to_pc_fee:     r.u64("swapCoin2PcFee")?,
            swap_pc_in_amount:       r.u128("swapPcInAmount")?,
            swap_coin_out_amount:    r.u128("swapCoinOutAmount")?,
            swap_pc_to_coin_fee:     r.u64("swapPc2CoinFee")?,
            coin_vault:              r.pubkey("poolCoinTokenAccount")?,
            pc_vault:                r.pubkey("poolPcTokenAccount")?,
            coin_mint:               r.pubkey("coinMintAddress")?,
            pc_mint:                 r.pubkey("pcMintAddress")?,
            lp_mint:                 r.pubkey("lpMintAddress")?,
            open_orders:             r.pubkey("ammOpenOrders")?,
            market:                  r.pubkey("serumMarket")?,
            market_program_id:       r.pubkey("serumProgramId")?,
            target_orders:           r.pubkey("ammTargetOrders")?,
            withdraw_queue:          r.pubkey("poolWithdrawQueue")?,
            temp_lp_token_account:   r.pubkey("poolTempLpTokenAccount")?,
            amm_owner:               r.pubkey("ammOwner")?,
            pnl_owner:               r.pubkey("pnlOwner")?,
        })
    }
}

/// Deserialize an AMM v4 pool account.
pub fn parse_pool(data: &[u8]) -> Result<PoolRecord> {
    PoolRecord::from_record(&decode(data, &AMM_INFO_V4)?)
}

// ─── Serum market ─────────────────────────────────────────────────────────────

/// Serum account flag bits shared by markets and open-orders accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountFlags {
    pub initialized:   bool,
    pub market:        bool,
    pub open_orders:   bool,
    pub request_queue: bool,
    pub event_queue:   bool,
    pub bids:          bool,
    pub asks:          bool,
}

impl From<FlagBits> for AccountFlags {
    fn from(bits: FlagBits) -> Self {
        Self {
            initialized:   bits.get("initialized"),
            market:        bits.get("market"),
            open_orders:   bits.get("open_orders"),
            request_queue: bits.get("request_queue"),
            event_queue:   bits.get("event_queue"),
            bids:          bits.get("bids"),
            asks:          bits.get("asks"),
        }
    }
}

/// Deserialized Serum v3 market state (388 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketRecord {
    pub flags:                    AccountFlags,
    pub own_address:              Pubkey,
    pub vault_signer_nonce:       u64,
    pub base_mint:                Pubkey,
    pub quote_mint:               Pubkey,
    pub base_vault:               Pubkey,
    pub base_deposits_total:      u64,
    pub base_fees_accrued:        u64,
    pub quote_vault:              Pubkey,
    pub quote_deposits_total:     u64,
    pub quote_fees_accrued:       u64,
    pub quote_dust_threshold:     u64,
    pub request_queue:            Pubkey,
    pub event_queue:              Pubkey,
    pub bids:                     Pubkey,
    pub asks:                     Pubkey,
    pub base_lot_size:            u64,
    pub quote_lot_size:           u64,
    pub fee_rate_bps:             u64,
    pub referrer_rebates_accrued: u64,
}

impl MarketRecord {
    pub fn from_record(r: &Record) -> Result<Self> {
        Ok(Self {
            flags:                    r.flags("accountFlags")?.into(),
            own_address:              r.pubkey("ownAddress")?,
            vault_signer_nonce:       r.u64("vaultSignerNonce")?,
            base_mint:                r.pubkey("baseMint")?,
            quote_mint:               r.pubkey("quoteMint")?,
            base_vault:               r.pubkey("baseVault")?,
            base_deposits_total:      r.u64("baseDepositsTotal")?,
            base_fees_accrued:        r.u64("baseFeesAccrued")?,
            quote_vault:              r.pubkey("quoteVault")?,
            quote_deposits_total:     r.u64("quoteDepositsTotal")?,
            quote_fees_accrued:       r.u64("quoteFeesAccrued")?,
            quote_dust_threshold:     r.u64("quoteDustThreshold")?,
            request_queue:            r.pubkey("requestQueue")?,
            event_queue:              r.pubkey("eventQueue")?,
            bids:                     r.pubkey("bids")?,
            asks:                     r.pubkey("asks")?,
            base_lot_size:            r.u64("baseLotSize")?,
            quote_lot_size:           r.u64("quoteLotSize")?,
            fee_rate_bps:             r.u64("feeRateBps")?,
            referrer_rebates_accrued: r.u64("referrerRebatesAccrued")?,
        })
    }
}

/// Deserialize a Serum v3 market account.
pub fn parse_market(data: &[u8]) -> Result<MarketRecord> {
    MarketRecord::from_record(&decode(data, &MARKET_STATE_V2)?)
}

// ─── Open orders ──────────────────────────────────────────────────────────────

/// Deserialized Serum open-orders account (3228 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOrdersRecord {
    pub flags:                   AccountFlags,
    pub market:                  Pubkey,
    pub owner:                   Pubkey,
    pub base_token_free:         u64,
    /// Base tokens locked in resting orders plus `base_token_free`.
    pub base_token_total:        u64,
    pub quote_token_free:        u64,
    /// Quote tokens locked in resting orders plus `quote_token_free`.
    pub quote_token_total:       u64,
    pub free_slot_bits:          u128,
    pub is_bid_bits:             u128,
    pub orders:                  Vec<u128>,
    pub client_ids:              Vec<u64>,
    pub referrer_rebate_accrued: u64,
}

impl OpenOrdersRecord {
    pub fn from_record(r: &Record) -> Result<Self> {
        Ok(Self {
            flags:                   r.flags("accountFlags")?.into(),
            market:                  r.pubkey("market")?,
            owner:                   r.pubkey("owner")?,
            base_token_free:         r.u64("baseTokenFree")?,
            base_token_total:        r.u64("baseTokenTotal")?,
            quote_token_free:        r.u64("quoteTokenFree")?,
            quote_token_total:       r.u64("quoteTokenTotal")?,
            free_slot_bits:          u128::from_le_bytes(r.byte_array("freeSlotBits")?),
            is_bid_bits:             u128::from_le_bytes(r.byte_array("isBidBits")?),
            orders:                  r.u128_array("orders")?,
            client_ids:              r.u64_array("clientIds")?,
            referrer_rebate_accrued: r.u64("referrerRebateAccrued")?,
        })
    }

    /// Whether order slot `slot` holds a live order.
    pub fn slot_in_use(&self, slot: usize) -> bool {
        slot < 128 && self.free_slot_bits & (1u128 << slot) == 0
    }

    /// Whether the order in `slot` is a bid.
    pub fn slot_is_bid(&self, slot: usize) -> bool {
        slot < 128 && self.is_bid_bits & (1u128 << slot) != 0
    }
}

/// Deserialize a Serum open-orders account.
pub fn parse_open_orders(data: &[u8]) -> Result<OpenOrdersRecord> {
    OpenOrdersRecord::from_record(&decode(data, &OPEN_ORDERS)?)
}

// ─── SPL token account ────────────────────────────────────────────────────────

/// Deserialized SPL token account (165 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountRecord {
    pub mint:             Pubkey,
    pub owner:            Pubkey,
    pub amount:           u64,
    pub delegate:         Option<Pubkey>,
    pub state:            u8,
    /// Rent-exempt reserve for wrapped-SOL accounts.
    pub is_native:        Option<u64>,
    pub delegated_amount: u64,
    pub close_authority:  Option<Pubkey>,
}

impl TokenAccountRecord {
    pub fn from_record(r: &Record) -> Result<Self> {
        let option = |tag: &str| -> Result<bool> { Ok(r.u32(tag)? != 0) };
        Ok(Self {
            mint:             r.pubkey("mint")?,
            owner:            r.pubkey("owner")?,
            amount:           r.u64("amount")?,
            delegate:         option("delegateOption")?.then(|| r.pubkey("delegate")).transpose()?,
            state:            r.u8("state")?,
            is_native:        option("isNativeOption")?.then(|| r.u64("isNative")).transpose()?,
            delegated_amount: r.u64("delegatedAmount")?,
            close_authority:  option("closeAuthorityOption")?
                .then(|| r.pubkey("closeAuthority"))
                .transpose()?,
        })
    }

    pub fn is_native(&self) -> bool {
        self.is_native.is_some()
    }
}

/// Deserialize a packed SPL token account.
pub fn parse_token_account(data: &[u8]) -> Result<TokenAccountRecord> {
    TokenAccountRecord::from_record(&decode(data, &TOKEN_ACCOUNT)?)
}
