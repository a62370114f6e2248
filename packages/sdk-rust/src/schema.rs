//! Byte-layout registry for every account kind the SDK understands.
//!
//! Each layout is plain data: an ordered list of [`Field`] descriptors whose
//! offsets follow from declaration order.  One generic routine in
//! [`crate::decode`] interprets all of them, so supporting a new protocol
//! version means adding a `static` here and nothing else.

use crate::error::{Error, Result};

// ─── Descriptors ──────────────────────────────────────────────────────────────

/// A packed group of named boolean flags.
///
/// The `width`-byte block is read as a little-endian integer; flag `i` of
/// `names` is bit `i`.  Bits above `names.len()` are padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagLayout {
    pub width:         usize,
    pub names:         &'static [&'static str],
    /// Padding bits must be zero; a set bit fails the decode.
    pub padding_const: bool,
}

/// How the bytes of one field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U32,
    U64,
    /// 16-byte little-endian integer (cumulative counters, deposit totals).
    U128,
    /// 16-byte big-endian integer (order-book order ids).
    U128Be,
    /// 32 raw bytes.
    Pubkey,
    Bytes(usize),
    U64Array(usize),
    U128BeArray(usize),
    Flags(FlagLayout),
    /// Skipped on decode, zero-filled on encode.
    Padding(usize),
    /// Must equal the literal exactly.
    Const(&'static [u8]),
}

impl FieldKind {
    pub const fn width(&self) -> usize {
        match self {
            FieldKind::U8 => 1,
            FieldKind::U32 => 4,
            FieldKind::U64 => 8,
            FieldKind::U128 | FieldKind::U128Be => 16,
            FieldKind::Pubkey => 32,
            FieldKind::Bytes(n) | FieldKind::Padding(n) => *n,
            FieldKind::U64Array(n) => *n * 8,
            FieldKind::U128BeArray(n) => *n * 16,
            FieldKind::Flags(layout) => layout.width,
            FieldKind::Const(bytes) => bytes.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn f(name: &'static str, kind: FieldKind) -> Field {
    Field { name, kind }
}

const fn pad(n: usize) -> Field {
    Field { name: "", kind: FieldKind::Padding(n) }
}

/// An ordered, immutable byte layout.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub name:   &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    /// Total declared width in bytes.
    pub const fn span(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].kind.width();
            i += 1;
        }
        total
    }

    /// Byte offset of the named field.
    pub fn offset_of(&self, name: &str) -> Result<usize> {
        let mut offset = 0;
        for field in self.fields {
            if !field.name.is_empty() && field.name == name {
                return Ok(offset);
            }
            offset += field.kind.width();
        }
        Err(Error::FieldMissing { schema: self.name, field: name.to_string() })
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|field| !field.name.is_empty() && field.name == name)
    }
}

use FieldKind::*;

// ─── Serum v3 ─────────────────────────────────────────────────────────────────

/// Serum account flags: seven named bits followed by 57 zero bits.
pub const SERUM_ACCOUNT_FLAGS: FlagLayout = FlagLayout {
    width: 8,
    names: &[
        "initialized",
        "market",
        "open_orders",
        "request_queue",
        "event_queue",
        "bids",
        "asks",
    ],
    padding_const: true,
};

/// Serum v3 market state, 388 bytes.
pub static MARKET_STATE_V2: Schema = Schema {
    name: "market_state_v2",
    fields: &[
        pad(5),
        f("accountFlags", Flags(SERUM_ACCOUNT_FLAGS)),
        f("ownAddress", Pubkey),
        f("vaultSignerNonce", U64),
        f("baseMint", Pubkey),
        f("quoteMint", Pubkey),
        f("baseVault", Pubkey),
        f("baseDepositsTotal", U64),
        f("baseFeesAccrued", U64),
        f("quoteVault", Pubkey),
        f("quoteDepositsTotal", U64),
        f("quoteFeesAccrued", U64),
        f("quoteDustThreshold", U64),
        f("requestQueue", Pubkey),
        f("eventQueue", Pubkey),
        f("bids", Pubkey),
        f("asks", Pubkey),
        f("baseLotSize", U64),
        f("quoteLotSize", U64),
        f("feeRateBps", U64),
        f("referrerRebatesAccrued", U64),
        pad(7),
    ],
};

/// Serum v3 open-orders account, 3228 bytes.
pub static OPEN_ORDERS: Schema = Schema {
    name: "open_orders",
    fields: &[
        pad(5),
        f("accountFlags", Flags(SERUM_ACCOUNT_FLAGS)),
        f("market", Pubkey),
        f("owner", Pubkey),
        f("baseTokenFree", U64),
        f("baseTokenTotal", U64),
        f("quoteTokenFree", U64),
        f("quoteTokenTotal", U64),
        f("freeSlotBits", Bytes(16)),
        f("isBidBits", Bytes(16)),
        f("orders", U128BeArray(128)),
        f("clientIds", U64Array(128)),
        f("referrerRebateAccrued", U64),
        pad(7),
    ],
};

// ─── Raydium AMM v4 ───────────────────────────────────────────────────────────

/// Raydium liquidity pool v4 state, 752 bytes.
pub static AMM_INFO_V4: Schema = Schema {
    name: "amm_info_v4",
    fields: &[
        f("status", U64),
        f("nonce", U64),
        f("orderNum", U64),
        f("depth", U64),
        f("coinDecimals", U64),
        f("pcDecimals", U64),
        f("state", U64),
        f("resetFlag", U64),
        f("minSize", U64),
        f("volMaxCutRatio", U64),
        f("amountWaveRatio", U64),
        f("coinLotSize", U64),
        f("pcLotSize", U64),
        f("minPriceMultiplier", U64),
        f("maxPriceMultiplier", U64),
        f("systemDecimalsValue", U64),
        f("minSeparateNumerator", U64),
        f("minSeparateDenominator", U64),
        f("tradeFeeNumerator", U64),
        f("tradeFeeDenominator", U64),
        f("pnlNumerator", U64),
        f("pnlDenominator", U64),
        f("swapFeeNumerator", U64),
        f("swapFeeDenominator", U64),
        f("needTakePnlCoin", U64),
        f("needTakePnlPc", U64),
        f("totalPnlPc", U64),
        f("totalPnlCoin", U64),
        f("poolTotalDepositPc", U128),
        f("poolTotalDepositCoin", U128),
        f("swapCoinInAmount", U128),
        f("swapPcOutAmount", U128),
        f("swapCoin2PcFee", U64),
        f("swapPcInAmount", U128),
        f("swapCoinOutAmount", U128),
        f("swapPc2CoinFee", U64),
        f("poolCoinTokenAccount", Pubkey),
        f("poolPcTokenAccount", Pubkey),
        f("coinMintAddress", Pubkey),
        f("pcMintAddress", Pubkey),
        f("lpMintAddress", Pubkey),
        f("ammOpenOrders", Pubkey),
        f("serumMarket", Pubkey),
        f("serumProgramId", Pubkey),
        f("ammTargetOrders", Pubkey),
        f("poolWithdrawQueue", Pubkey),
        f("poolTempLpTokenAccount", Pubkey),
        f("ammOwner", Pubkey),
        f("pnlOwner", Pubkey),
    ],
};

// ─── SPL token ────────────────────────────────────────────────────────────────

/// Packed SPL token account, 165 bytes.
pub static TOKEN_ACCOUNT: Schema = Schema {
    name: "token_account",
    fields: &[
        f("mint", Pubkey),
        f("owner", Pubkey),
        f("amount", U64),
        f("delegateOption", U32),
        f("delegate", Pubkey),
        f("state", U8),
        f("isNativeOption", U32),
        f("isNative", U64),
        f("delegatedAmount", U64),
        f("closeAuthorityOption", U32),
        f("closeAuthority", Pubkey),
    ],
};

// ─── Alternate protocols ──────────────────────────────────────────────────────

pub static GENERAL_SWAP: Schema = Schema {
    name: "general_swap",
    fields: &[
        f("version", U8),
        f("isInitialized", U8),
        f("bumpSeed", U8),
        f("tokenProgramId", Pubkey),
        f("tokenAccountA", Pubkey),
        f("tokenAccountB", Pubkey),
        f("tokenPool", Pubkey),
        f("mintA", Pubkey),
        f("mintB", Pubkey),
        f("feeAccount", Pubkey),
        f("tradeFeeNumerator", U64),
        f("tradeFeeDenominator", U64),
        f("ownerTradeFeeNumerator", U64),
        f("ownerTradeFeeDenominator", U64),
        f("hostFeeNumerator", U64),
        f("hostFeeDenominator", U64),
        f("curveType", U8),
        f("curveParameters", Bytes(32)),
    ],
};

pub static STEP_SWAP: Schema = Schema {
    name: "step_swap",
    fields: &[
        f("version", U8),
        f("isInitialized", U8),
        f("bumpSeed", U8),
        f("tokenProgramId", Pubkey),
        f("tokenAccountA", Pubkey),
        f("tokenAccountB", Pubkey),
        f("tokenPool", Pubkey),
        f("mintA", Pubkey),
        f("mintB", Pubkey),
        f("feeAccount", Pubkey),
        f("tradeFeeNumerator", U64),
        f("tradeFeeDenominator", U64),
        f("ownerTradeFeeNumerator", U64),
        f("ownerTradeFeeDenominator", U64),
        f("curveType", U8),
        f("curveParameters", Bytes(32)),
        f("poolNonce", U8),
    ],
};

pub static MERCURIAL_SWAP: Schema = Schema {
    name: "mercurial_swap",
    fields: &[
        f("version", U8),
        f("isInitialized", U8),
        f("nonce", U8),
        f("amplificationCoefficient", U64),
        f("feeNumerator", U64),
        f("adminFeeNumerator", U64),
        f("tokenAccountsLength", U32),
        f("precisionFactor", U64),
        f("precisionMultiplierA", U64),
        f("precisionMultiplierB", U64),
        f("precisionMultiplierC", U64),
        f("precisionMultiplierD", U64),
        f("tokenAccountA", Pubkey),
        f("tokenAccountB", Pubkey),
        f("tokenAccountC", Pubkey),
        f("tokenAccountD", Pubkey),
    ],
};

pub static CROPPER_SWAP: Schema = Schema {
    name: "cropper_swap",
    fields: &[
        f("version", U8),
        f("isInitialized", U8),
        f("nonce", U8),
        f("ammId", Pubkey),
        f("serumProgramId", Pubkey),
        f("serumMarket", Pubkey),
        f("tokenProgramId", Pubkey),
        f("tokenAAccount", Pubkey),
        f("tokenBAccount", Pubkey),
        f("poolMint", Pubkey),
        f("mintA", Pubkey),
        f("mintB", Pubkey),
    ],
};

pub static SENCHA_SWAP: Schema = Schema {
    name: "sencha_swap",
    fields: &[
        f("discriminator", Bytes(8)),
        f("factory", Pubkey),
        f("bump", U8),
        f("index", U64),
        f("admin", Pubkey),
        f("token0Reserves", Pubkey),
        f("token0Mint", Pubkey),
        f("token0Fees", Pubkey),
        f("token1Reserves", Pubkey),
        f("token1Mint", Pubkey),
        f("token1Fees", Pubkey),
        f("isPaused", U8),
        f("poolMint", Pubkey),
        f("tradeFeeKbps", U64),
        f("withdrawFeeKbps", U64),
        f("adminTradeFeeKbps", U64),
        f("adminWithdrawFeeKbps", U64),
    ],
};

pub static ALDRIN_SWAP: Schema = Schema {
    name: "aldrin_swap",
    fields: &[
        pad(8),
        f("lpTokenFreezeVault", Pubkey),
        f("poolMint", Pubkey),
        f("baseTokenVault", Pubkey),
        f("baseTokenMint", Pubkey),
        f("quoteTokenVault", Pubkey),
        f("quoteTokenMint", Pubkey),
        f("poolSigner", Pubkey),
        f("poolSignerNonce", U8),
        f("authority", Pubkey),
        f("initializerAccount", Pubkey),
        f("feeBaseAccount", Pubkey),
        f("feeQuoteAccount", Pubkey),
        f("feePoolTokenAccount", Pubkey),
        f("fees.tradeFeeNumerator", U64),
        f("fees.tradeFeeDenominator", U64),
        f("fees.ownerTradeFeeNumerator", U64),
        f("fees.ownerTradeFeeDenominator", U64),
        f("fees.ownerWithdrawFeeNumerator", U64),
        f("fees.ownerWithdrawFeeDenominator", U64),
    ],
};

pub static SABER_SWAP: Schema = Schema {
    name: "saber_swap",
    fields: &[
        f("isInitialized", U8),
        f("isPaused", U8),
        f("nonce", U8),
        f("initialAmpFactor", U64),
        f("targetAmpFactor", U64),
        f("startRampTs", U64),
        f("stopRampTs", U64),
        f("futureAdminDeadline", U64),
        f("futureAdminAccount", Pubkey),
        f("adminAccount", Pubkey),
        f("tokenAccountA", Pubkey),
        f("tokenAccountB", Pubkey),
        f("tokenPool", Pubkey),
        f("mintA", Pubkey),
        f("mintB", Pubkey),
        f("adminFeeAccountA", Pubkey),
        f("adminFeeAccountB", Pubkey),
        f("fees.adminTradeFeeNumerator", U64),
        f("fees.adminTradeFeeDenominator", U64),
        f("fees.adminWithdrawFeeNumerator", U64),
        f("fees.adminWithdrawFeeDenominator", U64),
        f("fees.tradeFeeNumerator", U64),
        f("fees.tradeFeeDenominator", U64),
        f("fees.withdrawFeeNumerator", U64),
        f("fees.withdrawFeeDenominator", U64),
    ],
};

pub static LIFINITY_SWAP: Schema = Schema {
    name: "lifinity_swap",
    fields: &[
        f("index", U64),
        f("initializerKey", Pubkey),
        f("initializerDepositTokenAccount", Pubkey),
        f("initializerReceiveTokenAccount", Pubkey),
        f("initializerAmount", U64),
        f("takerAmount", U64),
        f("initialized", U8),
        f("bumpSeed", U8),
        f("freezeTrade", U8),
        f("freezeDeposit", U8),
        f("freezeWithdraw", U8),
        f("baseDecimals", U8),
        f("tokenProgramId", Pubkey),
        f("tokenAAccount", Pubkey),
        f("tokenBAccount", Pubkey),
        f("poolMint", Pubkey),
        f("tokenAMint", Pubkey),
        f("tokenBMint", Pubkey),
        f("poolFeeAccount", Pubkey),
        f("pythAccount", Pubkey),
        f("pythPcAccount", Pubkey),
        f("configAccount", Pubkey),
        f("ammTemp1", Pubkey),
        f("ammTemp2", Pubkey),
        f("ammTemp3", Pubkey),
        f("tradeFeeNumerator", U64),
        f("tradeFeeDenominator", U64),
        f("ownerTradeFeeNumerator", U64),
        f("ownerTradeFeeDenominator", U64),
        f("ownerWithdrawFeeNumerator", U64),
        f("ownerWithdrawFeeDenominator", U64),
        f("hostFeeNumerator", U64),
        f("hostFeeDenominator", U64),
        f("curveType", U8),
        f("curveParameters", U64),
    ],
};

// ─── Catalog ──────────────────────────────────────────────────────────────────

/// The closed set of account kinds with a registered layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    AmmV4,
    MarketV2,
    OpenOrders,
    TokenAccount,
    Variant(ProtocolVariant),
}

impl AccountKind {
    pub fn schema(self) -> &'static Schema {
        match self {
            AccountKind::AmmV4 => &AMM_INFO_V4,
            AccountKind::MarketV2 => &MARKET_STATE_V2,
            AccountKind::OpenOrders => &OPEN_ORDERS,
            AccountKind::TokenAccount => &TOKEN_ACCOUNT,
            AccountKind::Variant(variant) => variant.schema(),
        }
    }
}

/// Pool layouts of other swap programs, used for cross-protocol scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVariant {
    General,
    Step,
    Mercurial,
    Cropper,
    Sencha,
    Aldrin,
    Saber,
    Lifinity,
}

impl ProtocolVariant {
    pub const ALL: [ProtocolVariant; 8] = [
        ProtocolVariant::General,
        ProtocolVariant::Step,
        ProtocolVariant::Mercurial,
        ProtocolVariant::Cropper,
        ProtocolVariant::Sencha,
        ProtocolVariant::Aldrin,
        ProtocolVariant::Saber,
        ProtocolVariant::Lifinity,
    ];

    pub fn schema(self) -> &'static Schema {
        match self {
            ProtocolVariant::General => &GENERAL_SWAP,
            ProtocolVariant::Step => &STEP_SWAP,
            ProtocolVariant::Mercurial => &MERCURIAL_SWAP,
            ProtocolVariant::Cropper => &CROPPER_SWAP,
            ProtocolVariant::Sencha => &SENCHA_SWAP,
            ProtocolVariant::Aldrin => &ALDRIN_SWAP,
            ProtocolVariant::Saber => &SABER_SWAP,
            ProtocolVariant::Lifinity => &LIFINITY_SWAP,
        }
    }

    /// Names of the two mint fields, or `None` when the layout only stores
    /// token accounts (Mercurial).
    pub fn mint_fields(self) -> Option<(&'static str, &'static str)> {
        match self {
            ProtocolVariant::General
            | ProtocolVariant::Step
            | ProtocolVariant::Cropper
            | ProtocolVariant::Saber => Some(("mintA", "mintB")),
            ProtocolVariant::Sencha => Some(("token0Mint", "token1Mint")),
            ProtocolVariant::Aldrin => Some(("baseTokenMint", "quoteTokenMint")),
            ProtocolVariant::Lifinity => Some(("tokenAMint", "tokenBMint")),
            ProtocolVariant::Mercurial => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProtocolVariant::General => "general",
            ProtocolVariant::Step => "step",
            ProtocolVariant::Mercurial => "mercurial",
            ProtocolVariant::Cropper => "cropper",
            ProtocolVariant::Sencha => "sencha",
            ProtocolVariant::Aldrin => "aldrin",
            ProtocolVariant::Saber => "saber",
            ProtocolVariant::Lifinity => "lifinity",
        }
    }
}

impl std::str::FromStr for ProtocolVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ProtocolVariant::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown protocol variant '{s}'")))
    }
}
