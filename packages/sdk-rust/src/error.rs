//! SDK error type.

use solana_sdk::pubkey::{Pubkey, PubkeyError};

use crate::transport::DataEncoding;

/// All errors returned by the Rayswap SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── RPC / network ────────────────────────────────────────────────────────
    /// A Solana JSON-RPC call failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    /// An account requested by address does not exist.
    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    /// The node returned account data in an encoding other than base64.
    #[error("Account data for {address} is not base64 encoded (got {encoding})")]
    UnexpectedEncoding { address: Pubkey, encoding: DataEncoding },

    // ── Record decoding ──────────────────────────────────────────────────────
    /// A constant-checked field (magic bytes, flag padding) did not match.
    #[error("{schema}: constant field `{field}` at offset {offset} does not match")]
    SchemaConstantMismatch {
        schema: &'static str,
        field:  &'static str,
        offset: usize,
    },

    /// The buffer is shorter than the schema's declared span.
    #[error("{schema}: buffer is {actual} bytes; expected at least {expected}")]
    DecodeTruncated {
        schema:   &'static str,
        expected: usize,
        actual:   usize,
    },

    /// A record was asked for a field its schema does not declare.
    #[error("{schema}: no field named `{field}`")]
    FieldMissing { schema: &'static str, field: String },

    /// A record field holds a different value kind than the caller expected.
    #[error("{schema}: field `{field}` is not a {expected}")]
    FieldType {
        schema:   &'static str,
        field:    &'static str,
        expected: &'static str,
    },

    // ── Pool discovery ───────────────────────────────────────────────────────
    /// Neither mint ordering produced a usable AMM pool.
    #[error("Pair of tokens {0} and {1} has no AMM pool")]
    NoPoolForPair(Pubkey, Pubkey),

    /// Neither mint ordering produced a usable order-book market.
    #[error("Pair of tokens {0} and {1} has no order-book market")]
    NoMarketForPair(Pubkey, Pubkey),

    // ── Address derivation ───────────────────────────────────────────────────
    /// Every bump from 255 down to 0 landed on the ed25519 curve.
    #[error("No viable bump seed for program {0}")]
    AddressDerivationExhausted(Pubkey),

    /// Direct derivation from explicit seeds failed (on-curve or bad seeds).
    #[error("Program address derivation failed: {0}")]
    ProgramAddress(#[from] PubkeyError),

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("Integer overflow in reserve / swap math")]
    MathOverflow,

    /// Both the input reserve and the fee-adjusted input are zero.
    #[error("Pool has no liquidity on the input side")]
    NoLiquidity,

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration file or value could not be used.
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
