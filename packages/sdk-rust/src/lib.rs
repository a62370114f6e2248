//! Rayswap Rust SDK
//!
//! Client-side toolkit for Raydium AMM v4 pools and the Serum v3 markets
//! behind them: decode on-chain accounts, find the pool for a mint pair,
//! read consistent reserves, quote constant-product swaps and build the swap
//! instruction.  Blocking I/O goes through the [`Transport`] trait, so every
//! piece above it can be driven by an in-memory node in tests.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rayswap_sdk::{AmmClient, AmmSession, ClientConfig, SwapSide};
//! use solana_sdk::pubkey::Pubkey;
//! use std::str::FromStr;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AmmClient::connect(ClientConfig::mainnet());
//!
//!     let sol  = Pubkey::from_str("So11111111111111111111111111111111111111112")?;
//!     let usdc = Pubkey::from_str("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")?;
//!
//!     // Resolve once, then poll
//!     let session  = AmmSession::open(&client, &sol, &usdc, true)?;
//!     let reserves = session.reserves()?;
//!     println!("coin={} pc={} at slot {}", reserves.coin, reserves.pc, reserves.slot);
//!
//!     let quote = session.quote(SwapSide::Sell, 1_000_000_000)?;
//!     println!("Estimated out: {}  price_impact: {:.2}%", quote.amount_out, quote.price_impact_pct);
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Item | Description |
//! |------|-------------|
//! | [`AmmClient::pool_info`] | Resolve pool + market for a pair into a [`PoolInfo`] |
//! | [`AmmClient::reserves`] | Vault + open-orders − PnL, one batched read |
//! | [`AmmClient::quote`] | Constant-product output after fees |
//! | [`AmmClient::swap`] | Quote, slippage guard, sign and send |
//! | [`AmmClient::scan_variant`] | Pair scan over other swap programs' layouts |
//! | [`decode::decode`] | Schema-driven decoder for every registered layout |

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod instructions;
pub mod math;
pub mod pda;
pub mod reserves;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod state;
pub mod transport;
pub mod types;

pub use client::AmmClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use session::AmmSession;
pub use transport::{RpcTransport, SendOptions, Transport};
pub use types::*;
