//! Endpoint and program-id configuration.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey, pubkey::Pubkey};

use crate::error::{Error, Result};

/// Raydium liquidity pool program v4 on mainnet-beta.
pub const AMM_V4_PROGRAM_ID: Pubkey = pubkey!("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");
/// Serum DEX v3 program on mainnet-beta.
pub const SERUM_V3_PROGRAM_ID: Pubkey = pubkey!("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin");

const MAINNET_RPC:  &str = "https://api.mainnet-beta.solana.com";
const LOCALNET_RPC: &str = "http://127.0.0.1:8899";

/// Where to connect and which programs to treat as the AMM and the order book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub rpc_url:           String,
    pub commitment:        CommitmentConfig,
    pub amm_program_id:    Pubkey,
    pub market_program_id: Pubkey,
}

/// On-disk shape; every key is optional and falls back to mainnet.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
struct ConfigFile {
    rpc_url:           Option<String>,
    commitment:        Option<String>,
    amm_program_id:    Option<String>,
    market_program_id: Option<String>,
}

impl ClientConfig {
    pub fn mainnet() -> Self {
        Self {
            rpc_url:           MAINNET_RPC.to_string(),
            commitment:        CommitmentConfig::confirmed(),
            amm_program_id:    AMM_V4_PROGRAM_ID,
            market_program_id: SERUM_V3_PROGRAM_ID,
        }
    }

    /// A local validator with the mainnet program ids cloned in.
    pub fn localnet() -> Self {
        Self { rpc_url: LOCALNET_RPC.to_string(), ..Self::mainnet() }
    }

    /// Same config pointed at another endpoint.
    pub fn with_rpc_url(self, rpc_url: impl Into<String>) -> Self {
        Self { rpc_url: rpc_url.into(), ..self }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        let defaults = Self::mainnet();
        Ok(Self {
            rpc_url:           file.rpc_url.unwrap_or(defaults.rpc_url),
            commitment:        match file.commitment {
                Some(level) => CommitmentConfig::from_str(&level)
                    .map_err(|_| Error::Config(format!("unknown commitment '{level}'")))?,
                None => defaults.commitment,
            },
            amm_program_id:    parse_program_id("amm_program_id", file.amm_program_id)?
                .unwrap_or(defaults.amm_program_id),
            market_program_id: parse_program_id("market_program_id", file.market_program_id)?
                .unwrap_or(defaults.market_program_id),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

fn parse_program_id(key: &str, value: Option<String>) -> Result<Option<Pubkey>> {
    value
        .map(|s| {
            Pubkey::from_str(&s).map_err(|e| Error::Config(format!("{key}: '{s}' is not a pubkey: {e}")))
        })
        .transpose()
}
