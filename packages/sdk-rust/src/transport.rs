//! The node-facing seam: everything the SDK needs from a Solana RPC endpoint.
//!
//! [`Transport`] is deliberately narrow so tests can swap in an in-memory
//! implementation.  [`RpcTransport`] is the real one, a thin layer over the
//! blocking [`RpcClient`].

use std::fmt;

use base64::Engine as _;
use serde_json::json;
use solana_account_decoder_client_types::{UiAccount, UiAccountData, UiAccountEncoding};
use solana_client::{
    rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSendTransactionConfig},
    rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType},
    rpc_request::RpcRequest,
    rpc_response::Response,
};
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::Transaction,
};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

// ─── Wire types ───────────────────────────────────────────────────────────────

/// Encoding tag reported by the node for an account's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEncoding {
    Base64,
    Base64Zstd,
    Base58,
    JsonParsed,
}

impl fmt::Display for DataEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataEncoding::Base64 => "base64",
            DataEncoding::Base64Zstd => "base64+zstd",
            DataEncoding::Base58 => "base58",
            DataEncoding::JsonParsed => "jsonParsed",
        })
    }
}

/// One account as read from the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub address:  Pubkey,
    /// Decoded bytes; empty unless `encoding` is [`DataEncoding::Base64`].
    pub data:     Vec<u8>,
    pub encoding: DataEncoding,
    pub slot:     u64,
}

impl AccountData {
    /// The raw bytes, provided the node sent them base64 encoded.
    pub fn base64_bytes(&self) -> Result<&[u8]> {
        match self.encoding {
            DataEncoding::Base64 => Ok(&self.data),
            other => Err(Error::UnexpectedEncoding { address: self.address, encoding: other }),
        }
    }
}

/// Result of one batched read; every account shares the same slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRead {
    /// Same order as the requested addresses; `None` for missing accounts.
    pub accounts: Vec<Option<AccountData>>,
    pub slot:     u64,
}

/// Byte-equality filter applied server-side to a program scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes:  Vec<u8>,
}

impl MemcmpFilter {
    pub fn pubkey(offset: usize, key: &Pubkey) -> Self {
        Self { offset, bytes: key.to_bytes().to_vec() }
    }
}

/// Submission knobs for [`Transport::submit_transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub skip_preflight:       bool,
    /// Return as soon as the node accepts the transaction.
    pub skip_confirmation:    bool,
    pub preflight_commitment: CommitmentLevel,
    pub max_retries:          Option<usize>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            skip_preflight:       false,
            skip_confirmation:    true,
            preflight_commitment: CommitmentLevel::Finalized,
            max_retries:          None,
        }
    }
}

// ─── Trait ────────────────────────────────────────────────────────────────────

/// Minimal RPC surface used by the resolver, the reserve aggregator and swaps.
pub trait Transport {
    /// All accounts owned by `program_id` that match every filter.
    fn scan_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>>;

    /// One account; [`Error::AccountNotFound`] if it does not exist.
    fn read_account(&self, address: &Pubkey) -> Result<AccountData>;

    /// Several accounts in a single request, observed at one slot.
    fn read_accounts_batch(&self, addresses: &[Pubkey]) -> Result<BatchRead>;

    fn submit_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &[&dyn Signer],
        options: &SendOptions,
    ) -> Result<Signature>;
}

// ─── RPC implementation ───────────────────────────────────────────────────────

/// [`Transport`] backed by a blocking JSON-RPC client.
pub struct RpcTransport {
    client:     RpcClient,
    commitment: CommitmentConfig,
}

impl RpcTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client:     RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment),
            commitment: config.commitment,
        }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    fn account_config(&self) -> RpcAccountInfoConfig {
        RpcAccountInfoConfig {
            encoding:   Some(UiAccountEncoding::Base64),
            commitment: Some(self.commitment),
            ..RpcAccountInfoConfig::default()
        }
    }
}

impl Transport for RpcTransport {
    fn scan_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(
                filters
                    .iter()
                    .map(|f| {
                        RpcFilterType::Memcmp(Memcmp::new(
                            f.offset,
                            MemcmpEncodedBytes::Bytes(f.bytes.clone()),
                        ))
                    })
                    .collect(),
            ),
            account_config: self.account_config(),
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self.client.get_program_accounts_with_config(program_id, config)?;
        Ok(accounts.into_iter().map(|(key, account)| (key, account.data)).collect())
    }

    fn read_account(&self, address: &Pubkey) -> Result<AccountData> {
        let response: Response<Option<UiAccount>> = self.client.send(
            RpcRequest::GetAccountInfo,
            json!([address.to_string(), self.account_config()]),
        )?;
        let account = response.value.ok_or(Error::AccountNotFound(*address))?;
        account_data(*address, account, response.context.slot)
    }

    fn read_accounts_batch(&self, addresses: &[Pubkey]) -> Result<BatchRead> {
        let keys: Vec<String> = addresses.iter().map(Pubkey::to_string).collect();
        let response: Response<Vec<Option<UiAccount>>> = self.client.send(
            RpcRequest::GetMultipleAccounts,
            json!([keys, self.account_config()]),
        )?;
        let slot = response.context.slot;
        let accounts = addresses
            .iter()
            .zip(response.value)
            .map(|(address, account)| {
                account.map(|a| account_data(*address, a, slot)).transpose()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(BatchRead { accounts, slot })
    }

    fn submit_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &[&dyn Signer],
        options: &SendOptions,
    ) -> Result<Signature> {
        let blockhash = self.client.get_latest_blockhash()?;
        let tx = Transaction::new_signed_with_payer(instructions, Some(payer), signers, blockhash);
        let signature = self.client.send_transaction_with_config(
            &tx,
            RpcSendTransactionConfig {
                skip_preflight:       options.skip_preflight,
                preflight_commitment: Some(options.preflight_commitment),
                max_retries:          options.max_retries,
                ..RpcSendTransactionConfig::default()
            },
        )?;
        if !options.skip_confirmation {
            self.client.poll_for_signature_with_commitment(&signature, self.commitment)?;
        }
        Ok(signature)
    }
}

/// Lift a wire account into [`AccountData`], decoding base64 payloads.
fn account_data(address: Pubkey, account: UiAccount, slot: u64) -> Result<AccountData> {
    let (data, encoding) = match account.data {
        UiAccountData::Binary(blob, UiAccountEncoding::Base64) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(blob)
                .map_err(|e| Error::InvalidArgument(format!("bad base64 for {address}: {e}")))?;
            (bytes, DataEncoding::Base64)
        }
        UiAccountData::Binary(_, UiAccountEncoding::Base64Zstd) => {
            (Vec::new(), DataEncoding::Base64Zstd)
        }
        UiAccountData::Binary(_, UiAccountEncoding::JsonParsed) | UiAccountData::Json(_) => {
            (Vec::new(), DataEncoding::JsonParsed)
        }
        UiAccountData::Binary(..) | UiAccountData::LegacyBinary(_) => {
            (Vec::new(), DataEncoding::Base58)
        }
    };
    Ok(AccountData { address, data, encoding, slot })
}
