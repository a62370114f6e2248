//! In-memory node and account fixtures shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use rayswap_sdk::{
    decode::{encode, FlagBits, Record, Value},
    pda::derive_vault_signer,
    schema::{Schema, AMM_INFO_V4, MARKET_STATE_V2, OPEN_ORDERS, SERUM_ACCOUNT_FLAGS, TOKEN_ACCOUNT},
    transport::{AccountData, BatchRead, DataEncoding, MemcmpFilter},
    Result, SendOptions, Transport,
};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Signature, Signer},
};

// ─── Mock node ────────────────────────────────────────────────────────────────

struct Stored {
    address:  Pubkey,
    owner:    Pubkey,
    data:     Vec<u8>,
    encoding: DataEncoding,
}

/// Accounts live in insertion order so scan results are deterministic.
#[derive(Default)]
pub struct MockNode {
    accounts:        RefCell<Vec<Stored>>,
    pub slot:        Cell<u64>,
    pub scans:       RefCell<Vec<(Pubkey, Vec<MemcmpFilter>)>>,
    pub batch_reads: Cell<usize>,
    pub submitted:   RefCell<Vec<Instruction>>,
    /// Batch replies lose their last entry, as a short RPC response would.
    pub short_batch: Cell<bool>,
}

impl MockNode {
    pub fn new() -> Self {
        let node = Self::default();
        node.slot.set(100);
        node
    }

    pub fn insert(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.insert_encoded(address, owner, data, DataEncoding::Base64);
    }

    pub fn insert_encoded(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>, encoding: DataEncoding) {
        let mut accounts = self.accounts.borrow_mut();
        accounts.retain(|a| a.address != address);
        accounts.push(Stored { address, owner, data, encoding });
    }

    fn to_data(&self, stored: &Stored) -> AccountData {
        AccountData {
            address:  stored.address,
            data:     if stored.encoding == DataEncoding::Base64 { stored.data.clone() } else { Vec::new() },
            encoding: stored.encoding,
            slot:     self.slot.get(),
        }
    }
}

impl Transport for MockNode {
    fn scan_accounts(&self, program_id: &Pubkey, filters: &[MemcmpFilter]) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        self.scans.borrow_mut().push((*program_id, filters.to_vec()));
        Ok(self
            .accounts
            .borrow()
            .iter()
            .filter(|a| a.owner == *program_id)
            .filter(|a| {
                filters.iter().all(|f| {
                    a.data.get(f.offset..f.offset + f.bytes.len()) == Some(f.bytes.as_slice())
                })
            })
            .map(|a| (a.address, a.data.clone()))
            .collect())
    }

    fn read_account(&self, address: &Pubkey) -> Result<AccountData> {
        self.accounts
            .borrow()
            .iter()
            .find(|a| a.address == *address)
            .map(|a| self.to_data(a))
            .ok_or(rayswap_sdk::Error::AccountNotFound(*address))
    }

    fn read_accounts_batch(&self, addresses: &[Pubkey]) -> Result<BatchRead> {
        self.batch_reads.set(self.batch_reads.get() + 1);
        let accounts = self.accounts.borrow();
        let mut found: Vec<Option<AccountData>> = addresses
            .iter()
            .map(|k| accounts.iter().find(|a| a.address == *k).map(|a| self.to_data(a)))
            .collect();
        if self.short_batch.get() {
            found.pop();
        }
        Ok(BatchRead { accounts: found, slot: self.slot.get() })
    }

    fn submit_transaction(
        &self,
        instructions: &[Instruction],
        _payer: &Pubkey,
        _signers: &[&dyn Signer],
        _options: &SendOptions,
    ) -> Result<Signature> {
        self.submitted.borrow_mut().extend_from_slice(instructions);
        Ok(Signature::default())
    }
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

pub fn build(schema: &'static Schema, fields: Vec<(&str, Value)>) -> Vec<u8> {
    let record = fields
        .into_iter()
        .fold(Record::zeroed(schema), |r, (name, value)| r.with(name, value).unwrap());
    encode(&record).unwrap()
}

pub fn pool_bytes(coin_mint: Pubkey, pc_mint: Pubkey, coin_in: u128, pc_out: u128) -> Vec<u8> {
    build(&AMM_INFO_V4, vec![
        ("coinMintAddress", Value::Pubkey(coin_mint)),
        ("pcMintAddress", Value::Pubkey(pc_mint)),
        ("swapCoinInAmount", Value::U128(coin_in)),
        ("swapPcOutAmount", Value::U128(pc_out)),
        ("swapFeeNumerator", Value::U64(25)),
        ("swapFeeDenominator", Value::U64(10_000)),
    ])
}

pub fn market_bytes(base_mint: Pubkey, quote_mint: Pubkey, base_total: u64, quote_total: u64) -> Vec<u8> {
    build(&MARKET_STATE_V2, vec![
        ("accountFlags", Value::Flags(FlagBits::from_names(SERUM_ACCOUNT_FLAGS, &["initialized", "market"]))),
        ("baseMint", Value::Pubkey(base_mint)),
        ("quoteMint", Value::Pubkey(quote_mint)),
        ("baseDepositsTotal", Value::U64(base_total)),
        ("quoteDepositsTotal", Value::U64(quote_total)),
    ])
}

pub fn token_bytes(mint: Pubkey, amount: u64) -> Vec<u8> {
    build(&TOKEN_ACCOUNT, vec![
        ("mint", Value::Pubkey(mint)),
        ("amount", Value::U64(amount)),
    ])
}

pub fn open_orders_bytes(base_total: u64, quote_total: u64) -> Vec<u8> {
    build(&OPEN_ORDERS, vec![
        ("accountFlags", Value::Flags(FlagBits::from_names(SERUM_ACCOUNT_FLAGS, &["initialized", "open_orders"]))),
        ("baseTokenTotal", Value::U64(base_total)),
        ("quoteTokenTotal", Value::U64(quote_total)),
    ])
}

/// First nonce whose vault signer is off the curve.
pub fn vault_nonce(market: &Pubkey, market_program: &Pubkey) -> u64 {
    (0u64..256)
        .find(|n| derive_vault_signer(market, *n, market_program).is_ok())
        .unwrap()
}

/// A complete pool: AMM account, market, both vaults and open orders.
pub struct PoolFixture {
    pub coin_mint:   Pubkey,
    pub pc_mint:     Pubkey,
    pub amm_id:      Pubkey,
    pub market_id:   Pubkey,
    pub coin_vault:  Pubkey,
    pub pc_vault:    Pubkey,
    pub open_orders: Pubkey,
    pub nonce:       u64,
}

impl PoolFixture {
    /// Register every account of a pool with the given vault balances.
    pub fn install(
        node:           &MockNode,
        amm_program:    &Pubkey,
        market_program: &Pubkey,
        coin_amount:    u64,
        pc_amount:      u64,
    ) -> Self {
        let fixture = Self {
            coin_mint:   Pubkey::new_unique(),
            pc_mint:     Pubkey::new_unique(),
            amm_id:      Pubkey::new_unique(),
            market_id:   Pubkey::new_unique(),
            coin_vault:  Pubkey::new_unique(),
            pc_vault:    Pubkey::new_unique(),
            open_orders: Pubkey::new_unique(),
            nonce:       0,
        };
        let nonce = vault_nonce(&fixture.market_id, market_program);
        let fixture = Self { nonce, ..fixture };

        let pool = build(&AMM_INFO_V4, vec![
            ("coinMintAddress", Value::Pubkey(fixture.coin_mint)),
            ("pcMintAddress", Value::Pubkey(fixture.pc_mint)),
            ("swapCoinInAmount", Value::U128(5)),
            ("swapPcOutAmount", Value::U128(5)),
            ("swapFeeNumerator", Value::U64(25)),
            ("swapFeeDenominator", Value::U64(10_000)),
            ("poolCoinTokenAccount", Value::Pubkey(fixture.coin_vault)),
            ("poolPcTokenAccount", Value::Pubkey(fixture.pc_vault)),
            ("ammOpenOrders", Value::Pubkey(fixture.open_orders)),
            ("serumMarket", Value::Pubkey(fixture.market_id)),
            ("serumProgramId", Value::Pubkey(*market_program)),
        ]);
        node.insert(fixture.amm_id, *amm_program, pool);

        let market = build(&MARKET_STATE_V2, vec![
            ("accountFlags", Value::Flags(FlagBits::from_names(SERUM_ACCOUNT_FLAGS, &["initialized", "market"]))),
            ("ownAddress", Value::Pubkey(fixture.market_id)),
            ("vaultSignerNonce", Value::U64(nonce)),
            ("baseMint", Value::Pubkey(fixture.coin_mint)),
            ("quoteMint", Value::Pubkey(fixture.pc_mint)),
            ("baseDepositsTotal", Value::U64(1)),
            ("quoteDepositsTotal", Value::U64(1)),
        ]);
        node.insert(fixture.market_id, *market_program, market);

        let token_program = rayswap_sdk::instructions::SPL_TOKEN_PROGRAM_ID;
        node.insert(fixture.coin_vault, token_program, token_bytes(fixture.coin_mint, coin_amount));
        node.insert(fixture.pc_vault, token_program, token_bytes(fixture.pc_mint, pc_amount));
        node.insert(fixture.open_orders, *market_program, open_orders_bytes(0, 0));
        fixture
    }
}
