//! Effective pool reserves.
//!
//! An AMM v4 pool's liquidity is split between its two vaults and the
//! balances parked in its order-book open-orders account, minus PnL the
//! protocol has claimed but not yet withdrawn.

use log::debug;
use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};
use crate::state::{
    parse_open_orders, parse_pool, parse_token_account, OpenOrdersRecord, PoolRecord,
    TokenAccountRecord,
};
use crate::transport::{AccountData, Transport};
use crate::types::{FeeRatio, ReserveSnapshot};

/// Read pool, both vaults and open orders in one request and combine them.
///
/// All four accounts come from the same slot, so the snapshot is never a mix
/// of two ledger states.
pub fn get_reserves<T: Transport + ?Sized>(
    transport:   &T,
    pool:        &Pubkey,
    coin_vault:  &Pubkey,
    pc_vault:    &Pubkey,
    open_orders: &Pubkey,
) -> Result<ReserveSnapshot> {
    let addresses = [*pool, *coin_vault, *pc_vault, *open_orders];
    let batch = transport.read_accounts_batch(&addresses)?;
    if batch.accounts.len() != addresses.len() {
        return Err(Error::InvalidArgument(format!(
            "batch read returned {} accounts for {} addresses",
            batch.accounts.len(),
            addresses.len()
        )));
    }

    let bytes = |i: usize| -> Result<&[u8]> {
        batch.accounts[i]
            .as_ref()
            .ok_or(Error::AccountNotFound(addresses[i]))
            .and_then(AccountData::base64_bytes)
    };

    let pool_record = parse_pool(bytes(0)?)?;
    let coin = parse_token_account(bytes(1)?)?;
    let pc = parse_token_account(bytes(2)?)?;
    let oo = parse_open_orders(bytes(3)?)?;

    let snapshot = compute_reserves(&pool_record, &coin, &pc, &oo, batch.slot)?;
    debug!(
        "reserves for {pool} at slot {}: coin={} pc={}",
        snapshot.slot, snapshot.coin, snapshot.pc
    );
    Ok(snapshot)
}

/// `vault + open_orders_total - need_take_pnl` for each side.
pub fn compute_reserves(
    pool:        &PoolRecord,
    coin_vault:  &TokenAccountRecord,
    pc_vault:    &TokenAccountRecord,
    open_orders: &OpenOrdersRecord,
    slot:        u64,
) -> Result<ReserveSnapshot> {
    let side = |vault: u64, in_orders: u64, pnl: u64| -> Result<u128> {
        (vault as u128 + in_orders as u128)
            .checked_sub(pnl as u128)
            .ok_or(Error::MathOverflow)
    };
    Ok(ReserveSnapshot {
        coin: side(coin_vault.amount, open_orders.base_token_total, pool.need_take_pnl_coin)?,
        pc:   side(pc_vault.amount, open_orders.quote_token_total, pool.need_take_pnl_pc)?,
        fees: FeeRatio {
            denominator: pool.swap_fee.denominator,
            numerator:   pool.swap_fee.numerator,
        },
        slot,
    })
}
