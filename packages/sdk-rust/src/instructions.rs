//! Low-level instruction builders for the AMM v4 program.
//!
//! Account order mirrors the on-chain program's swap handler exactly; the
//! program reads accounts positionally.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey,
    pubkey::Pubkey,
};

use crate::types::PoolInfo;

// ─── Well-known program IDs ───────────────────────────────────────────────────

pub const SPL_TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ATA_PROGRAM_ID: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// Instruction index of `swap_base_in` in the AMM v4 program.
pub const SWAP_OPCODE: u8 = 9;

/// Derive the Associated Token Account for a wallet + mint.
pub fn derive_ata(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[wallet.as_ref(), SPL_TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ATA_PROGRAM_ID,
    )
    .0
}

// ─── swap ─────────────────────────────────────────────────────────────────────

/// Swap payload: `[9][amount_in u64 LE][min_amount_out u64 LE]`.
pub fn swap_data(amount_in: u64, min_amount_out: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(17);
    data.push(SWAP_OPCODE);
    data.extend_from_slice(&amount_in.to_le_bytes());
    data.extend_from_slice(&min_amount_out.to_le_bytes());
    data
}

/// Build the `swap` instruction against `pool`.
///
/// `user_source` is debited `amount_in`; the transaction fails on chain if
/// `user_dest` would receive less than `min_amount_out`.  Only `user_owner`
/// signs.
pub fn swap_ix(
    pool:           &PoolInfo,
    user_source:    &Pubkey,
    user_dest:      &Pubkey,
    user_owner:     &Pubkey,
    amount_in:      u64,
    min_amount_out: u64,
) -> Instruction {
    Instruction {
        program_id: pool.program_id,
        accounts: vec![
            AccountMeta::new_readonly(SPL_TOKEN_PROGRAM_ID, false),
            AccountMeta::new(pool.id, false),
            AccountMeta::new_readonly(pool.authority, false),
            AccountMeta::new(pool.open_orders, false),
            AccountMeta::new(pool.target_orders, false),
            AccountMeta::new(pool.base_vault, false),
            AccountMeta::new(pool.quote_vault, false),
            AccountMeta::new_readonly(pool.market_program_id, false),
            AccountMeta::new(pool.market_id, false),
            AccountMeta::new(pool.market_bids, false),
            AccountMeta::new(pool.market_asks, false),
            AccountMeta::new(pool.market_event_queue, false),
            AccountMeta::new(pool.market_base_vault, false),
            AccountMeta::new(pool.market_quote_vault, false),
            AccountMeta::new_readonly(pool.market_authority, false),
            AccountMeta::new(*user_source, false),
            AccountMeta::new(*user_dest, false),
            AccountMeta::new_readonly(*user_owner, true), // signer
        ],
        data: swap_data(amount_in, min_amount_out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pda::AssociatedAccounts;

    fn pool() -> PoolInfo {
        let k = Pubkey::new_unique;
        PoolInfo {
            id:                 k(),
            base_mint:          k(),
            quote_mint:         k(),
            lp_mint:            k(),
            version:            4,
            program_id:         k(),
            authority:          k(),
            open_orders:        k(),
            target_orders:      k(),
            base_vault:         k(),
            quote_vault:        k(),
            withdraw_queue:     k(),
            lp_vault:           k(),
            market_version:     3,
            market_program_id:  k(),
            market_id:          k(),
            market_authority:   k(),
            market_base_vault:  k(),
            market_quote_vault: k(),
            market_bids:        k(),
            market_asks:        k(),
            market_event_queue: k(),
            associated:         AssociatedAccounts {
                amm_id:        k(),
                coin_vault:    k(),
                pc_vault:      k(),
                lp_mint:       k(),
                temp_lp_token: k(),
                target_orders: k(),
                withdraw:      k(),
                open_orders:   k(),
            },
        }
    }

    #[test]
    fn test_swap_data_bytes() {
        let data = swap_data(0x0102, u64::MAX);
        assert_eq!(data.len(), 17);
        assert_eq!(data[0], 9);
        assert_eq!(&data[1..9], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&data[9..], &[0xff; 8]);
    }

    #[test]
    fn test_swap_account_order() {
        let pool = pool();
        let (src, dst, owner) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let ix = swap_ix(&pool, &src, &dst, &owner, 100, 90);

        assert_eq!(ix.program_id, pool.program_id);
        let keys: Vec<Pubkey> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert_eq!(keys, vec![
            SPL_TOKEN_PROGRAM_ID,
            pool.id,
            pool.authority,
            pool.open_orders,
            pool.target_orders,
            pool.base_vault,
            pool.quote_vault,
            pool.market_program_id,
            pool.market_id,
            pool.market_bids,
            pool.market_asks,
            pool.market_event_queue,
            pool.market_base_vault,
            pool.market_quote_vault,
            pool.market_authority,
            src,
            dst,
            owner,
        ]);

        let writable: Vec<usize> = ix
            .accounts
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_writable)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(writable, vec![1, 3, 4, 5, 6, 8, 9, 10, 11, 12, 13, 15, 16]);

        let signers: Vec<usize> = ix
            .accounts
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_signer)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(signers, vec![17]);
        assert_eq!(ix.data, swap_data(100, 90));
    }

    #[test]
    fn test_ata_is_deterministic() {
        let (wallet, mint) = (Pubkey::new_unique(), Pubkey::new_unique());
        assert_eq!(derive_ata(&wallet, &mint), derive_ata(&wallet, &mint));
        assert_ne!(derive_ata(&wallet, &mint), derive_ata(&wallet, &Pubkey::new_unique()));
    }
}
