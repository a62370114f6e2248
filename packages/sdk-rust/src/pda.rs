//! Program-derived addresses used by AMM v4 pools and Serum markets.
//!
//! A pool's auxiliary accounts are derived from `[program_id, market, label]`
//! with a label per role.  The vault signer of a market is derived from
//! `[market, nonce_le]` under the market program with the nonce stored in
//! the market itself.

use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

pub const AMM_ASSOCIATED_SEED: &[u8] = b"amm_associated_seed";
pub const COIN_VAULT_ASSOCIATED_SEED: &[u8] = b"coin_vault_associated_seed";
pub const PC_VAULT_ASSOCIATED_SEED: &[u8] = b"pc_vault_associated_seed";
pub const LP_MINT_ASSOCIATED_SEED: &[u8] = b"lp_mint_associated_seed";
pub const TEMP_LP_TOKEN_ASSOCIATED_SEED: &[u8] = b"temp_lp_token_associated_seed";
pub const TARGET_ASSOCIATED_SEED: &[u8] = b"target_associated_seed";
pub const WITHDRAW_ASSOCIATED_SEED: &[u8] = b"withdraw_associated_seed";
pub const OPEN_ORDER_ASSOCIATED_SEED: &[u8] = b"open_order_associated_seed";

/// Seed of the pool-wide AMM authority.
pub const AMM_AUTHORITY_SEED: &[u8] = b"amm authority";

/// Derive an address from explicit seeds (the bump, if any, already included).
///
/// Fails with [`Error::ProgramAddress`] when the result lands on the curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey> {
    Ok(Pubkey::create_program_address(seeds, program_id)?)
}

/// Search bumps 255 down to 0 and return the first off-curve address.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or(Error::AddressDerivationExhausted(*program_id))
}

/// Address of one associated account of the pool on `market`.
pub fn derive_associated(program_id: &Pubkey, market: &Pubkey, label: &[u8]) -> Result<Pubkey> {
    find_program_address(&[program_id.as_ref(), market.as_ref(), label], program_id)
        .map(|(address, _)| address)
}

/// The AMM authority and its bump.  Signs for every pool vault of the program.
pub fn derive_amm_authority(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    find_program_address(&[AMM_AUTHORITY_SEED], program_id)
}

/// The vault signer of a Serum market, from the market's stored nonce.
pub fn derive_vault_signer(
    market: &Pubkey,
    nonce: u64,
    market_program_id: &Pubkey,
) -> Result<Pubkey> {
    create_program_address(&[market.as_ref(), &nonce.to_le_bytes()], market_program_id)
}

/// Every associated account of a pool, derived from its market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociatedAccounts {
    pub amm_id:        Pubkey,
    pub coin_vault:    Pubkey,
    pub pc_vault:      Pubkey,
    pub lp_mint:       Pubkey,
    pub temp_lp_token: Pubkey,
    pub target_orders: Pubkey,
    pub withdraw:      Pubkey,
    pub open_orders:   Pubkey,
}

impl AssociatedAccounts {
    pub fn derive(program_id: &Pubkey, market: &Pubkey) -> Result<Self> {
        let d = |label| derive_associated(program_id, market, label);
        Ok(Self {
            amm_id:        d(AMM_ASSOCIATED_SEED)?,
            coin_vault:    d(COIN_VAULT_ASSOCIATED_SEED)?,
            pc_vault:      d(PC_VAULT_ASSOCIATED_SEED)?,
            lp_mint:       d(LP_MINT_ASSOCIATED_SEED)?,
            temp_lp_token: d(TEMP_LP_TOKEN_ASSOCIATED_SEED)?,
            target_orders: d(TARGET_ASSOCIATED_SEED)?,
            withdraw:      d(WITHDRAW_ASSOCIATED_SEED)?,
            open_orders:   d(OPEN_ORDER_ASSOCIATED_SEED)?,
        })
    }

    /// `(role, address)` pairs in derivation order.
    pub fn entries(&self) -> [(&'static str, Pubkey); 8] {
        [
            ("amm_id", self.amm_id),
            ("coin_vault", self.coin_vault),
            ("pc_vault", self.pc_vault),
            ("lp_mint", self.lp_mint),
            ("temp_lp_token", self.temp_lp_token),
            ("target_orders", self.target_orders),
            ("withdraw", self.withdraw),
            ("open_orders", self.open_orders),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_deterministic_and_consistent() {
        let program = Pubkey::new_unique();
        let market = Pubkey::new_unique();
        let seeds: &[&[u8]] = &[program.as_ref(), market.as_ref(), AMM_ASSOCIATED_SEED];

        let (a, bump) = find_program_address(seeds, &program).unwrap();
        let (b, bump_again) = find_program_address(seeds, &program).unwrap();
        assert_eq!((a, bump), (b, bump_again));

        let bump_seed = [bump];
        let with_bump: Vec<&[u8]> = seeds.iter().copied().chain([&bump_seed[..]]).collect();
        assert_eq!(create_program_address(&with_bump, &program).unwrap(), a);
        assert!(!a.is_on_curve());
    }

    #[test]
    fn test_labels_give_distinct_addresses() {
        let program = Pubkey::new_unique();
        let market = Pubkey::new_unique();
        let accounts = AssociatedAccounts::derive(&program, &market).unwrap();
        let mut seen: Vec<Pubkey> = accounts.entries().iter().map(|(_, k)| *k).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 8);
        assert_eq!(
            accounts.coin_vault,
            derive_associated(&program, &market, COIN_VAULT_ASSOCIATED_SEED).unwrap()
        );
    }

    #[test]
    fn test_market_changes_addresses() {
        let program = Pubkey::new_unique();
        let a = AssociatedAccounts::derive(&program, &Pubkey::new_unique()).unwrap();
        let b = AssociatedAccounts::derive(&program, &Pubkey::new_unique()).unwrap();
        assert_ne!(a.amm_id, b.amm_id);
    }

    #[test]
    fn test_vault_signer_matches_some_nonce() {
        // Roughly half of all nonces land on the curve; the first off-curve
        // one is what a market would have stored.
        let program = Pubkey::new_unique();
        let market = Pubkey::new_unique();
        let (nonce, signer) = (0u64..64)
            .find_map(|n| derive_vault_signer(&market, n, &program).ok().map(|k| (n, k)))
            .unwrap();
        assert_eq!(
            Pubkey::create_program_address(&[market.as_ref(), &nonce.to_le_bytes()], &program)
                .unwrap(),
            signer
        );
    }

    #[test]
    fn test_on_curve_seed_is_an_error() {
        let program = Pubkey::new_unique();
        let market = Pubkey::new_unique();
        let n = (0u64..=255)
            .find(|n| derive_vault_signer(&market, *n, &program).is_err())
            .expect("some nonce lands on the curve");
        assert!(matches!(
            derive_vault_signer(&market, n, &program),
            Err(Error::ProgramAddress(_))
        ));
    }

    // Mainnet Raydium v4 program and its SOL-USDC Serum v3 market.
    const RAYDIUM_V4: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
    const SERUM_V3: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
    const SOL_USDC_MARKET: &str = "9wFFyRfZBsuAha4YcuxcXLKwMxJR43S7fPfQLusDBzvT";

    #[test]
    fn test_mainnet_amm_authority() {
        let program: Pubkey = RAYDIUM_V4.parse().unwrap();
        let (authority, bump) = derive_amm_authority(&program).unwrap();
        assert_eq!(authority.to_string(), "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1");
        assert_eq!(bump, 254);
    }

    #[test]
    fn test_mainnet_vault_signer() {
        let program: Pubkey = SERUM_V3.parse().unwrap();
        let market: Pubkey = SOL_USDC_MARKET.parse().unwrap();
        assert_eq!(
            derive_vault_signer(&market, 1, &program).unwrap().to_string(),
            "F8Vyqk3unwxkXukZFQeYyGmFfTG3CAX4v24iyrjEYBJV"
        );
        // Nonce 0 lands on the curve for this market.
        assert!(matches!(
            derive_vault_signer(&market, 0, &program),
            Err(Error::ProgramAddress(_))
        ));
    }
}
