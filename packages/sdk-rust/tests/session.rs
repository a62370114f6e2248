//! End-to-end: resolve a pool, build its PoolInfo, quote and swap.

mod common;

use common::{PoolFixture, MockNode};
use rayswap_sdk::{
    instructions::{derive_ata, swap_data, SPL_TOKEN_PROGRAM_ID},
    pda::{derive_amm_authority, derive_vault_signer, AssociatedAccounts},
    AmmClient, AmmSession, ClientConfig, Error, SendOptions, SwapParams, SwapSide,
};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};

fn client() -> AmmClient<MockNode> {
    let config = ClientConfig {
        amm_program_id:    Pubkey::new_unique(),
        market_program_id: Pubkey::new_unique(),
        ..ClientConfig::localnet()
    };
    AmmClient::new(config, MockNode::new())
}

fn install(client: &AmmClient<MockNode>) -> PoolFixture {
    let config = client.config();
    PoolFixture::install(
        client.transport(),
        &config.amm_program_id,
        &config.market_program_id,
        2_000,
        1_000,
    )
}

#[test]
fn test_pool_info_is_complete() {
    let client = client();
    let fx = install(&client);
    let config = client.config().clone();

    let info = client.pool_info(&fx.coin_mint, &fx.pc_mint, true).unwrap();
    assert_eq!(info.id, fx.amm_id);
    assert_eq!((info.base_mint, info.quote_mint), (fx.coin_mint, fx.pc_mint));
    assert_eq!((info.version, info.market_version), (4, 3));
    assert_eq!(info.program_id, config.amm_program_id);
    assert_eq!(info.authority, derive_amm_authority(&config.amm_program_id).unwrap().0);
    assert_eq!(info.base_vault, fx.coin_vault);
    assert_eq!(info.quote_vault, fx.pc_vault);
    assert_eq!(info.open_orders, fx.open_orders);
    assert_eq!(info.market_id, fx.market_id);
    assert_eq!(info.market_program_id, config.market_program_id);
    assert_eq!(
        info.market_authority,
        derive_vault_signer(&fx.market_id, fx.nonce, &config.market_program_id).unwrap()
    );
    assert_eq!(
        info.associated,
        AssociatedAccounts::derive(&config.amm_program_id, &fx.market_id).unwrap()
    );
}

#[test]
fn test_stored_addresses_differ_from_derived() {
    let client = client();
    let fx = install(&client);
    let info = client.pool_info(&fx.coin_mint, &fx.pc_mint, false).unwrap();

    // Fixture addresses are random, so every role disagrees with its seed.
    let roles: Vec<&str> = info.associated_mismatches().iter().map(|(r, _, _)| *r).collect();
    assert!(roles.contains(&"amm_id"));
    assert!(roles.contains(&"coin_vault"));
    assert_eq!(roles.len(), 8);

    let mut aligned = info.clone();
    let a = info.associated;
    aligned.id = a.amm_id;
    aligned.base_vault = a.coin_vault;
    aligned.quote_vault = a.pc_vault;
    aligned.lp_mint = a.lp_mint;
    aligned.lp_vault = a.temp_lp_token;
    aligned.target_orders = a.target_orders;
    aligned.withdraw_queue = a.withdraw;
    aligned.open_orders = a.open_orders;
    assert!(aligned.associated_mismatches().is_empty());
}

#[test]
fn test_reversed_pair_resolves_same_pool() {
    let client = client();
    let fx = install(&client);
    let info = client.pool_info(&fx.pc_mint, &fx.coin_mint, true).unwrap();
    assert_eq!(info.id, fx.amm_id);
    assert!(info.is_base(&fx.coin_mint));
}

#[test]
fn test_session_quotes_and_builds_swap() {
    let client = client();
    let fx = install(&client);
    let session = AmmSession::open(&client, &fx.coin_mint, &fx.pc_mint, true).unwrap();

    let reserves = session.reserves().unwrap();
    assert_eq!((reserves.coin, reserves.pc), (2_000, 1_000));

    // Buying coin with 100 pc: 2000 * 100 * 9975 / (1000 * 10000 + 100 * 9975)
    let quote = session.quote(SwapSide::Buy, 100).unwrap();
    assert_eq!(quote.amount_out, 181);
    assert_eq!(session.amount_out(SwapSide::Buy, 100).unwrap(), (181, 100));

    let (src, dst, owner) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    let ix = session.swap_ix(&src, &dst, &owner, 100, 181);
    assert_eq!(ix.program_id, session.pool().program_id);
    assert_eq!(ix.accounts.len(), 18);
    assert_eq!(ix.accounts[0].pubkey, SPL_TOKEN_PROGRAM_ID);
    assert_eq!(ix.accounts[1].pubkey, fx.amm_id);
    assert_eq!(ix.accounts[14].pubkey, session.pool().market_authority);
    assert_eq!(ix.data, swap_data(100, 181));
}

#[test]
fn test_swap_submits_with_slippage_floor() {
    let client = client();
    let fx = install(&client);
    let session = AmmSession::open(&client, &fx.coin_mint, &fx.pc_mint, false).unwrap();
    let payer = Keypair::new();

    let result = session
        .swap(&payer, SwapParams { side: SwapSide::Sell, amount_in: 100, max_slippage_bps: 100 }, &SendOptions::default())
        .unwrap();

    // Selling 100 coin: 1000 * 100 * 9975 / (2000 * 10000 + 100 * 9975) = 47
    assert_eq!(result.estimated_out, 47);
    assert_eq!(result.min_amount_out, 46);
    assert_eq!(result.pool, fx.amm_id);

    let submitted = client.transport().submitted.borrow();
    assert_eq!(submitted.len(), 1);
    let ix = &submitted[0];
    assert_eq!(ix.accounts[15].pubkey, derive_ata(&payer.pubkey(), &fx.coin_mint));
    assert_eq!(ix.accounts[16].pubkey, derive_ata(&payer.pubkey(), &fx.pc_mint));
    assert_eq!(ix.accounts[17].pubkey, payer.pubkey());
    assert!(ix.accounts[17].is_signer);
    assert_eq!(ix.data, swap_data(100, 46));
}

#[test]
fn test_unknown_pair() {
    let client = client();
    install(&client);
    let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
    assert!(matches!(
        AmmSession::open(&client, &a, &b, false),
        Err(Error::NoPoolForPair(..))
    ));
}
