//! [`AmmClient`]: the main entry point for integrations.

use log::{info, warn};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};

use crate::{
    config::ClientConfig,
    decode::Record,
    error::Result,
    instructions::{derive_ata, swap_ix},
    math::{amount_out, min_amount_out, price_impact_pct},
    pda::{derive_amm_authority, derive_vault_signer, AssociatedAccounts},
    reserves::get_reserves,
    resolver::{resolve_pair, scan_variant, Resolution, ScanSpec},
    schema::ProtocolVariant,
    state::{parse_market, parse_pool, MarketRecord, PoolRecord},
    transport::{RpcTransport, SendOptions, Transport},
    types::{PoolInfo, Quote, ReserveSnapshot, SwapParams, SwapResult, SwapSide},
};

// ─── Client ───────────────────────────────────────────────────────────────────

/// Stateless client for Raydium v4 pools and their Serum markets.
///
/// Every method works on explicit values; nothing is cached between calls.
///
/// ```rust,no_run
/// # use rayswap_sdk::{AmmClient, ClientConfig, SwapSide};
/// # use solana_sdk::pubkey::Pubkey;
/// # use std::str::FromStr;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AmmClient::connect(ClientConfig::mainnet());
/// let sol  = Pubkey::from_str("So11111111111111111111111111111111111111112")?;
/// let usdc = Pubkey::from_str("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")?;
/// let pool  = client.pool_info(&sol, &usdc, true)?;
/// let quote = client.quote(&pool, SwapSide::Sell, 1_000_000_000)?;
/// println!("1 SOL -> {} USDC base units", quote.amount_out);
/// # Ok(())
/// # }
/// ```
pub struct AmmClient<T: Transport = RpcTransport> {
    config:    ClientConfig,
    transport: T,
}

impl AmmClient<RpcTransport> {
    /// Client over JSON-RPC at `config.rpc_url`.
    pub fn connect(config: ClientConfig) -> Self {
        let transport = RpcTransport::new(&config);
        Self { config, transport }
    }
}

impl<T: Transport> AmmClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Discovery ─────────────────────────────────────────────────────────────

    /// The busiest AMM v4 pool for the pair.
    pub fn find_amm(&self, token_a: &Pubkey, token_b: &Pubkey, exclude_drained: bool) -> Result<Resolution> {
        let spec = ScanSpec::amm_v4(self.config.amm_program_id);
        resolve_pair(&self.transport, &spec, token_a, token_b, exclude_drained)
    }

    /// The busiest order-book market for the pair.
    pub fn find_market(&self, token_a: &Pubkey, token_b: &Pubkey, exclude_drained: bool) -> Result<Resolution> {
        let spec = ScanSpec::market_v3(self.config.market_program_id);
        resolve_pair(&self.transport, &spec, token_a, token_b, exclude_drained)
    }

    /// Pools of another swap program trading the pair.
    pub fn scan_variant(
        &self,
        variant:    ProtocolVariant,
        program_id: &Pubkey,
        token_a:    &Pubkey,
        token_b:    &Pubkey,
    ) -> Result<Vec<(Pubkey, Record)>> {
        scan_variant(&self.transport, variant, program_id, token_a, token_b)
    }

    /// Resolve pool and market for the pair and gather every address a swap needs.
    pub fn pool_info(&self, token_a: &Pubkey, token_b: &Pubkey, exclude_drained: bool) -> Result<PoolInfo> {
        let amm = self.find_amm(token_a, token_b, exclude_drained)?;
        let market = self.find_market(token_a, token_b, exclude_drained)?;
        self.pool_info_at(&amm.address, &market.address)
    }

    /// Build [`PoolInfo`] from known pool and market addresses.
    pub fn pool_info_at(&self, amm_id: &Pubkey, market_id: &Pubkey) -> Result<PoolInfo> {
        let pool = parse_pool(self.transport.read_account(amm_id)?.base64_bytes()?)?;
        let market = parse_market(self.transport.read_account(market_id)?.base64_bytes()?)?;
        if pool.market != *market_id {
            warn!("pool {amm_id} stores market {} but {market_id} was resolved", pool.market);
        }

        let info = assemble_pool_info(&self.config, amm_id, &pool, market_id, &market)?;
        for (role, stored, derived) in info.associated_mismatches() {
            warn!("pool {amm_id}: {role} is {stored} on chain but derives to {derived}");
        }
        info!("pool {amm_id}: {} / {} via market {market_id}", info.base_mint, info.quote_mint);
        Ok(info)
    }

    // ── Pricing ───────────────────────────────────────────────────────────────

    pub fn reserves(&self, pool: &PoolInfo) -> Result<ReserveSnapshot> {
        get_reserves(&self.transport, &pool.id, &pool.base_vault, &pool.quote_vault, &pool.open_orders)
    }

    /// Fetch fresh reserves and price a swap against them.
    pub fn quote(&self, pool: &PoolInfo, side: SwapSide, amount_in: u64) -> Result<Quote> {
        let reserves = self.reserves(pool)?;
        Ok(Quote {
            side,
            amount_in,
            amount_out: amount_out(amount_in, side, &reserves)?,
            price_impact_pct: price_impact_pct(amount_in, side, &reserves),
            reserves,
        })
    }

    /// Output amount only, with the slot it was priced at.
    pub fn amount_out(&self, pool: &PoolInfo, side: SwapSide, amount_in: u64) -> Result<(u64, u64)> {
        let quote = self.quote(pool, side, amount_in)?;
        Ok((quote.amount_out, quote.reserves.slot))
    }

    // ── Swaps ─────────────────────────────────────────────────────────────────

    pub fn swap_ix(
        &self,
        pool:           &PoolInfo,
        user_source:    &Pubkey,
        user_dest:      &Pubkey,
        user_owner:     &Pubkey,
        amount_in:      u64,
        min_amount_out: u64,
    ) -> Instruction {
        swap_ix(pool, user_source, user_dest, user_owner, amount_in, min_amount_out)
    }

    /// The owner's associated token accounts as `(source, dest)` for `side`.
    pub fn user_token_accounts(&self, pool: &PoolInfo, owner: &Pubkey, side: SwapSide) -> (Pubkey, Pubkey) {
        let base = derive_ata(owner, &pool.base_mint);
        let quote = derive_ata(owner, &pool.quote_mint);
        match side {
            SwapSide::Buy => (quote, base),
            SwapSide::Sell => (base, quote),
        }
    }

    /// Quote, apply the slippage guard and submit a swap between the payer's
    /// associated token accounts.
    pub fn swap(
        &self,
        pool:    &PoolInfo,
        payer:   &Keypair,
        params:  SwapParams,
        options: &SendOptions,
    ) -> Result<SwapResult> {
        let quote = self.quote(pool, params.side, params.amount_in)?;
        let min_out = if params.max_slippage_bps == 0 {
            0
        } else {
            min_amount_out(quote.amount_out, params.max_slippage_bps)?
        };

        let owner = payer.pubkey();
        let (source, dest) = self.user_token_accounts(pool, &owner, params.side);
        let ix = swap_ix(pool, &source, &dest, &owner, params.amount_in, min_out);
        let signature = self.send(&[ix], payer, options)?;
        info!("swap {} {} on {}: {signature}", params.side, params.amount_in, pool.id);

        Ok(SwapResult {
            signature:      signature.to_string(),
            pool:           pool.id,
            side:           params.side,
            amount_in:      params.amount_in,
            estimated_out:  quote.amount_out,
            min_amount_out: min_out,
        })
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn send(&self, instructions: &[Instruction], payer: &Keypair, options: &SendOptions) -> Result<Signature> {
        let signers: [&dyn Signer; 1] = [payer];
        self.transport.submit_transaction(instructions, &payer.pubkey(), &signers, options)
    }
}

/// Combine decoded pool and market state with derived authorities.
pub fn assemble_pool_info(
    config:    &ClientConfig,
    amm_id:    &Pubkey,
    pool:      &PoolRecord,
    market_id: &Pubkey,
    market:    &MarketRecord,
) -> Result<PoolInfo> {
    let (authority, _) = derive_amm_authority(&config.amm_program_id)?;
    let market_authority =
        derive_vault_signer(market_id, market.vault_signer_nonce, &config.market_program_id)?;
    // Seeded by the AMM program, which owns these accounts; not the market program.
    let associated = AssociatedAccounts::derive(&config.amm_program_id, market_id)?;

    Ok(PoolInfo {
        id:                 *amm_id,
        base_mint:          pool.coin_mint,
        quote_mint:         pool.pc_mint,
        lp_mint:            pool.lp_mint,
        version:            4,
        program_id:         config.amm_program_id,
        authority,
        open_orders:        pool.open_orders,
        target_orders:      pool.target_orders,
        base_vault:         pool.coin_vault,
        quote_vault:        pool.pc_vault,
        withdraw_queue:     pool.withdraw_queue,
        lp_vault:           pool.temp_lp_token_account,
        market_version:     3,
        market_program_id:  config.market_program_id,
        market_id:          *market_id,
        market_authority,
        market_base_vault:  market.base_vault,
        market_quote_vault: market.quote_vault,
        market_bids:        market.bids,
        market_asks:        market.asks,
        market_event_queue: market.event_queue,
        associated,
    })
}
