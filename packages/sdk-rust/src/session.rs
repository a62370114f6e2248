//! A client bound to one resolved pool.

use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Keypair};

use crate::client::AmmClient;
use crate::error::Result;
use crate::transport::{SendOptions, Transport};
use crate::types::{PoolInfo, Quote, ReserveSnapshot, SwapParams, SwapResult, SwapSide};

/// Resolves a pair once, then forwards every call with that [`PoolInfo`].
pub struct AmmSession<'a, T: Transport> {
    client: &'a AmmClient<T>,
    pool:   PoolInfo,
}

impl<'a, T: Transport> AmmSession<'a, T> {
    /// Resolve the pool for `token_a`/`token_b` and bind to it.
    pub fn open(
        client:          &'a AmmClient<T>,
        token_a:         &Pubkey,
        token_b:         &Pubkey,
        exclude_drained: bool,
    ) -> Result<Self> {
        let pool = client.pool_info(token_a, token_b, exclude_drained)?;
        Ok(Self { client, pool })
    }

    /// Bind to an already resolved pool.
    pub fn with_pool(client: &'a AmmClient<T>, pool: PoolInfo) -> Self {
        Self { client, pool }
    }

    pub fn pool(&self) -> &PoolInfo {
        &self.pool
    }

    pub fn reserves(&self) -> Result<ReserveSnapshot> {
        self.client.reserves(&self.pool)
    }

    pub fn quote(&self, side: SwapSide, amount_in: u64) -> Result<Quote> {
        self.client.quote(&self.pool, side, amount_in)
    }

    pub fn amount_out(&self, side: SwapSide, amount_in: u64) -> Result<(u64, u64)> {
        self.client.amount_out(&self.pool, side, amount_in)
    }

    pub fn swap_ix(
        &self,
        user_source:    &Pubkey,
        user_dest:      &Pubkey,
        user_owner:     &Pubkey,
        amount_in:      u64,
        min_amount_out: u64,
    ) -> Instruction {
        self.client.swap_ix(&self.pool, user_source, user_dest, user_owner, amount_in, min_amount_out)
    }

    pub fn swap(&self, payer: &Keypair, params: SwapParams, options: &SendOptions) -> Result<SwapResult> {
        self.client.swap(&self.pool, payer, params, options)
    }
}
