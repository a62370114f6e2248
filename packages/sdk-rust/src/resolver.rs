//! Pair discovery: which on-chain pool (or market) trades a given mint pair.
//!
//! Both the AMM and the order book index their accounts by two mint fields
//! at fixed offsets, so one scan-and-score routine serves both.  The only
//! differences live in [`ScanSpec`].

use ethnum::U256;
use log::{debug, info};
use solana_sdk::pubkey::Pubkey;

use crate::decode::{decode, Record, Value};
use crate::error::{Error, Result};
use crate::schema::{ProtocolVariant, Schema, AMM_INFO_V4, MARKET_STATE_V2};
use crate::transport::{MemcmpFilter, Transport};

// ─── Scan description ─────────────────────────────────────────────────────────

/// What a scan is looking for; decides the error when nothing is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    Pool,
    Market,
}

/// Everything that differs between pool discovery and market discovery.
#[derive(Debug, Clone, Copy)]
pub struct ScanSpec {
    pub program_id:  Pubkey,
    pub schema:      &'static Schema,
    pub base_field:  &'static str,
    pub quote_field: &'static str,
    /// Two counters whose sum ranks candidates.
    pub score_fields: (&'static str, &'static str),
    pub target:      ScanTarget,
}

impl ScanSpec {
    /// AMM v4 pools, ranked by cumulative swap volume.
    pub fn amm_v4(program_id: Pubkey) -> Self {
        Self {
            program_id,
            schema:       &AMM_INFO_V4,
            base_field:   "coinMintAddress",
            quote_field:  "pcMintAddress",
            score_fields: ("swapCoinInAmount", "swapPcOutAmount"),
            target:       ScanTarget::Pool,
        }
    }

    /// Serum v3 markets, ranked by deposits.
    pub fn market_v3(program_id: Pubkey) -> Self {
        Self {
            program_id,
            schema:       &MARKET_STATE_V2,
            base_field:   "baseMint",
            quote_field:  "quoteMint",
            score_fields: ("baseDepositsTotal", "quoteDepositsTotal"),
            target:       ScanTarget::Market,
        }
    }

    fn filters(&self, base: &Pubkey, quote: &Pubkey) -> Result<Vec<MemcmpFilter>> {
        Ok(vec![
            MemcmpFilter::pubkey(self.schema.offset_of(self.base_field)?, base),
            MemcmpFilter::pubkey(self.schema.offset_of(self.quote_field)?, quote),
        ])
    }

    fn not_found(&self, token_a: Pubkey, token_b: Pubkey) -> Error {
        match self.target {
            ScanTarget::Pool => Error::NoPoolForPair(token_a, token_b),
            ScanTarget::Market => Error::NoMarketForPair(token_a, token_b),
        }
    }
}

// ─── Candidates ───────────────────────────────────────────────────────────────

/// One decoded scan hit with its two score components.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub address: Pubkey,
    pub scores:  (u128, u128),
    pub record:  Record,
}

impl Candidate {
    pub fn score(&self) -> U256 {
        U256::from(self.scores.0) + U256::from(self.scores.1)
    }

    fn drained(&self) -> bool {
        self.scores.0 == 0 || self.scores.1 == 0
    }
}

/// The winning account for a pair.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub address:         Pubkey,
    /// `true` when the first token passed in is the account's base mint.
    pub token_a_is_base: bool,
    pub record:          Record,
}

/// Index of the highest-scoring candidate; the earliest one wins ties.
pub fn pick_best(candidates: &[Candidate]) -> Option<usize> {
    let mut best: Option<(usize, U256)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let score = candidate.score();
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

// ─── Resolution ───────────────────────────────────────────────────────────────

/// Find the busiest account trading `token_a` against `token_b`.
///
/// Scans with `token_a` as base first and only tries the swapped order when
/// that yields nothing.  Records that fail to decode are skipped.  With
/// `exclude_drained`, candidates with either score component at zero never
/// count.
pub fn resolve_pair<T: Transport + ?Sized>(
    transport:       &T,
    spec:            &ScanSpec,
    token_a:         &Pubkey,
    token_b:         &Pubkey,
    exclude_drained: bool,
) -> Result<Resolution> {
    let mut candidates = scan(transport, spec, token_a, token_b, exclude_drained)?;
    let mut token_a_is_base = true;
    if candidates.is_empty() {
        candidates = scan(transport, spec, token_b, token_a, exclude_drained)?;
        token_a_is_base = false;
    }

    let best = pick_best(&candidates).ok_or_else(|| spec.not_found(*token_a, *token_b))?;
    let winner = candidates.swap_remove(best);
    info!(
        "{}: resolved {token_a}/{token_b} to {} ({} candidates, score {})",
        spec.schema.name,
        winner.address,
        candidates.len() + 1,
        winner.score()
    );
    Ok(Resolution { address: winner.address, token_a_is_base, record: winner.record })
}

fn scan<T: Transport + ?Sized>(
    transport:       &T,
    spec:            &ScanSpec,
    base:            &Pubkey,
    quote:           &Pubkey,
    exclude_drained: bool,
) -> Result<Vec<Candidate>> {
    let raw = transport.scan_accounts(&spec.program_id, &spec.filters(base, quote)?)?;
    debug!("{}: {} raw accounts for {base}/{quote}", spec.schema.name, raw.len());

    let mut out = Vec::with_capacity(raw.len());
    for (address, data) in raw {
        let candidate = decode(&data, spec.schema).and_then(|record| {
            let scores = (
                numeric(&record, spec.score_fields.0)?,
                numeric(&record, spec.score_fields.1)?,
            );
            Ok(Candidate { address, scores, record })
        });
        match candidate {
            Ok(c) if exclude_drained && c.drained() => {
                debug!("{}: skipping drained {address}", spec.schema.name);
            }
            Ok(c) => out.push(c),
            Err(e) => debug!("{}: skipping {address}: {e}", spec.schema.name),
        }
    }
    Ok(out)
}

/// Read a counter field regardless of its width.
fn numeric(record: &Record, field: &str) -> Result<u128> {
    match record.get(field) {
        Some(Value::U128(v)) => Ok(*v),
        Some(Value::U64(v)) => Ok(*v as u128),
        Some(Value::U32(v)) => Ok(*v as u128),
        Some(Value::U8(v)) => Ok(*v as u128),
        Some(_) => Err(Error::FieldType {
            schema:   record.schema.name,
            field:    record.schema.field(field).map(|f| f.name).unwrap_or(""),
            expected: "integer",
        }),
        None => Err(Error::FieldMissing {
            schema: record.schema.name,
            field:  field.to_string(),
        }),
    }
}

// ─── Alternate protocols ──────────────────────────────────────────────────────

/// Every pool of another swap program that trades the pair, either way round.
///
/// Layouts without mint fields cannot be filtered and yield nothing.
pub fn scan_variant<T: Transport + ?Sized>(
    transport:  &T,
    variant:    ProtocolVariant,
    program_id: &Pubkey,
    token_a:    &Pubkey,
    token_b:    &Pubkey,
) -> Result<Vec<(Pubkey, Record)>> {
    let Some((mint_a, mint_b)) = variant.mint_fields() else {
        debug!("{}: layout has no mint fields, nothing to scan", variant.name());
        return Ok(Vec::new());
    };
    let schema = variant.schema();
    let (off_a, off_b) = (schema.offset_of(mint_a)?, schema.offset_of(mint_b)?);

    let mut out = Vec::new();
    for (first, second) in [(token_a, token_b), (token_b, token_a)] {
        let filters = [MemcmpFilter::pubkey(off_a, first), MemcmpFilter::pubkey(off_b, second)];
        for (address, data) in transport.scan_accounts(program_id, &filters)? {
            match decode(&data, schema) {
                Ok(record) => out.push((address, record)),
                Err(e) => debug!("{}: skipping {address}: {e}", variant.name()),
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(a: u128, b: u128) -> Candidate {
        Candidate {
            address: Pubkey::new_unique(),
            scores:  (a, b),
            record:  Record::zeroed(&AMM_INFO_V4),
        }
    }

    #[test]
    fn test_highest_score_wins() {
        let list = [candidate(10, 0), candidate(15, 15), candidate(20, 0)];
        assert_eq!(pick_best(&list), Some(1));
    }

    #[test]
    fn test_first_wins_ties() {
        let list = [candidate(5, 5), candidate(0, 10), candidate(10, 0)];
        assert_eq!(pick_best(&list), Some(0));
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(pick_best(&[candidate(0, 0)]), Some(0));
        assert_eq!(pick_best(&[]), None);
    }

    #[test]
    fn test_score_does_not_overflow() {
        let c = candidate(u128::MAX, u128::MAX);
        assert_eq!(c.score(), U256::from(u128::MAX) * U256::from(2u8));
    }

    #[test]
    fn test_drained() {
        assert!(candidate(0, 50).drained());
        assert!(candidate(50, 0).drained());
        assert!(!candidate(1, 1).drained());
    }

    #[test]
    fn test_scan_spec_offsets() {
        let amm = ScanSpec::amm_v4(Pubkey::new_unique());
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        let filters = amm.filters(&a, &b).unwrap();
        assert_eq!((filters[0].offset, filters[1].offset), (400, 432));

        let market = ScanSpec::market_v3(Pubkey::new_unique());
        let filters = market.filters(&a, &b).unwrap();
        assert_eq!((filters[0].offset, filters[1].offset), (53, 85));
        assert_eq!(filters[0].bytes, a.to_bytes().to_vec());
    }

    #[test]
    fn test_numeric_widths() {
        let record = Record::zeroed(&MARKET_STATE_V2)
            .with("baseDepositsTotal", Value::U64(7))
            .unwrap();
        assert_eq!(numeric(&record, "baseDepositsTotal").unwrap(), 7);
        assert!(matches!(numeric(&record, "baseMint"), Err(Error::FieldType { .. })));
        assert!(matches!(numeric(&record, "missing"), Err(Error::FieldMissing { .. })));
    }
}
