use anyhow::{anyhow, bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use log::debug;
use rayswap_sdk::{
    decode::{Record, Value},
    instructions::derive_ata,
    math::min_amount_out,
    schema::ProtocolVariant,
    AmmClient, ClientConfig, PoolInfo, Quote, ReserveSnapshot, SendOptions, SwapParams, SwapSide,
};
use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// ─── Token symbol registry (mainnet-beta) ────────────────────────────────────

const KNOWN_TOKENS: &[(&str, &str)] = &[
    ("SOL",  "So11111111111111111111111111111111111111112"),
    ("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
    ("USDT", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"),
    ("RAY",  "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R"),
];

/// Resolve a symbol (SOL, USDC, USDT, RAY) or raw base-58 mint address to a Pubkey.
fn resolve_mint(symbol_or_address: &str) -> Result<Pubkey> {
    let upper = symbol_or_address.to_uppercase();
    for (sym, addr) in KNOWN_TOKENS {
        if upper == *sym {
            return Ok(Pubkey::from_str(addr)?);
        }
    }
    Pubkey::from_str(symbol_or_address)
        .map_err(|_| anyhow!(
            "Unknown token '{}'. Use a built-in symbol ({}) or a base-58 mint address.",
            symbol_or_address,
            KNOWN_TOKENS.iter().map(|(s, _)| *s).collect::<Vec<_>>().join(", ")
        ))
}

/// Reverse-lookup: mint address → symbol, or shortened address for unknowns.
fn resolve_symbol(mint: &Pubkey) -> String {
    let addr = mint.to_string();
    for (sym, known) in KNOWN_TOKENS {
        if addr == *known {
            return sym.to_string();
        }
    }
    format!("{}…{}", &addr[..4], &addr[addr.len() - 4..])
}

/// Expand `~/` to `$HOME/` in keypair paths.
fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        format!("{}/{}", std::env::var("HOME").unwrap_or_default(), rest)
    } else {
        path.to_string()
    }
}

fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded = expand_home(path);
    read_keypair_file(&expanded)
        .map_err(|e| anyhow!(
            "Cannot load keypair from '{}': {}\n  \
             Set RAYSWAP_KEYPAIR or pass --keypair to specify a different path.",
            expanded, e
        ))
}

// ─── Version banner ───────────────────────────────────────────────────────────

fn print_banner(config: &ClientConfig) {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  rayswap  v{ver}  ·  Raydium v4 pools from the command line");
    println!("  {}", "─".repeat(62));
    println!("  AMM       {}", config.amm_program_id);
    println!("  Market    {}", config.market_program_id);
    println!("  RPC       {}", config.rpc_url);
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// rayswap: inspect Raydium v4 pools, poll reserves, quote and send swaps.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   RAYSWAP_RPC_URL  Solana JSON-RPC endpoint
///   RAYSWAP_KEYPAIR  path to Ed25519 keypair JSON
#[derive(Parser)]
#[command(
    name    = "rayswap",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Raydium v4 pool discovery, reserves, quotes and swaps on Solana.",
    after_help = "\
ENVIRONMENT:
  RAYSWAP_RPC_URL  Solana JSON-RPC endpoint  [default: https://api.mainnet-beta.solana.com]
  RAYSWAP_KEYPAIR  Path to Ed25519 keypair JSON  [default: ~/.config/solana/id.json]
  RUST_LOG         Diagnostics on stderr, e.g. RUST_LOG=rayswap_sdk=debug

QUICK START:
  rayswap pool-info --pair SOL-USDC
  rayswap reserves  --pair SOL-USDC --watch
  rayswap quote     --pair SOL-USDC --side sell --amount 1000000000
  rayswap swap      --pair SOL-USDC --side sell --amount 1000000000 --dry-run"
)]
struct Cli {
    /// Solana JSON-RPC endpoint (overrides the config file)
    #[arg(long, global = true, value_name = "URL", env = "RAYSWAP_RPC_URL")]
    rpc_url: Option<String>,

    /// Path to the Ed25519 keypair JSON file used by `swap`
    #[arg(
        long,
        global     = true,
        value_name = "PATH",
        default_value = "~/.config/solana/id.json",
        env = "RAYSWAP_KEYPAIR"
    )]
    keypair: String,

    /// JSON config file with rpc_url, commitment and program ids
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the pool and market for a pair and print every address
    #[command(
        after_help = "\
EXAMPLES:
  rayswap pool-info --pair SOL-USDC
  rayswap pool-info --pair <mintA>-<mintB> --exclude-drained"
    )]
    PoolInfo {
        /// Token pair, e.g. SOL-USDC or <mintA>-<mintB>
        #[arg(long, value_name = "A-B")]
        pair: String,

        /// Ignore pools and markets with no volume on one side
        #[arg(long, default_value_t = false)]
        exclude_drained: bool,
    },

    /// Print effective reserves (vault + open orders − pending PnL)
    Reserves {
        #[arg(long, value_name = "A-B")]
        pair: String,

        /// Keep polling until interrupted
        #[arg(long, default_value_t = false)]
        watch: bool,

        /// Poll interval for --watch
        #[arg(long, value_name = "MS", default_value_t = 2_000)]
        interval_ms: u64,
    },

    /// Quote a swap without sending anything
    ///
    /// `buy` spends the pool's quote token for its base token; `sell` the reverse.
    Quote {
        #[arg(long, value_name = "A-B")]
        pair: String,

        #[arg(long, value_name = "buy|sell", value_parser = parse_side)]
        side: SwapSide,

        /// Input amount in atomic units
        #[arg(long, value_name = "AMOUNT")]
        amount: u64,
    },

    /// Swap between the keypair's associated token accounts
    #[command(
        after_help = "\
EXAMPLES:
  # Sell 1 SOL for USDC with at most 0.5% slippage
  rayswap swap --pair SOL-USDC --side sell --amount 1000000000

  # Show the instruction only
  rayswap swap --pair SOL-USDC --side buy --amount 5000000 --dry-run

  # Dry run for any wallet, without a keypair file
  rayswap swap --pair SOL-USDC --side sell --amount 1000000000 --dry-run --owner <PUBKEY>"
    )]
    Swap {
        #[arg(long, value_name = "A-B")]
        pair: String,

        #[arg(long, value_name = "buy|sell", value_parser = parse_side)]
        side: SwapSide,

        #[arg(long, value_name = "AMOUNT")]
        amount: u64,

        /// Maximum slippage in percent; 0 disables the guard
        #[arg(long, value_name = "PCT", default_value_t = 0.5)]
        max_slippage: f64,

        /// Build and print the instruction without sending it
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Wallet to build a --dry-run for; no keypair file is read
        #[arg(long, value_name = "PUBKEY", requires = "dry_run")]
        owner: Option<String>,
    },

    /// List pools of another swap program that trade a pair
    #[command(
        after_help = "\
PROTOCOLS:
  general, step, mercurial, cropper, sencha, aldrin, saber, lifinity"
    )]
    Scan {
        #[arg(long, value_name = "NAME")]
        protocol: String,

        /// Program id of that protocol's swap program
        #[arg(long, value_name = "PUBKEY")]
        program: String,

        #[arg(long, value_name = "A-B")]
        pair: String,
    },
}

fn parse_side(s: &str) -> std::result::Result<SwapSide, String> {
    SwapSide::from_str(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner(&ClientConfig::mainnet());
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.rpc_url.as_deref())?;
    debug!("using {} (amm {}, market {})", config.rpc_url, config.amm_program_id, config.market_program_id);
    let client = AmmClient::connect(config);

    match &cli.command {
        Commands::PoolInfo { pair, exclude_drained } => {
            cmd_pool_info(&client, pair, *exclude_drained, cli.json)?;
        }
        Commands::Reserves { pair, watch, interval_ms } => {
            cmd_reserves(&client, pair, *watch, *interval_ms, cli.json)?;
        }
        Commands::Quote { pair, side, amount } => {
            cmd_quote(&client, pair, *side, *amount, cli.json)?;
        }
        Commands::Swap { pair, side, amount, max_slippage, dry_run, owner } => {
            let mode = if *dry_run {
                SwapMode::DryRun(dry_run_owner(owner.as_deref(), &cli.keypair)?)
            } else {
                SwapMode::Send
            };
            cmd_swap(&client, &cli.keypair, pair, *side, *amount, *max_slippage, mode, cli.json)?;
        }
        Commands::Scan { protocol, program, pair } => {
            cmd_scan(&client, protocol, program, pair, cli.json)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>, rpc_url: Option<&str>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load --config {}", path.display()))?,
        None => ClientConfig::mainnet(),
    };
    Ok(match rpc_url {
        Some(url) => config.with_rpc_url(url),
        None => config,
    })
}

// ─── pool-info ────────────────────────────────────────────────────────────────

fn cmd_pool_info(client: &AmmClient, pair: &str, exclude_drained: bool, json_output: bool) -> Result<()> {
    let (_, _, mint_a, mint_b) = parse_pair(pair)?;
    let info = resolve_pool(client, pair, &mint_a, &mint_b, exclude_drained)?;
    let mismatches = info.associated_mismatches();

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "pool-info",
            "pair":    pair,
            "pool":    pool_info_json(&info),
            "associated_mismatches": mismatches.iter().map(|(role, stored, derived)| json!({
                "role": role, "stored": stored.to_string(), "derived": derived.to_string(),
            })).collect::<Vec<_>>(),
        }));
    } else {
        let (base, quote) = (resolve_symbol(&info.base_mint), resolve_symbol(&info.quote_mint));
        println!("─── Pool Info: {base}/{quote} ─────────────────────────────────────────");
        println!("  AMM id           {}", info.id);
        println!("  Program          {}  (v{})", info.program_id, info.version);
        println!("  Authority        {}", info.authority);
        println!();
        println!("  Base mint        {base}  ({})", info.base_mint);
        println!("  Base vault       {}", info.base_vault);
        println!("  Quote mint       {quote}  ({})", info.quote_mint);
        println!("  Quote vault      {}", info.quote_vault);
        println!("  LP mint          {}", info.lp_mint);
        println!("  LP vault         {}", info.lp_vault);
        println!("  Open orders      {}", info.open_orders);
        println!("  Target orders    {}", info.target_orders);
        println!("  Withdraw queue   {}", info.withdraw_queue);
        println!();
        println!("  ─── Market (v{}) ─────────────────────────────────", info.market_version);
        println!("  Market           {}", info.market_id);
        println!("  Program          {}", info.market_program_id);
        println!("  Vault signer     {}", info.market_authority);
        println!("  Base vault       {}", info.market_base_vault);
        println!("  Quote vault      {}", info.market_quote_vault);
        println!("  Bids             {}", info.market_bids);
        println!("  Asks             {}", info.market_asks);
        println!("  Event queue      {}", info.market_event_queue);
        if !mismatches.is_empty() {
            println!();
            println!("  {} stored address(es) differ from their seed derivation:", mismatches.len());
            for (role, stored, derived) in &mismatches {
                println!("    {role:<14} stored {stored}  derived {derived}");
            }
        }
    }
    Ok(())
}

// ─── reserves ─────────────────────────────────────────────────────────────────

fn cmd_reserves(client: &AmmClient, pair: &str, watch: bool, interval_ms: u64, json_output: bool) -> Result<()> {
    let (_, _, mint_a, mint_b) = parse_pair(pair)?;
    let info = resolve_pool(client, pair, &mint_a, &mint_b, true)?;
    let (base, quote) = (resolve_symbol(&info.base_mint), resolve_symbol(&info.quote_mint));

    if !json_output {
        println!("─── Reserves: {base}/{quote} ──────────────────────────────────────────");
        println!("  Pool             {}", info.id);
        println!();
    }
    loop {
        let r = client.reserves(&info)
            .context("Failed to read pool reserves; check your RPC endpoint")?;
        if json_output {
            println!("{}", json!({
                "status":  "ok",
                "command": "reserves",
                "pool":    info.id.to_string(),
                "reserves": reserves_json(&r),
            }));
        } else {
            println!("  slot {:>12}   {base} {:>24}   {quote} {:>24}   fee {:.2} bps",
                     r.slot, r.coin, r.pc, r.fees.bps());
        }
        if !watch {
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(interval_ms));
    }
}

// ─── quote ────────────────────────────────────────────────────────────────────

fn cmd_quote(client: &AmmClient, pair: &str, side: SwapSide, amount: u64, json_output: bool) -> Result<()> {
    if amount == 0 {
        bail!("--amount must be > 0 (atomic units: lamports for SOL, μUSDC for USDC, etc.)");
    }
    let (_, _, mint_a, mint_b) = parse_pair(pair)?;
    let info = resolve_pool(client, pair, &mint_a, &mint_b, true)?;
    let quote = client.quote(&info, side, amount)
        .context("Failed to quote; the pool may have no liquidity")?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "quote",
            "pool":    info.id.to_string(),
            "quote":   quote_json(&info, &quote),
        }));
    } else {
        let (sym_in, sym_out) = io_symbols(&info, side);
        println!("─── Swap Quote ───────────────────────────────────────────────────");
        println!("  {sym_in} → {sym_out}  [{side}]");
        println!("  Pool             {}", info.id);
        println!("  Slot             {:>20}", quote.reserves.slot);
        println!("  Reserve coin     {:>20}", quote.reserves.coin);
        println!("  Reserve pc       {:>20}", quote.reserves.pc);
        println!("  Swap fee         {:>20}  ({}/{})",
                 format!("{:.2} bps", quote.reserves.fees.bps()),
                 quote.reserves.fees.numerator, quote.reserves.fees.denominator);
        println!();
        println!("  Amount in        {:>20}", quote.amount_in);
        println!("  Estimated out    {:>20}", quote.amount_out);
        println!("  Price impact     {:>19.4}%", quote.price_impact_pct);
        println!();
        println!("  No transaction sent.  To execute:");
        println!("    rayswap swap --pair {pair} --side {side} --amount {amount}");
    }
    Ok(())
}

// ─── swap ─────────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn cmd_swap(
    client: &AmmClient,
    keypair_path: &str,
    pair: &str,
    side: SwapSide,
    amount: u64,
    max_slippage: f64,
    mode: SwapMode,
    json_output: bool,
) -> Result<()> {
    if amount == 0 {
        bail!("--amount must be > 0 (atomic units: lamports for SOL, μUSDC for USDC, etc.)");
    }
    let slippage_bps = slippage_to_bps(max_slippage)?;
    let (_, _, mint_a, mint_b) = parse_pair(pair)?;
    let info = resolve_pool(client, pair, &mint_a, &mint_b, true)?;

    if let SwapMode::DryRun(owner) = mode {
        let quote = client.quote(&info, side, amount)?;
        let min_out = if slippage_bps == 0 { 0 } else { min_amount_out(quote.amount_out, slippage_bps)? };
        let (source, dest) = client.user_token_accounts(&info, &owner, side);
        let ix = client.swap_ix(&info, &source, &dest, &owner, amount, min_out);
        if json_output {
            println!("{}", json!({
                "status":  "ok",
                "command": "swap",
                "dry_run": true,
                "quote":   quote_json(&info, &quote),
                "min_amount_out": min_out,
                "instruction": {
                    "program_id": ix.program_id.to_string(),
                    "data":       ix.data,
                    "accounts":   ix.accounts.iter().map(|m| json!({
                        "pubkey": m.pubkey.to_string(), "signer": m.is_signer, "writable": m.is_writable,
                    })).collect::<Vec<_>>(),
                },
            }));
        } else {
            println!("─── Swap (dry run) ───────────────────────────────────────────────");
            println!("  Estimated out    {:>20}", quote.amount_out);
            println!("  Min out          {:>20}  ({max_slippage}% slippage)", min_out);
            println!("  Program          {}", ix.program_id);
            for (i, meta) in ix.accounts.iter().enumerate() {
                println!("  [{i:>2}] {}  {}{}", meta.pubkey,
                         if meta.is_writable { "w" } else { "-" },
                         if meta.is_signer { "s" } else { "-" });
            }
            println!("  Data             {:02x?}", ix.data);
        }
        return Ok(());
    }

    let payer = load_keypair(keypair_path)?;
    let options = SendOptions { skip_confirmation: false, ..SendOptions::default() };
    let result = client
        .swap(&info, &payer, SwapParams { side, amount_in: amount, max_slippage_bps: slippage_bps }, &options)
        .map_err(|e| anyhow!(
            "Swap failed: {e}\n  Check that {} holds the input token and the output ATA {} exists.",
            payer.pubkey(),
            derive_ata(&payer.pubkey(), &io_mints(&info, side).1)
        ))?;

    if json_output {
        println!("{}", json!({
            "status":         "ok",
            "command":        "swap",
            "signature":      result.signature,
            "pool":           result.pool.to_string(),
            "side":           result.side.to_string(),
            "amount_in":      result.amount_in,
            "estimated_out":  result.estimated_out,
            "min_amount_out": result.min_amount_out,
        }));
    } else {
        let (sym_in, sym_out) = io_symbols(&info, side);
        println!("─── Swap ─────────────────────────────────────────────────────────");
        println!("  {sym_in} → {sym_out}  [{side}]");
        println!("  Pool             {}", result.pool);
        println!("  Amount in        {:>20}", result.amount_in);
        println!("  Estimated out    {:>20}", result.estimated_out);
        println!("  Min out          {:>20}", result.min_amount_out);
        println!("  Signature        {}", result.signature);
    }
    Ok(())
}

// ─── scan ─────────────────────────────────────────────────────────────────────

fn cmd_scan(client: &AmmClient, protocol: &str, program: &str, pair: &str, json_output: bool) -> Result<()> {
    let variant = ProtocolVariant::from_str(protocol)
        .with_context(|| format!("--protocol '{protocol}'; run `rayswap scan --help` for the list"))?;
    let program_id = Pubkey::from_str(program)
        .map_err(|_| anyhow!("--program must be a base-58 program id. Got: '{program}'"))?;
    let (_, _, mint_a, mint_b) = parse_pair(pair)?;

    let pools = client
        .scan_variant(variant, &program_id, &mint_a, &mint_b)
        .context("Failed to scan program accounts; check your RPC endpoint")?;

    if json_output {
        println!("{}", json!({
            "status":   "ok",
            "command":  "scan",
            "protocol": variant.name(),
            "program":  program_id.to_string(),
            "pools":    pools.iter().map(|(k, r)| json!({
                "address": k.to_string(),
                "fields":  record_json(r),
            })).collect::<Vec<_>>(),
        }));
    } else {
        println!("─── {} pools for {pair} ────────────────────────────────────────", variant.name());
        if pools.is_empty() {
            println!("  None found.");
        }
        for (i, (address, _)) in pools.iter().enumerate() {
            println!("  [{i:>2}]  {address}");
        }
    }
    Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn resolve_pool(client: &AmmClient, pair: &str, mint_a: &Pubkey, mint_b: &Pubkey, exclude_drained: bool) -> Result<PoolInfo> {
    client.pool_info(mint_a, mint_b, exclude_drained).with_context(|| format!(
        "Could not resolve a pool for '{pair}'.\n  \
         Try `rayswap pool-info --pair {pair}` without --exclude-drained, or check your RPC endpoint."
    ))
}

/// Parse `"TOKEN_A-TOKEN_B"` into `(sym_a, sym_b, mint_a, mint_b)`.
fn parse_pair(pair: &str) -> Result<(&str, &str, Pubkey, Pubkey)> {
    let parts: Vec<&str> = pair.splitn(2, '-').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        bail!("--pair must be TOKEN_A-TOKEN_B (e.g. SOL-USDC or <mintA>-<mintB>). Got: '{pair}'");
    }
    let (sym_a, sym_b) = (parts[0], parts[1]);
    let mint_a = resolve_mint(sym_a).context("pair: token A")?;
    let mint_b = resolve_mint(sym_b).context("pair: token B")?;
    if mint_a == mint_b {
        bail!("Token A and token B in --pair must be different.");
    }
    Ok((sym_a, sym_b, mint_a, mint_b))
}

enum SwapMode {
    Send,
    /// Build for this owner and print; nothing is signed.
    DryRun(Pubkey),
}

/// `--owner` if given, else the public key of the keypair file.
fn dry_run_owner(owner: Option<&str>, keypair_path: &str) -> Result<Pubkey> {
    match owner {
        Some(owner) => Pubkey::from_str(owner)
            .map_err(|_| anyhow!("--owner must be a base-58 public key. Got: '{owner}'")),
        None => Ok(load_keypair(keypair_path)
            .context("--dry-run needs a wallet; pass --owner <PUBKEY> to skip the keypair file")?
            .pubkey()),
    }
}

/// Percent (0.5 = 0.5%) to basis points.
fn slippage_to_bps(pct: f64) -> Result<u64> {
    if !(0.0..=100.0).contains(&pct) {
        bail!("--max-slippage must be between 0 and 100 (percent). Got: {pct}");
    }
    Ok((pct * 100.0).round() as u64)
}

/// `(mint_in, mint_out)` for a side.
fn io_mints(info: &PoolInfo, side: SwapSide) -> (Pubkey, Pubkey) {
    match side {
        SwapSide::Buy => (info.quote_mint, info.base_mint),
        SwapSide::Sell => (info.base_mint, info.quote_mint),
    }
}

fn io_symbols(info: &PoolInfo, side: SwapSide) -> (String, String) {
    let (mint_in, mint_out) = io_mints(info, side);
    (resolve_symbol(&mint_in), resolve_symbol(&mint_out))
}

fn pool_info_json(info: &PoolInfo) -> serde_json::Value {
    json!({
        "id":                 info.id.to_string(),
        "base_mint":          info.base_mint.to_string(),
        "quote_mint":         info.quote_mint.to_string(),
        "lp_mint":            info.lp_mint.to_string(),
        "version":            info.version,
        "program_id":         info.program_id.to_string(),
        "authority":          info.authority.to_string(),
        "open_orders":        info.open_orders.to_string(),
        "target_orders":      info.target_orders.to_string(),
        "base_vault":         info.base_vault.to_string(),
        "quote_vault":        info.quote_vault.to_string(),
        "withdraw_queue":     info.withdraw_queue.to_string(),
        "lp_vault":           info.lp_vault.to_string(),
        "market_version":     info.market_version,
        "market_program_id":  info.market_program_id.to_string(),
        "market_id":          info.market_id.to_string(),
        "market_authority":   info.market_authority.to_string(),
        "market_base_vault":  info.market_base_vault.to_string(),
        "market_quote_vault": info.market_quote_vault.to_string(),
        "market_bids":        info.market_bids.to_string(),
        "market_asks":        info.market_asks.to_string(),
        "market_event_queue": info.market_event_queue.to_string(),
    })
}

/// 128-bit reserves are emitted as strings so JSON readers never round them.
fn reserves_json(r: &ReserveSnapshot) -> serde_json::Value {
    json!({
        "coin": r.coin.to_string(),
        "pc":   r.pc.to_string(),
        "fee_numerator":   r.fees.numerator,
        "fee_denominator": r.fees.denominator,
        "slot": r.slot,
    })
}

fn quote_json(info: &PoolInfo, q: &Quote) -> serde_json::Value {
    let (mint_in, mint_out) = io_mints(info, q.side);
    json!({
        "side":             q.side.to_string(),
        "mint_in":          mint_in.to_string(),
        "mint_out":         mint_out.to_string(),
        "amount_in":        q.amount_in,
        "amount_out":       q.amount_out,
        "price_impact_pct": q.price_impact_pct,
        "reserves":         reserves_json(&q.reserves),
    })
}

fn record_json(record: &Record) -> serde_json::Value {
    let fields: serde_json::Map<String, serde_json::Value> = record
        .values()
        .map(|(name, value)| {
            let v = match value {
                Value::U8(v) => json!(v),
                Value::U32(v) => json!(v),
                Value::U64(v) => json!(v),
                Value::U128(v) => json!(v.to_string()),
                Value::Pubkey(k) => json!(k.to_string()),
                Value::Bytes(b) => json!(b),
                Value::U64Array(v) => json!(v),
                Value::U128Array(v) => json!(v.iter().map(u128::to_string).collect::<Vec<_>>()),
                Value::Flags(bits) => json!(bits
                    .layout
                    .names
                    .iter()
                    .copied()
                    .filter(|n| bits.get(n))
                    .collect::<Vec<&str>>()),
            };
            (name.to_string(), v)
        })
        .collect();
    serde_json::Value::Object(fields)
}
