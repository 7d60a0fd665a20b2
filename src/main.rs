//! GAFFER — Fantasy Football Squad & Transfer Optimizer
//!
//! Entry point. Loads configuration, initialises structured logging,
//! fetches and scores the live candidate pool, then dispatches one of
//! the subcommands: build a fresh squad, show the current team, plan
//! transfers, apply accepted transfers, or bootstrap a team file from
//! player names.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{info, warn};

use gaffer::api::names::parse_accept_list;
use gaffer::api::{self, LeagueClient, NameIndex};
use gaffer::config::AppConfig;
use gaffer::engine::ledger::apply_transfers;
use gaffer::solver::LpSolver;
use gaffer::storage;
use gaffer::strategy::lineup::pick_lineup;
use gaffer::strategy::squad::build_squad;
use gaffer::strategy::transfers::{plan_transfers, TransferSettings};
use gaffer::types::{fmt_tenths, Player, SquadSlot, TeamState};

const BANNER: &str = r#"
  ____    _    _____ _____ _____ ____
 / ___|  / \  |  ___|  ___| ____|  _ \
| |  _  / _ \ | |_  | |_  |  _| | |_) |
| |_| |/ ___ \|  _| |  _| | |___|  _ <
 \____/_/   \_\_|   |_|   |_____|_| \_\

  Fantasy Football Squad & Transfer Optimizer
  v0.1.0
"#;

#[derive(Parser)]
#[command(name = "gaffer", version, about = "Fantasy football squad & transfer optimizer")]
struct Cli {
    /// Path to the TOML config file (defaults used if absent).
    #[arg(long, global = true, default_value = "config.toml")]
    config: String,

    /// Path to the persisted team file.
    #[arg(long, global = true, default_value = storage::DEFAULT_TEAM_FILE)]
    team: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the best fresh squad under budget and save it as the team file.
    Build {
        /// Override the configured budget (tenths of £1.0m).
        #[arg(long)]
        budget_tenths: Option<i64>,
    },

    /// Show the current team's best XI, captain, and projected score.
    Show,

    /// Recommend transfers for the next gameweek.
    Plan {
        /// Override the cap on transfers beyond the free allotment.
        #[arg(long)]
        max_extra: Option<u32>,
    },

    /// Apply accepted transfers (ids or names, semicolon-separated) and
    /// rewrite the team file.
    Apply {
        /// Players to buy, e.g. "Salah; 412".
        #[arg(long)]
        ins: Option<String>,

        /// Players to sell. Omitted → cheapest-first inference.
        #[arg(long)]
        outs: Option<String>,
    },

    /// Create a team file from 15 player names or ids.
    Init {
        /// Semicolon-separated names or ids, exactly 15.
        #[arg(long)]
        names: String,

        /// Starting bank in tenths.
        #[arg(long, default_value_t = 0)]
        bank_tenths: i64,

        /// Free transfers available next gameweek.
        #[arg(long, default_value_t = 1)]
        free_transfers: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let cfg = AppConfig::load_or_default(&cli.config)?;

    init_logging();
    println!("{BANNER}");

    // Live data — every subcommand works against the scored pool.
    let client = LeagueClient::new(&cfg.api.base_url)?;
    let (pool, names) = api::load_pool(&client, &cfg.projection).await?;

    match &cli.command {
        Command::Build { budget_tenths } => run_build(&cli, &cfg, &pool, *budget_tenths),
        Command::Show => run_show(&cli, &cfg, &pool),
        Command::Plan { max_extra } => run_plan(&cli, &cfg, &pool, *max_extra),
        Command::Apply { ins, outs } => run_apply(&cli, &pool, &names, ins.clone(), outs.clone()),
        Command::Init {
            names: raw_names,
            bank_tenths,
            free_transfers,
        } => run_init(&cli, &names, raw_names, *bank_tenths, *free_transfers),
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn run_build(cli: &Cli, cfg: &AppConfig, pool: &[Player], budget: Option<i64>) -> Result<()> {
    let budget = budget.unwrap_or(cfg.rules.budget_tenths);

    let pick = build_squad(
        pool,
        budget,
        cfg.rules.max_per_club,
        &LpSolver::new(),
        cfg.solver.build_budget(),
    )?;

    print_squad_tables(&pick.slots, pool);
    println!("Projected gameweek score: {:.2}", pick.objective);

    let player_ids: Vec<u32> = pick.slots.iter().map(|s| s.id).collect();
    let purchases: BTreeMap<u32, i64> = pick
        .slots
        .iter()
        .filter_map(|s| {
            pool.iter()
                .find(|p| p.id == s.id)
                .map(|p| (p.id, p.price_tenths))
        })
        .collect();
    let bank = (budget - pick.total_cost_tenths).max(0);
    let state = TeamState::new(player_ids, bank, 1, purchases);
    storage::save_state(&state, Some(&cli.team))?;

    println!(
        "Saved squad to {} (cost {}, bank {})",
        cli.team,
        fmt_tenths(pick.total_cost_tenths),
        fmt_tenths(bank),
    );
    Ok(())
}

fn run_show(cli: &Cli, cfg: &AppConfig, pool: &[Player]) -> Result<()> {
    let state = load_team(&cli.team)?;

    let squad = held_players(&state, pool);
    let choice = pick_lineup(&squad, &LpSolver::new(), cfg.solver.lineup_budget())?;

    print_squad_tables(&choice.slots, pool);
    println!("Projected gameweek score with this team: {:.2}", choice.objective);
    println!("Bank: {} | free transfers: {}", fmt_tenths(state.bank_tenths), state.free_transfers);
    Ok(())
}

fn run_plan(cli: &Cli, cfg: &AppConfig, pool: &[Player], max_extra: Option<u32>) -> Result<()> {
    let state = load_team(&cli.team)?;

    let settings = TransferSettings {
        max_per_club: cfg.rules.max_per_club,
        max_extra_transfers: max_extra.unwrap_or(cfg.rules.max_extra_transfers),
        hit_penalty: cfg.rules.hit_penalty,
    };
    let rec = plan_transfers(
        pool,
        &state,
        &settings,
        &LpSolver::new(),
        cfg.solver.transfer_budget(),
    )?;

    println!(
        "Transfers out ({}): {}",
        rec.transfers_out,
        fmt_ids(&rec.removed, pool)
    );
    println!("Transfers in:        {}", fmt_ids(&rec.added, pool));
    println!(
        "Extra transfers: {} → penalty = {:.0} pts",
        rec.extra_transfers,
        settings.hit_penalty * rec.extra_transfers as f64
    );
    println!("Bank if executed: {}", fmt_tenths(rec.final_bank_tenths));
    print_squad_tables(&rec.slots, pool);
    println!("Projected gameweek score (net of hits): {:.2}", rec.objective);
    println!();
    println!("To apply some or all of these:");
    println!("  gaffer apply --ins \"Name1; Name2\" --outs \"NameA; NameB\"");
    Ok(())
}

fn run_apply(
    cli: &Cli,
    pool: &[Player],
    names: &NameIndex,
    ins: Option<String>,
    outs: Option<String>,
) -> Result<()> {
    let state = load_team(&cli.team)?;

    let ins = parse_accept_list(ins.as_deref().unwrap_or(""), names)?;
    let outs = parse_accept_list(outs.as_deref().unwrap_or(""), names)?;
    if ins.is_empty() && outs.is_empty() {
        warn!("No transfers accepted — free transfers reset to 1");
    }

    let next = apply_transfers(&state, pool, &ins, &outs)?;
    let sold: Vec<u32> = state
        .player_ids
        .iter()
        .copied()
        .filter(|id| !next.holds(*id))
        .collect();
    storage::save_state(&next, Some(&cli.team))?;

    println!("Ins:  {}", fmt_ids(&ins, pool));
    println!("Outs: {}", fmt_ids(&sold, pool));
    println!("Bank: {}", fmt_tenths(next.bank_tenths));
    Ok(())
}

fn run_init(
    cli: &Cli,
    names: &NameIndex,
    raw_names: &str,
    bank_tenths: i64,
    free_transfers: u32,
) -> Result<()> {
    let ids = parse_accept_list(raw_names, names)?;

    // Purchase prices are unknown for an imported team; the planner and
    // ledger fall back to current prices, which realizes no gains.
    let state = TeamState::new(ids, bank_tenths, free_transfers, BTreeMap::new());
    state.validate()?;
    storage::save_state(&state, Some(&cli.team))?;

    info!(team = %cli.team, "Team file created");
    println!(
        "Wrote {} with {} players, bank {}, free transfers {}",
        cli.team,
        state.player_ids.len(),
        fmt_tenths(state.bank_tenths),
        state.free_transfers,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_team(path: &str) -> Result<TeamState> {
    storage::load_state(Some(path))?
        .with_context(|| format!("No team file at {path} — run `gaffer build` or `gaffer init` first"))
}

/// The held players present in the pool, warning about any that are not.
fn held_players(state: &TeamState, pool: &[Player]) -> Vec<Player> {
    let mut squad = Vec::new();
    let mut missing = Vec::new();
    for id in &state.player_ids {
        match pool.iter().find(|p| p.id == *id) {
            Some(p) => squad.push(p.clone()),
            None => missing.push(*id),
        }
    }
    if !missing.is_empty() {
        warn!(ids = ?missing, "Held players missing from the candidate pool");
    }
    squad
}

/// "233 (Salah), 412 (van Dijk)" — or "None".
fn fmt_ids(ids: &[u32], pool: &[Player]) -> String {
    if ids.is_empty() {
        return "None".to_string();
    }
    ids.iter()
        .map(|id| {
            let name = pool
                .iter()
                .find(|p| p.id == *id)
                .map(|p| p.name.as_str())
                .unwrap_or("?");
            format!("{id} ({name})")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Tabled)]
struct SquadRow {
    #[tabled(rename = "player")]
    name: String,
    #[tabled(rename = "pos")]
    position: String,
    #[tabled(rename = "price")]
    price: String,
    #[tabled(rename = "st")]
    status: String,
    #[tabled(rename = "fix")]
    fixture: u8,
    #[tabled(rename = "ep")]
    ep: String,
    #[tabled(rename = "C")]
    captain: String,
}

fn squad_rows<'a>(
    slots: impl Iterator<Item = &'a SquadSlot>,
    pool: &[Player],
) -> Vec<SquadRow> {
    slots
        .filter_map(|s| {
            pool.iter().find(|p| p.id == s.id).map(|p| SquadRow {
                name: p.name.clone(),
                position: p.position.to_string(),
                price: fmt_tenths(p.price_tenths),
                status: p.status.clone(),
                fixture: p.fixture_diff,
                ep: format!("{:.2}", p.ep_next),
                captain: if s.captain { "C" } else { "" }.to_string(),
            })
        })
        .collect()
}

fn print_squad_tables(slots: &[SquadSlot], pool: &[Player]) {
    let starters = squad_rows(slots.iter().filter(|s| s.starter), pool);
    let bench = squad_rows(slots.iter().filter(|s| !s.starter), pool);

    println!("Starting XI");
    println!("{}", Table::new(starters).with(Style::sharp()));
    println!("Bench");
    println!("{}", Table::new(bench).with(Style::sharp()));
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gaffer=info"));

    let json_logging = std::env::var("GAFFER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
