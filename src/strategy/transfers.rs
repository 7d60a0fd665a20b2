//! Transfer planning.
//!
//! Jointly re-optimizes squad membership, XI, and captain for the next
//! gameweek. Purchases must be funded by the bank plus the resale value
//! of the players sold (the cash-flow rule); transfers beyond the free
//! allotment cost a points hit each and are capped hard by
//! `max_extra_transfers`.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::solver::{Assignment, Cmp, MilpSolver, ProblemSpec, SolveError, VarId};
use crate::types::{GafferError, Player, Recommendation, TeamState};

use super::valuation::sell_price_tenths;
use super::{
    add_composition_rules, add_lineup_rules, add_points_objective, declare_squad_vars,
    extract_slots, SQUAD_SIZE,
};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Planner knobs. Free-transfer count comes from the team state.
#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub max_per_club: usize,
    /// Hard cap on transfers beyond the free allotment.
    pub max_extra_transfers: u32,
    /// Points deducted per transfer beyond the free allotment.
    pub hit_penalty: f64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            max_per_club: 3,
            max_extra_transfers: 3,
            hit_penalty: 4.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Plan the best reachable squad for the next gameweek.
pub fn plan_transfers(
    pool: &[Player],
    state: &TeamState,
    settings: &TransferSettings,
    solver: &dyn MilpSolver,
    time_budget: Duration,
) -> Result<Recommendation, GafferError> {
    state.validate()?;

    let held: BTreeSet<u32> = state.player_ids.iter().copied().collect();

    // Held players absent from the pool cannot be kept: they have no
    // decision variable, so they are forced sales. With no current quote,
    // the resale rule values them at their purchase price.
    let missing: Vec<u32> = held
        .iter()
        .copied()
        .filter(|id| !pool.iter().any(|p| p.id == *id))
        .collect();
    if !missing.is_empty() {
        warn!(ids = ?missing, "Held players missing from the candidate pool — forced sales");
    }
    let forced_cash: i64 = missing
        .iter()
        .map(|id| {
            let buy = state.purchases_tenths.get(id).copied().unwrap_or(0);
            sell_price_tenths(buy, buy)
        })
        .sum();

    // Resale value of each held player still in the pool.
    let sell_value: Vec<Option<i64>> = pool
        .iter()
        .map(|p| {
            held.contains(&p.id).then(|| {
                let buy = state
                    .purchases_tenths
                    .get(&p.id)
                    .copied()
                    .unwrap_or(p.price_tenths);
                sell_price_tenths(buy, p.price_tenths)
            })
        })
        .collect();

    let mut spec = ProblemSpec::new();
    let vars = declare_squad_vars(&mut spec, pool.len());

    add_composition_rules(&mut spec, pool, &vars, settings.max_per_club);
    add_lineup_rules(&mut spec, pool, &vars.lineup);
    add_points_objective(&mut spec, pool, &vars.lineup);

    // Cash flow: Σ price·buy_i ≤ bank + forced sales + Σ sell·sold_i.
    // With buy_i = select_i (not held) and sold_i = 1 − select_i (held),
    // this linearizes to
    //   Σ_not-held price_i·select_i + Σ_held sell_i·select_i
    //     ≤ bank + forced + Σ_held sell_i.
    let mut cash_terms: Vec<(VarId, f64)> = Vec::new();
    let mut cash_rhs = (state.bank_tenths + forced_cash) as f64;
    for (i, p) in pool.iter().enumerate() {
        match sell_value[i] {
            Some(sell) => {
                cash_terms.push((vars.select[i], sell as f64));
                cash_rhs += sell as f64;
            }
            None => cash_terms.push((vars.select[i], p.price_tenths as f64)),
        }
    }
    spec.constrain(cash_terms, Cmp::Le, cash_rhs);

    // Hit accounting: outs = held-but-not-kept (plus the forced sales),
    // extra ≥ outs − free, with the hard cap as the variable's domain.
    let held_in_pool: Vec<usize> = (0..pool.len()).filter(|&i| sell_value[i].is_some()).collect();
    let extra = spec.integer(0, settings.max_extra_transfers as i64);
    let mut extra_terms: Vec<(VarId, f64)> = vec![(extra, 1.0)];
    for &i in &held_in_pool {
        extra_terms.push((vars.select[i], 1.0));
    }
    let min_extra_rhs =
        held_in_pool.len() as f64 + missing.len() as f64 - state.free_transfers as f64;
    spec.constrain(extra_terms, Cmp::Ge, min_extra_rhs);
    spec.maximize_term(extra, -settings.hit_penalty);

    debug!(
        candidates = pool.len(),
        held = held.len(),
        bank = state.bank_tenths,
        free = state.free_transfers,
        "Planning transfers"
    );

    let asn = solver.solve(&spec, time_budget).map_err(|e| match e {
        SolveError::Infeasible => GafferError::Infeasible(
            "no reachable 15-man squad (cash flow, position quotas, club cap, \
             or the extra-transfer cap)"
                .to_string(),
        ),
        SolveError::Unknown => {
            GafferError::Unknown("transfer planning exhausted its time budget".to_string())
        }
        SolveError::Backend(msg) => GafferError::Solver(msg),
    })?;

    Ok(build_recommendation(
        pool, state, &held, &missing, &sell_value, &vars.lineup, &vars.select, &asn,
    ))
}

/// Assemble the report from a solved assignment.
#[allow(clippy::too_many_arguments)]
fn build_recommendation(
    pool: &[Player],
    state: &TeamState,
    held: &BTreeSet<u32>,
    missing: &[u32],
    sell_value: &[Option<i64>],
    lineup: &super::LineupVars,
    select: &[VarId],
    asn: &Assignment,
) -> Recommendation {
    let final_ids: BTreeSet<u32> = pool
        .iter()
        .enumerate()
        .filter(|(i, _)| asn.is_set(select[*i]))
        .map(|(_, p)| p.id)
        .collect();
    debug_assert_eq!(final_ids.len(), SQUAD_SIZE);

    let added: Vec<u32> = final_ids.difference(held).copied().collect();
    let mut removed: Vec<u32> = held.difference(&final_ids).copied().collect();
    removed.sort_unstable();
    debug_assert!(missing.iter().all(|id| removed.contains(id)));

    let spend: i64 = pool
        .iter()
        .filter(|p| added.binary_search(&p.id).is_ok())
        .map(|p| p.price_tenths)
        .sum();
    let raised: i64 = removed
        .iter()
        .map(|id| match crate::types::find_player(pool, *id) {
            Some(i) => sell_value[i].unwrap_or(0),
            None => {
                let buy = state.purchases_tenths.get(id).copied().unwrap_or(0);
                sell_price_tenths(buy, buy)
            }
        })
        .sum();
    let final_bank_tenths = state.bank_tenths + raised - spend;

    let transfers_out = removed.len() as u32;
    let extra_transfers = transfers_out.saturating_sub(state.free_transfers);

    let slots = extract_slots(pool, |i| asn.is_set(select[i]), lineup, asn);

    info!(
        ins = added.len(),
        outs = transfers_out,
        extra = extra_transfers,
        final_bank = final_bank_tenths,
        objective = format!("{:.2}", asn.objective),
        "Transfer plan ready"
    );

    Recommendation {
        added,
        removed,
        transfers_out,
        extra_transfers,
        final_bank_tenths,
        objective: asn.objective,
        slots,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
