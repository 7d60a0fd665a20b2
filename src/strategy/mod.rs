//! Squad optimization — fresh builds, lineup picks, and transfer plans.
//!
//! The three operations share one formulation: a binary `select` variable
//! per pool player (in the 15-man squad), a `start` variable (in the XI),
//! and a `captain` variable (points doubled), with the league's
//! composition rules as linear constraints. This module owns the shared
//! pieces; `squad`, `lineup`, and `transfers` assemble them into full
//! models.

pub mod lineup;
pub mod squad;
pub mod transfers;
pub mod valuation;

use std::collections::HashMap;

use crate::solver::{Assignment, Cmp, ProblemSpec, VarId};
use crate::types::{Player, Position, SquadSlot};

/// Squad size.
pub const SQUAD_SIZE: usize = 15;
/// Starting-XI size.
pub const XI_SIZE: usize = 11;

// ---------------------------------------------------------------------------
// Shared variable blocks
// ---------------------------------------------------------------------------

/// XI/captain decision variables, one per pool index, with the
/// `captain ≤ start` linking already in place.
pub(crate) struct LineupVars {
    pub start: Vec<VarId>,
    pub captain: Vec<VarId>,
}

pub(crate) fn declare_lineup_vars(spec: &mut ProblemSpec, n: usize) -> LineupVars {
    let start: Vec<VarId> = (0..n).map(|_| spec.binary()).collect();
    let captain: Vec<VarId> = (0..n).map(|_| spec.binary()).collect();
    for i in 0..n {
        spec.constrain(vec![(captain[i], 1.0), (start[i], -1.0)], Cmp::Le, 0.0);
    }
    LineupVars { start, captain }
}

/// Full squad decision variables: membership plus XI/captain, with
/// `start ≤ select` and `captain ≤ start` linking.
pub(crate) struct SquadVars {
    pub select: Vec<VarId>,
    pub lineup: LineupVars,
}

pub(crate) fn declare_squad_vars(spec: &mut ProblemSpec, n: usize) -> SquadVars {
    let select: Vec<VarId> = (0..n).map(|_| spec.binary()).collect();
    let lineup = declare_lineup_vars(spec, n);
    for i in 0..n {
        spec.constrain(
            vec![(lineup.start[i], 1.0), (select[i], -1.0)],
            Cmp::Le,
            0.0,
        );
    }
    SquadVars { select, lineup }
}

// ---------------------------------------------------------------------------
// Shared constraint blocks
// ---------------------------------------------------------------------------

/// Squad composition: exactly 15 members, exact per-position quotas, the
/// per-club cap, and no unavailable players.
pub(crate) fn add_composition_rules(
    spec: &mut ProblemSpec,
    pool: &[Player],
    vars: &SquadVars,
    max_per_club: usize,
) {
    let select = &vars.select;

    spec.constrain(
        select.iter().map(|&v| (v, 1.0)).collect(),
        Cmp::Eq,
        SQUAD_SIZE as f64,
    );

    for &pos in Position::ALL {
        let terms: Vec<(VarId, f64)> = pool
            .iter()
            .enumerate()
            .filter(|(_, p)| p.position == pos)
            .map(|(i, _)| (select[i], 1.0))
            .collect();
        spec.constrain(terms, Cmp::Eq, pos.squad_quota() as f64);
    }

    let mut clubs: HashMap<u32, Vec<VarId>> = HashMap::new();
    for (i, p) in pool.iter().enumerate() {
        clubs.entry(p.club).or_default().push(select[i]);
    }
    for members in clubs.values() {
        if members.len() > max_per_club {
            spec.constrain(
                members.iter().map(|&v| (v, 1.0)).collect(),
                Cmp::Le,
                max_per_club as f64,
            );
        }
    }

    for (i, p) in pool.iter().enumerate() {
        if !p.available {
            spec.constrain(vec![(select[i], 1.0)], Cmp::Eq, 0.0);
        }
    }
}

/// Legal XI: 11 starters, exactly one keeper, the positional minimums,
/// and exactly one captain.
pub(crate) fn add_lineup_rules(spec: &mut ProblemSpec, pool: &[Player], vars: &LineupVars) {
    spec.constrain(
        vars.start.iter().map(|&v| (v, 1.0)).collect(),
        Cmp::Eq,
        XI_SIZE as f64,
    );

    for &pos in Position::ALL {
        let terms: Vec<(VarId, f64)> = pool
            .iter()
            .enumerate()
            .filter(|(_, p)| p.position == pos)
            .map(|(i, _)| (vars.start[i], 1.0))
            .collect();
        let op = if pos.exact_starters() { Cmp::Eq } else { Cmp::Ge };
        spec.constrain(terms, op, pos.min_starters() as f64);
    }

    spec.constrain(
        vars.captain.iter().map(|&v| (v, 1.0)).collect(),
        Cmp::Eq,
        1.0,
    );
}

/// Objective contribution of the XI: starter points plus the captain's
/// points a second time.
pub(crate) fn add_points_objective(spec: &mut ProblemSpec, pool: &[Player], vars: &LineupVars) {
    for (i, p) in pool.iter().enumerate() {
        spec.maximize_term(vars.start[i], p.ep_next);
        spec.maximize_term(vars.captain[i], p.ep_next);
    }
}

// ---------------------------------------------------------------------------
// Result extraction
// ---------------------------------------------------------------------------

/// Read the chosen squad out of an assignment. Slots are ordered by
/// (position, descending points, id) for stable presentation.
pub(crate) fn extract_slots(
    pool: &[Player],
    selected: impl Fn(usize) -> bool,
    vars: &LineupVars,
    asn: &Assignment,
) -> Vec<SquadSlot> {
    let mut picked: Vec<usize> = (0..pool.len()).filter(|&i| selected(i)).collect();
    picked.sort_by(|&a, &b| {
        pool[a]
            .position
            .cmp(&pool[b].position)
            .then(
                pool[b]
                    .ep_next
                    .partial_cmp(&pool[a].ep_next)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(pool[a].id.cmp(&pool[b].id))
    });
    picked
        .into_iter()
        .map(|i| SquadSlot {
            id: pool[i].id,
            starter: asn.is_set(vars.start[i]),
            captain: asn.is_set(vars.captain[i]),
        })
        .collect()
}
