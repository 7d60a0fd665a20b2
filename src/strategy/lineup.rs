//! XI selection from a fixed squad.
//!
//! Membership is already decided; only the starters and the captain are
//! optimized. No budget or composition rules are re-checked here — an
//! already-held squad is presumed legal.

use std::time::Duration;

use tracing::debug;

use crate::solver::{MilpSolver, ProblemSpec, SolveError};
use crate::types::{GafferError, LineupChoice, Player, Position};

use super::{add_lineup_rules, add_points_objective, declare_lineup_vars, extract_slots};

/// Pick the best legal XI and captain from `squad`.
///
/// Fails with `NoValidLineup` when the squad's positional distribution
/// cannot field a legal XI at all (for example, no goalkeeper).
pub fn pick_lineup(
    squad: &[Player],
    solver: &dyn MilpSolver,
    time_budget: Duration,
) -> Result<LineupChoice, GafferError> {
    let mut spec = ProblemSpec::new();
    let vars = declare_lineup_vars(&mut spec, squad.len());

    add_lineup_rules(&mut spec, squad, &vars);
    add_points_objective(&mut spec, squad, &vars);

    debug!(squad = squad.len(), "Picking lineup");

    let asn = solver.solve(&spec, time_budget).map_err(|e| match e {
        SolveError::Infeasible => GafferError::NoValidLineup(position_summary(squad)),
        SolveError::Unknown => {
            GafferError::Unknown("lineup pick exhausted its time budget".to_string())
        }
        SolveError::Backend(msg) => GafferError::Solver(msg),
    })?;

    let slots = extract_slots(squad, |_| true, &vars, &asn);

    Ok(LineupChoice {
        slots,
        objective: asn.objective,
    })
}

/// "2 GK / 4 DEF / 5 MID / 3 FWD" — used in lineup failure messages.
fn position_summary(squad: &[Player]) -> String {
    let counts: Vec<String> = Position::ALL
        .iter()
        .map(|&pos| {
            let n = squad.iter().filter(|p| p.position == pos).count();
            format!("{n} {pos}")
        })
        .collect();
    counts.join(" / ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
