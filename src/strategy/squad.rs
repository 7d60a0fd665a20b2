//! Fresh squad build.
//!
//! Picks a legal 15-man squad from the candidate pool under the price
//! budget, together with its best XI and captain, in a single joint
//! optimization.

use std::time::Duration;

use tracing::{debug, info};

use crate::solver::{Cmp, MilpSolver, ProblemSpec, SolveError};
use crate::types::{GafferError, Player, SquadPick};

use super::{
    add_composition_rules, add_lineup_rules, add_points_objective, declare_squad_vars,
    extract_slots,
};

/// Build the highest-projected legal squad affordable within
/// `budget_tenths`.
pub fn build_squad(
    pool: &[Player],
    budget_tenths: i64,
    max_per_club: usize,
    solver: &dyn MilpSolver,
    time_budget: Duration,
) -> Result<SquadPick, GafferError> {
    let mut spec = ProblemSpec::new();
    let vars = declare_squad_vars(&mut spec, pool.len());

    add_composition_rules(&mut spec, pool, &vars, max_per_club);

    spec.constrain(
        pool.iter()
            .enumerate()
            .map(|(i, p)| (vars.select[i], p.price_tenths as f64))
            .collect(),
        Cmp::Le,
        budget_tenths as f64,
    );

    add_lineup_rules(&mut spec, pool, &vars.lineup);
    add_points_objective(&mut spec, pool, &vars.lineup);

    debug!(
        candidates = pool.len(),
        budget = budget_tenths,
        "Building fresh squad"
    );

    let asn = solver.solve(&spec, time_budget).map_err(|e| match e {
        SolveError::Infeasible => GafferError::Infeasible(format!(
            "no legal 15-man squad within budget {budget_tenths} tenths \
             (budget, position quotas, or the {max_per_club}-per-club cap)"
        )),
        SolveError::Unknown => {
            GafferError::Unknown("squad build exhausted its time budget".to_string())
        }
        SolveError::Backend(msg) => GafferError::Solver(msg),
    })?;

    let slots = extract_slots(pool, |i| asn.is_set(vars.select[i]), &vars.lineup, &asn);
    let total_cost_tenths: i64 = slots
        .iter()
        .map(|s| {
            pool.iter()
                .find(|p| p.id == s.id)
                .map(|p| p.price_tenths)
                .unwrap_or(0)
        })
        .sum();

    info!(
        objective = format!("{:.2}", asn.objective),
        cost = total_cost_tenths,
        "Squad built"
    );

    Ok(SquadPick {
        slots,
        objective: asn.objective,
        total_cost_tenths,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::LpSolver;
    use crate::types::Position;

    fn time() -> Duration {
        Duration::from_secs(10)
    }

    /// Minimum-depth pool: exactly the quota at each position, every
    /// player on a different club, all priced 50.
    fn minimal_pool() -> Vec<Player> {
        let mut pool = Vec::new();
        let mut id = 1;
        for &pos in Position::ALL {
            for _ in 0..pos.squad_quota() {
                let mut p = Player::sample(id, pos, 50, id as f64);
                p.club = id;
                pool.push(p);
                id += 1;
            }
        }
        pool
    }

    fn position_of(pool: &[Player], id: u32) -> Position {
        pool.iter().find(|p| p.id == id).unwrap().position
    }

    #[test]
    fn test_builds_legal_squad() {
        let pool = minimal_pool();
        let pick = build_squad(&pool, 1000, 3, &LpSolver::new(), time()).unwrap();

        assert_eq!(pick.slots.len(), 15);
        assert_eq!(pick.slots.iter().filter(|s| s.starter).count(), 11);
        assert_eq!(pick.slots.iter().filter(|s| s.captain).count(), 1);
        assert!(pick.total_cost_tenths <= 1000);

        for &pos in Position::ALL {
            let count = pick
                .slots
                .iter()
                .filter(|s| position_of(&pool, s.id) == pos)
                .count();
            assert_eq!(count, pos.squad_quota(), "wrong quota for {pos}");
        }

        let gk_starters = pick
            .slots
            .iter()
            .filter(|s| s.starter && position_of(&pool, s.id) == Position::Gk)
            .count();
        assert_eq!(gk_starters, 1);
    }

    #[test]
    fn test_captain_is_a_starter() {
        let pool = minimal_pool();
        let pick = build_squad(&pool, 1000, 3, &LpSolver::new(), time()).unwrap();
        let captain = pick.slots.iter().find(|s| s.captain).unwrap();
        assert!(captain.starter);
    }

    #[test]
    fn test_captain_doubles_best_starter() {
        // Make one forward clearly the best player; the optimal captain
        // choice is forced.
        let mut pool = minimal_pool();
        let star = pool.iter_mut().find(|p| p.position == Position::Fwd).unwrap();
        star.ep_next = 99.0;
        let star_id = star.id;

        let pick = build_squad(&pool, 1000, 3, &LpSolver::new(), time()).unwrap();
        let captain = pick.slots.iter().find(|s| s.captain).unwrap();
        assert_eq!(captain.id, star_id);
    }

    #[test]
    fn test_budget_too_low_is_infeasible() {
        let pool = minimal_pool();
        // Cheapest legal squad costs 15 × 50 = 750.
        let err = build_squad(&pool, 749, 3, &LpSolver::new(), time()).unwrap_err();
        assert!(matches!(err, GafferError::Infeasible(_)));
    }

    #[test]
    fn test_missing_position_depth_is_infeasible() {
        let pool: Vec<Player> = minimal_pool()
            .into_iter()
            .filter(|p| p.position != Position::Gk)
            .collect();
        let err = build_squad(&pool, 1000, 3, &LpSolver::new(), time()).unwrap_err();
        assert!(matches!(err, GafferError::Infeasible(_)));
    }

    #[test]
    fn test_unavailable_player_never_picked() {
        // Add a spare defender so the pool keeps enough depth, then flag
        // the best defender unavailable.
        let mut pool = minimal_pool();
        let mut spare = Player::sample(100, Position::Def, 50, 0.5);
        spare.club = 100;
        pool.push(spare);

        let best_def = pool
            .iter_mut()
            .filter(|p| p.position == Position::Def)
            .max_by(|a, b| a.ep_next.partial_cmp(&b.ep_next).unwrap())
            .unwrap();
        best_def.available = false;
        let benched_id = best_def.id;

        let pick = build_squad(&pool, 1000, 3, &LpSolver::new(), time()).unwrap();
        assert!(pick.slots.iter().all(|s| s.id != benched_id));
    }

    #[test]
    fn test_club_cap_enforced() {
        // Four excellent cheap defenders at one club; only three may come.
        let mut pool = minimal_pool();
        for i in 0..4 {
            let mut p = Player::sample(200 + i, Position::Def, 40, 50.0);
            p.club = 7_000;
            pool.push(p);
        }

        let pick = build_squad(&pool, 1000, 3, &LpSolver::new(), time()).unwrap();
        let from_club = pick
            .slots
            .iter()
            .filter(|s| pool.iter().any(|p| p.id == s.id && p.club == 7_000))
            .count();
        assert_eq!(from_club, 3);
    }

    #[test]
    fn test_prefers_higher_projection_within_budget() {
        // One expensive star midfielder plus a cheap spare; generous
        // budget → the star must be in.
        let mut pool = minimal_pool();
        let mut star = Player::sample(300, Position::Mid, 130, 80.0);
        star.club = 300;
        pool.push(star);
        let mut spare = Player::sample(301, Position::Mid, 40, 0.1);
        spare.club = 301;
        pool.push(spare);

        let pick = build_squad(&pool, 2000, 3, &LpSolver::new(), time()).unwrap();
        assert!(pick.slots.iter().any(|s| s.id == 300));
    }
}
