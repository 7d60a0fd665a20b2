//! Expected-points projection for the next gameweek.
//!
//! A deliberately simple, config-driven heuristic:
//!
//! `ep_next = expected_minutes(status) × per-minute estimate(ppg, form)
//!            × fixture multiplier(difficulty) + position bias`
//!
//! The optimizer is agnostic to how these scores were derived; anything
//! that fills `Player::ep_next` works.

use std::collections::HashMap;

use tracing::debug;

use crate::api::normalize::{PlayerRow, RawFixture};
use crate::config::ProjectionConfig;
use crate::types::Player;

/// Appearance-points denominator converting per-game numbers into a
/// per-minute-ish signal.
const MINUTES_PER_APPEARANCE: f64 = 75.0;

/// Difficulty assumed for clubs with no scheduled fixture.
const DEFAULT_DIFFICULTY: u8 = 3;

/// Project every player row into a pool candidate.
pub fn project_next_gameweek(
    rows: &[PlayerRow],
    fixtures: &[RawFixture],
    cfg: &ProjectionConfig,
) -> Vec<Player> {
    let difficulty = next_fixture_difficulty(fixtures);

    let pool: Vec<Player> = rows
        .iter()
        .map(|row| {
            let fixture_diff = difficulty
                .get(&row.club)
                .copied()
                .unwrap_or(DEFAULT_DIFFICULTY);
            let fixture_mult = cfg
                .fixture_bump
                .get(&fixture_diff.to_string())
                .copied()
                .unwrap_or(1.0);
            let exp_minutes = cfg
                .status_minutes
                .get(&row.status)
                .copied()
                .unwrap_or(0.0);
            let per_minute = (cfg.ppg_weight * row.ppg + cfg.form_weight * row.form)
                / MINUTES_PER_APPEARANCE;
            let bias = cfg
                .position_bias
                .get(&row.position.to_string())
                .copied()
                .unwrap_or(0.0);

            let ep_next = exp_minutes * per_minute * fixture_mult + bias;

            Player {
                id: row.id,
                name: row.name.clone(),
                club: row.club,
                position: row.position,
                price_tenths: row.price_tenths,
                status: row.status.clone(),
                fixture_diff,
                ep_next,
                available: exp_minutes > 0.0,
            }
        })
        .collect();

    debug!(
        players = pool.len(),
        available = pool.iter().filter(|p| p.available).count(),
        "Projections computed"
    );

    pool
}

/// Each club's next-fixture difficulty: earliest (gameweek, fixture id)
/// wins; unscheduled fixtures are ignored.
fn next_fixture_difficulty(fixtures: &[RawFixture]) -> HashMap<u32, u8> {
    let mut scheduled: Vec<&RawFixture> = fixtures.iter().filter(|f| f.event.is_some()).collect();
    scheduled.sort_by_key(|f| (f.event, f.id));

    let mut difficulty: HashMap<u32, u8> = HashMap::new();
    for fx in scheduled {
        difficulty.entry(fx.team_h).or_insert(fx.team_h_difficulty);
        difficulty.entry(fx.team_a).or_insert(fx.team_a_difficulty);
    }
    difficulty
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
