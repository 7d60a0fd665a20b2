//! Normalization of raw league API payloads.
//!
//! The bootstrap endpoint returns every player and club in one blob with
//! stringly-typed numerics; this module turns it into the typed tables
//! the projection model consumes. Only the fields we need are
//! deserialized.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::types::Position;

// ---------------------------------------------------------------------------
// Raw API shapes
// ---------------------------------------------------------------------------

/// The bootstrap snapshot: players plus clubs.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBootstrap {
    pub elements: Vec<RawElement>,
    pub teams: Vec<RawTeam>,
}

/// One player record as the API ships it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    pub id: u32,
    pub web_name: String,
    pub first_name: String,
    pub second_name: String,
    pub team: u32,
    /// Position code 1–4.
    pub element_type: u8,
    /// Current price in tenths.
    pub now_cost: i64,
    /// Availability letter: "a", "d", "i", "s", "u", ...
    pub status: String,
    /// Recent form — a decimal shipped as a string.
    #[serde(default)]
    pub form: Option<String>,
    /// Season points per game — a decimal shipped as a string.
    #[serde(default)]
    pub points_per_game: Option<String>,
    #[serde(default)]
    pub chance_of_playing_next_round: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    pub id: u32,
    pub name: String,
    pub short_name: String,
}

/// One upcoming fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFixture {
    pub id: u64,
    /// Gameweek number; null for unscheduled fixtures.
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: u8,
    pub team_a_difficulty: u8,
    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Normalized player table
// ---------------------------------------------------------------------------

/// A player row with typed numerics, ready for projection.
#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub id: u32,
    pub name: String,
    pub club: u32,
    pub position: Position,
    pub price_tenths: i64,
    pub status: String,
    pub form: f64,
    pub ppg: f64,
    pub chance_of_playing: Option<u8>,
}

/// Build the player table from a bootstrap snapshot. Rows with an
/// unknown position code are dropped with a warning.
pub fn players_table(bootstrap: &RawBootstrap) -> Vec<PlayerRow> {
    bootstrap
        .elements
        .iter()
        .filter_map(|e| {
            let Some(position) = Position::from_element_type(e.element_type) else {
                warn!(id = e.id, code = e.element_type, "Unknown position code — skipping");
                return None;
            };
            Some(PlayerRow {
                id: e.id,
                name: e.web_name.clone(),
                club: e.team,
                position,
                price_tenths: e.now_cost,
                status: e.status.clone(),
                form: parse_decimal(e.form.as_deref()),
                ppg: parse_decimal(e.points_per_game.as_deref()),
                chance_of_playing: e.chance_of_playing_next_round,
            })
        })
        .collect()
}

/// The API ships decimals as strings ("5.2"); anything unparseable is 0.
fn parse_decimal(s: Option<&str>) -> f64 {
    s.and_then(|v| v.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
