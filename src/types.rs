//! Shared types for the GAFFER optimizer.
//!
//! These types form the data model used across all modules.
//! The candidate pool is an immutable snapshot for the duration of one
//! optimization call; api, strategy, engine, and storage modules depend
//! on these types without circular references.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Squad position. Declaration order (GK < DEF < MID < FWD) is the
/// canonical ordering used wherever players are sorted by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Gk,
    Def,
    Mid,
    Fwd,
}

impl Position {
    /// All positions in canonical order.
    pub const ALL: &'static [Position] =
        &[Position::Gk, Position::Def, Position::Mid, Position::Fwd];

    /// Exact number of players of this position in a legal 15-player squad.
    pub fn squad_quota(self) -> usize {
        match self {
            Position::Gk => 2,
            Position::Def => 5,
            Position::Mid => 5,
            Position::Fwd => 3,
        }
    }

    /// Minimum starters of this position in a legal XI.
    /// Goalkeeper is an exact count (one keeper, never two).
    pub fn min_starters(self) -> usize {
        match self {
            Position::Gk => 1,
            Position::Def => 3,
            Position::Mid => 2,
            Position::Fwd => 1,
        }
    }

    /// Whether the XI count for this position is exact rather than a minimum.
    pub fn exact_starters(self) -> bool {
        matches!(self, Position::Gk)
    }

    /// Map the league API's numeric `element_type` code.
    pub fn from_element_type(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Gk),
            2 => Some(Position::Def),
            3 => Some(Position::Mid),
            4 => Some(Position::Fwd),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Gk => write!(f, "GK"),
            Position::Def => write!(f, "DEF"),
            Position::Mid => write!(f, "MID"),
            Position::Fwd => write!(f, "FWD"),
        }
    }
}

impl std::str::FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GK" | "GKP" => Ok(Position::Gk),
            "DEF" => Ok(Position::Def),
            "MID" => Ok(Position::Mid),
            "FWD" => Ok(Position::Fwd),
            _ => Err(anyhow::anyhow!("Unknown position: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One candidate in the pool: an immutable snapshot of a player's price,
/// availability, and projected points for the upcoming gameweek.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    /// Club identifier, for the per-club squad cap.
    pub club: u32,
    pub position: Position,
    /// Current price in tenths of £1.0m.
    pub price_tenths: i64,
    /// Availability status letter from the league API ("a", "d", "i", ...).
    pub status: String,
    /// Difficulty of the next fixture (1 easiest – 5 hardest).
    pub fixture_diff: u8,
    /// Projected points for the next gameweek.
    pub ep_next: f64,
    /// Whether the player can be picked into a new squad.
    pub available: bool,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}, {}) ep={:.2}",
            self.name,
            self.position,
            fmt_tenths(self.price_tenths),
            self.status,
            self.ep_next,
        )
    }
}

impl Player {
    /// Helper to build a test player with sensible defaults.
    #[cfg(test)]
    pub fn sample(id: u32, position: Position, price_tenths: i64, ep_next: f64) -> Self {
        Player {
            id,
            name: format!("player-{id}"),
            club: id % 20,
            position,
            price_tenths,
            status: "a".to_string(),
            fixture_diff: 3,
            ep_next,
            available: true,
        }
    }
}

/// Look up a player index by id in a pool slice.
pub fn find_player(pool: &[Player], id: u32) -> Option<usize> {
    pool.iter().position(|p| p.id == id)
}

// ---------------------------------------------------------------------------
// Squad selections
// ---------------------------------------------------------------------------

/// One roster slot in an optimization result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadSlot {
    pub id: u32,
    /// In the starting XI.
    pub starter: bool,
    /// Captain — projected points count double.
    pub captain: bool,
}

/// Result of a fresh squad build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadPick {
    pub slots: Vec<SquadSlot>,
    /// Projected XI points with the captain doubled.
    pub objective: f64,
    pub total_cost_tenths: i64,
}

/// Result of picking an XI from a fixed squad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupChoice {
    pub slots: Vec<SquadSlot>,
    pub objective: f64,
}

/// Result of a transfer-planning run: the recommended final squad plus
/// the moves that reach it from the current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Player ids bought, ascending.
    pub added: Vec<u32>,
    /// Player ids sold, ascending.
    pub removed: Vec<u32>,
    pub transfers_out: u32,
    /// Transfers beyond the free allotment (each costs the hit penalty).
    pub extra_transfers: u32,
    /// Bank after executing every recommended move.
    pub final_bank_tenths: i64,
    /// Projected XI points with captain doubled, net of hit penalties.
    pub objective: f64,
    pub slots: Vec<SquadSlot>,
}

// ---------------------------------------------------------------------------
// Persisted team state
// ---------------------------------------------------------------------------

/// Persistent team state, saved to a JSON file and mutated only by an
/// explicit transfer apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    /// The 15 held player ids. Order is not significant.
    pub player_ids: Vec<u32>,
    /// Cash in the bank, tenths of £1.0m. Never negative.
    pub bank_tenths: i64,
    /// Free transfers available for the next gameweek.
    pub free_transfers: u32,
    /// Purchase price (tenths) for each currently-held player.
    pub purchases_tenths: BTreeMap<u32, i64>,
}

impl TeamState {
    pub fn new(
        player_ids: Vec<u32>,
        bank_tenths: i64,
        free_transfers: u32,
        purchases_tenths: BTreeMap<u32, i64>,
    ) -> Self {
        Self {
            player_ids,
            bank_tenths,
            free_transfers,
            purchases_tenths,
        }
    }

    /// Check structural invariants: exactly 15 distinct ids, non-negative
    /// bank, and purchase records only for held players.
    pub fn validate(&self) -> Result<(), GafferError> {
        let unique: std::collections::BTreeSet<u32> = self.player_ids.iter().copied().collect();
        if self.player_ids.len() != 15 || unique.len() != 15 {
            return Err(GafferError::Config(format!(
                "team must hold exactly 15 distinct players, found {}",
                self.player_ids.len()
            )));
        }
        if self.bank_tenths < 0 {
            return Err(GafferError::Config(format!(
                "bank cannot be negative ({})",
                fmt_tenths(self.bank_tenths)
            )));
        }
        if let Some(stray) = self.purchases_tenths.keys().find(|id| !unique.contains(id)) {
            return Err(GafferError::Config(format!(
                "purchase record for player {stray} who is not in the squad"
            )));
        }
        Ok(())
    }

    /// Whether the given player is currently held.
    pub fn holds(&self, id: u32) -> bool {
        self.player_ids.contains(&id)
    }
}

impl fmt::Display for TeamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} players | bank={} | free transfers={}",
            self.player_ids.len(),
            fmt_tenths(self.bank_tenths),
            self.free_transfers,
        )
    }
}

// ---------------------------------------------------------------------------
// Money formatting
// ---------------------------------------------------------------------------

/// Render a tenths amount as pounds, e.g. 1003 → "£100.3".
pub fn fmt_tenths(tenths: i64) -> String {
    let sign = if tenths < 0 { "-" } else { "" };
    let abs = tenths.abs();
    format!("{sign}£{}.{}", abs / 10, abs % 10)
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for GAFFER.
///
/// Every failure aborts the current operation before any persisted-state
/// mutation; nothing is retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum GafferError {
    #[error("Invalid team state: {0}")]
    Config(String),

    #[error("Could not resolve '{0}' to a player. Try the full name or web name.")]
    Resolution(String),

    #[error("No feasible solution: {0}")]
    Infeasible(String),

    #[error("Solver ran out of time without a feasible solution: {0}")]
    Unknown(String),

    #[error("No legal starting lineup for this squad: {0}")]
    NoValidLineup(String),

    #[error("Accepted transfers leave {got} players; need exactly 15")]
    InvalidTransferSet { got: usize },

    #[error("Insufficient funds: short by £{}.{}", .shortfall_tenths / 10, .shortfall_tenths % 10)]
    InsufficientFunds {
        /// Positive amount (tenths) by which the apply would overdraw.
        shortfall_tenths: i64,
    },

    #[error("Solver backend error: {0}")]
    Solver(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Position tests --

    #[test]
    fn test_position_display() {
        assert_eq!(format!("{}", Position::Gk), "GK");
        assert_eq!(format!("{}", Position::Def), "DEF");
        assert_eq!(format!("{}", Position::Mid), "MID");
        assert_eq!(format!("{}", Position::Fwd), "FWD");
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!("gk".parse::<Position>().unwrap(), Position::Gk);
        assert_eq!("GKP".parse::<Position>().unwrap(), Position::Gk);
        assert_eq!("def".parse::<Position>().unwrap(), Position::Def);
        assert_eq!("MID".parse::<Position>().unwrap(), Position::Mid);
        assert_eq!("Fwd".parse::<Position>().unwrap(), Position::Fwd);
        assert!("striker".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_from_element_type() {
        assert_eq!(Position::from_element_type(1), Some(Position::Gk));
        assert_eq!(Position::from_element_type(4), Some(Position::Fwd));
        assert_eq!(Position::from_element_type(5), None);
    }

    #[test]
    fn test_position_quotas_sum_to_squad_size() {
        let total: usize = Position::ALL.iter().map(|p| p.squad_quota()).sum();
        assert_eq!(total, 15);
    }

    #[test]
    fn test_position_ordering_is_canonical() {
        assert!(Position::Gk < Position::Def);
        assert!(Position::Def < Position::Mid);
        assert!(Position::Mid < Position::Fwd);
    }

    #[test]
    fn test_position_serialization_roundtrip() {
        for pos in Position::ALL {
            let json = serde_json::to_string(pos).unwrap();
            let parsed: Position = serde_json::from_str(&json).unwrap();
            assert_eq!(*pos, parsed);
        }
    }

    // -- Money formatting --

    #[test]
    fn test_fmt_tenths() {
        assert_eq!(fmt_tenths(1003), "£100.3");
        assert_eq!(fmt_tenths(50), "£5.0");
        assert_eq!(fmt_tenths(0), "£0.0");
        assert_eq!(fmt_tenths(-25), "-£2.5");
    }

    // -- TeamState tests --

    fn valid_state() -> TeamState {
        let ids: Vec<u32> = (1..=15).collect();
        let purchases = ids.iter().map(|&id| (id, 50)).collect();
        TeamState::new(ids, 10, 1, purchases)
    }

    #[test]
    fn test_state_validate_ok() {
        assert!(valid_state().validate().is_ok());
    }

    #[test]
    fn test_state_validate_wrong_count() {
        let mut state = valid_state();
        state.player_ids.pop();
        state.purchases_tenths.remove(&15);
        assert!(matches!(state.validate(), Err(GafferError::Config(_))));
    }

    #[test]
    fn test_state_validate_duplicate_ids() {
        let mut state = valid_state();
        state.player_ids[14] = 1;
        state.purchases_tenths.remove(&15);
        assert!(matches!(state.validate(), Err(GafferError::Config(_))));
    }

    #[test]
    fn test_state_validate_negative_bank() {
        let mut state = valid_state();
        state.bank_tenths = -1;
        assert!(matches!(state.validate(), Err(GafferError::Config(_))));
    }

    #[test]
    fn test_state_validate_stray_purchase_record() {
        let mut state = valid_state();
        state.purchases_tenths.insert(999, 60);
        assert!(matches!(state.validate(), Err(GafferError::Config(_))));
    }

    #[test]
    fn test_state_serialization_roundtrip() {
        let state = valid_state();
        let json = serde_json::to_string(&state).unwrap();
        let parsed: TeamState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, parsed);
    }

    #[test]
    fn test_error_display_reports_shortfall() {
        let err = GafferError::InsufficientFunds {
            shortfall_tenths: 23,
        };
        assert!(err.to_string().contains("£2.3"));
    }
}
