//! Persistence layer.
//!
//! Saves and loads the team state to/from a JSON file. Writes go through
//! a temp file and an atomic rename so the file on disk is always either
//! the previous state or the complete new one.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::types::TeamState;

/// Default team file path.
pub const DEFAULT_TEAM_FILE: &str = "team.json";

/// Save team state to a JSON file, atomically.
pub fn save_state(state: &TeamState, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_TEAM_FILE);
    state.validate()?;

    let json = serde_json::to_string_pretty(state)
        .context("Failed to serialise team state")?;

    let tmp = format!("{path}.tmp");
    std::fs::write(&tmp, &json)
        .context(format!("Failed to write state to {tmp}"))?;
    std::fs::rename(&tmp, path)
        .context(format!("Failed to move state into place at {path}"))?;

    debug!(path, bank = state.bank_tenths, "State saved");
    Ok(())
}

/// Load team state from a JSON file.
/// Returns None if the file doesn't exist (fresh start).
pub fn load_state(path: Option<&str>) -> Result<Option<TeamState>> {
    let path = path.unwrap_or(DEFAULT_TEAM_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved team found");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read state from {path}"))?;

    let state: TeamState = serde_json::from_str(&json)
        .context(format!("Failed to parse state from {path}"))?;
    state
        .validate()
        .context(format!("Rejecting team file {path}"))?;

    info!(
        path,
        bank = state.bank_tenths,
        free_transfers = state.free_transfers,
        "Team loaded from disk"
    );

    Ok(Some(state))
}

/// Delete the team file (for testing or reset).
pub fn delete_state(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_TEAM_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to delete team file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn temp_path() -> String {
        let mut p = std::env::temp_dir();
        p.push(format!("gaffer_test_team_{}.json", uuid::Uuid::new_v4()));
        p.to_string_lossy().to_string()
    }

    fn sample_state() -> TeamState {
        let ids: Vec<u32> = (1..=15).collect();
        let purchases: BTreeMap<u32, i64> = ids.iter().map(|&id| (id, 50)).collect();
        TeamState::new(ids, 25, 1, purchases)
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path();
        let state = sample_state();
        save_state(&state, Some(&path)).unwrap();

        let loaded = load_state(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, state);

        delete_state(Some(&path)).unwrap();
    }

    #[test]
    fn test_load_nonexistent() {
        let loaded = load_state(Some("/tmp/gaffer_nonexistent_team_12345.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_preserves_ledger_exactly() {
        let path = temp_path();
        let mut state = sample_state();
        state.purchases_tenths.insert(7, 123);
        state.bank_tenths = 0;

        save_state(&state, Some(&path)).unwrap();
        let loaded = load_state(Some(&path)).unwrap().unwrap();

        assert_eq!(loaded.purchases_tenths.get(&7), Some(&123));
        assert_eq!(loaded.bank_tenths, 0);
        assert_eq!(loaded.free_transfers, 1);

        delete_state(Some(&path)).unwrap();
    }

    #[test]
    fn test_save_rejects_invalid_state() {
        let path = temp_path();
        let mut state = sample_state();
        state.player_ids.pop();
        state.purchases_tenths.remove(&15);

        assert!(save_state(&state, Some(&path)).is_err());
        assert!(!Path::new(&path).exists());
    }

    #[test]
    fn test_load_rejects_wrong_member_count() {
        let path = temp_path();
        let state = sample_state();
        save_state(&state, Some(&path)).unwrap();

        // Corrupt the file: drop a player.
        let json = std::fs::read_to_string(&path).unwrap();
        let mut parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        parsed["player_ids"].as_array_mut().unwrap().pop();
        parsed["purchases_tenths"].as_object_mut().unwrap().remove("15");
        std::fs::write(&path, serde_json::to_string(&parsed).unwrap()).unwrap();

        assert!(load_state(Some(&path)).is_err());
        delete_state(Some(&path)).unwrap();
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let path = temp_path();
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_state(Some(&path)).is_err());
        delete_state(Some(&path)).unwrap();
    }

    #[test]
    fn test_delete_nonexistent_ok() {
        assert!(delete_state(Some("/tmp/gaffer_does_not_exist_xyz.json")).is_ok());
    }

    #[test]
    fn test_overwrite_replaces_whole_file() {
        let path = temp_path();
        let mut state = sample_state();
        save_state(&state, Some(&path)).unwrap();

        state.bank_tenths = 999;
        save_state(&state, Some(&path)).unwrap();

        let loaded = load_state(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.bank_tenths, 999);
        delete_state(Some(&path)).unwrap();
    }
}
