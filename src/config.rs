//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a sensible default so the CLI runs without a config
//! file; a partial file overrides only the sections it names.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub rules: RulesConfig,
    pub projection: ProjectionConfig,
    pub solver: SolverConfig,
    pub api: ApiConfig,
}

/// League squad rules and transfer economics.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RulesConfig {
    /// Fresh-build budget in tenths of £1.0m.
    pub budget_tenths: i64,
    /// Maximum players from any one club.
    pub max_per_club: usize,
    /// Points deducted per transfer beyond the free allotment.
    pub hit_penalty: f64,
    /// Hard cap on transfers beyond the free allotment.
    pub max_extra_transfers: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            budget_tenths: 1000,
            max_per_club: 3,
            hit_penalty: 4.0,
            max_extra_transfers: 3,
        }
    }
}

/// Expected-points model weights.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Weight of season points-per-game in the per-minute estimate.
    pub ppg_weight: f64,
    /// Weight of recent form in the per-minute estimate.
    pub form_weight: f64,
    /// Fixture-difficulty multiplier, keyed by difficulty "1"–"5".
    pub fixture_bump: HashMap<String, f64>,
    /// Expected minutes keyed by availability status letter.
    pub status_minutes: HashMap<String, f64>,
    /// Flat per-position bonus reflecting scoring-system bias.
    pub position_bias: HashMap<String, f64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        let fixture_bump = [
            ("1", 1.20),
            ("2", 1.10),
            ("3", 1.00),
            ("4", 0.90),
            ("5", 0.80),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        // "a" available, "d" doubtful; injured/suspended/unavailable
        // project to zero minutes.
        let status_minutes = [("a", 90.0), ("d", 45.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let position_bias = [("GK", 0.0), ("DEF", 0.2), ("MID", 0.3), ("FWD", 0.3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        Self {
            ppg_weight: 0.7,
            form_weight: 0.3,
            fixture_bump,
            status_minutes,
            position_bias,
        }
    }
}

/// Wall-clock budgets for the optimization calls.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SolverConfig {
    pub build_secs: u64,
    pub lineup_secs: u64,
    pub transfer_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            build_secs: 15,
            lineup_secs: 10,
            transfer_secs: 25,
        }
    }
}

impl SolverConfig {
    pub fn build_budget(&self) -> Duration {
        Duration::from_secs(self.build_secs)
    }

    pub fn lineup_budget(&self) -> Duration {
        Duration::from_secs(self.lineup_secs)
    }

    pub fn transfer_budget(&self) -> Duration {
        Duration::from_secs(self.transfer_secs)
    }
}

/// League API endpoints.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fantasy.premierleague.com/api".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load from a TOML file if it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.rules.budget_tenths, 1000);
        assert_eq!(cfg.rules.max_per_club, 3);
        assert_eq!(cfg.rules.hit_penalty, 4.0);
        assert_eq!(cfg.solver.transfer_secs, 25);
        assert_eq!(cfg.projection.status_minutes.get("a"), Some(&90.0));
        assert_eq!(cfg.projection.status_minutes.get("i"), None);
        assert!(cfg.api.base_url.starts_with("https://"));
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let toml_str = r#"
            [rules]
            budget_tenths = 850

            [solver]
            transfer_secs = 5
        "#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.rules.budget_tenths, 850);
        assert_eq!(cfg.rules.max_per_club, 3); // default preserved
        assert_eq!(cfg.solver.transfer_secs, 5);
        assert_eq!(cfg.solver.build_secs, 15);
    }

    #[test]
    fn test_projection_weights_override() {
        let toml_str = r#"
            [projection]
            ppg_weight = 0.9
            form_weight = 0.1

            [projection.fixture_bump]
            1 = 1.5
        "#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.projection.ppg_weight, 0.9);
        assert_eq!(cfg.projection.fixture_bump.get("1"), Some(&1.5));
        // Whole-map override: unnamed difficulties fall back to 1.0 at
        // lookup time, not to the default table.
        assert_eq!(cfg.projection.fixture_bump.len(), 1);
    }

    #[test]
    fn test_solver_budgets_as_durations() {
        let cfg = SolverConfig::default();
        assert_eq!(cfg.build_budget(), Duration::from_secs(15));
        assert_eq!(cfg.lineup_budget(), Duration::from_secs(10));
        assert_eq!(cfg.transfer_budget(), Duration::from_secs(25));
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::load_or_default("/tmp/gaffer_no_such_config_987.toml").unwrap();
        assert_eq!(cfg.rules.budget_tenths, 1000);
    }
}
