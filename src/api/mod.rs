//! Candidate pool acquisition.
//!
//! Defines the `CandidateSource` trait over the league's raw data and
//! assembles the scored candidate pool from it. The optimizer only ever
//! sees the assembled pool, so tests swap the live client for an
//! in-memory source.

pub mod client;
pub mod names;
pub mod normalize;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::ProjectionConfig;
use crate::projections::project_next_gameweek;
use crate::types::Player;

pub use client::LeagueClient;
pub use names::NameIndex;
use normalize::{players_table, RawBootstrap, RawFixture};

/// Abstraction over where the raw league data comes from.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// The full bootstrap snapshot (players and clubs).
    async fn bootstrap(&self) -> Result<RawBootstrap>;

    /// Upcoming fixtures with difficulty ratings.
    async fn fixtures(&self) -> Result<Vec<RawFixture>>;
}

/// Fetch, normalize, and score the candidate pool.
///
/// Returns the pool alongside a name index for resolving user-supplied
/// player names.
pub async fn load_pool(
    source: &dyn CandidateSource,
    cfg: &ProjectionConfig,
) -> Result<(Vec<Player>, NameIndex)> {
    let bootstrap = source.bootstrap().await?;
    let fixtures = source.fixtures().await?;

    let rows = players_table(&bootstrap);
    let names = NameIndex::from_bootstrap(&bootstrap);
    let pool = project_next_gameweek(&rows, &fixtures, cfg);

    info!(
        candidates = pool.len(),
        available = pool.iter().filter(|p| p.available).count(),
        "Candidate pool ready"
    );

    Ok((pool, names))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory source with two players and one fixture.
    struct StubSource;

    #[async_trait]
    impl CandidateSource for StubSource {
        async fn bootstrap(&self) -> Result<RawBootstrap> {
            Ok(serde_json::from_str(
                r#"{
                    "elements": [
                        {"id": 1, "web_name": "Keeper", "first_name": "A",
                         "second_name": "Keeper", "team": 1, "element_type": 1,
                         "now_cost": 45, "status": "a", "points_per_game": "3.5"},
                        {"id": 2, "web_name": "Crock", "first_name": "B",
                         "second_name": "Crock", "team": 2, "element_type": 4,
                         "now_cost": 80, "status": "i", "points_per_game": "6.0"}
                    ],
                    "teams": [
                        {"id": 1, "name": "One", "short_name": "ONE"},
                        {"id": 2, "name": "Two", "short_name": "TWO"}
                    ]
                }"#,
            )?)
        }

        async fn fixtures(&self) -> Result<Vec<RawFixture>> {
            Ok(serde_json::from_str(
                r#"[{"id": 1, "event": 1, "team_h": 1, "team_a": 2,
                     "team_h_difficulty": 2, "team_a_difficulty": 3}]"#,
            )?)
        }
    }

    #[tokio::test]
    async fn test_load_pool_assembles_scored_candidates() {
        let (pool, names) = load_pool(&StubSource, &ProjectionConfig::default())
            .await
            .unwrap();

        assert_eq!(pool.len(), 2);
        assert!(pool[0].available);
        assert!(pool[0].ep_next > 0.0);
        assert!(!pool[1].available); // injured

        assert_eq!(names.resolve("keeper"), Some(1));
        assert_eq!(names.resolve("B Crock"), Some(2));
    }
}
