//! League REST API integration.
//!
//! Read-only public endpoints, no auth:
//!   `GET {base}/bootstrap-static/` — all players, clubs, prices, status
//!   `GET {base}/fixtures/?future=1` — upcoming fixtures with difficulty

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::normalize::{RawBootstrap, RawFixture};
use super::CandidateSource;

/// League API client.
pub struct LeagueClient {
    http: Client,
    base_url: String,
}

impl LeagueClient {
    /// Create a new client against the given API base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("GAFFER/0.1.0 (squad-optimizer)")
            .build()
            .context("Failed to build HTTP client for the league API")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("League API returned an error status for {url}"))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {url}"))
    }
}

#[async_trait]
impl CandidateSource for LeagueClient {
    async fn bootstrap(&self) -> Result<RawBootstrap> {
        let snapshot: RawBootstrap = self.get_json("/bootstrap-static/").await?;
        info!(
            players = snapshot.elements.len(),
            clubs = snapshot.teams.len(),
            "Bootstrap snapshot fetched"
        );
        Ok(snapshot)
    }

    async fn fixtures(&self) -> Result<Vec<RawFixture>> {
        let fixtures: Vec<RawFixture> = self.get_json("/fixtures/?future=1").await?;
        info!(count = fixtures.len(), "Upcoming fixtures fetched");
        Ok(fixtures)
    }
}
