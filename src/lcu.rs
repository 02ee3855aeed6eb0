//! League client (LCU) session integration.
//!
//! When the desktop client is running on the same machine it exposes a
//! local HTTPS API with the freshest ranked standings. The client uses
//! a self-signed certificate and HTTP basic auth with the `riot` user
//! and a per-session token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Request timeout for the local endpoint; it either answers instantly
/// or is not there.
const LCU_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum LocalSessionError {
    #[error("local client unreachable: {0}")]
    Unreachable(String),

    #[error("local client returned status {0}")]
    Status(u16),

    #[error("failed to parse local client response: {0}")]
    Parse(String),
}

/// One queue's standing as reported by the local client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRankedQueue {
    #[serde(default)]
    pub queue_type: String,

    /// Empty string when the queue is unranked this season.
    #[serde(default)]
    pub tier: String,

    #[serde(default)]
    pub division: String,

    #[serde(default)]
    pub league_points: i32,

    #[serde(default)]
    pub wins: u32,

    #[serde(default)]
    pub losses: u32,
}

/// The player logged into the local client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalSummoner {
    #[serde(default)]
    pub game_name: String,

    #[serde(default)]
    pub tag_line: String,

    /// Legacy display name; empty on clients that only report the Riot ID.
    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub puuid: String,

    #[serde(default)]
    pub summoner_level: i64,

    #[serde(default)]
    pub profile_icon_id: i32,
}

/// View of the logged-in session exposed by the desktop client.
#[async_trait]
pub trait LocalSession: Send + Sync {
    async fn current_summoner(&self) -> Result<LocalSummoner, LocalSessionError>;

    async fn current_ranked(&self) -> Result<Vec<LocalRankedQueue>, LocalSessionError>;
}

#[derive(Debug, Deserialize)]
struct CurrentRankedStats {
    #[serde(default)]
    queues: Vec<LocalRankedQueue>,
}

/// Talks to the desktop client's local HTTPS API.
pub struct LcuClient {
    client: Client,
    base_url: String,
    token: String,
}

impl LcuClient {
    /// Build a client for a known lockfile port and token.
    pub fn new(port: u16, token: &str) -> Result<Self, LocalSessionError> {
        // The LCU certificate is self-signed and scoped to loopback.
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(LCU_TIMEOUT)
            .build()
            .map_err(|e| LocalSessionError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("https://127.0.0.1:{}", port),
            token: token.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LocalSessionError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Fetching {} from local client", path);

        let response = self
            .client
            .get(&url)
            .basic_auth("riot", Some(&self.token))
            .send()
            .await
            .map_err(|e| LocalSessionError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocalSessionError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| LocalSessionError::Parse(e.to_string()))
    }
}

#[async_trait]
impl LocalSession for LcuClient {
    async fn current_summoner(&self) -> Result<LocalSummoner, LocalSessionError> {
        self.get_json("/lol-summoner/v1/current-summoner").await
    }

    async fn current_ranked(&self) -> Result<Vec<LocalRankedQueue>, LocalSessionError> {
        let stats: CurrentRankedStats =
            self.get_json("/lol-ranked/v1/current-ranked-stats").await?;
        Ok(stats.queues)
    }
}

// --- Test helpers ---

#[cfg(test)]
pub struct MockLocalSession {
    pub summoner: LocalSummoner,
    pub queues: Vec<LocalRankedQueue>,
    pub fail: bool,
}

#[cfg(test)]
impl MockLocalSession {
    pub fn with_queues(queues: Vec<LocalRankedQueue>) -> Self {
        Self {
            summoner: LocalSummoner::default(),
            queues,
            fail: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            summoner: LocalSummoner::default(),
            queues: Vec::new(),
            fail: true,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl LocalSession for MockLocalSession {
    async fn current_summoner(&self) -> Result<LocalSummoner, LocalSessionError> {
        if self.fail {
            return Err(LocalSessionError::Unreachable("mock failure".to_string()));
        }
        Ok(self.summoner.clone())
    }

    async fn current_ranked(&self) -> Result<Vec<LocalRankedQueue>, LocalSessionError> {
        if self.fail {
            return Err(LocalSessionError::Unreachable("mock failure".to_string()));
        }
        Ok(self.queues.clone())
    }
}
