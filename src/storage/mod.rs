//! Local persistence for analyzed players.
//!
//! Every successful analysis leaves a trail on disk: the player's
//! identity, each ranked snapshot as it was resolved, and a flat record
//! per analyzed match. Storage is JSONL; one line per record, append
//! only, with the newest identity row winning on reload.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod jsonl;

pub use jsonl::JsonlStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A player identity row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredPlayer {
    pub puuid: String,

    pub game_name: String,

    pub tag_line: String,

    pub region: String,

    pub platform: String,

    pub summoner_level: Option<i64>,

    pub profile_icon_id: Option<i32>,

    /// First time this player was analyzed; preserved across upserts.
    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// One resolved ranked standing at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRankedStats {
    pub puuid: String,

    pub queue_type: String,

    pub tier: String,

    pub rank: String,

    pub lp: Option<i32>,

    pub wins: u32,

    pub losses: u32,

    pub winrate: f64,

    pub veteran: bool,

    pub hot_streak: bool,

    /// Which resolver source produced this row.
    pub data_source: String,

    pub updated_at: DateTime<Utc>,
}

/// A flat per-match record for one player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredMatch {
    pub puuid: String,

    pub match_id: String,

    pub game_mode: String,

    pub game_duration: i64,

    pub game_creation: Option<DateTime<Utc>>,

    pub champion_name: String,

    pub kills: u32,

    pub deaths: u32,

    pub assists: u32,

    pub win: bool,

    pub total_damage: u32,

    pub gold_earned: u32,

    pub cs: u32,

    pub vision_score: u32,
}

/// Persistence surface used by the analysis pipeline.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Insert or refresh a player row, keyed by puuid.
    async fn upsert_player(&self, player: StoredPlayer) -> Result<(), StorageError>;

    /// Record a batch of ranked snapshots.
    async fn record_ranked(&self, rows: Vec<StoredRankedStats>) -> Result<(), StorageError>;

    /// Append match records the store has not seen before for this
    /// player. Returns how many were actually written.
    async fn append_matches(
        &self,
        puuid: &str,
        rows: Vec<StoredMatch>,
    ) -> Result<usize, StorageError>;
}

// --- Test helpers ---

#[cfg(test)]
#[derive(Default)]
pub struct MockStore {
    pub players: std::sync::Mutex<Vec<StoredPlayer>>,
    pub ranked: std::sync::Mutex<Vec<StoredRankedStats>>,
    pub matches: std::sync::Mutex<Vec<StoredMatch>>,
    pub fail: bool,
}

#[cfg(test)]
impl MockStore {
    fn failure() -> StorageError {
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "mock failure",
        ))
    }
}

#[cfg(test)]
#[async_trait]
impl PlayerStore for MockStore {
    async fn upsert_player(&self, player: StoredPlayer) -> Result<(), StorageError> {
        if self.fail {
            return Err(Self::failure());
        }
        self.players.lock().unwrap().push(player);
        Ok(())
    }

    async fn record_ranked(&self, rows: Vec<StoredRankedStats>) -> Result<(), StorageError> {
        if self.fail {
            return Err(Self::failure());
        }
        self.ranked.lock().unwrap().extend(rows);
        Ok(())
    }

    async fn append_matches(
        &self,
        puuid: &str,
        rows: Vec<StoredMatch>,
    ) -> Result<usize, StorageError> {
        if self.fail {
            return Err(Self::failure());
        }
        let mut matches = self.matches.lock().unwrap();
        let fresh: Vec<StoredMatch> = rows
            .into_iter()
            .filter(|row| {
                !matches
                    .iter()
                    .any(|m| m.puuid == puuid && m.match_id == row.match_id)
            })
            .collect();
        let count = fresh.len();
        matches.extend(fresh);
        Ok(count)
    }
}
