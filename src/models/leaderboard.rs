//! Assembled ladder output.

use serde::{Deserialize, Serialize};

/// One ladder row, enriched where the lookups succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardPlayer {
    pub summoner_name: String,

    /// `Name#Tag`, when the account lookup succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub riot_id: Option<String>,

    pub league_points: i32,

    pub wins: u32,

    pub losses: u32,

    pub winrate: f64,

    pub hot_streak: bool,

    pub veteran: bool,

    pub rank: Option<String>,

    /// Tier the row was sourced from, e.g. "CHALLENGER".
    pub tier: String,

    pub profile_icon_id: Option<i32>,

    pub puuid: Option<String>,
}

/// The merged, enriched ladder for one platform and queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub platform: String,

    pub queue: String,

    pub tier: String,

    pub name: String,

    pub players: Vec<LeaderboardPlayer>,

    /// Profile lookups that failed; rows are kept with gaps instead.
    pub summoner_errors: u32,

    pub account_errors: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_omits_missing_riot_id() {
        let player = LeaderboardPlayer {
            summoner_name: "Unknown".to_string(),
            riot_id: None,
            league_points: 1200,
            wins: 100,
            losses: 80,
            winrate: 55.6,
            hot_streak: false,
            veteran: true,
            rank: Some("I".to_string()),
            tier: "CHALLENGER".to_string(),
            profile_icon_id: None,
            puuid: Some("p1".to_string()),
        };
        let json = serde_json::to_string(&player).unwrap();

        assert!(!json.contains("riot_id"));
        assert!(json.contains("\"tier\":\"CHALLENGER\""));
    }
}
