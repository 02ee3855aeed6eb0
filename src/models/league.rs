//! Ranked league records from league-v4.

use serde::{Deserialize, Serialize};

/// Promotion series progress attached to an entry mid-series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniSeries {
    #[serde(default)]
    pub target: u32,

    #[serde(default)]
    pub wins: u32,

    #[serde(default)]
    pub losses: u32,

    #[serde(default)]
    pub progress: String,
}

/// A single queue standing for a player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntry {
    #[serde(default)]
    pub league_id: Option<String>,

    #[serde(default)]
    pub summoner_id: Option<String>,

    #[serde(default)]
    pub summoner_name: Option<String>,

    #[serde(default)]
    pub puuid: Option<String>,

    #[serde(default)]
    pub queue_type: Option<String>,

    #[serde(default)]
    pub tier: Option<String>,

    #[serde(default)]
    pub rank: Option<String>,

    #[serde(default)]
    pub league_points: i32,

    #[serde(default)]
    pub wins: u32,

    #[serde(default)]
    pub losses: u32,

    #[serde(default)]
    pub veteran: bool,

    #[serde(default)]
    pub hot_streak: bool,

    #[serde(default)]
    pub mini_series: Option<MiniSeries>,
}

/// A full apex league listing (challenger, grandmaster, or master).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueList {
    #[serde(default)]
    pub tier: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub queue: Option<String>,

    #[serde(default)]
    pub entries: Vec<LeagueEntry>,
}

/// The three ladder tiers above Diamond, in descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApexTier {
    Challenger,
    Grandmaster,
    Master,
}

impl ApexTier {
    /// Scan order from highest tier down.
    pub const ALL: [ApexTier; 3] = [ApexTier::Challenger, ApexTier::Grandmaster, ApexTier::Master];

    /// Path segment used by the league-v4 endpoint for this tier.
    pub fn league_path(&self) -> &'static str {
        match self {
            ApexTier::Challenger => "challengerleagues",
            ApexTier::Grandmaster => "grandmasterleagues",
            ApexTier::Master => "masterleagues",
        }
    }

    /// Upstream tier label, e.g. "CHALLENGER".
    pub fn as_str(&self) -> &'static str {
        match self {
            ApexTier::Challenger => "CHALLENGER",
            ApexTier::Grandmaster => "GRANDMASTER",
            ApexTier::Master => "MASTER",
        }
    }
}

// --- Resolved standings ---

/// Where a resolved ranked standing came from.
///
/// Serialized with the human-facing label so reports read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankedSource {
    #[serde(rename = "LCU (Live Client)")]
    LocalClient,

    #[serde(rename = "Riot API (Apex Leaderboard)")]
    ApexLeaderboard,

    #[serde(rename = "Riot API (League Entries)")]
    LeagueEntries,

    #[serde(rename = "Match History (Fallback)")]
    MatchHistory,
}

impl RankedSource {
    pub fn label(&self) -> &'static str {
        match self {
            RankedSource::LocalClient => "LCU (Live Client)",
            RankedSource::ApexLeaderboard => "Riot API (Apex Leaderboard)",
            RankedSource::LeagueEntries => "Riot API (League Entries)",
            RankedSource::MatchHistory => "Match History (Fallback)",
        }
    }
}

/// One queue's standing after resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSnapshot {
    /// Tier label, or "UNKNOWN" when derived from match history alone.
    pub tier: String,

    pub rank: String,

    /// League points; absent when the source cannot know them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lp: Option<i32>,

    pub wins: u32,

    pub losses: u32,

    pub total_games: u32,

    /// Percentage rounded to one decimal; 0.0 with no games.
    pub winrate: f64,

    pub veteran: bool,

    pub hot_streak: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<MiniSeries>,
}

/// Both ranked queues plus which resolver rung supplied them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedOverview {
    pub solo: Option<RankedSnapshot>,

    pub flex: Option<RankedSnapshot>,

    pub data_source: RankedSource,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_entry_deserializes_camel_case() {
        let json = r#"{
            "queueType": "RANKED_SOLO_5x5",
            "tier": "GOLD",
            "rank": "II",
            "leaguePoints": 54,
            "wins": 40,
            "losses": 20,
            "hotStreak": true
        }"#;
        let entry: LeagueEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.queue_type.as_deref(), Some("RANKED_SOLO_5x5"));
        assert_eq!(entry.tier.as_deref(), Some("GOLD"));
        assert_eq!(entry.league_points, 54);
        assert!(entry.hot_streak);
        assert!(!entry.veteran);
    }

    #[test]
    fn test_league_list_defaults_to_empty_entries() {
        let json = r#"{"tier": "CHALLENGER", "name": "Faker's Fists"}"#;
        let list: LeagueList = serde_json::from_str(json).unwrap();

        assert!(list.entries.is_empty());
        assert_eq!(list.tier.as_deref(), Some("CHALLENGER"));
    }

    #[test]
    fn test_apex_tier_paths() {
        assert_eq!(ApexTier::Challenger.league_path(), "challengerleagues");
        assert_eq!(ApexTier::Grandmaster.league_path(), "grandmasterleagues");
        assert_eq!(ApexTier::Master.league_path(), "masterleagues");
        assert_eq!(ApexTier::Master.as_str(), "MASTER");
    }

    #[test]
    fn test_ranked_source_serializes_as_label() {
        let json = serde_json::to_string(&RankedSource::ApexLeaderboard).unwrap();

        assert_eq!(json, "\"Riot API (Apex Leaderboard)\"");
        assert_eq!(
            RankedSource::MatchHistory.label(),
            "Match History (Fallback)"
        );
    }

    #[test]
    fn test_snapshot_omits_absent_lp() {
        let snapshot = RankedSnapshot {
            tier: "UNKNOWN".to_string(),
            rank: "UNKNOWN".to_string(),
            lp: None,
            wins: 3,
            losses: 1,
            total_games: 4,
            winrate: 75.0,
            veteran: false,
            hot_streak: false,
            series: None,
        };
        let json = serde_json::to_string(&snapshot).unwrap();

        assert!(!json.contains("\"lp\""));
        assert!(!json.contains("\"series\""));
        assert!(json.contains("\"winrate\":75.0"));
    }
}
