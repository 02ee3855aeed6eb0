//! Derived analytics output: match cards, aggregates, and coaching signals.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EarlyGameSummary, RankedOverview, TimelineDigest};

/// Normalized role labels derived from assigned positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Top,
    Jungle,
    Mid,
    #[serde(rename = "ADC")]
    Adc,
    Support,
    #[default]
    Unknown,
}

impl Role {
    /// Map an upstream position label to a role. Any unrecognized label
    /// (including "NONE" and the empty string) becomes `Unknown`.
    pub fn from_position(position: &str) -> Role {
        match position {
            "TOP" => Role::Top,
            "JUNGLE" => Role::Jungle,
            "MIDDLE" => Role::Mid,
            "BOTTOM" => Role::Adc,
            "UTILITY" => Role::Support,
            _ => Role::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Top => "Top",
            Role::Jungle => "Jungle",
            Role::Mid => "Mid",
            Role::Adc => "ADC",
            Role::Support => "Support",
            Role::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rune page ids pulled from a participant's perks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuneSummary {
    pub primary_style_id: Option<i32>,

    pub sub_style_id: Option<i32>,

    pub keystone_id: Option<i32>,

    pub perk_ids: Vec<i32>,
}

/// A resolved game-data asset (champion, item, spell, or rune).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetDetail {
    pub name: String,

    pub icon: String,
}

/// Rune ids resolved to names and icons.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuneDetails {
    pub primary_style: Option<AssetDetail>,

    pub sub_style: Option<AssetDetail>,

    pub keystone: Option<AssetDetail>,

    pub perks: Vec<AssetDetail>,
}

/// One match from the subject player's point of view.
///
/// Share and per-minute figures are pre-rounded for presentation; the
/// asset and timeline fields stay `None` unless enrichment ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCard {
    pub match_id: String,

    pub queue_id: i32,

    pub game_duration: i64,

    pub game_creation: i64,

    pub champion: String,

    pub role: Role,

    pub team_position: String,

    pub kills: u32,

    pub deaths: u32,

    pub assists: u32,

    pub kda: f64,

    pub cs: u32,

    pub lane_cs: u32,

    pub neutral_cs: u32,

    pub cs_per_min: f64,

    pub vision_score: u32,

    pub vision_per_min: f64,

    pub gold: u32,

    pub gold_per_min: f64,

    pub damage: u32,

    pub damage_taken: u32,

    pub damage_per_min: f64,

    pub win: bool,

    pub kill_participation: f64,

    pub damage_share: f64,

    pub gold_share: f64,

    pub team_kills: u32,

    pub team_damage: u32,

    pub team_gold: u32,

    pub dragon_takedowns: u32,

    pub baron_takedowns: u32,

    pub herald_takedowns: u32,

    pub turret_takedowns: u32,

    pub inhibitor_takedowns: u32,

    pub wards_placed: u32,

    pub wards_killed: u32,

    pub control_wards_placed: u32,

    pub items: Vec<i32>,

    pub spells: Vec<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runes: Option<RuneSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub champion_detail: Option<AssetDetail>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_detail: Option<Vec<AssetDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spells_detail: Option<Vec<AssetDetail>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub runes_detail: Option<RuneDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineDigest>,
}

/// Win/loss totals over the analyzed batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryTotals {
    pub total_games: u32,

    pub wins: u32,

    pub losses: u32,

    pub winrate: f64,
}

/// Arithmetic means of per-match metrics, zeroed when no matches parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceAverages {
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub avg_kda: f64,
    pub avg_cs: f64,
    pub avg_vision_score: f64,
    pub avg_gold: f64,
    pub avg_damage: f64,
    pub avg_cs_per_min: f64,
    pub avg_vision_per_min: f64,
    pub avg_gold_per_min: f64,
    pub avg_damage_per_min: f64,
    pub avg_kill_participation: f64,
    pub avg_damage_share: f64,
    pub avg_dragon_takedowns: f64,
    pub avg_baron_takedowns: f64,
    pub avg_herald_takedowns: f64,
    pub avg_turret_takedowns: f64,
    pub avg_inhibitor_takedowns: f64,
}

/// Games played in one role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleShare {
    pub role: Role,

    pub games: u32,

    /// Share of total games, rounded to one decimal.
    pub percentage: f64,
}

/// Role histogram ordered by games descending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoleBreakdown {
    pub main_role: Role,

    pub breakdown: Vec<RoleShare>,
}

/// Win/loss record on one champion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChampionRecord {
    pub champion: String,

    pub games: u32,

    pub wins: u32,

    pub losses: u32,

    pub winrate: f64,
}

/// Aggregate player summary over a batch of matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub summary: SummaryTotals,

    pub performance: PerformanceAverages,

    pub roles: RoleBreakdown,

    /// Champion pool limited to the five most-played.
    pub champions: Vec<ChampionRecord>,
}

/// Capability scores in [0, 100].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DnaScores {
    pub economy: u8,

    pub vision: u8,

    pub teamplay: u8,

    pub damage: u8,

    pub survivability: u8,
}

/// Playstyle profile derived from the aggregate summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDna {
    pub primary: String,

    /// At most three qualifying tags.
    pub tags: Vec<String>,

    pub scores: DnaScores,
}

/// One improvement focus with the measurement that triggered it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearningFocus {
    pub title: String,

    pub reason: String,

    pub action: String,
}

/// Ordered improvement plan, capped at three focuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPath {
    pub main_role: Role,

    pub focuses: Vec<LearningFocus>,
}

/// Who the report is about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub game_name: String,

    pub tag_line: String,

    pub puuid: String,

    pub level: i64,

    pub profile_icon_id: Option<i32>,
}

/// The full coaching report for one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingReport {
    pub player: PlayerIdentity,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranked: Option<RankedOverview>,

    #[serde(flatten)]
    pub analysis: PlayerSummary,

    pub recent_matches: Vec<MatchCard>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub early_game: Option<EarlyGameSummary>,

    pub dna: PlayerDna,

    pub learning_path: LearningPath,

    /// How many match ids the listing returned.
    pub fetched_match_ids: usize,

    /// How many match details were fetched and contained the player.
    pub analyzed_matches: usize,

    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_position_covers_all_labels() {
        assert_eq!(Role::from_position("TOP"), Role::Top);
        assert_eq!(Role::from_position("JUNGLE"), Role::Jungle);
        assert_eq!(Role::from_position("MIDDLE"), Role::Mid);
        assert_eq!(Role::from_position("BOTTOM"), Role::Adc);
        assert_eq!(Role::from_position("UTILITY"), Role::Support);
        assert_eq!(Role::from_position("NONE"), Role::Unknown);
        assert_eq!(Role::from_position(""), Role::Unknown);
        assert_eq!(Role::from_position("Invalid"), Role::Unknown);
    }

    #[test]
    fn test_role_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Role::Adc).unwrap(), "\"ADC\"");
        assert_eq!(serde_json::to_string(&Role::Mid).unwrap(), "\"Mid\"");
        assert_eq!(Role::Support.to_string(), "Support");
    }

    #[test]
    fn test_player_summary_default_is_empty() {
        let summary = PlayerSummary::default();

        assert_eq!(summary.summary.total_games, 0);
        assert_eq!(summary.summary.winrate, 0.0);
        assert_eq!(summary.roles.main_role, Role::Unknown);
        assert!(summary.champions.is_empty());
    }
}
