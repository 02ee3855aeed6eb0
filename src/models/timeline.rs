//! Match timeline payloads and their digested form.

use serde::{Deserialize, Serialize};

/// A full timeline record from match-v5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineDto {
    #[serde(default)]
    pub metadata: TimelineMetadata,

    #[serde(default)]
    pub info: TimelineInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMetadata {
    #[serde(default)]
    pub match_id: String,

    /// Puuids in participant-id order; participant ids are one-based.
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineInfo {
    #[serde(default)]
    pub frames: Vec<TimelineFrame>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFrame {
    #[serde(default)]
    pub timestamp: i64,

    #[serde(default)]
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// Event time in milliseconds from match start.
    #[serde(default)]
    pub timestamp: i64,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub killer_id: Option<i32>,

    #[serde(default)]
    pub victim_id: Option<i32>,

    #[serde(default)]
    pub assisting_participant_ids: Vec<i32>,

    #[serde(default)]
    pub monster_type: Option<String>,

    #[serde(default)]
    pub building_type: Option<String>,
}

// --- Digested output ---

/// Per-match timeline digest for one player.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimelineDigest {
    /// Kills inside the early-game window.
    pub early_kills: u32,

    pub early_deaths: u32,

    pub early_assists: u32,

    /// Whether the player helped take an objective inside the window.
    pub first_objective_participation: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_objective: Option<FirstObjective>,

    /// The last few swing moments of the match, oldest first.
    pub turning_points: Vec<TurningPoint>,
}

/// The first early objective or structure the player helped take.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirstObjective {
    /// Monster or building type, e.g. "DRAGON" or "TOWER_BUILDING".
    pub kind: String,

    pub timestamp_ms: i64,
}

/// A moment where the player swung the game state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurningPoint {
    /// Minute mark of the event.
    pub minute: i64,

    /// Signed weight of the swing; negative for deaths.
    pub impact: i32,

    pub label: String,
}

/// Averages over the matches that had a timeline digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarlyGameSummary {
    pub tracked_matches: u32,

    pub avg_early_kills: f64,

    pub avg_early_deaths: f64,

    pub avg_early_assists: f64,

    pub first_objective_participation_rate: f64,
}
