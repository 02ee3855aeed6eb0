//! Raw match payloads from match-v5.
//!
//! Only the fields the analytics engine reads are modeled; everything is
//! defaulted so a partially populated payload (remakes, old patches) still
//! deserializes.

use serde::{Deserialize, Serialize};

/// A full match record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDto {
    #[serde(default)]
    pub metadata: MatchMetadata,

    #[serde(default)]
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    #[serde(default)]
    pub match_id: String,

    /// Puuids of all participants, in participant-id order.
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Match start, in epoch milliseconds.
    #[serde(default)]
    pub game_creation: i64,

    /// Match length in seconds.
    #[serde(default)]
    pub game_duration: i64,

    #[serde(default)]
    pub game_mode: String,

    #[serde(default)]
    pub queue_id: i32,

    #[serde(default)]
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    #[serde(default)]
    pub puuid: String,

    #[serde(default)]
    pub team_id: i32,

    #[serde(default)]
    pub win: bool,

    #[serde(default)]
    pub champion_name: String,

    /// Assigned position label, e.g. "TOP" or "UTILITY". Empty or "NONE"
    /// for modes without positions.
    #[serde(default)]
    pub team_position: String,

    #[serde(default)]
    pub kills: u32,

    #[serde(default)]
    pub deaths: u32,

    #[serde(default)]
    pub assists: u32,

    #[serde(default)]
    pub total_minions_killed: u32,

    #[serde(default)]
    pub neutral_minions_killed: u32,

    #[serde(default)]
    pub vision_score: u32,

    #[serde(default)]
    pub gold_earned: u32,

    #[serde(default)]
    pub total_damage_dealt_to_champions: u32,

    #[serde(default)]
    pub total_damage_taken: u32,

    #[serde(default)]
    pub wards_placed: u32,

    #[serde(default)]
    pub wards_killed: u32,

    #[serde(default)]
    pub detector_wards_placed: u32,

    #[serde(default)]
    pub item0: i32,
    #[serde(default)]
    pub item1: i32,
    #[serde(default)]
    pub item2: i32,
    #[serde(default)]
    pub item3: i32,
    #[serde(default)]
    pub item4: i32,
    #[serde(default)]
    pub item5: i32,
    #[serde(default)]
    pub item6: i32,

    #[serde(default)]
    pub summoner1_id: i32,

    #[serde(default)]
    pub summoner2_id: i32,

    #[serde(default)]
    pub challenges: Challenges,

    #[serde(default)]
    pub perks: Option<Perks>,
}

impl ParticipantDto {
    /// Lane plus jungle creeps.
    pub fn total_cs(&self) -> u32 {
        self.total_minions_killed + self.neutral_minions_killed
    }

    pub fn items(&self) -> [i32; 7] {
        [
            self.item0, self.item1, self.item2, self.item3, self.item4, self.item5, self.item6,
        ]
    }
}

/// Objective takedown counters from the challenges blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenges {
    #[serde(default)]
    pub dragon_takedowns: u32,

    #[serde(default)]
    pub baron_takedowns: u32,

    #[serde(default)]
    pub rift_herald_takedowns: u32,

    #[serde(default)]
    pub turret_takedowns: u32,

    #[serde(default)]
    pub inhibitor_takedowns: u32,
}

/// Rune page selections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perks {
    #[serde(default)]
    pub styles: Vec<PerkStyle>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkStyle {
    /// "primaryStyle" or "subStyle".
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub style: i32,

    #[serde(default)]
    pub selections: Vec<PerkSelection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerkSelection {
    #[serde(default)]
    pub perk: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_deserializes_camel_case() {
        let json = r#"{
            "puuid": "p1",
            "teamId": 100,
            "win": true,
            "championName": "Ahri",
            "teamPosition": "MIDDLE",
            "kills": 7,
            "deaths": 2,
            "assists": 9,
            "totalMinionsKilled": 180,
            "neutralMinionsKilled": 12,
            "visionScore": 24,
            "goldEarned": 12500,
            "totalDamageDealtToChampions": 21000,
            "challenges": {"dragonTakedowns": 2, "turretTakedowns": 3}
        }"#;
        let participant: ParticipantDto = serde_json::from_str(json).unwrap();

        assert_eq!(participant.champion_name, "Ahri");
        assert_eq!(participant.total_cs(), 192);
        assert_eq!(participant.challenges.dragon_takedowns, 2);
        assert_eq!(participant.challenges.baron_takedowns, 0);
    }

    #[test]
    fn test_match_tolerates_missing_challenges() {
        let json = r#"{
            "metadata": {"matchId": "EUW1_1", "participants": ["p1"]},
            "info": {"gameDuration": 1800, "participants": [{"puuid": "p1"}]}
        }"#;
        let m: MatchDto = serde_json::from_str(json).unwrap();

        assert_eq!(m.metadata.match_id, "EUW1_1");
        assert_eq!(m.info.participants[0].challenges.dragon_takedowns, 0);
        assert_eq!(m.info.participants[0].items(), [0; 7]);
    }
}
