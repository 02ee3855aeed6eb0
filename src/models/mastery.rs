//! Champion mastery records from champion-mastery-v4.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionMastery {
    #[serde(default)]
    pub champion_id: i64,

    #[serde(default)]
    pub champion_level: i32,

    #[serde(default)]
    pub champion_points: i64,

    /// Last played, in epoch milliseconds.
    #[serde(default)]
    pub last_play_time: i64,

    #[serde(default)]
    pub chest_granted: bool,

    #[serde(default)]
    pub tokens_earned: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mastery_deserializes_camel_case() {
        let json = r#"{
            "championId": 103,
            "championLevel": 7,
            "championPoints": 345678,
            "lastPlayTime": 1700000000000,
            "chestGranted": true
        }"#;
        let mastery: ChampionMastery = serde_json::from_str(json).unwrap();

        assert_eq!(mastery.champion_id, 103);
        assert_eq!(mastery.champion_level, 7);
        assert!(mastery.chest_granted);
        assert_eq!(mastery.tokens_earned, 0);
    }
}
