//! Summoner profile record.

use serde::{Deserialize, Serialize};

/// Summoner as returned by summoner-v4.
///
/// The encrypted `id` is absent on some shards for newer accounts, so
/// everything except the puuid is optional or defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summoner {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub account_id: Option<String>,

    pub puuid: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub profile_icon_id: Option<i32>,

    #[serde(default)]
    pub summoner_level: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summoner_deserializes_full_payload() {
        let json = r#"{
            "id": "enc-id",
            "accountId": "enc-account",
            "puuid": "puuid-1",
            "name": "Faker",
            "profileIconId": 4568,
            "summonerLevel": 742
        }"#;
        let summoner: Summoner = serde_json::from_str(json).unwrap();

        assert_eq!(summoner.id.as_deref(), Some("enc-id"));
        assert_eq!(summoner.profile_icon_id, Some(4568));
        assert_eq!(summoner.summoner_level, 742);
    }

    #[test]
    fn test_summoner_tolerates_missing_id() {
        let json = r#"{"puuid": "puuid-1", "summonerLevel": 30}"#;
        let summoner: Summoner = serde_json::from_str(json).unwrap();

        assert_eq!(summoner.id, None);
        assert_eq!(summoner.summoner_level, 30);
    }
}
