//! Riot account identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account record from the account-v1 endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub puuid: String,

    #[serde(default)]
    pub game_name: Option<String>,

    #[serde(default)]
    pub tag_line: Option<String>,
}

impl Account {
    /// Riot ID in `Name#Tag` form, when both halves are known.
    pub fn riot_id(&self) -> Option<String> {
        match (&self.game_name, &self.tag_line) {
            (Some(game_name), Some(tag_line)) => Some(format!("{}#{}", game_name, tag_line)),
            _ => None,
        }
    }
}

/// A player handle in `Name#Tag` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiotId {
    pub game_name: String,
    pub tag_line: String,
}

impl RiotId {
    /// Parse `Name#Tag`, rejecting empty halves.
    pub fn parse(input: &str) -> Option<Self> {
        let (game_name, tag_line) = input.split_once('#')?;
        let game_name = game_name.trim();
        let tag_line = tag_line.trim();

        if game_name.is_empty() || tag_line.is_empty() {
            return None;
        }

        Some(Self {
            game_name: game_name.to_string(),
            tag_line: tag_line.to_string(),
        })
    }
}

impl fmt::Display for RiotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_riot_id_parse() {
        let id = RiotId::parse("Faker#KR1").unwrap();

        assert_eq!(id.game_name, "Faker");
        assert_eq!(id.tag_line, "KR1");
        assert_eq!(id.to_string(), "Faker#KR1");
    }

    #[test]
    fn test_riot_id_parse_trims_whitespace() {
        let id = RiotId::parse(" Hide on bush # KR1 ").unwrap();

        assert_eq!(id.game_name, "Hide on bush");
        assert_eq!(id.tag_line, "KR1");
    }

    #[test]
    fn test_riot_id_parse_rejects_bad_input() {
        assert!(RiotId::parse("NoTag").is_none());
        assert!(RiotId::parse("#EUW").is_none());
        assert!(RiotId::parse("Name#").is_none());
        assert!(RiotId::parse("").is_none());
    }

    #[test]
    fn test_account_deserializes_camel_case() {
        let json = r#"{"puuid": "abc-123", "gameName": "Faker", "tagLine": "KR1"}"#;
        let account: Account = serde_json::from_str(json).unwrap();

        assert_eq!(account.puuid, "abc-123");
        assert_eq!(account.riot_id(), Some("Faker#KR1".to_string()));
    }

    #[test]
    fn test_account_tolerates_missing_names() {
        let json = r#"{"puuid": "abc-123"}"#;
        let account: Account = serde_json::from_str(json).unwrap();

        assert_eq!(account.game_name, None);
        assert_eq!(account.riot_id(), None);
    }
}
