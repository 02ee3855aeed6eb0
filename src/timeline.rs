//! Match timeline digests.
//!
//! Condenses the per-frame event stream into the handful of facts the
//! coaching report cares about: early-lane activity, the first
//! objective the player helped take, and the swingiest moments.

use crate::models::{
    EarlyGameSummary, FirstObjective, MatchCard, TimelineDigest, TimelineDto, TurningPoint,
};

/// Events at or before this timestamp count as early game.
const EARLY_WINDOW_MS: i64 = 600_000;

/// How many turning points the digest keeps.
const MAX_TURNING_POINTS: usize = 5;

/// Digest a raw timeline from one player's point of view.
///
/// Returns `None` when the player is not listed in the timeline
/// metadata. Participant ids in events are 1-based positions into that
/// list.
pub fn summarize_timeline(timeline: &TimelineDto, puuid: &str) -> Option<TimelineDigest> {
    let index = timeline
        .metadata
        .participants
        .iter()
        .position(|p| p == puuid)
        .map(|pos| pos as i32 + 1)?;

    let mut digest = TimelineDigest::default();
    let mut turning_points = Vec::new();

    for frame in &timeline.info.frames {
        for event in &frame.events {
            match event.kind.as_str() {
                "CHAMPION_KILL" => {
                    if event.killer_id == Some(index) {
                        if event.timestamp <= EARLY_WINDOW_MS {
                            digest.early_kills += 1;
                        }
                        turning_points.push(turning_point(event.timestamp, 2, "Champion kill"));
                    } else if event.victim_id == Some(index) {
                        if event.timestamp <= EARLY_WINDOW_MS {
                            digest.early_deaths += 1;
                        }
                        turning_points.push(turning_point(event.timestamp, -2, "Death"));
                    } else if event.assisting_participant_ids.contains(&index) {
                        if event.timestamp <= EARLY_WINDOW_MS {
                            digest.early_assists += 1;
                        }
                        turning_points.push(turning_point(event.timestamp, 1, "Kill assist"));
                    }
                }
                "ELITE_MONSTER_KILL" | "BUILDING_KILL" => {
                    let participated = event.killer_id == Some(index)
                        || event.assisting_participant_ids.contains(&index);

                    if participated
                        && event.timestamp <= EARLY_WINDOW_MS
                        && digest.first_objective.is_none()
                    {
                        let kind = event
                            .monster_type
                            .clone()
                            .or_else(|| event.building_type.clone())
                            .unwrap_or_else(|| event.kind.clone());
                        digest.first_objective_participation = true;
                        digest.first_objective = Some(FirstObjective {
                            kind,
                            timestamp_ms: event.timestamp,
                        });
                    }

                    if participated {
                        if let Some(monster) = &event.monster_type {
                            turning_points.push(turning_point(
                                event.timestamp,
                                2,
                                &format!("{} takedown", monster),
                            ));
                        } else if let Some(building) = &event.building_type {
                            turning_points.push(turning_point(
                                event.timestamp,
                                1,
                                &format!("{} destroyed", building),
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    // Keep the last few swings, in order.
    if turning_points.len() > MAX_TURNING_POINTS {
        turning_points.drain(..turning_points.len() - MAX_TURNING_POINTS);
    }
    digest.turning_points = turning_points;

    Some(digest)
}

fn turning_point(timestamp_ms: i64, impact: i32, label: &str) -> TurningPoint {
    TurningPoint {
        minute: timestamp_ms / 60_000,
        impact,
        label: label.to_string(),
    }
}

/// Average the early-game digests across a batch of cards.
///
/// Cards without an attached digest are excluded; with nothing tracked
/// the summary is `None`.
pub fn summarize_early_game(cards: &[MatchCard]) -> Option<EarlyGameSummary> {
    let digests: Vec<&TimelineDigest> = cards
        .iter()
        .filter_map(|card| card.timeline.as_ref())
        .collect();
    if digests.is_empty() {
        return None;
    }

    let n = digests.len() as f64;
    let kills: u32 = digests.iter().map(|d| d.early_kills).sum();
    let deaths: u32 = digests.iter().map(|d| d.early_deaths).sum();
    let assists: u32 = digests.iter().map(|d| d.early_assists).sum();
    let objectives = digests
        .iter()
        .filter(|d| d.first_objective_participation)
        .count();

    Some(EarlyGameSummary {
        tracked_matches: digests.len() as u32,
        avg_early_kills: crate::analytics::round_to(kills as f64 / n, 2),
        avg_early_deaths: crate::analytics::round_to(deaths as f64 / n, 2),
        avg_early_assists: crate::analytics::round_to(assists as f64 / n, 2),
        first_objective_participation_rate: crate::analytics::round_to(objectives as f64 / n, 3),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{
        MatchDto, MatchInfo, MatchMetadata, ParticipantDto, TimelineEvent, TimelineFrame,
        TimelineInfo, TimelineMetadata,
    };

    fn sample_card(match_id: &str) -> MatchCard {
        let participant = ParticipantDto {
            puuid: "me".to_string(),
            ..Default::default()
        };
        let m = MatchDto {
            metadata: MatchMetadata {
                match_id: match_id.to_string(),
                participants: vec!["me".to_string()],
            },
            info: MatchInfo {
                game_creation: 0,
                game_duration: 1800,
                game_mode: "CLASSIC".to_string(),
                queue_id: 420,
                participants: vec![participant],
            },
        };
        crate::analytics::build_match_card(&m, "me").unwrap()
    }

    fn kill_event(timestamp: i64, killer: i32, victim: i32, assists: Vec<i32>) -> TimelineEvent {
        TimelineEvent {
            kind: "CHAMPION_KILL".to_string(),
            timestamp,
            killer_id: Some(killer),
            victim_id: Some(victim),
            assisting_participant_ids: assists,
            ..Default::default()
        }
    }

    fn timeline_with(participants: Vec<&str>, events: Vec<TimelineEvent>) -> TimelineDto {
        TimelineDto {
            metadata: TimelineMetadata {
                match_id: "EUW1_1".to_string(),
                participants: participants.into_iter().map(String::from).collect(),
            },
            info: TimelineInfo {
                frames: vec![TimelineFrame {
                    timestamp: 0,
                    events,
                }],
            },
        }
    }

    #[test]
    fn test_early_kill_is_counted() {
        let timeline = timeline_with(
            vec!["me", "other"],
            vec![kill_event(120_000, 1, 2, vec![])],
        );

        let digest = summarize_timeline(&timeline, "me").unwrap();

        assert_eq!(digest.early_kills, 1);
        assert_eq!(digest.early_deaths, 0);
        assert!(!digest.first_objective_participation);
        assert_eq!(digest.turning_points.len(), 1);
        assert_eq!(digest.turning_points[0].minute, 2);
        assert_eq!(digest.turning_points[0].impact, 2);
        assert_eq!(digest.turning_points[0].label, "Champion kill");
    }

    #[test]
    fn test_absent_player_yields_none() {
        let timeline = timeline_with(vec!["a", "b"], vec![kill_event(1000, 1, 2, vec![])]);

        assert!(summarize_timeline(&timeline, "me").is_none());
    }

    #[test]
    fn test_early_window_boundary() {
        let timeline = timeline_with(
            vec!["me", "other"],
            vec![
                kill_event(600_000, 1, 2, vec![]),
                kill_event(600_001, 1, 2, vec![]),
            ],
        );

        let digest = summarize_timeline(&timeline, "me").unwrap();

        // Only the event at the boundary counts as early; both still
        // register as turning points.
        assert_eq!(digest.early_kills, 1);
        assert_eq!(digest.turning_points.len(), 2);
    }

    #[test]
    fn test_death_and_assist_attribution() {
        let timeline = timeline_with(
            vec!["me", "killer", "victim"],
            vec![
                kill_event(100_000, 2, 1, vec![]),
                kill_event(200_000, 2, 3, vec![1]),
            ],
        );

        let digest = summarize_timeline(&timeline, "me").unwrap();

        assert_eq!(digest.early_deaths, 1);
        assert_eq!(digest.early_assists, 1);
        assert_eq!(digest.turning_points[0].impact, -2);
        assert_eq!(digest.turning_points[1].impact, 1);
    }

    #[test]
    fn test_first_objective_with_assist_participation() {
        let objective = TimelineEvent {
            kind: "ELITE_MONSTER_KILL".to_string(),
            timestamp: 480_000,
            killer_id: Some(2),
            assisting_participant_ids: vec![1],
            monster_type: Some("DRAGON".to_string()),
            ..Default::default()
        };
        let later = TimelineEvent {
            kind: "BUILDING_KILL".to_string(),
            timestamp: 900_000,
            killer_id: Some(1),
            building_type: Some("TOWER_BUILDING".to_string()),
            ..Default::default()
        };
        let timeline = timeline_with(vec!["me", "ally"], vec![objective, later]);

        let digest = summarize_timeline(&timeline, "me").unwrap();
        let first = digest.first_objective.unwrap();

        assert!(digest.first_objective_participation);
        assert_eq!(first.kind, "DRAGON");
        assert_eq!(first.timestamp_ms, 480_000);
        assert_eq!(digest.turning_points.len(), 2);
        assert_eq!(digest.turning_points[0].label, "DRAGON takedown");
        assert_eq!(digest.turning_points[1].label, "TOWER_BUILDING destroyed");
    }

    #[test]
    fn test_enemy_objective_is_not_recorded() {
        let objective = TimelineEvent {
            kind: "ELITE_MONSTER_KILL".to_string(),
            timestamp: 500_000,
            killer_id: Some(2),
            monster_type: Some("RIFTHERALD".to_string()),
            ..Default::default()
        };
        let timeline = timeline_with(vec!["me", "enemy"], vec![objective]);

        let digest = summarize_timeline(&timeline, "me").unwrap();

        assert!(!digest.first_objective_participation);
        assert!(digest.first_objective.is_none());
        assert!(digest.turning_points.is_empty());
    }

    #[test]
    fn test_late_objective_is_only_a_turning_point() {
        let objective = TimelineEvent {
            kind: "ELITE_MONSTER_KILL".to_string(),
            timestamp: 1_500_000,
            killer_id: Some(1),
            monster_type: Some("BARON_NASHOR".to_string()),
            ..Default::default()
        };
        let timeline = timeline_with(vec!["me", "other"], vec![objective]);

        let digest = summarize_timeline(&timeline, "me").unwrap();

        assert!(!digest.first_objective_participation);
        assert!(digest.first_objective.is_none());
        assert_eq!(digest.turning_points.len(), 1);
        assert_eq!(digest.turning_points[0].label, "BARON_NASHOR takedown");
        assert_eq!(digest.turning_points[0].minute, 25);
    }

    #[test]
    fn test_turning_points_keep_last_five() {
        let events: Vec<TimelineEvent> = (0..8)
            .map(|i| kill_event(i * 60_000, 1, 2, vec![]))
            .collect();
        let timeline = timeline_with(vec!["me", "other"], events);

        let digest = summarize_timeline(&timeline, "me").unwrap();

        assert_eq!(digest.turning_points.len(), 5);
        assert_eq!(digest.turning_points[0].minute, 3);
        assert_eq!(digest.turning_points[4].minute, 7);
    }

    #[test]
    fn test_early_game_summary_averages() {
        let mut with_digest = sample_card("M1");
        with_digest.timeline = Some(TimelineDigest {
            early_kills: 2,
            early_deaths: 1,
            early_assists: 3,
            first_objective_participation: true,
            first_objective: Some(FirstObjective {
                kind: "DRAGON".to_string(),
                timestamp_ms: 480_000,
            }),
            turning_points: Vec::new(),
        });
        let mut second = sample_card("M2");
        second.timeline = Some(TimelineDigest::default());
        let without = sample_card("M3");

        let summary = summarize_early_game(&[with_digest, second, without]).unwrap();

        assert_eq!(summary.tracked_matches, 2);
        assert_eq!(summary.avg_early_kills, 1.0);
        assert_eq!(summary.avg_early_deaths, 0.5);
        assert_eq!(summary.avg_early_assists, 1.5);
        assert_eq!(summary.first_objective_participation_rate, 0.5);
    }

    #[test]
    fn test_early_game_summary_requires_digests() {
        let card = sample_card("M1");

        assert!(summarize_early_game(&[card]).is_none());
        assert!(summarize_early_game(&[]).is_none());
    }
}
