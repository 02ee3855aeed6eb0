//! Playstyle profiling and coaching recommendations.
//!
//! Works entirely off the aggregate [`PlayerSummary`]; expectations are
//! calibrated per role since a 1.5 CS/min Support and a 1.5 CS/min ADC
//! are very different players.

use crate::models::{DnaScores, LearningFocus, LearningPath, PlayerDna, PlayerSummary, Role};

/// Per-role expectation bands used to normalize raw averages.
#[derive(Debug, Clone, Copy)]
pub struct RoleThresholds {
    pub cs_low: f64,
    pub cs_high: f64,
    pub vision_low: f64,
    pub vision_high: f64,
    pub damage_share_low: f64,
    pub damage_share_high: f64,
}

/// Expectation band for a role; unknown roles get a middle-of-the-road
/// band.
pub fn thresholds_for(role: Role) -> RoleThresholds {
    match role {
        Role::Support => RoleThresholds {
            cs_low: 1.5,
            cs_high: 3.0,
            vision_low: 1.2,
            vision_high: 2.5,
            damage_share_low: 0.12,
            damage_share_high: 0.2,
        },
        Role::Jungle => RoleThresholds {
            cs_low: 4.0,
            cs_high: 7.0,
            vision_low: 0.7,
            vision_high: 1.6,
            damage_share_low: 0.16,
            damage_share_high: 0.24,
        },
        Role::Adc => RoleThresholds {
            cs_low: 6.0,
            cs_high: 9.0,
            vision_low: 0.5,
            vision_high: 1.2,
            damage_share_low: 0.22,
            damage_share_high: 0.32,
        },
        Role::Mid => RoleThresholds {
            cs_low: 6.0,
            cs_high: 8.5,
            vision_low: 0.6,
            vision_high: 1.4,
            damage_share_low: 0.2,
            damage_share_high: 0.3,
        },
        Role::Top => RoleThresholds {
            cs_low: 5.5,
            cs_high: 8.0,
            vision_low: 0.5,
            vision_high: 1.2,
            damage_share_low: 0.18,
            damage_share_high: 0.27,
        },
        Role::Unknown => RoleThresholds {
            cs_low: 4.0,
            cs_high: 7.0,
            vision_low: 0.6,
            vision_high: 1.4,
            damage_share_low: 0.16,
            damage_share_high: 0.25,
        },
    }
}

/// Map a raw value onto a 0..=100 score between a low and high bound.
///
/// A degenerate band (high at or below low) scores a flat 50.
pub fn score_range(value: f64, low: f64, high: f64) -> u8 {
    if high <= low {
        return 50;
    }
    let normalized = (value - low) / (high - low) * 100.0;
    normalized.clamp(0.0, 100.0).round() as u8
}

/// Derive the player's DNA profile from their aggregate summary.
pub fn build_player_dna(summary: &PlayerSummary) -> PlayerDna {
    let role = summary.roles.main_role;
    let bands = thresholds_for(role);
    let perf = &summary.performance;

    let scores = DnaScores {
        economy: score_range(perf.avg_cs_per_min, bands.cs_low, bands.cs_high),
        vision: score_range(perf.avg_vision_per_min, bands.vision_low, bands.vision_high),
        teamplay: score_range(perf.avg_kill_participation, 0.45, 0.7),
        damage: score_range(
            perf.avg_damage_share,
            bands.damage_share_low,
            bands.damage_share_high,
        ),
        survivability: score_range(perf.avg_kda, 2.0, 4.0),
    };

    let mut tags = Vec::new();
    if scores.vision >= 70 {
        tags.push("Vision Controller".to_string());
    }
    if scores.economy >= 70 {
        tags.push("Economy Farmer".to_string());
    }
    if scores.teamplay >= 70 {
        tags.push("Teamfight Oriented".to_string());
    }
    if scores.damage >= 70 {
        tags.push("Damage Threat".to_string());
    }
    if scores.survivability >= 70 {
        tags.push("Low Risk".to_string());
    }
    if tags.is_empty() {
        tags.push("Balanced".to_string());
    }
    tags.truncate(3);

    // A farming profile outranks a vision profile when both qualify.
    let primary = if scores.teamplay >= 70 && scores.damage >= 70 {
        "Playmaker".to_string()
    } else if scores.economy >= 75 && scores.damage < 55 {
        "Economy Farmer".to_string()
    } else if scores.vision >= 75 && scores.damage < 50 {
        "Vision Controller".to_string()
    } else {
        tags[0].clone()
    };

    PlayerDna {
        primary,
        tags,
        scores,
    }
}

/// Build a prioritized improvement plan from the aggregate summary.
///
/// At most three focus areas are returned, in severity order; a player
/// with no flagged weaknesses gets a single consistency focus.
pub fn build_learning_path(summary: &PlayerSummary) -> LearningPath {
    let role = summary.roles.main_role;
    let bands = thresholds_for(role);
    let perf = &summary.performance;

    let mut focuses = Vec::new();

    if perf.avg_cs_per_min < bands.cs_low {
        focuses.push(LearningFocus {
            title: "CS discipline".to_string(),
            reason: format!(
                "CS/min is {:.2} for {}.",
                perf.avg_cs_per_min,
                role.label()
            ),
            action: "Focus on pathing and last-hits; track 10-min CS goals.".to_string(),
        });
    }
    if perf.avg_vision_per_min < bands.vision_low {
        focuses.push(LearningFocus {
            title: "Vision control".to_string(),
            reason: format!("Vision/min is {:.2}.", perf.avg_vision_per_min),
            action: "Add control wards and clear river before objectives.".to_string(),
        });
    }
    if perf.avg_kill_participation < 0.5 {
        focuses.push(LearningFocus {
            title: "Teamfight presence".to_string(),
            reason: format!(
                "Kill participation is {:.3}.",
                perf.avg_kill_participation
            ),
            action: "Sync timings with lanes and contest first objectives.".to_string(),
        });
    }
    if perf.avg_damage_share < bands.damage_share_low {
        focuses.push(LearningFocus {
            title: "Damage contribution".to_string(),
            reason: format!("Damage share is {:.3}.", perf.avg_damage_share),
            action: "Prioritize safe damage windows and item spikes.".to_string(),
        });
    }
    if perf.avg_deaths > 6.0 {
        focuses.push(LearningFocus {
            title: "Survivability".to_string(),
            reason: format!("Avg deaths is {:.2}.", perf.avg_deaths),
            action: "Track risky fights and improve retreat timing.".to_string(),
        });
    }

    if focuses.is_empty() {
        focuses.push(LearningFocus {
            title: "Consistency".to_string(),
            reason: "Core metrics look solid.".to_string(),
            action: "Maintain form and refine champion pool.".to_string(),
        });
    }
    focuses.truncate(3);

    LearningPath {
        main_role: role,
        focuses,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{PerformanceAverages, RoleBreakdown};

    fn summary_with(role: Role, performance: PerformanceAverages) -> PlayerSummary {
        PlayerSummary {
            roles: RoleBreakdown {
                main_role: role,
                breakdown: Vec::new(),
            },
            performance,
            ..Default::default()
        }
    }

    #[test]
    fn test_score_range_bounds() {
        assert_eq!(score_range(6.0, 6.0, 9.0), 0);
        assert_eq!(score_range(9.0, 6.0, 9.0), 100);
        assert_eq!(score_range(7.5, 6.0, 9.0), 50);
        // Out of band clamps instead of overflowing.
        assert_eq!(score_range(20.0, 6.0, 9.0), 100);
        assert_eq!(score_range(-5.0, 6.0, 9.0), 0);
    }

    #[test]
    fn test_score_range_degenerate_band() {
        assert_eq!(score_range(7.0, 5.0, 5.0), 50);
        assert_eq!(score_range(7.0, 5.0, 4.0), 50);
    }

    #[test]
    fn test_dna_playmaker_override() {
        let perf = PerformanceAverages {
            avg_kill_participation: 0.7,
            avg_damage_share: 0.35,
            avg_cs_per_min: 5.0,
            avg_vision_per_min: 0.5,
            avg_kda: 2.0,
            ..Default::default()
        };
        let dna = build_player_dna(&summary_with(Role::Mid, perf));

        assert_eq!(dna.scores.teamplay, 100);
        assert_eq!(dna.scores.damage, 100);
        assert_eq!(dna.primary, "Playmaker");
    }

    #[test]
    fn test_dna_vision_controller_override() {
        let perf = PerformanceAverages {
            avg_vision_per_min: 2.5,
            avg_kill_participation: 0.4,
            avg_damage_share: 0.13,
            avg_cs_per_min: 1.0,
            avg_kda: 1.5,
            ..Default::default()
        };
        let dna = build_player_dna(&summary_with(Role::Support, perf));

        assert!(dna.scores.vision >= 75);
        assert!(dna.scores.damage < 50);
        assert_eq!(dna.primary, "Vision Controller");
    }

    #[test]
    fn test_dna_economy_outranks_vision() {
        let perf = PerformanceAverages {
            avg_cs_per_min: 3.0,
            avg_vision_per_min: 2.5,
            avg_kill_participation: 0.4,
            avg_damage_share: 0.1,
            avg_kda: 1.5,
            ..Default::default()
        };
        let dna = build_player_dna(&summary_with(Role::Support, perf));

        assert_eq!(dna.scores.economy, 100);
        assert_eq!(dna.scores.vision, 100);
        assert_eq!(dna.primary, "Economy Farmer");
    }

    #[test]
    fn test_dna_balanced_fallback() {
        let perf = PerformanceAverages {
            avg_cs_per_min: 6.5,
            avg_vision_per_min: 0.8,
            avg_kill_participation: 0.5,
            avg_damage_share: 0.24,
            avg_kda: 2.5,
            ..Default::default()
        };
        let dna = build_player_dna(&summary_with(Role::Mid, perf));

        assert_eq!(dna.tags, vec!["Balanced".to_string()]);
        assert_eq!(dna.primary, "Balanced");
    }

    #[test]
    fn test_dna_tags_cap_at_three() {
        let perf = PerformanceAverages {
            avg_cs_per_min: 10.0,
            avg_vision_per_min: 3.0,
            avg_kill_participation: 0.9,
            avg_damage_share: 0.4,
            avg_kda: 6.0,
            ..Default::default()
        };
        let dna = build_player_dna(&summary_with(Role::Mid, perf));

        assert_eq!(dna.tags.len(), 3);
        assert_eq!(
            dna.tags,
            vec![
                "Vision Controller".to_string(),
                "Economy Farmer".to_string(),
                "Teamfight Oriented".to_string(),
            ]
        );
    }

    #[test]
    fn test_learning_path_flags_weaknesses_in_order() {
        let perf = PerformanceAverages {
            avg_cs_per_min: 4.0,
            avg_vision_per_min: 0.3,
            avg_kill_participation: 0.4,
            avg_damage_share: 0.1,
            avg_deaths: 8.0,
            ..Default::default()
        };
        let path = build_learning_path(&summary_with(Role::Adc, perf));

        // Five weaknesses flagged, only the first three survive.
        assert_eq!(path.focuses.len(), 3);
        assert_eq!(path.focuses[0].title, "CS discipline");
        assert_eq!(path.focuses[0].reason, "CS/min is 4.00 for ADC.");
        assert_eq!(path.focuses[1].title, "Vision control");
        assert_eq!(path.focuses[2].title, "Teamfight presence");
        assert_eq!(path.main_role, Role::Adc);
    }

    #[test]
    fn test_learning_path_respects_role_bands() {
        // 2.0 CS/min is fine for a Support but not for an ADC.
        let perf = PerformanceAverages {
            avg_cs_per_min: 2.0,
            avg_vision_per_min: 2.0,
            avg_kill_participation: 0.6,
            avg_damage_share: 0.15,
            avg_deaths: 4.0,
            ..Default::default()
        };
        let path = build_learning_path(&summary_with(Role::Support, perf));

        assert_eq!(path.focuses[0].title, "Consistency");
    }

    #[test]
    fn test_learning_path_consistency_fallback() {
        let perf = PerformanceAverages {
            avg_cs_per_min: 7.0,
            avg_vision_per_min: 1.0,
            avg_kill_participation: 0.6,
            avg_damage_share: 0.25,
            avg_deaths: 4.0,
            ..Default::default()
        };
        let path = build_learning_path(&summary_with(Role::Mid, perf));

        assert_eq!(path.focuses.len(), 1);
        assert_eq!(path.focuses[0].title, "Consistency");
        assert_eq!(path.focuses[0].reason, "Core metrics look solid.");
        assert_eq!(
            path.focuses[0].action,
            "Maintain form and refine champion pool."
        );
    }
}
