//! Match analytics engine.
//!
//! Pure derivations from raw match payloads: per-match cards from the
//! subject player's point of view, and an aggregate summary across the
//! batch. No I/O happens here.

use crate::models::{
    ChampionRecord, MatchCard, MatchDto, ParticipantDto, Perks, PerformanceAverages, PlayerSummary,
    Role, RoleBreakdown, RoleShare, RuneSummary, SummaryTotals,
};

pub mod coaching;

/// How many cards the aggregate output keeps.
const RECENT_MATCH_LIMIT: usize = 10;

/// How many champions the pool keeps.
const CHAMPION_POOL_LIMIT: usize = 5;

/// Round to a fixed number of decimals.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Win percentage with one decimal; 0.0 when no games were played.
pub fn winrate_percent(wins: u32, losses: u32) -> f64 {
    let total = wins + losses;
    if total == 0 {
        return 0.0;
    }
    round_to(wins as f64 / total as f64 * 100.0, 1)
}

/// Kills-plus-assists per death; with zero deaths the sum stands alone.
pub fn kda(kills: f64, deaths: f64, assists: f64) -> f64 {
    if deaths <= 0.0 {
        kills + assists
    } else {
        (kills + assists) / deaths
    }
}

/// Pull the rune page ids out of a participant's perks, if present.
fn extract_runes(perks: &Perks) -> RuneSummary {
    let mut summary = RuneSummary::default();

    for style in &perks.styles {
        match style.description.as_str() {
            "primaryStyle" => {
                summary.primary_style_id = Some(style.style);
                summary.keystone_id = style.selections.first().map(|s| s.perk);
            }
            "subStyle" => summary.sub_style_id = Some(style.style),
            _ => {}
        }
        for selection in &style.selections {
            summary.perk_ids.push(selection.perk);
        }
    }

    summary
}

/// Unrounded per-match rates. The card displays rounded copies; batch
/// averages accumulate these so the mean is rounded exactly once.
struct MatchRates {
    cs_per_min: f64,
    vision_per_min: f64,
    gold_per_min: f64,
    damage_per_min: f64,
    kill_participation: f64,
    damage_share: f64,
}

/// Build a card for the subject player, or `None` if they are not in the
/// match.
pub fn build_match_card(m: &MatchDto, puuid: &str) -> Option<MatchCard> {
    card_with_rates(m, puuid).map(|(card, _)| card)
}

fn card_with_rates(m: &MatchDto, puuid: &str) -> Option<(MatchCard, MatchRates)> {
    let participant = m.info.participants.iter().find(|p| p.puuid == puuid)?;

    // Short games still divide by at least one minute.
    let minutes = (m.info.game_duration as f64 / 60.0).max(1.0);

    let mut team_kills = 0u32;
    let mut team_damage = 0u32;
    let mut team_gold = 0u32;
    for teammate in &m.info.participants {
        if teammate.team_id == participant.team_id {
            team_kills += teammate.kills;
            team_damage += teammate.total_damage_dealt_to_champions;
            team_gold += teammate.gold_earned;
        }
    }

    let total_cs = participant.total_cs();
    let rates = MatchRates {
        cs_per_min: total_cs as f64 / minutes,
        vision_per_min: participant.vision_score as f64 / minutes,
        gold_per_min: participant.gold_earned as f64 / minutes,
        damage_per_min: participant.total_damage_dealt_to_champions as f64 / minutes,
        kill_participation: (participant.kills + participant.assists) as f64
            / team_kills.max(1) as f64,
        damage_share: participant.total_damage_dealt_to_champions as f64
            / team_damage.max(1) as f64,
    };
    let gold_share = participant.gold_earned as f64 / team_gold.max(1) as f64;

    let card = MatchCard {
        match_id: m.metadata.match_id.clone(),
        queue_id: m.info.queue_id,
        game_duration: m.info.game_duration,
        game_creation: m.info.game_creation,
        champion: participant.champion_name.clone(),
        role: Role::from_position(&participant.team_position),
        team_position: participant.team_position.clone(),
        kills: participant.kills,
        deaths: participant.deaths,
        assists: participant.assists,
        kda: kda(
            participant.kills as f64,
            participant.deaths as f64,
            participant.assists as f64,
        ),
        cs: total_cs,
        lane_cs: participant.total_minions_killed,
        neutral_cs: participant.neutral_minions_killed,
        cs_per_min: round_to(rates.cs_per_min, 2),
        vision_score: participant.vision_score,
        vision_per_min: round_to(rates.vision_per_min, 2),
        gold: participant.gold_earned,
        gold_per_min: round_to(rates.gold_per_min, 1),
        damage: participant.total_damage_dealt_to_champions,
        damage_taken: participant.total_damage_taken,
        damage_per_min: round_to(rates.damage_per_min, 1),
        win: participant.win,
        kill_participation: round_to(rates.kill_participation, 3),
        damage_share: round_to(rates.damage_share, 3),
        gold_share: round_to(gold_share, 3),
        team_kills,
        team_damage,
        team_gold,
        dragon_takedowns: participant.challenges.dragon_takedowns,
        baron_takedowns: participant.challenges.baron_takedowns,
        herald_takedowns: participant.challenges.rift_herald_takedowns,
        turret_takedowns: participant.challenges.turret_takedowns,
        inhibitor_takedowns: participant.challenges.inhibitor_takedowns,
        wards_placed: participant.wards_placed,
        wards_killed: participant.wards_killed,
        control_wards_placed: participant.detector_wards_placed,
        items: participant.items().to_vec(),
        spells: vec![participant.summoner1_id, participant.summoner2_id],
        runes: participant.perks.as_ref().map(extract_runes),
        champion_detail: None,
        items_detail: None,
        spells_detail: None,
        runes_detail: None,
        timeline: None,
    };

    Some((card, rates))
}

/// Counter that preserves first-encounter order, so ties break the way
/// the matches arrived.
struct OrderedCounter<K> {
    entries: Vec<(K, u32)>,
}

impl<K: PartialEq> OrderedCounter<K> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn bump(&mut self, key: K) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 += 1;
        } else {
            self.entries.push((key, 1));
        }
    }

    /// Entries sorted by count descending; the sort is stable so ties stay
    /// in encounter order.
    fn most_common(mut self) -> Vec<(K, u32)> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries
    }
}

#[derive(Default)]
struct Totals {
    kills: f64,
    deaths: f64,
    assists: f64,
    cs: f64,
    vision: f64,
    gold: f64,
    damage: f64,
    cs_per_min: f64,
    vision_per_min: f64,
    gold_per_min: f64,
    damage_per_min: f64,
    kill_participation: f64,
    damage_share: f64,
    dragons: f64,
    barons: f64,
    heralds: f64,
    turrets: f64,
    inhibitors: f64,
}

/// Aggregate a batch of matches for one player.
///
/// Returns the summary plus the newest match cards (at most ten).
/// Matches that do not contain the player are skipped; zero analyzable
/// matches yields an empty summary, not an error.
pub fn summarize_matches(matches: &[MatchDto], puuid: &str) -> (PlayerSummary, Vec<MatchCard>) {
    let mut wins = 0u32;
    let mut losses = 0u32;
    let mut totals = Totals::default();
    let mut roles: OrderedCounter<Role> = OrderedCounter::new();
    let mut champions: OrderedCounter<String> = OrderedCounter::new();
    let mut champion_wins: Vec<(String, u32)> = Vec::new();
    let mut cards: Vec<MatchCard> = Vec::new();

    for m in matches {
        let (card, rates) = match card_with_rates(m, puuid) {
            Some(pair) => pair,
            None => continue,
        };

        if card.win {
            wins += 1;
        } else {
            losses += 1;
        }

        totals.kills += card.kills as f64;
        totals.deaths += card.deaths as f64;
        totals.assists += card.assists as f64;
        totals.cs += card.cs as f64;
        totals.vision += card.vision_score as f64;
        totals.gold += card.gold as f64;
        totals.damage += card.damage as f64;
        totals.cs_per_min += rates.cs_per_min;
        totals.vision_per_min += rates.vision_per_min;
        totals.gold_per_min += rates.gold_per_min;
        totals.damage_per_min += rates.damage_per_min;
        totals.kill_participation += rates.kill_participation;
        totals.damage_share += rates.damage_share;
        totals.dragons += card.dragon_takedowns as f64;
        totals.barons += card.baron_takedowns as f64;
        totals.heralds += card.herald_takedowns as f64;
        totals.turrets += card.turret_takedowns as f64;
        totals.inhibitors += card.inhibitor_takedowns as f64;

        roles.bump(card.role);
        champions.bump(card.champion.clone());
        if card.win {
            bump_wins(&mut champion_wins, &card.champion);
        }

        cards.push(card);
    }

    let total_games = wins + losses;
    if total_games == 0 {
        return (PlayerSummary::default(), Vec::new());
    }

    let n = total_games as f64;
    let avg_kills = totals.kills / n;
    let avg_deaths = totals.deaths / n;
    let avg_assists = totals.assists / n;

    let performance = PerformanceAverages {
        avg_kills: round_to(avg_kills, 2),
        avg_deaths: round_to(avg_deaths, 2),
        avg_assists: round_to(avg_assists, 2),
        avg_kda: round_to(kda(avg_kills, avg_deaths, avg_assists), 2),
        avg_cs: round_to(totals.cs / n, 1),
        avg_vision_score: round_to(totals.vision / n, 1),
        avg_gold: round_to(totals.gold / n, 1),
        avg_damage: round_to(totals.damage / n, 1),
        avg_cs_per_min: round_to(totals.cs_per_min / n, 2),
        avg_vision_per_min: round_to(totals.vision_per_min / n, 2),
        avg_gold_per_min: round_to(totals.gold_per_min / n, 1),
        avg_damage_per_min: round_to(totals.damage_per_min / n, 1),
        avg_kill_participation: round_to(totals.kill_participation / n, 3),
        avg_damage_share: round_to(totals.damage_share / n, 3),
        avg_dragon_takedowns: round_to(totals.dragons / n, 2),
        avg_baron_takedowns: round_to(totals.barons / n, 2),
        avg_herald_takedowns: round_to(totals.heralds / n, 2),
        avg_turret_takedowns: round_to(totals.turrets / n, 2),
        avg_inhibitor_takedowns: round_to(totals.inhibitors / n, 2),
    };

    let champion_pool: Vec<ChampionRecord> = champions
        .most_common()
        .into_iter()
        .take(CHAMPION_POOL_LIMIT)
        .map(|(champion, games)| {
            let champ_wins = champion_wins
                .iter()
                .find(|(name, _)| *name == champion)
                .map_or(0, |(_, w)| *w);
            ChampionRecord {
                games,
                wins: champ_wins,
                losses: games - champ_wins,
                winrate: winrate_percent(champ_wins, games - champ_wins),
                champion,
            }
        })
        .collect();

    let breakdown: Vec<RoleShare> = roles
        .most_common()
        .into_iter()
        .map(|(role, games)| RoleShare {
            role,
            games,
            percentage: round_to(games as f64 / n * 100.0, 1),
        })
        .collect();
    let main_role = breakdown.first().map_or(Role::Unknown, |share| share.role);

    let summary = PlayerSummary {
        summary: SummaryTotals {
            total_games,
            wins,
            losses,
            winrate: winrate_percent(wins, losses),
        },
        performance,
        roles: RoleBreakdown {
            main_role,
            breakdown,
        },
        champions: champion_pool,
    };

    cards.truncate(RECENT_MATCH_LIMIT);
    (summary, cards)
}

fn bump_wins(wins: &mut Vec<(String, u32)>, champion: &str) {
    if let Some(entry) = wins.iter_mut().find(|(name, _)| name == champion) {
        entry.1 += 1;
    } else {
        wins.push((champion.to_string(), 1));
    }
}
