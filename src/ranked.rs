//! Ranked standing resolution.
//!
//! Ranked data has no single reliable source: the local client only
//! works on the player's own machine, apex players are missing from
//! normal league entries on some shards, and the encrypted summoner id
//! needed for league-v4 is not always present. The resolver walks a
//! chain of sources from freshest to coarsest and reports which rung
//! supplied the answer.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::analytics::winrate_percent;
use crate::fetch::fanout::BoundedFetcher;
use crate::fetch::RiotClient;
use crate::lcu::{LocalRankedQueue, LocalSession};
use crate::models::{
    Account, ApexTier, LeagueEntry, MatchDto, RankedOverview, RankedSnapshot, RankedSource,
    Summoner,
};

const SOLO_QUEUE: &str = "RANKED_SOLO_5x5";
const FLEX_QUEUE: &str = "RANKED_FLEX_SR";
const SOLO_QUEUE_ID: u32 = 420;
const FLEX_QUEUE_ID: u32 = 440;

/// Matches listed per ranked queue when falling back to history.
const RANKED_HISTORY_COUNT: u32 = 30;

/// Resolves a player's ranked standing from the best available source.
pub struct RankedResolver {
    client: Arc<RiotClient>,
    fetcher: BoundedFetcher,
    local_session: Option<Arc<dyn LocalSession>>,
}

impl RankedResolver {
    pub fn new(client: Arc<RiotClient>, fetcher: BoundedFetcher) -> Self {
        Self {
            client,
            fetcher,
            local_session: None,
        }
    }

    pub fn with_local_session(mut self, session: Arc<dyn LocalSession>) -> Self {
        self.local_session = Some(session);
        self
    }

    /// Walk the source chain until one rung produces a standing.
    ///
    /// Never fails: every rung degrades to the next, and the last rung
    /// reports its limits in the overview note.
    pub async fn resolve(
        &self,
        platform: &str,
        account: &Account,
        summoner: &Summoner,
    ) -> RankedOverview {
        if let Some(session) = &self.local_session {
            match session.current_ranked().await {
                Ok(queues) => {
                    let solo = find_local_queue(&queues, SOLO_QUEUE);
                    let flex = find_local_queue(&queues, FLEX_QUEUE);
                    if solo.is_some() {
                        debug!("Resolved ranked standing from the local client");
                        return RankedOverview {
                            solo,
                            flex,
                            data_source: RankedSource::LocalClient,
                            note: None,
                        };
                    }
                }
                Err(err) => warn!("Local client lookup failed: {}", err),
            }
        }

        // Apex players are often invisible to the entries endpoint, so
        // scan the three apex ladders before asking it.
        for tier in ApexTier::ALL {
            let league = match self.client.apex_league(platform, tier, SOLO_QUEUE).await {
                Ok(league) => league,
                Err(err) => {
                    warn!("{} ladder lookup failed: {}", tier.as_str(), err);
                    continue;
                }
            };

            let hit = league.entries.iter().find(|entry| {
                entry.puuid.as_deref() == Some(account.puuid.as_str())
                    || (summoner.id.is_some() && entry.summoner_id == summoner.id)
            });
            if let Some(entry) = hit {
                debug!("Found player on the {} ladder", tier.as_str());
                return RankedOverview {
                    solo: Some(snapshot_from_apex(entry, tier)),
                    flex: None,
                    data_source: RankedSource::ApexLeaderboard,
                    note: None,
                };
            }
        }

        if let Some(summoner_id) = &summoner.id {
            match self
                .client
                .league_entries_by_summoner(platform, summoner_id)
                .await
            {
                Ok(entries) if !entries.is_empty() => {
                    let (solo_entry, flex_entry) = select_entries(&entries);
                    return RankedOverview {
                        solo: solo_entry.map(snapshot_from_entry),
                        flex: flex_entry.map(snapshot_from_entry),
                        data_source: RankedSource::LeagueEntries,
                        note: None,
                    };
                }
                Ok(_) => debug!("No league entries for this summoner"),
                Err(err) => warn!("League entries lookup failed: {}", err),
            }
        }

        self.from_match_history(platform, &account.puuid).await
    }

    /// Last rung: reconstruct win/loss records from recent ranked
    /// matches. Tier, rank, and LP are unknowable from here.
    async fn from_match_history(&self, platform: &str, puuid: &str) -> RankedOverview {
        let mut ids: Vec<String> = Vec::new();
        let mut failed_listings = 0;
        for queue in [SOLO_QUEUE_ID, FLEX_QUEUE_ID] {
            match self
                .client
                .match_ids_by_puuid(platform, puuid, 0, RANKED_HISTORY_COUNT, Some(queue))
                .await
            {
                Ok(mut batch) => ids.append(&mut batch),
                Err(err) => {
                    warn!("Match listing failed for queue {}: {}", queue, err);
                    failed_listings += 1;
                }
            }
        }
        if failed_listings == 2 {
            return RankedOverview {
                solo: None,
                flex: None,
                data_source: RankedSource::MatchHistory,
                note: Some("Unable to fetch ranked data".to_string()),
            };
        }

        let details = {
            let client = Arc::clone(&self.client);
            let platform = platform.to_string();
            self.fetcher
                .run(ids, move |match_id: String| {
                    let client = Arc::clone(&client);
                    let platform = platform.clone();
                    async move { client.match_by_id(&platform, &match_id).await }
                })
                .await
        };
        let matches: Vec<MatchDto> = details.into_iter().flatten().collect();

        let solo = tally_queue(&matches, puuid, SOLO_QUEUE_ID);
        let flex = tally_queue(&matches, puuid, FLEX_QUEUE_ID);
        let note = if solo.is_none() && flex.is_none() {
            "No ranked games found"
        } else {
            "Ranked data calculated from match history (tier/rank/LP unavailable)"
        };

        RankedOverview {
            solo,
            flex,
            data_source: RankedSource::MatchHistory,
            note: Some(note.to_string()),
        }
    }
}

fn find_local_queue(queues: &[LocalRankedQueue], queue_type: &str) -> Option<RankedSnapshot> {
    queues
        .iter()
        .find(|q| q.queue_type == queue_type && !q.tier.is_empty())
        .map(snapshot_from_local)
}

fn snapshot_from_local(queue: &LocalRankedQueue) -> RankedSnapshot {
    RankedSnapshot {
        tier: queue.tier.clone(),
        rank: if queue.division.is_empty() {
            "I".to_string()
        } else {
            queue.division.clone()
        },
        lp: Some(queue.league_points),
        wins: queue.wins,
        losses: queue.losses,
        total_games: queue.wins + queue.losses,
        winrate: winrate_percent(queue.wins, queue.losses),
        veteran: false,
        hot_streak: false,
        series: None,
    }
}

/// Apex listings carry no division; everyone above Diamond is rank I.
fn snapshot_from_apex(entry: &LeagueEntry, tier: ApexTier) -> RankedSnapshot {
    RankedSnapshot {
        tier: tier.as_str().to_string(),
        rank: "I".to_string(),
        lp: Some(entry.league_points),
        wins: entry.wins,
        losses: entry.losses,
        total_games: entry.wins + entry.losses,
        winrate: winrate_percent(entry.wins, entry.losses),
        veteran: entry.veteran,
        hot_streak: entry.hot_streak,
        series: None,
    }
}

fn snapshot_from_entry(entry: &LeagueEntry) -> RankedSnapshot {
    RankedSnapshot {
        tier: entry.tier.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
        rank: entry.rank.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
        lp: Some(entry.league_points),
        wins: entry.wins,
        losses: entry.losses,
        total_games: entry.wins + entry.losses,
        winrate: winrate_percent(entry.wins, entry.losses),
        veteran: entry.veteran,
        hot_streak: entry.hot_streak,
        series: entry.mini_series.clone(),
    }
}

/// Pick the solo and flex entries from a league-v4 listing. A player
/// with only off-queue entries still gets their first entry reported as
/// the main standing.
fn select_entries(entries: &[LeagueEntry]) -> (Option<&LeagueEntry>, Option<&LeagueEntry>) {
    let solo = entries
        .iter()
        .find(|e| e.queue_type.as_deref() == Some(SOLO_QUEUE))
        .or_else(|| entries.first());
    let flex = entries
        .iter()
        .find(|e| e.queue_type.as_deref() == Some(FLEX_QUEUE));
    (solo, flex)
}

fn tally_queue(matches: &[MatchDto], puuid: &str, queue_id: u32) -> Option<RankedSnapshot> {
    let mut wins = 0u32;
    let mut losses = 0u32;
    for m in matches.iter().filter(|m| m.info.queue_id == queue_id as i32) {
        if let Some(p) = m.info.participants.iter().find(|p| p.puuid == puuid) {
            if p.win {
                wins += 1;
            } else {
                losses += 1;
            }
        }
    }

    let total = wins + losses;
    if total == 0 {
        return None;
    }
    Some(RankedSnapshot {
        tier: "UNKNOWN".to_string(),
        rank: "UNKNOWN".to_string(),
        lp: None,
        wins,
        losses,
        total_games: total,
        winrate: winrate_percent(wins, losses),
        veteran: false,
        hot_streak: false,
        series: None,
    })
}
