//! Apex ladder assembly.
//!
//! Merges the challenger, grandmaster, and master listings into one
//! ladder, then enriches each row with summoner and account lookups.
//! Lower tiers are only fetched when the higher ones cannot fill the
//! requested size.

use std::sync::Arc;

use tracing::{debug, info};

use crate::analytics::winrate_percent;
use crate::fetch::fanout::BoundedFetcher;
use crate::fetch::{FetchError, RiotClient};
use crate::models::{Account, ApexTier, Leaderboard, LeaderboardPlayer, LeagueEntry, Summoner};

/// Rows returned when the caller does not ask for a size.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 50;

/// Hard cap on ladder size.
const MAX_LEADERBOARD_LIMIT: usize = 200;

/// Builds enriched apex ladders for a platform and queue.
pub struct LeaderboardAggregator {
    client: Arc<RiotClient>,
    fetcher: BoundedFetcher,
}

impl LeaderboardAggregator {
    pub fn new(client: Arc<RiotClient>, fetcher: BoundedFetcher) -> Self {
        Self { client, fetcher }
    }

    /// Assemble the ladder, top tier first.
    ///
    /// The limit is clamped to `1..=200`. League listing failures abort
    /// the assembly; per-row profile lookups degrade to gaps and are
    /// tallied on the result instead.
    pub async fn assemble(
        &self,
        platform: &str,
        queue: &str,
        limit: usize,
    ) -> Result<Leaderboard, FetchError> {
        let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
        info!(
            "Assembling {} leaderboard for {} (limit {})",
            queue, platform, limit
        );

        let challenger = self
            .client
            .apex_league(platform, ApexTier::Challenger, queue)
            .await?;
        let ladder_tier = challenger.tier.clone();
        let ladder_name = challenger.name.clone();

        let mut rows: Vec<(LeagueEntry, ApexTier)> = Vec::new();
        push_tier(&mut rows, challenger.entries, ApexTier::Challenger, limit);

        if rows.len() < limit {
            let grandmaster = self
                .client
                .apex_league(platform, ApexTier::Grandmaster, queue)
                .await?;
            push_tier(&mut rows, grandmaster.entries, ApexTier::Grandmaster, limit);
        }
        if rows.len() < limit {
            let master = self
                .client
                .apex_league(platform, ApexTier::Master, queue)
                .await?;
            push_tier(&mut rows, master.entries, ApexTier::Master, limit);
        }

        let puuids: Vec<String> = rows
            .iter()
            .map(|(entry, _)| entry.puuid.clone().unwrap_or_default())
            .collect();

        let summoners = {
            let client = Arc::clone(&self.client);
            let platform = platform.to_string();
            self.fetcher
                .run(puuids.clone(), move |puuid: String| {
                    let client = Arc::clone(&client);
                    let platform = platform.clone();
                    async move {
                        if puuid.is_empty() {
                            return Err(FetchError::NotFound);
                        }
                        client.summoner_by_puuid(&platform, &puuid).await
                    }
                })
                .await
        };
        let accounts = {
            let client = Arc::clone(&self.client);
            let platform = platform.to_string();
            self.fetcher
                .run(puuids.clone(), move |puuid: String| {
                    let client = Arc::clone(&client);
                    let platform = platform.clone();
                    async move {
                        if puuid.is_empty() {
                            return Err(FetchError::NotFound);
                        }
                        client.account_by_puuid(&platform, &puuid).await
                    }
                })
                .await
        };

        let summoner_errors = summoners.iter().filter(|s| s.is_none()).count() as u32;
        let account_errors = accounts
            .iter()
            .zip(&puuids)
            .filter(|(account, puuid)| account.is_none() && !puuid.is_empty())
            .count() as u32;
        debug!(
            "Enriched {} rows ({} summoner misses, {} account misses)",
            rows.len(),
            summoner_errors,
            account_errors
        );

        let players = rows
            .into_iter()
            .zip(summoners)
            .zip(accounts)
            .map(|(((entry, tier), summoner), account)| {
                build_row(entry, tier, summoner.as_ref(), account.as_ref())
            })
            .collect();

        Ok(Leaderboard {
            platform: platform.to_string(),
            queue: queue.to_string(),
            tier: ladder_tier.unwrap_or_else(|| ApexTier::Challenger.as_str().to_string()),
            name: ladder_name.unwrap_or_else(|| "Challenger".to_string()),
            players,
            summoner_errors,
            account_errors,
        })
    }
}

/// Append one tier's entries, highest LP first, until the ladder is full.
fn push_tier(
    rows: &mut Vec<(LeagueEntry, ApexTier)>,
    mut entries: Vec<LeagueEntry>,
    tier: ApexTier,
    limit: usize,
) {
    entries.sort_by(|a, b| b.league_points.cmp(&a.league_points));
    for entry in entries {
        if rows.len() >= limit {
            break;
        }
        rows.push((entry, tier));
    }
}

fn build_row(
    entry: LeagueEntry,
    tier: ApexTier,
    summoner: Option<&Summoner>,
    account: Option<&Account>,
) -> LeaderboardPlayer {
    let mut summoner_name = entry
        .summoner_name
        .clone()
        .unwrap_or_else(|| "Unknown".to_string());
    if let Some(name) = summoner.and_then(|s| s.name.clone()) {
        summoner_name = name;
    }

    LeaderboardPlayer {
        summoner_name,
        riot_id: account.and_then(|a| a.riot_id()),
        league_points: entry.league_points,
        wins: entry.wins,
        losses: entry.losses,
        winrate: winrate_percent(entry.wins, entry.losses),
        hot_streak: entry.hot_streak,
        veteran: entry.veteran,
        rank: entry.rank,
        tier: tier.as_str().to_string(),
        profile_icon_id: summoner.and_then(|s| s.profile_icon_id),
        puuid: entry.puuid,
    }
}
