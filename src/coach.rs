//! End-to-end analysis orchestration.
//!
//! Ties the pipeline together: resolve the player, pull their recent
//! matches, derive the summary and coaching signals, then enrich and
//! persist. Only the identity and match listing steps are fatal; every
//! later stage degrades with a warning so a flaky side channel cannot
//! sink a report.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::analytics::coaching::{build_learning_path, build_player_dna};
use crate::analytics::summarize_matches;
use crate::assets::AssetResolver;
use crate::fetch::fanout::BoundedFetcher;
use crate::fetch::{region_for_platform, FetchError, RiotClient};
use crate::lcu::LocalSession;
use crate::models::{
    Account, CoachingReport, MatchCard, MatchDto, PlayerIdentity, RankedOverview, RiotId, Summoner,
};
use crate::ranked::RankedResolver;
use crate::storage::{PlayerStore, StorageError, StoredMatch, StoredPlayer, StoredRankedStats};
use crate::timeline::{summarize_early_game, summarize_timeline};

const DEFAULT_MATCH_COUNT: u32 = 20;

/// Timelines are an extra request per match, so only the newest few
/// are digested.
const DEFAULT_TIMELINE_MATCHES: u32 = 3;

/// Parameters for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub riot_id: RiotId,

    /// Platform shard; falls back to the client's configured default.
    pub platform: Option<String>,

    pub match_count: u32,

    /// Restrict the listing to one queue id.
    pub queue: Option<u32>,

    pub with_timelines: bool,

    pub timeline_matches: u32,
}

impl AnalyzeRequest {
    pub fn new(riot_id: RiotId) -> Self {
        Self {
            riot_id,
            platform: None,
            match_count: DEFAULT_MATCH_COUNT,
            queue: None,
            with_timelines: true,
            timeline_matches: DEFAULT_TIMELINE_MATCHES,
        }
    }
}

/// Runs the full acquisition and analysis pipeline for one player.
pub struct CoachOrchestrator {
    client: Arc<RiotClient>,
    fetcher: BoundedFetcher,
    ranked: RankedResolver,
    assets: Option<Arc<dyn AssetResolver>>,
    store: Option<Arc<dyn PlayerStore>>,
}

impl CoachOrchestrator {
    pub fn new(client: Arc<RiotClient>, fetcher: BoundedFetcher) -> Self {
        let ranked = RankedResolver::new(Arc::clone(&client), fetcher.clone());
        Self {
            client,
            fetcher,
            ranked,
            assets: None,
            store: None,
        }
    }

    pub fn with_assets(mut self, assets: Arc<dyn AssetResolver>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn PlayerStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_local_session(mut self, session: Arc<dyn LocalSession>) -> Self {
        self.ranked = RankedResolver::new(Arc::clone(&self.client), self.fetcher.clone())
            .with_local_session(session);
        self
    }

    /// Produce a full coaching report for one player.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<CoachingReport, FetchError> {
        let platform = request
            .platform
            .as_deref()
            .unwrap_or_else(|| self.client.default_platform());
        info!("Analyzing {} on {}", request.riot_id, platform);

        let account = self
            .client
            .account_by_riot_id(platform, &request.riot_id.game_name, &request.riot_id.tag_line)
            .await?;
        let summoner = self
            .client
            .summoner_by_puuid(platform, &account.puuid)
            .await?;

        let ids = self
            .client
            .match_ids_by_puuid(platform, &account.puuid, 0, request.match_count, request.queue)
            .await?;
        debug!("Listed {} match ids", ids.len());

        let details = {
            let client = Arc::clone(&self.client);
            let platform_owned = platform.to_string();
            self.fetcher
                .run(ids.clone(), move |match_id: String| {
                    let client = Arc::clone(&client);
                    let platform = platform_owned.clone();
                    async move { client.match_by_id(&platform, &match_id).await }
                })
                .await
        };
        let analyzed: Vec<MatchDto> = details.into_iter().flatten().collect();

        let (summary, mut cards) = summarize_matches(&analyzed, &account.puuid);

        if let Some(assets) = &self.assets {
            if let Err(err) = assets.enrich_cards(&mut cards).await {
                warn!("Asset enrichment skipped: {}", err);
            }
        }

        if request.with_timelines {
            self.attach_timelines(platform, &account.puuid, &mut cards, request.timeline_matches)
                .await;
        }
        let early_game = summarize_early_game(&cards);

        let dna = build_player_dna(&summary);
        let learning_path = build_learning_path(&summary);
        let ranked = self.ranked.resolve(platform, &account, &summoner).await;

        if let Err(err) = self
            .persist(platform, &account, &summoner, &ranked, &analyzed)
            .await
        {
            warn!("Failed to persist analysis: {}", err);
        }

        info!(
            "Analyzed {} of {} matches for {}",
            analyzed.len(),
            ids.len(),
            request.riot_id
        );
        Ok(CoachingReport {
            player: player_identity(&request.riot_id, &account, &summoner),
            ranked: Some(ranked),
            analysis: summary,
            recent_matches: cards,
            early_game,
            dna,
            learning_path,
            fetched_match_ids: ids.len(),
            analyzed_matches: analyzed.len(),
            generated_at: Utc::now(),
        })
    }

    /// Fetch and digest timelines for the newest cards, in place.
    /// Timeline failures only cost the digest on that card.
    async fn attach_timelines(
        &self,
        platform: &str,
        puuid: &str,
        cards: &mut [MatchCard],
        limit: u32,
    ) {
        let targets: Vec<String> = cards
            .iter()
            .take(limit as usize)
            .map(|card| card.match_id.clone())
            .collect();
        if targets.is_empty() {
            return;
        }

        let timelines = {
            let client = Arc::clone(&self.client);
            let platform = platform.to_string();
            self.fetcher
                .run(targets.clone(), move |match_id: String| {
                    let client = Arc::clone(&client);
                    let platform = platform.clone();
                    async move { client.timeline_by_id(&platform, &match_id).await }
                })
                .await
        };

        for (match_id, fetched) in targets.iter().zip(timelines) {
            if let Some(raw) = fetched {
                if let Some(digest) = summarize_timeline(&raw, puuid) {
                    if let Some(card) = cards.iter_mut().find(|c| &c.match_id == match_id) {
                        card.timeline = Some(digest);
                    }
                }
            }
        }
    }

    async fn persist(
        &self,
        platform: &str,
        account: &Account,
        summoner: &Summoner,
        ranked: &RankedOverview,
        matches: &[MatchDto],
    ) -> Result<(), StorageError> {
        let store = match &self.store {
            Some(store) => store,
            None => return Ok(()),
        };

        let now = Utc::now();
        store
            .upsert_player(stored_player(platform, account, summoner, now))
            .await?;
        store
            .record_ranked(ranked_rows(&account.puuid, ranked, now))
            .await?;
        let appended = store
            .append_matches(&account.puuid, stored_matches_from(matches, &account.puuid))
            .await?;
        debug!("Persisted {} new match records", appended);
        Ok(())
    }
}

fn player_identity(riot_id: &RiotId, account: &Account, summoner: &Summoner) -> PlayerIdentity {
    PlayerIdentity {
        game_name: account
            .game_name
            .clone()
            .unwrap_or_else(|| riot_id.game_name.clone()),
        tag_line: account
            .tag_line
            .clone()
            .unwrap_or_else(|| riot_id.tag_line.clone()),
        puuid: account.puuid.clone(),
        level: summoner.summoner_level,
        profile_icon_id: summoner.profile_icon_id,
    }
}

fn stored_player(
    platform: &str,
    account: &Account,
    summoner: &Summoner,
    now: DateTime<Utc>,
) -> StoredPlayer {
    StoredPlayer {
        puuid: account.puuid.clone(),
        game_name: account.game_name.clone().unwrap_or_default(),
        tag_line: account.tag_line.clone().unwrap_or_default(),
        region: region_for_platform(platform).to_string(),
        platform: platform.to_string(),
        summoner_level: Some(summoner.summoner_level),
        profile_icon_id: summoner.profile_icon_id,
        created_at: now,
        updated_at: now,
    }
}

fn ranked_rows(puuid: &str, overview: &RankedOverview, now: DateTime<Utc>) -> Vec<StoredRankedStats> {
    let queues = [
        ("RANKED_SOLO_5x5", &overview.solo),
        ("RANKED_FLEX_SR", &overview.flex),
    ];

    let mut rows = Vec::new();
    for (queue_type, snapshot) in queues {
        if let Some(snapshot) = snapshot {
            rows.push(StoredRankedStats {
                puuid: puuid.to_string(),
                queue_type: queue_type.to_string(),
                tier: snapshot.tier.clone(),
                rank: snapshot.rank.clone(),
                lp: snapshot.lp,
                wins: snapshot.wins,
                losses: snapshot.losses,
                winrate: snapshot.winrate,
                veteran: snapshot.veteran,
                hot_streak: snapshot.hot_streak,
                data_source: overview.data_source.label().to_string(),
                updated_at: now,
            });
        }
    }
    rows
}

fn stored_matches_from(matches: &[MatchDto], puuid: &str) -> Vec<StoredMatch> {
    matches
        .iter()
        .filter_map(|m| {
            let p = m.info.participants.iter().find(|p| p.puuid == puuid)?;
            Some(StoredMatch {
                puuid: puuid.to_string(),
                match_id: m.metadata.match_id.clone(),
                game_mode: m.info.game_mode.clone(),
                game_duration: m.info.game_duration,
                game_creation: creation_time(m.info.game_creation),
                champion_name: p.champion_name.clone(),
                kills: p.kills,
                deaths: p.deaths,
                assists: p.assists,
                win: p.win,
                total_damage: p.total_damage_dealt_to_champions,
                gold_earned: p.gold_earned,
                cs: p.total_cs(),
                vision_score: p.vision_score,
            })
        })
        .collect()
}

/// Match creation times arrive as epoch milliseconds; zero means the
/// upstream left the field out.
fn creation_time(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fetch::RiotClientConfig;
    use crate::models::{
        MatchInfo, MatchMetadata, MiniSeries, ParticipantDto, RankedSnapshot, RankedSource,
    };
    use crate::storage::MockStore;

    fn fixture_match(match_id: &str, puuid: &str, win: bool) -> MatchDto {
        MatchDto {
            metadata: MatchMetadata {
                match_id: match_id.to_string(),
                participants: vec![puuid.to_string()],
            },
            info: MatchInfo {
                game_creation: 1_700_000_000_000,
                game_duration: 1800,
                game_mode: "CLASSIC".to_string(),
                queue_id: 420,
                participants: vec![ParticipantDto {
                    puuid: puuid.to_string(),
                    win,
                    champion_name: "Ahri".to_string(),
                    kills: 4,
                    deaths: 2,
                    assists: 9,
                    total_minions_killed: 160,
                    neutral_minions_killed: 12,
                    gold_earned: 11_500,
                    total_damage_dealt_to_champions: 19_000,
                    vision_score: 22,
                    ..Default::default()
                }],
            },
        }
    }

    fn fixture_account() -> Account {
        Account {
            puuid: "p1".to_string(),
            game_name: Some("Test".to_string()),
            tag_line: Some("EUW".to_string()),
        }
    }

    fn fixture_summoner() -> Summoner {
        Summoner {
            id: Some("enc-1".to_string()),
            account_id: None,
            puuid: "p1".to_string(),
            name: Some("Test".to_string()),
            profile_icon_id: Some(100),
            summoner_level: 250,
        }
    }

    fn fixture_overview() -> RankedOverview {
        RankedOverview {
            solo: Some(RankedSnapshot {
                tier: "GOLD".to_string(),
                rank: "II".to_string(),
                lp: Some(54),
                wins: 40,
                losses: 20,
                total_games: 60,
                winrate: 66.7,
                veteran: false,
                hot_streak: true,
                series: Some(MiniSeries {
                    target: 3,
                    wins: 1,
                    losses: 0,
                    progress: "WNN".to_string(),
                }),
            }),
            flex: None,
            data_source: RankedSource::LeagueEntries,
            note: None,
        }
    }

    #[test]
    fn test_stored_matches_map_participant_fields() {
        let matches = vec![
            fixture_match("M1", "p1", true),
            fixture_match("M2", "someone-else", false),
        ];

        let rows = stored_matches_from(&matches, "p1");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].match_id, "M1");
        assert_eq!(rows[0].champion_name, "Ahri");
        assert_eq!(rows[0].cs, 172);
        assert!(rows[0].win);
        assert!(rows[0].game_creation.is_some());
    }

    #[test]
    fn test_creation_time_handles_missing_epoch() {
        assert!(creation_time(0).is_none());
        assert!(creation_time(-5).is_none());

        let parsed = creation_time(1_700_000_000_000).unwrap();
        assert_eq!(parsed.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_ranked_rows_skip_missing_queues() {
        let now = Utc::now();
        let rows = ranked_rows("p1", &fixture_overview(), now);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].queue_type, "RANKED_SOLO_5x5");
        assert_eq!(rows[0].tier, "GOLD");
        assert_eq!(rows[0].data_source, "Riot API (League Entries)");
    }

    #[test]
    fn test_player_identity_prefers_account_names() {
        let riot_id = RiotId::parse("Requested#TAG").unwrap();
        let identity = player_identity(&riot_id, &fixture_account(), &fixture_summoner());

        assert_eq!(identity.game_name, "Test");
        assert_eq!(identity.tag_line, "EUW");
        assert_eq!(identity.level, 250);

        let bare_account = Account {
            puuid: "p1".to_string(),
            game_name: None,
            tag_line: None,
        };
        let identity = player_identity(&riot_id, &bare_account, &fixture_summoner());
        assert_eq!(identity.game_name, "Requested");
        assert_eq!(identity.tag_line, "TAG");
    }

    #[tokio::test]
    async fn test_persist_writes_player_ranked_and_matches() {
        let store = Arc::new(MockStore::default());
        let client = Arc::new(RiotClient::new(RiotClientConfig::default()).unwrap());
        let orchestrator = CoachOrchestrator::new(client, BoundedFetcher::new(2))
            .with_store(store.clone());

        let matches = vec![fixture_match("M1", "p1", true)];
        orchestrator
            .persist(
                "euw1",
                &fixture_account(),
                &fixture_summoner(),
                &fixture_overview(),
                &matches,
            )
            .await
            .unwrap();

        let players = store.players.lock().unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].region, "europe");
        assert_eq!(players[0].platform, "euw1");

        let ranked = store.ranked.lock().unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].queue_type, "RANKED_SOLO_5x5");

        let stored = store.matches.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].match_id, "M1");
    }

    #[tokio::test]
    async fn test_persist_without_store_is_a_no_op() {
        let client = Arc::new(RiotClient::new(RiotClientConfig::default()).unwrap());
        let orchestrator = CoachOrchestrator::new(client, BoundedFetcher::new(2));

        orchestrator
            .persist(
                "euw1",
                &fixture_account(),
                &fixture_summoner(),
                &fixture_overview(),
                &[],
            )
            .await
            .unwrap();
    }

    #[test]
    fn test_analyze_request_defaults() {
        let request = AnalyzeRequest::new(RiotId::parse("Test#EUW").unwrap());

        assert_eq!(request.match_count, 20);
        assert_eq!(request.timeline_matches, 3);
        assert!(request.with_timelines);
        assert!(request.queue.is_none());
        assert!(request.platform.is_none());
    }
}
