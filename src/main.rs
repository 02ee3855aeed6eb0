use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rift_coach::assets::{AssetResolver, DdragonClient};
use rift_coach::cache::TtlCache;
use rift_coach::coach::{AnalyzeRequest, CoachOrchestrator};
use rift_coach::config::AppConfig;
use rift_coach::fetch::fanout::BoundedFetcher;
use rift_coach::fetch::RiotClient;
use rift_coach::lcu::{LcuClient, LocalSession};
use rift_coach::leaderboard::LeaderboardAggregator;
use rift_coach::models::{ChampionMastery, PlayerIdentity, RankedOverview, RiotId};
use rift_coach::ranked::RankedResolver;
use rift_coach::storage::JsonlStore;

#[derive(Parser)]
#[command(name = "rift-coach")]
#[command(about = "League of Legends coaching reports from the Riot API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a full coaching report for a player
    Analyze {
        /// Riot ID in GameName#TAG form
        riot_id: String,

        /// Platform shard (e.g. "euw1", "na1")
        #[arg(long)]
        platform: Option<String>,

        /// Number of recent matches to analyze
        #[arg(long, default_value = "20")]
        count: u32,

        /// Restrict to a queue id (420 solo, 440 flex)
        #[arg(long)]
        queue: Option<u32>,

        /// Skip per-match timeline digests
        #[arg(long)]
        no_timelines: bool,

        /// Consult the local League client for ranked data
        #[arg(long)]
        local_session: bool,
    },

    /// Show the apex ladder with resolved player identities
    Leaderboard {
        /// Platform shard (e.g. "euw1", "na1")
        #[arg(long)]
        platform: Option<String>,

        /// Ranked queue name
        #[arg(long, default_value = "RANKED_SOLO_5x5")]
        queue: String,

        /// Players to return (1-200)
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show a player's ranked standing
    Ranked {
        /// Riot ID in GameName#TAG form; defaults to the logged-in
        /// player when --local-session is set
        riot_id: Option<String>,

        /// Platform shard (e.g. "euw1", "na1")
        #[arg(long)]
        platform: Option<String>,

        /// Consult the local League client first
        #[arg(long)]
        local_session: bool,
    },

    /// Show a player's champion mastery
    Mastery {
        /// Riot ID in GameName#TAG form
        riot_id: String,

        /// Platform shard (e.g. "euw1", "na1")
        #[arg(long)]
        platform: Option<String>,

        /// Only the top N champions
        #[arg(long, default_value = "10")]
        top: u32,
    },
}

/// Ranked overview paired with who it is about.
#[derive(Serialize)]
struct RankedReport {
    player: PlayerIdentity,

    #[serde(flatten)]
    overview: RankedOverview,
}

/// Mastery record with the champion name resolved when possible.
#[derive(Serialize)]
struct MasteryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    champion: Option<String>,

    #[serde(flatten)]
    mastery: ChampionMastery,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting rift-coach v{}", env!("CARGO_PKG_VERSION"));

    let config =
        AppConfig::load(Path::new(&cli.config)).context("Failed to load configuration")?;

    let cache = TtlCache::new(
        Duration::from_secs(config.cache.default_ttl_secs),
        config.cache.max_size,
    );
    let client = Arc::new(
        RiotClient::with_cache(config.riot.client_config(), cache)
            .context("Failed to create Riot API client")?,
    );
    let fetcher =
        BoundedFetcher::with_policy(config.fanout.concurrency, config.fanout.retry_policy());

    match cli.command {
        Commands::Analyze {
            riot_id,
            platform,
            count,
            queue,
            no_timelines,
            local_session,
        } => {
            let riot_id = parse_riot_id(&riot_id)?;

            let mut orchestrator = CoachOrchestrator::new(client.clone(), fetcher);
            if config.assets.enabled {
                let ddragon =
                    DdragonClient::new().context("Failed to create Data Dragon client")?;
                orchestrator = orchestrator.with_assets(Arc::new(ddragon));
            }
            if config.store.enabled {
                let store = JsonlStore::open(config.store.data_dir.clone())
                    .context("Failed to open data directory")?;
                orchestrator = orchestrator.with_store(Arc::new(store));
            }
            if local_session {
                orchestrator = orchestrator.with_local_session(local_client(&config)?);
            }

            let mut request = AnalyzeRequest::new(riot_id);
            request.platform = platform;
            request.match_count = count;
            request.queue = queue;
            request.with_timelines = !no_timelines;

            let report = orchestrator.analyze(&request).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Leaderboard {
            platform,
            queue,
            limit,
        } => {
            let platform = platform.unwrap_or_else(|| client.default_platform().to_string());

            let aggregator = LeaderboardAggregator::new(client.clone(), fetcher);
            let board = aggregator.assemble(&platform, &queue, limit).await?;

            println!("{}", serde_json::to_string_pretty(&board)?);
        }
        Commands::Ranked {
            riot_id,
            platform,
            local_session,
        } => {
            let platform = platform.unwrap_or_else(|| client.default_platform().to_string());

            let local = if local_session {
                Some(local_client(&config)?)
            } else {
                None
            };
            let riot_id = match riot_id {
                Some(raw) => parse_riot_id(&raw)?,
                None => {
                    let session = local
                        .as_ref()
                        .context("A Riot ID is required unless --local-session is set")?;
                    logged_in_riot_id(session.as_ref()).await?
                }
            };

            let account = client
                .account_by_riot_id(&platform, &riot_id.game_name, &riot_id.tag_line)
                .await?;
            let summoner = client.summoner_by_puuid(&platform, &account.puuid).await?;

            let mut resolver = RankedResolver::new(client.clone(), fetcher);
            if let Some(session) = local {
                resolver = resolver.with_local_session(session);
            }
            let overview = resolver.resolve(&platform, &account, &summoner).await;

            let report = RankedReport {
                player: PlayerIdentity {
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
                },
                overview,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Mastery {
            riot_id,
            platform,
            top,
        } => {
            let riot_id = parse_riot_id(&riot_id)?;
            let platform = platform.unwrap_or_else(|| client.default_platform().to_string());

            let account = client
                .account_by_riot_id(&platform, &riot_id.game_name, &riot_id.tag_line)
                .await?;
            let summoner = client.summoner_by_puuid(&platform, &account.puuid).await?;
            let summoner_id = summoner
                .id
                .clone()
                .context("Summoner record has no id; mastery lookup unavailable")?;

            let masteries = client
                .champion_masteries(&platform, &summoner_id, Some(top))
                .await?;

            let resolver = if config.assets.enabled {
                match DdragonClient::new() {
                    Ok(ddragon) => Some(ddragon),
                    Err(e) => {
                        tracing::warn!("Champion name lookup unavailable: {}", e);
                        None
                    }
                }
            } else {
                None
            };

            let mut entries: Vec<MasteryEntry> = Vec::with_capacity(masteries.len());
            for mastery in masteries {
                let champion = match &resolver {
                    Some(ddragon) => ddragon
                        .champion_name(mastery.champion_id)
                        .await
                        .ok()
                        .flatten(),
                    None => None,
                };
                entries.push(MasteryEntry { champion, mastery });
            }

            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

/// Parse a `GameName#TAG` Riot ID argument.
fn parse_riot_id(input: &str) -> Result<RiotId> {
    RiotId::parse(input)
        .with_context(|| format!("Invalid Riot ID (expected GameName#TAG): {}", input))
}

/// Ask the local client who is logged in.
async fn logged_in_riot_id(session: &dyn LocalSession) -> Result<RiotId> {
    let summoner = session
        .current_summoner()
        .await
        .context("Failed to read the logged-in player from the local client")?;

    if summoner.game_name.is_empty() || summoner.tag_line.is_empty() {
        anyhow::bail!("Local client did not report a Riot ID; pass one explicitly");
    }

    Ok(RiotId {
        game_name: summoner.game_name,
        tag_line: summoner.tag_line,
    })
}

/// Build the local League client connector from configuration.
fn local_client(config: &AppConfig) -> Result<Arc<dyn LocalSession>> {
    if !config.local_session.enabled {
        anyhow::bail!(
            "local_session is not enabled in the configuration; set [local_session] enabled, port and token"
        );
    }

    let client = LcuClient::new(config.local_session.port, &config.local_session.token)
        .context("Failed to create League client connector")?;
    Ok(Arc::new(client))
}
