//! Riot API gateway client.
//!
//! Translates logical lookups into requests against the geographically
//! sharded Riot API, with platform-to-region routing, a shared TTL cache
//! keyed per call, and a typed error classification of upstream responses.
//! The client never retries on its own; resilience lives in the callers'
//! retry policies (see [`fanout`]).

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::cache::TtlCache;
use crate::models::{
    Account, ApexTier, ChampionMastery, LeagueEntry, LeagueList, MatchDto, Summoner, TimelineDto,
};

pub mod fanout;

// Per-call-type cache lifetimes.
const ACCOUNT_TTL: Duration = Duration::from_secs(600);
const SUMMONER_TTL: Duration = Duration::from_secs(600);
const LEAGUE_TTL: Duration = Duration::from_secs(60);
const MATCH_IDS_TTL: Duration = Duration::from_secs(120);
const MATCH_TTL: Duration = Duration::from_secs(600);
const MASTERY_TTL: Duration = Duration::from_secs(600);

/// Most match ids the listing endpoint returns per page.
const MAX_MATCH_PAGE: u32 = 100;

/// Errors from the Riot API or the transport underneath it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Resource not found")]
    NotFound,

    #[error("Forbidden: API key rejected")]
    Forbidden,

    #[error("Rate limited by upstream")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("HTTP {status} from upstream: {body}")]
    Upstream { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether a caller-driven retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::RateLimited { .. } | FetchError::Timeout => true,
            FetchError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Map a platform shard to its regional routing domain.
///
/// Unmapped shards fall back to "europe".
pub fn region_for_platform(platform: &str) -> &'static str {
    match platform {
        "euw1" | "eun1" | "ru" | "tr1" => "europe",
        "na1" | "br1" | "la1" | "la2" | "oc1" => "americas",
        "kr" | "jp1" => "asia",
        "sg2" | "tw2" | "vn2" => "sea",
        _ => "europe",
    }
}

/// Configuration for the gateway client.
#[derive(Debug, Clone)]
pub struct RiotClientConfig {
    /// Riot developer API key, sent as `X-Riot-Token`.
    pub api_key: String,

    /// Default platform shard for calls that do not specify one.
    pub platform: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// API domain; platform or region subdomains are prepended.
    pub base_domain: String,
}

impl Default for RiotClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            platform: "euw1".to_string(),
            timeout: Duration::from_secs(10),
            base_domain: "api.riotgames.com".to_string(),
        }
    }
}

/// Stateless Riot API client with a shared response cache.
pub struct RiotClient {
    client: Client,
    config: RiotClientConfig,
    cache: TtlCache<Value>,
}

impl RiotClient {
    /// Create a client. Does not touch the network.
    pub fn new(config: RiotClientConfig) -> Result<Self, FetchError> {
        Self::with_cache(config, TtlCache::default())
    }

    /// Create a client with an explicitly sized response cache.
    pub fn with_cache(config: RiotClientConfig, cache: TtlCache<Value>) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Default platform shard from the configuration.
    pub fn default_platform(&self) -> &str {
        &self.config.platform
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    /// Host for platform-sharded endpoints (summoner, league, mastery).
    fn platform_host(&self, platform: &str) -> String {
        format!("https://{}.{}", platform, self.config.base_domain)
    }

    /// Host for region-sharded endpoints (account, match).
    fn regional_host(&self, platform: &str) -> String {
        format!(
            "https://{}.{}",
            region_for_platform(platform),
            self.config.base_domain
        )
    }

    /// Build a URL from a host and path segments, percent-encoding each
    /// segment (riot ids may contain spaces).
    fn build_url(host: &str, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(host).map_err(|e| FetchError::Transport(format!("bad host: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport("host cannot carry a path".to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// Cached GET returning the raw JSON body.
    async fn get_json(&self, url: Url, cache_key: &str, ttl: Duration) -> Result<Value, FetchError> {
        if let Some(hit) = self.cache.get(cache_key) {
            debug!("Cache hit for {}", cache_key);
            return Ok(hit);
        }

        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("X-Riot-Token", &self.config.api_key)
            .send()
            .await?;

        let value = classify_response(response).await?;
        self.cache.set_with_ttl(cache_key, value.clone(), ttl);
        Ok(value)
    }

    async fn get_typed<T: DeserializeOwned>(
        &self,
        url: Url,
        cache_key: &str,
        ttl: Duration,
    ) -> Result<T, FetchError> {
        let value = self.get_json(url, cache_key, ttl).await?;
        serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
    }

    // --- Account endpoints (region-sharded) ---

    pub async fn account_by_riot_id(
        &self,
        platform: &str,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Account, FetchError> {
        let host = self.regional_host(platform);
        let url = Self::build_url(
            &host,
            &[
                "riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line,
            ],
        )?;
        let key = format!(
            "account:riot-id:{}:{}:{}",
            region_for_platform(platform),
            game_name.to_lowercase(),
            tag_line.to_lowercase()
        );
        self.get_typed(url, &key, ACCOUNT_TTL).await
    }

    pub async fn account_by_puuid(
        &self,
        platform: &str,
        puuid: &str,
    ) -> Result<Account, FetchError> {
        let host = self.regional_host(platform);
        let url = Self::build_url(&host, &["riot", "account", "v1", "accounts", "by-puuid", puuid])?;
        let key = format!("account:puuid:{}:{}", region_for_platform(platform), puuid);
        self.get_typed(url, &key, ACCOUNT_TTL).await
    }

    // --- Summoner endpoints (platform-sharded) ---

    pub async fn summoner_by_puuid(
        &self,
        platform: &str,
        puuid: &str,
    ) -> Result<Summoner, FetchError> {
        let host = self.platform_host(platform);
        let url = Self::build_url(
            &host,
            &["lol", "summoner", "v4", "summoners", "by-puuid", puuid],
        )?;
        let key = format!("summoner:puuid:{}:{}", platform, puuid);
        self.get_typed(url, &key, SUMMONER_TTL).await
    }

    pub async fn summoner_by_id(
        &self,
        platform: &str,
        summoner_id: &str,
    ) -> Result<Summoner, FetchError> {
        let host = self.platform_host(platform);
        let url = Self::build_url(&host, &["lol", "summoner", "v4", "summoners", summoner_id])?;
        let key = format!("summoner:id:{}:{}", platform, summoner_id);
        self.get_typed(url, &key, SUMMONER_TTL).await
    }

    // --- League endpoints (platform-sharded) ---

    /// League entries for a summoner. A 404 means "no ranked record" and
    /// folds to an empty list.
    pub async fn league_entries_by_summoner(
        &self,
        platform: &str,
        summoner_id: &str,
    ) -> Result<Vec<LeagueEntry>, FetchError> {
        let host = self.platform_host(platform);
        let url = Self::build_url(
            &host,
            &["lol", "league", "v4", "entries", "by-summoner", summoner_id],
        )?;
        let key = format!("league:entries:{}:{}", platform, summoner_id);

        match self.get_typed(url, &key, LEAGUE_TTL).await {
            Ok(entries) => Ok(entries),
            Err(FetchError::NotFound) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Full listing for an apex league (challenger/grandmaster/master).
    pub async fn apex_league(
        &self,
        platform: &str,
        tier: ApexTier,
        queue: &str,
    ) -> Result<LeagueList, FetchError> {
        let host = self.platform_host(platform);
        let url = Self::build_url(
            &host,
            &["lol", "league", "v4", tier.league_path(), "by-queue", queue],
        )?;
        let key = format!("league:{}:{}:{}", tier.league_path(), platform, queue);
        self.get_typed(url, &key, LEAGUE_TTL).await
    }

    // --- Match endpoints (region-sharded) ---

    /// Page of match ids for a player, newest first. `count` is clamped
    /// to the upstream page limit.
    pub async fn match_ids_by_puuid(
        &self,
        platform: &str,
        puuid: &str,
        start: u32,
        count: u32,
        queue: Option<u32>,
    ) -> Result<Vec<String>, FetchError> {
        let count = count.min(MAX_MATCH_PAGE);
        let host = self.regional_host(platform);
        let mut url = Self::build_url(
            &host,
            &["lol", "match", "v5", "matches", "by-puuid", puuid, "ids"],
        )?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("start", &start.to_string());
            pairs.append_pair("count", &count.to_string());
            if let Some(queue) = queue {
                pairs.append_pair("queue", &queue.to_string());
            }
        }
        let queue_key = queue.map_or_else(|| "any".to_string(), |q| q.to_string());
        let key = format!(
            "match-ids:{}:{}:{}:{}:{}",
            region_for_platform(platform),
            puuid,
            start,
            count,
            queue_key
        );
        self.get_typed(url, &key, MATCH_IDS_TTL).await
    }

    pub async fn match_by_id(&self, platform: &str, match_id: &str) -> Result<MatchDto, FetchError> {
        let host = self.regional_host(platform);
        let url = Self::build_url(&host, &["lol", "match", "v5", "matches", match_id])?;
        let key = format!("match:{}:{}", region_for_platform(platform), match_id);
        self.get_typed(url, &key, MATCH_TTL).await
    }

    pub async fn timeline_by_id(
        &self,
        platform: &str,
        match_id: &str,
    ) -> Result<TimelineDto, FetchError> {
        let host = self.regional_host(platform);
        let url = Self::build_url(
            &host,
            &["lol", "match", "v5", "matches", match_id, "timeline"],
        )?;
        let key = format!("timeline:{}:{}", region_for_platform(platform), match_id);
        self.get_typed(url, &key, MATCH_TTL).await
    }

    // --- Mastery endpoints (platform-sharded) ---

    /// Champion masteries for a summoner, optionally only the top `count`.
    pub async fn champion_masteries(
        &self,
        platform: &str,
        summoner_id: &str,
        top: Option<u32>,
    ) -> Result<Vec<ChampionMastery>, FetchError> {
        let host = self.platform_host(platform);
        let mut segments = vec![
            "lol",
            "champion-mastery",
            "v4",
            "champion-masteries",
            "by-summoner",
            summoner_id,
        ];
        if top.is_some() {
            segments.push("top");
        }
        let mut url = Self::build_url(&host, &segments)?;
        if let Some(top) = top {
            url.query_pairs_mut()
                .append_pair("count", &top.to_string());
        }
        let top_key = top.map_or_else(|| "all".to_string(), |t| t.to_string());
        let key = format!("mastery:{}:{}:{}", platform, summoner_id, top_key);
        self.get_typed(url, &key, MASTERY_TTL).await
    }
}

/// Turn an upstream response into a value or a typed error.
async fn classify_response(response: reqwest::Response) -> Result<Value, FetchError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound);
    }

    if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
        return Err(FetchError::Forbidden);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        return Err(FetchError::RateLimited { retry_after_secs });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
}
