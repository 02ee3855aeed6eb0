//! Data Dragon asset resolution.
//!
//! Data Dragon is Riot's static game-data CDN: champion, item, spell,
//! and rune tables keyed by patch version. Tables change once per patch
//! so they are cached aggressively. Asset enrichment is cosmetic and
//! the callers treat failures as skippable.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::cache::TtlCache;
use crate::models::{AssetDetail, MatchCard, RuneDetails, RuneSummary};

const DDRAGON_BASE: &str = "https://ddragon.leagueoflegends.com";
const DEFAULT_LOCALE: &str = "en_US";

/// Tables are refreshed at most once per six hours; patches land less
/// often than that.
const ASSET_TTL: Duration = Duration::from_secs(21_600);

const ASSET_CACHE_SIZE: usize = 128;
const ASSET_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset request failed: {0}")]
    Http(String),

    #[error("failed to decode asset payload: {0}")]
    Decode(String),

    #[error("no game data versions published")]
    NoVersions,
}

/// Resolves raw asset ids on match cards into names and icon URLs.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn enrich_cards(&self, cards: &mut [MatchCard]) -> Result<(), AssetError>;

    /// Display name for a numeric champion key, if known.
    async fn champion_name(&self, key: i64) -> Result<Option<String>, AssetError>;
}

// --- Data Dragon payload shapes ---

#[derive(Debug, Clone, Deserialize)]
struct DdTable<T> {
    data: HashMap<String, T>,
}

#[derive(Debug, Clone, Deserialize)]
struct DdImage {
    full: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DdItem {
    name: String,
    image: DdImage,
}

#[derive(Debug, Clone, Deserialize)]
struct DdSpell {
    name: String,
    key: String,
    image: DdImage,
}

#[derive(Debug, Clone, Deserialize)]
struct DdChampion {
    name: String,
    key: String,
    image: DdImage,
}

#[derive(Debug, Clone, Deserialize)]
struct DdRuneStyle {
    id: i32,
    name: String,
    icon: String,
    slots: Vec<DdRuneSlot>,
}

#[derive(Debug, Clone, Deserialize)]
struct DdRuneSlot {
    runes: Vec<DdRune>,
}

#[derive(Debug, Clone, Deserialize)]
struct DdRune {
    id: i32,
    name: String,
    icon: String,
}

fn versioned_icon(base: &str, version: &str, kind: &str, file: &str) -> String {
    format!("{}/cdn/{}/img/{}/{}", base, version, kind, file)
}

/// Rune icons live outside the versioned tree.
fn static_icon(base: &str, icon_path: &str) -> String {
    format!("{}/cdn/img/{}", base, icon_path)
}

/// Flattened rune lookup built from the reforged rune tree.
struct RuneIndex {
    styles: HashMap<i32, AssetDetail>,
    runes: HashMap<i32, AssetDetail>,
}

impl RuneIndex {
    fn build(styles: &[DdRuneStyle], base_url: &str) -> Self {
        let mut style_map = HashMap::new();
        let mut rune_map = HashMap::new();
        for style in styles {
            style_map.insert(
                style.id,
                AssetDetail {
                    name: style.name.clone(),
                    icon: static_icon(base_url, &style.icon),
                },
            );
            for slot in &style.slots {
                for rune in &slot.runes {
                    rune_map.insert(
                        rune.id,
                        AssetDetail {
                            name: rune.name.clone(),
                            icon: static_icon(base_url, &rune.icon),
                        },
                    );
                }
            }
        }
        Self {
            styles: style_map,
            runes: rune_map,
        }
    }

    fn resolve(&self, summary: &RuneSummary) -> RuneDetails {
        RuneDetails {
            primary_style: summary
                .primary_style_id
                .and_then(|id| self.styles.get(&id).cloned()),
            sub_style: summary
                .sub_style_id
                .and_then(|id| self.styles.get(&id).cloned()),
            keystone: summary
                .keystone_id
                .and_then(|id| self.runes.get(&id).cloned()),
            perks: summary
                .perk_ids
                .iter()
                .filter_map(|id| self.runes.get(id).cloned())
                .collect(),
        }
    }
}

/// Client for the Data Dragon CDN.
pub struct DdragonClient {
    client: Client,
    cache: TtlCache<Value>,
    base_url: String,
    locale: String,
}

impl DdragonClient {
    pub fn new() -> Result<Self, AssetError> {
        let client = Client::builder()
            .timeout(ASSET_TIMEOUT)
            .build()
            .map_err(|e| AssetError::Http(e.to_string()))?;

        Ok(Self {
            client,
            cache: TtlCache::new(ASSET_TTL, ASSET_CACHE_SIZE),
            base_url: DDRAGON_BASE.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
        })
    }

    async fn get_json(&self, url: &str, cache_key: &str) -> Result<Value, AssetError> {
        if let Some(hit) = self.cache.get(cache_key) {
            return Ok(hit);
        }

        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AssetError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AssetError::Http(format!(
                "status {} from {}",
                response.status().as_u16(),
                url
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| AssetError::Decode(e.to_string()))?;
        self.cache.set(cache_key, value.clone());
        Ok(value)
    }

    async fn get_typed<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        cache_key: &str,
    ) -> Result<T, AssetError> {
        let value = self.get_json(url, cache_key).await?;
        serde_json::from_value(value).map_err(|e| AssetError::Decode(e.to_string()))
    }

    /// Newest published game data version.
    pub async fn latest_version(&self) -> Result<String, AssetError> {
        let url = format!("{}/api/versions.json", self.base_url);
        let versions: Vec<String> = self.get_typed(&url, "ddragon:versions").await?;
        versions.into_iter().next().ok_or(AssetError::NoVersions)
    }

    fn table_url(&self, version: &str, table: &str) -> String {
        format!(
            "{}/cdn/{}/data/{}/{}.json",
            self.base_url, version, self.locale, table
        )
    }

    async fn item_table(&self, version: &str) -> Result<HashMap<String, DdItem>, AssetError> {
        let table: DdTable<DdItem> = self
            .get_typed(
                &self.table_url(version, "item"),
                &format!("ddragon:items:{}", version),
            )
            .await?;
        Ok(table.data)
    }

    /// Spell lookup keyed by the numeric id matches carry.
    async fn spell_table(&self, version: &str) -> Result<HashMap<i32, DdSpell>, AssetError> {
        let table: DdTable<DdSpell> = self
            .get_typed(
                &self.table_url(version, "summoner"),
                &format!("ddragon:spells:{}", version),
            )
            .await?;

        let mut by_id = HashMap::new();
        for spell in table.data.into_values() {
            if let Ok(id) = spell.key.parse::<i32>() {
                by_id.insert(id, spell);
            }
        }
        Ok(by_id)
    }

    async fn champion_table(
        &self,
        version: &str,
    ) -> Result<HashMap<String, DdChampion>, AssetError> {
        let table: DdTable<DdChampion> = self
            .get_typed(
                &self.table_url(version, "champion"),
                &format!("ddragon:champions:{}", version),
            )
            .await?;
        Ok(table.data)
    }

    async fn rune_table(&self, version: &str) -> Result<Vec<DdRuneStyle>, AssetError> {
        self.get_typed(
            &self.table_url(version, "runesReforged"),
            &format!("ddragon:runes:{}", version),
        )
        .await
    }
}

#[async_trait]
impl AssetResolver for DdragonClient {
    async fn enrich_cards(&self, cards: &mut [MatchCard]) -> Result<(), AssetError> {
        if cards.is_empty() {
            return Ok(());
        }

        let version = self.latest_version().await?;
        let items = self.item_table(&version).await?;
        let spells = self.spell_table(&version).await?;
        let champions = self.champion_table(&version).await?;
        let rune_index = RuneIndex::build(&self.rune_table(&version).await?, &self.base_url);

        for card in cards.iter_mut() {
            card.champion_detail = champions.get(&card.champion).map(|champion| AssetDetail {
                name: champion.name.clone(),
                icon: versioned_icon(&self.base_url, &version, "champion", &champion.image.full),
            });

            // Empty slots (id 0) and unknown ids are dropped rather than
            // rendered as gaps.
            card.items_detail = Some(
                card.items
                    .iter()
                    .filter(|id| **id != 0)
                    .filter_map(|id| items.get(&id.to_string()))
                    .map(|item| AssetDetail {
                        name: item.name.clone(),
                        icon: versioned_icon(&self.base_url, &version, "item", &item.image.full),
                    })
                    .collect(),
            );

            card.spells_detail = Some(
                card.spells
                    .iter()
                    .filter_map(|id| spells.get(id))
                    .map(|spell| AssetDetail {
                        name: spell.name.clone(),
                        icon: versioned_icon(&self.base_url, &version, "spell", &spell.image.full),
                    })
                    .collect(),
            );

            if let Some(runes) = &card.runes {
                card.runes_detail = Some(rune_index.resolve(runes));
            }
        }

        Ok(())
    }

    async fn champion_name(&self, key: i64) -> Result<Option<String>, AssetError> {
        let version = self.latest_version().await?;
        let champions = self.champion_table(&version).await?;
        let key = key.to_string();
        Ok(champions
            .values()
            .find(|champion| champion.key == key)
            .map(|champion| champion.name.clone()))
    }
}

// --- Test helpers ---

#[cfg(test)]
pub struct MockAssetResolver {
    pub fail: bool,
}

#[cfg(test)]
#[async_trait]
impl AssetResolver for MockAssetResolver {
    async fn enrich_cards(&self, cards: &mut [MatchCard]) -> Result<(), AssetError> {
        if self.fail {
            return Err(AssetError::Http("mock failure".to_string()));
        }
        for card in cards.iter_mut() {
            card.champion_detail = Some(AssetDetail {
                name: card.champion.clone(),
                icon: format!("mock://champion/{}", card.champion),
            });
        }
        Ok(())
    }

    async fn champion_name(&self, key: i64) -> Result<Option<String>, AssetError> {
        if self.fail {
            return Err(AssetError::Http("mock failure".to_string()));
        }
        Ok(Some(format!("Champion{}", key)))
    }
}
