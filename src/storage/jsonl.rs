//! JSONL (JSON Lines) storage.
//!
//! Each data file holds one record type, one JSON object per line.
//! Files are append only; rereading applies newest-wins semantics for
//! player identities and dedupes match history.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{PlayerStore, StorageError, StoredMatch, StoredPlayer, StoredRankedStats};

/// Record types persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFile {
    Players,
    RankedStats,
    MatchHistory,
}

impl DataFile {
    /// Get the filename for this record type.
    pub fn filename(&self) -> &'static str {
        match self {
            DataFile::Players => "players.jsonl",
            DataFile::RankedStats => "ranked_stats.jsonl",
            DataFile::MatchHistory => "match_history.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single record to the file.
    pub fn append(&self, record: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(record)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended record to {:?}", self.path);
        Ok(())
    }

    /// Append multiple records to the file.
    pub fn append_batch(&self, records: &[T]) -> Result<usize, StorageError> {
        if records.is_empty() {
            return Ok(0);
        }

        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        debug!("Appended {} records to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all records from the file. Unparseable lines are logged and
    /// skipped so one corrupt line cannot poison the whole file.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        let mut line_num = 0;

        for line in reader.lines() {
            line_num += 1;
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        line_num, self.path, e
                    );
                }
            }
        }

        debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }
}

struct StoreState {
    players: HashMap<String, StoredPlayer>,
    seen_matches: HashMap<String, HashSet<String>>,
}

/// Append-only player store rooted at a data directory.
pub struct JsonlStore {
    data_dir: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonlStore {
    /// Open (or create) a store, replaying existing files to rebuild
    /// the in-memory indexes.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;

        let mut players = HashMap::new();
        let player_reader: JsonlReader<StoredPlayer> =
            JsonlReader::new(data_dir.join(DataFile::Players.filename()));
        for player in player_reader.read_all()? {
            // Later rows win; the file is append only.
            players.insert(player.puuid.clone(), player);
        }

        let mut seen_matches: HashMap<String, HashSet<String>> = HashMap::new();
        let match_reader: JsonlReader<StoredMatch> =
            JsonlReader::new(data_dir.join(DataFile::MatchHistory.filename()));
        for row in match_reader.read_all()? {
            seen_matches
                .entry(row.puuid.clone())
                .or_default()
                .insert(row.match_id);
        }

        info!(
            "Opened player store at {:?} ({} known players)",
            data_dir,
            players.len()
        );
        Ok(Self {
            data_dir,
            state: Mutex::new(StoreState {
                players,
                seen_matches,
            }),
        })
    }

    fn writer<T: Serialize>(&self, file: DataFile) -> JsonlWriter<T> {
        JsonlWriter::new(self.data_dir.join(file.filename()))
    }

    /// Current identity row for a player, if one was ever stored.
    pub fn player(&self, puuid: &str) -> Option<StoredPlayer> {
        self.state
            .lock()
            .expect("store lock poisoned")
            .players
            .get(puuid)
            .cloned()
    }

    /// How many distinct matches are stored for a player.
    pub fn known_match_count(&self, puuid: &str) -> usize {
        self.state
            .lock()
            .expect("store lock poisoned")
            .seen_matches
            .get(puuid)
            .map_or(0, |ids| ids.len())
    }
}

#[async_trait]
impl PlayerStore for JsonlStore {
    async fn upsert_player(&self, mut player: StoredPlayer) -> Result<(), StorageError> {
        {
            let mut state = self.state.lock().expect("store lock poisoned");
            if let Some(existing) = state.players.get(&player.puuid) {
                player.created_at = existing.created_at;
            }
            state.players.insert(player.puuid.clone(), player.clone());
        }

        self.writer(DataFile::Players).append(&player)
    }

    async fn record_ranked(&self, rows: Vec<StoredRankedStats>) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        self.writer(DataFile::RankedStats).append_batch(&rows)?;
        Ok(())
    }

    async fn append_matches(
        &self,
        puuid: &str,
        rows: Vec<StoredMatch>,
    ) -> Result<usize, StorageError> {
        let fresh: Vec<StoredMatch> = {
            let mut state = self.state.lock().expect("store lock poisoned");
            let seen = state.seen_matches.entry(puuid.to_string()).or_default();
            rows.into_iter()
                .filter(|row| seen.insert(row.match_id.clone()))
                .collect()
        };

        if fresh.is_empty() {
            return Ok(0);
        }
        self.writer(DataFile::MatchHistory).append_batch(&fresh)
    }
}
