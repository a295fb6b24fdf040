use std::cmp::Reverse;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

pub const LEADERBOARD_CAPACITY: usize = 10;

/// A finished session's result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Score")]
    pub score: u64,
}

impl PlayerRecord {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Top results, best first. Never longer than [`LEADERBOARD_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(rename = "PlayersData", default)]
    entries: Vec<PlayerRecord>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalise arbitrary records: sort and truncate.
    pub fn from_entries(entries: Vec<PlayerRecord>) -> Self {
        let mut board = Self { entries };
        board.normalise();
        board
    }

    /// Add a record, keep the best ten. Returns the 1-based rank of the new
    /// record, or `None` if it did not make the board. Equal scores keep
    /// their insertion order, so a newcomer ranks below existing ties.
    pub fn insert(&mut self, record: PlayerRecord) -> Option<usize> {
        self.entries.push(record);
        let newest = self.entries.len() - 1;

        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        // stable: ties stay in insertion order
        order.sort_by_key(|&i| Reverse(self.entries[i].score));
        let rank = order.iter().position(|&i| i == newest);

        self.normalise();
        rank.filter(|&r| r < LEADERBOARD_CAPACITY).map(|r| r + 1)
    }

    fn normalise(&mut self) {
        self.entries.sort_by_key(|e| Reverse(e.score));
        self.entries.truncate(LEADERBOARD_CAPACITY);
    }

    pub fn entries(&self) -> &[PlayerRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub trait LeaderboardStore {
    /// Previously saved board; empty when nothing was saved yet.
    fn load(&self) -> Result<Leaderboard, PersistenceError>;

    /// Insert, sort, truncate and persist before returning. The updated board
    /// and the new record's rank are returned.
    fn insert(&mut self, record: PlayerRecord) -> Result<(Leaderboard, Option<usize>), PersistenceError>;

    /// `load`, degrading a read failure to an empty board.
    fn load_or_empty(&self) -> Leaderboard {
        self.load().unwrap_or_else(|e| {
            tracing::warn!("{e}; starting from an empty leaderboard");
            Leaderboard::new()
        })
    }
}

/// Board kept as `{"PlayersData": [{"Name": .., "Score": ..}]}` on disk
#[derive(Debug, Clone)]
pub struct JsonLeaderboardStore {
    path: PathBuf,
}

impl JsonLeaderboardStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, board: &Leaderboard) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(board)?;

        // write aside, then swap in, so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)
    }
}

impl LeaderboardStore for JsonLeaderboardStore {
    fn load(&self) -> Result<Leaderboard, PersistenceError> {
        let read_err = |reason: String| PersistenceError::Read {
            path: self.path.clone(),
            reason,
        };
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Leaderboard::new()),
            Err(e) => return Err(read_err(e.to_string())),
        };
        let board: Leaderboard =
            serde_json::from_slice(&bytes).map_err(|e| read_err(e.to_string()))?;
        // files edited by hand may be unsorted or too long
        Ok(Leaderboard::from_entries(board.entries))
    }

    fn insert(&mut self, record: PlayerRecord) -> Result<(Leaderboard, Option<usize>), PersistenceError> {
        let mut board = self.load_or_empty();
        let rank = board.insert(record);
        self.write(&board).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), entries = board.len(), "leaderboard saved");
        Ok((board, rank))
    }
}

/// Store that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboardStore {
    board: Leaderboard,
}

impl MemoryLeaderboardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardStore for MemoryLeaderboardStore {
    fn load(&self) -> Result<Leaderboard, PersistenceError> {
        Ok(self.board.clone())
    }

    fn insert(&mut self, record: PlayerRecord) -> Result<(Leaderboard, Option<usize>), PersistenceError> {
        let rank = self.board.insert(record);
        Ok((self.board.clone(), rank))
    }
}
