//! Best-score table: one entry per player name, highest first, top ten only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const MAX_ENTRIES: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

/// Receives the final score of a lost game.
pub trait ScoreSink {
    fn submit(&mut self, name: &str, score: u32);
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn best(&self) -> u32 {
        self.entries.first().map_or(0, |e| e.score)
    }

    pub fn record(&mut self, name: &str, score: u32) {
        self.entries.push(ScoreEntry { name: name.to_string(), score });
        self.clean();
    }

    /// Keep each name's best (names compared case-insensitively), sort
    /// descending and truncate.
    fn clean(&mut self) {
        let mut best: HashMap<String, ScoreEntry> = HashMap::new();
        for entry in self.entries.drain(..) {
            let key = entry.name.to_lowercase();
            match best.get(&key) {
                Some(kept) if kept.score >= entry.score => {}
                _ => {
                    best.insert(key, entry);
                }
            }
        }
        let mut entries: Vec<ScoreEntry> = best.into_values().collect();
        // Name as a tiebreak so equal scores keep a stable order.
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        entries.truncate(MAX_ENTRIES);
        self.entries = entries;
    }

    /// A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => return Err(GameError::Io { path: path.to_path_buf(), source }),
        };
        let mut board: Leaderboard = serde_json::from_str(&raw).map_err(|e| GameError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        board.clean();
        Ok(board)
    }

    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let raw = serde_json::to_string_pretty(self).map_err(|e| GameError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ScoreSink for Leaderboard {
    fn submit(&mut self, name: &str, score: u32) {
        self.record(name, score);
    }
}

/// A leaderboard kept in a JSON file; every submission is written through.
#[derive(Clone, Debug)]
pub struct ScoreFile {
    path: PathBuf,
    board: Leaderboard,
}

impl ScoreFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GameError> {
        let path = path.into();
        let board = Leaderboard::load(&path)?;
        Ok(Self { path, board })
    }

    pub fn board(&self) -> &Leaderboard {
        &self.board
    }
}

impl ScoreSink for ScoreFile {
    fn submit(&mut self, name: &str, score: u32) {
        self.board.record(name, score);
        match self.board.save(&self.path) {
            Ok(()) => info!("saved score {score} for {name}"),
            Err(e) => warn!("could not save score table: {e}"),
        }
    }
}
