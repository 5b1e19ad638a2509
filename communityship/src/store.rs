//! Persisted game state.
//!
//! The state is split over several JSON files under one root directory. [`FileStore::update`]
//! is the only way to change them: it holds the directory lock for the whole
//! load-modify-save cycle and replaces each file atomically.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{archive::RoundArchive, session::GameState};

pub use self::lock::{DirLock, LOCK_FILE};

mod lock;

const BOARD_FILE: &str = "game/board.json";
const SHIPS_FILE: &str = "game/ships.json";
const LEADERBOARD_FILE: &str = "game2/leaderboard.json";
const ALL_TIME_FILE: &str = "game2/all_time_leaderboard.json";
const HISTORY_FILE: &str = "game2/move_history.json";
const ACHIEVEMENTS_FILE: &str = "game2/achievements.json";
const ATTEMPTS_FILE: &str = "game2/duplicate_attempts.json";
const IP_TRACKING_FILE: &str = "game2/ip_tracking.json";
const ROUNDS_DIR: &str = "rounds";

/// Error reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file could not be read or written.
    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A file exists but does not hold valid state.
    #[error("{} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Another process holds the state lock.
    #[error("{} is held by another process (gave up after {attempts} attempts)", .path.display())]
    Locked { path: PathBuf, attempts: usize },
    /// An archive for this round was already written.
    #[error("round {0} has already been archived")]
    RoundExists(u32),
}

impl StoreError {
    fn io(path: &Path) -> impl '_ + FnOnce(io::Error) -> Self {
        move |source| StoreError::Io {
            path: path.to_owned(),
            source,
        }
    }
}

/// Somewhere the game state and round archives are kept.
pub trait StateStore {
    /// Load the current state. Missing pieces load as empty.
    fn load(&self) -> Result<GameState, StoreError>;

    /// Replace the current state.
    fn save(&mut self, state: &GameState) -> Result<(), StoreError>;

    /// Number of rounds archived so far.
    fn round_count(&self) -> Result<u32, StoreError>;

    /// Store the archive of a finished round. Archives are never overwritten.
    fn write_round(&mut self, archive: &RoundArchive) -> Result<(), StoreError>;

    /// Every archived round, oldest first.
    fn rounds(&self) -> Result<Vec<RoundArchive>, StoreError>;
}

/// State kept as JSON files under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    lock_attempts: usize,
    lock_delay: Duration,
}

impl FileStore {
    /// Construct a store rooted at `root`. Nothing is touched until the store is used.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_attempts: 5,
            lock_delay: Duration::from_millis(500),
        }
    }

    /// Change how often and how far apart a held lock is retried.
    pub fn with_lock_retry(mut self, attempts: usize, delay: Duration) -> Self {
        self.lock_attempts = attempts;
        self.lock_delay = delay;
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `f` on the current state while holding the directory lock. The state is
    /// saved only if `f` succeeds; on error nothing is written.
    pub fn update<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self, &mut GameState) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _lock = DirLock::acquire(&self.root, self.lock_attempts, self.lock_delay)?;
        let mut state = self.load()?;
        let value = f(self, &mut state)?;
        self.save(&state)?;
        Ok(value)
    }

    fn rounds_dir(&self) -> PathBuf {
        self.root.join(ROUNDS_DIR)
    }

    fn round_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.rounds_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&dir)(e)),
        };
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(StoreError::io(&dir))?.path();
            let is_round = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.starts_with("round_") && name.ends_with(".json"));
            if is_round {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<GameState, StoreError> {
        let state = GameState {
            board: read_json(&self.root.join(BOARD_FILE))?,
            ships: read_json(&self.root.join(SHIPS_FILE))?,
            leaderboard: read_json(&self.root.join(LEADERBOARD_FILE))?,
            all_time: read_json(&self.root.join(ALL_TIME_FILE))?,
            history: read_json(&self.root.join(HISTORY_FILE))?,
            achievements: read_json(&self.root.join(ACHIEVEMENTS_FILE))?,
            attempts: read_json(&self.root.join(ATTEMPTS_FILE))?,
            ip_tracking: read_json(&self.root.join(IP_TRACKING_FILE))?,
        };
        log::debug!(
            "loaded state from {}: {} ship cells, {} players, {} moves",
            self.root.display(),
            state.ships.len(),
            state.leaderboard.len(),
            state.history.len()
        );
        if let Err(e) = state.check_integrity() {
            log::warn!("board integrity: {}", e);
        }
        Ok(state)
    }

    fn save(&mut self, state: &GameState) -> Result<(), StoreError> {
        write_json(&self.root.join(BOARD_FILE), &state.board)?;
        write_json(&self.root.join(SHIPS_FILE), &state.ships)?;
        write_json(&self.root.join(LEADERBOARD_FILE), &state.leaderboard)?;
        write_json(&self.root.join(ALL_TIME_FILE), &state.all_time)?;
        write_json(&self.root.join(HISTORY_FILE), &state.history)?;
        write_json(&self.root.join(ACHIEVEMENTS_FILE), &state.achievements)?;
        write_json(&self.root.join(ATTEMPTS_FILE), &state.attempts)?;
        write_json(&self.root.join(IP_TRACKING_FILE), &state.ip_tracking)?;
        Ok(())
    }

    fn round_count(&self) -> Result<u32, StoreError> {
        Ok(self.round_files()?.len() as u32)
    }

    fn write_round(&mut self, archive: &RoundArchive) -> Result<(), StoreError> {
        let path = self.rounds_dir().join(archive.file_name());
        if path.exists() {
            return Err(StoreError::RoundExists(archive.round()));
        }
        write_json(&path, archive)?;
        log::info!("archived round {} to {}", archive.round(), path.display());
        Ok(())
    }

    fn rounds(&self) -> Result<Vec<RoundArchive>, StoreError> {
        self.round_files()?
            .iter()
            .map(|path| read_file(path))
            .collect()
    }
}

/// Read a JSON file, treating a missing file as the default value.
fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Ok(T::default());
    }
    read_file(path)
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = fs::read_to_string(path).map_err(StoreError::io(path))?;
    serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
        path: path.to_owned(),
        source,
    })
}

/// Write pretty-printed JSON to a temporary sibling, then rename it over `path`.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
    }
    let mut text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Corrupt {
        path: path.to_owned(),
        source,
    })?;
    text.push('\n');
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).map_err(StoreError::io(&tmp))?;
    fs::rename(&tmp, path).map_err(StoreError::io(path))
}

/// State kept in memory, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: GameState,
    rounds: Vec<RoundArchive>,
}

impl MemoryStore {
    /// Construct a store holding `state` and no archived rounds.
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            rounds: Vec::new(),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<GameState, StoreError> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &GameState) -> Result<(), StoreError> {
        self.state = state.clone();
        Ok(())
    }

    fn round_count(&self) -> Result<u32, StoreError> {
        Ok(self.rounds.len() as u32)
    }

    fn write_round(&mut self, archive: &RoundArchive) -> Result<(), StoreError> {
        if self.rounds.iter().any(|r| r.round() == archive.round()) {
            return Err(StoreError::RoundExists(archive.round()));
        }
        self.rounds.push(archive.clone());
        Ok(())
    }

    fn rounds(&self) -> Result<Vec<RoundArchive>, StoreError> {
        Ok(self.rounds.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::{
        board::{Coordinate, Mark},
        ships::ShipMap,
    };

    static SCRATCH: AtomicUsize = AtomicUsize::new(0);

    /// A fresh, empty directory for one test.
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "communityship-{}-{}-{}",
            name,
            std::process::id(),
            SCRATCH.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn sample_state() -> GameState {
        let mut state = GameState::default();
        let cells: [Coordinate; 2] = ["B4".parse().unwrap(), "B5".parse().unwrap()];
        state.ships.place("patrol", &cells).unwrap();
        state.board[cells[0]] = Mark::Hit;
        state.ip_tracking.record_violation("0123456789abcdef", Utc::now());
        state
    }

    #[test]
    fn missing_files_load_as_empty() {
        let dir = scratch_dir("empty");
        let state = FileStore::new(&dir).load().unwrap();
        assert_eq!(state, GameState::default());
    }

    #[test]
    fn save_then_load() {
        let dir = scratch_dir("save");
        let mut store = FileStore::new(&dir);
        let state = sample_state();
        store.save(&state).unwrap();
        assert!(dir.join(BOARD_FILE).exists());
        assert!(dir.join(ATTEMPTS_FILE).exists());
        assert!(dir.join(IP_TRACKING_FILE).exists());
        assert_eq!(store.load().unwrap(), state);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupt_file_names_its_path() {
        let dir = scratch_dir("corrupt");
        let mut store = FileStore::new(&dir);
        store.save(&GameState::default()).unwrap();
        fs::write(dir.join(SHIPS_FILE), "{ not json").unwrap();
        match store.load() {
            Err(StoreError::Corrupt { path, .. }) => assert!(path.ends_with(SHIPS_FILE)),
            other => panic!("expected corrupt ships file, got {:?}", other),
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_update_writes_nothing() {
        let dir = scratch_dir("rollback");
        let mut store = FileStore::new(&dir);
        store.save(&sample_state()).unwrap();
        let result: Result<(), StoreError> = store.update(|_, state| {
            state.ships = ShipMap::new();
            Err(StoreError::RoundExists(1))
        });
        assert!(result.is_err());
        assert_eq!(store.load().unwrap(), sample_state());

        let moves: Result<usize, StoreError> = store.update(|_, state| {
            state.board = Default::default();
            Ok(state.ships.len())
        });
        assert_eq!(moves.unwrap(), 2);
        assert_eq!(store.load().unwrap().board.played(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn update_fails_while_locked() {
        let dir = scratch_dir("held");
        let mut store = FileStore::new(&dir).with_lock_retry(2, Duration::from_millis(1));
        let held = DirLock::acquire(&dir, 1, Duration::from_millis(1)).unwrap();
        let result: Result<(), StoreError> = store.update(|_, _| Ok(()));
        assert!(matches!(result, Err(StoreError::Locked { .. })));
        drop(held);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn update_recovers_from_a_killed_run() {
        let dir = scratch_dir("killed");
        let mut store = FileStore::new(&dir).with_lock_retry(3, Duration::from_millis(1));
        store.save(&sample_state()).unwrap();
        fs::write(dir.join(LOCK_FILE), "99999\n").unwrap();
        for _ in 0..3 {
            let cells: Result<usize, StoreError> = store.update(|_, state| Ok(state.ships.len()));
            assert_eq!(cells.unwrap(), 2);
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rounds_are_numbered_and_never_overwritten() {
        let dir = scratch_dir("rounds");
        let mut store = FileStore::new(&dir);
        assert_eq!(store.round_count().unwrap(), 0);
        let state = sample_state();
        let archive = state.archive_round(1, None, Utc::now());
        store.write_round(&archive).unwrap();
        assert!(dir.join("rounds/round_001.json").exists());
        assert_eq!(store.round_count().unwrap(), 1);
        assert!(matches!(
            store.write_round(&archive),
            Err(StoreError::RoundExists(1))
        ));
        let rounds = store.rounds().unwrap();
        assert_eq!(rounds, vec![archive]);
        fs::remove_dir_all(&dir).unwrap();
    }
}
