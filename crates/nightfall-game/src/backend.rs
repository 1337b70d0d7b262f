//! Persistence backends for game records.
//!
//! A backend stores one record per game, keyed by [`GameId`]. The store
//! calls [`Backend::persist`] once per mutating command, before the change
//! becomes visible in memory, so a failed write leaves the game exactly as
//! it was.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use nightfall_protocol::{Codec, GameId, JsonCodec};

use crate::{Game, GameError};

/// Where game records live between process restarts.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the store is shared across Tokio tasks
/// for the lifetime of the process.
pub trait Backend: Send + Sync + 'static {
    /// Loads every stored game. Called once when the store opens.
    fn load_all(&self) -> impl Future<Output = Result<Vec<Game>, GameError>> + Send;

    /// Writes the full record of one game, replacing any previous record.
    ///
    /// Must be atomic per record: a reader never observes a half-written game.
    fn persist(&self, game: &Game) -> impl Future<Output = Result<(), GameError>> + Send;
}

fn store_failure(context: &str, err: impl std::fmt::Display) -> GameError {
    let error = format!("{context}: {err}");
    tracing::error!(%error, "persistence failure");
    GameError::StoreFailure(error)
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// Keeps encoded records in process memory.
///
/// Records are still round-tripped through the codec, so a game that can't
/// be serialized fails here the same way it would on disk. Writes can be
/// switched off with [`set_failing`](Self::set_failing) to exercise the
/// store-failure path.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<GameId, Vec<u8>>>,
    failing: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, every subsequent `persist` fails with `StoreFailure`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the stored record for `id`, if any.
    pub fn stored(&self, id: GameId) -> Result<Option<Game>, GameError> {
        let records = self
            .records
            .lock()
            .map_err(|e| store_failure("memory store lock", e))?;
        records
            .get(&id)
            .map(|bytes| JsonCodec.decode(bytes))
            .transpose()
            .map_err(|e| store_failure("decode", e))
    }
}

impl Backend for MemoryBackend {
    async fn load_all(&self) -> Result<Vec<Game>, GameError> {
        let records = self
            .records
            .lock()
            .map_err(|e| store_failure("memory store lock", e))?;
        records
            .values()
            .map(|bytes| JsonCodec.decode(bytes).map_err(|e| store_failure("decode", e)))
            .collect()
    }

    async fn persist(&self, game: &Game) -> Result<(), GameError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(store_failure("memory store", "writes disabled"));
        }
        let bytes = JsonCodec
            .encode(game)
            .map_err(|e| store_failure("encode", e))?;
        self.records
            .lock()
            .map_err(|e| store_failure("memory store lock", e))?
            .insert(game.id(), bytes);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileBackend
// ---------------------------------------------------------------------------

/// One file per game under a directory, encoded with `C`.
///
/// Writes go to a temporary file that is then renamed over the record, so a
/// crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct FileBackend<C: Codec> {
    dir: PathBuf,
    codec: C,
}

/// The default file backend: pretty-printed JSON, `game-<id>.json`.
pub type JsonFileBackend = FileBackend<JsonCodec>;

impl FileBackend<JsonCodec> {
    /// Opens (creating if needed) a JSON record directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, GameError> {
        Self::with_codec(dir, JsonCodec).await
    }
}

impl<C: Codec> FileBackend<C> {
    pub async fn with_codec(dir: impl Into<PathBuf>, codec: C) -> Result<Self, GameError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| store_failure("create data dir", e))?;
        tracing::debug!(dir = %dir.display(), "file store opened");
        Ok(Self { dir, codec })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: GameId) -> PathBuf {
        self.dir.join(format!("game-{}.json", id.0))
    }
}

impl<C: Codec> Backend for FileBackend<C> {
    async fn load_all(&self) -> Result<Vec<Game>, GameError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| store_failure("read data dir", e))?;

        let mut games = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| store_failure("read data dir", e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| store_failure("read record", e))?;
            let game: Game = self
                .codec
                .decode(&bytes)
                .map_err(|e| store_failure(&path.display().to_string(), e))?;
            games.push(game);
        }
        tracing::info!(dir = %self.dir.display(), count = games.len(), "games loaded");
        Ok(games)
    }

    async fn persist(&self, game: &Game) -> Result<(), GameError> {
        let bytes = self
            .codec
            .encode(game)
            .map_err(|e| store_failure("encode", e))?;
        let path = self.record_path(game.id());
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| store_failure("write record", e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| store_failure("commit record", e))?;
        tracing::debug!(game_id = %game.id(), path = %path.display(), "game persisted");
        Ok(())
    }
}
