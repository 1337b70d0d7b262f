//! `Context` builder and the handle every command runs against.

use std::path::PathBuf;

use serde_json::Value;

use nightfall_game::{Backend, Game, GameStore, JsonFileBackend, MemoryBackend};
use nightfall_protocol::GameId;

use crate::command::{CommandRequest, dispatch};
use crate::{Config, NightfallError, Reply};

/// Builder for a [`Context`].
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), nightfall::NightfallError> {
/// use nightfall::prelude::*;
///
/// let ctx = Context::builder()
///     .data_dir("/var/lib/nightfall")
///     .shuffle_listings(false)
///     .build_file()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ContextBuilder {
    config: Config,
}

impl ContextBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    pub fn shuffle_listings(mut self, shuffle: bool) -> Self {
        self.config.shuffle_listings = shuffle;
        self
    }

    /// Adds a setting seeded into every new game.
    pub fn default_setting(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.config
            .default_settings
            .insert(key.to_string(), value.into());
        self
    }

    /// Builds a context whose games live only in memory.
    pub async fn build_in_memory(self) -> Result<Context<MemoryBackend>, NightfallError> {
        self.build_with(MemoryBackend::new()).await
    }

    /// Builds a context storing one JSON file per game under `data_dir`.
    ///
    /// # Errors
    /// [`NightfallError::Config`] if no `data_dir` is configured.
    pub async fn build_file(self) -> Result<Context<JsonFileBackend>, NightfallError> {
        let dir = self
            .config
            .data_dir
            .clone()
            .ok_or_else(|| NightfallError::Config("data_dir is required for a file store".into()))?;
        let backend = JsonFileBackend::open(dir).await?;
        self.build_with(backend).await
    }

    /// Builds a context over any backend, loading the games it holds.
    pub async fn build_with<B: Backend>(self, backend: B) -> Result<Context<B>, NightfallError> {
        let store = GameStore::open(backend).await?;
        Ok(Context {
            store,
            config: self.config,
        })
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The store handle plus configuration, passed to every command handler.
///
/// Built once at startup and shared (by reference or `Arc`) across tasks.
pub struct Context<B: Backend> {
    store: GameStore<B>,
    config: Config,
}

impl Context<MemoryBackend> {
    /// Creates a new builder.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }
}

impl<B: Backend> Context<B> {
    pub fn store(&self) -> &GameStore<B> {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates and stores a game seeded with the configured default settings.
    ///
    /// # Errors
    /// [`GameError::GameExists`](nightfall_game::GameError::GameExists) if
    /// `id` is taken.
    pub async fn create_game(&self, id: GameId, name: &str) -> Result<Game, NightfallError> {
        Ok(self.store.insert(self.seeded_game(id, name)).await?)
    }

    /// A new, unstored game carrying the default settings.
    pub fn seeded_game(&self, id: GameId, name: &str) -> Game {
        let mut game = Game::new(id, name);
        for (key, value) in &self.config.default_settings {
            game.set_value(key, value.clone());
        }
        game
    }

    /// Runs one command. See [`dispatch`].
    pub async fn handle(&self, request: &CommandRequest) -> Result<Reply, NightfallError> {
        dispatch(self, request).await
    }
}
