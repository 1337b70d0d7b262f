//! Game store: owns every game and serializes access to each one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use nightfall_protocol::{ChatId, GameId, GameLocator};

use crate::{Backend, Game, GameError};

/// Holds all games, keyed by id, backed by a persistence [`Backend`].
///
/// # Concurrency
///
/// Each game sits behind its own async mutex, so commands for the same
/// game run one at a time while different games proceed in parallel. The
/// outer `RwLock` only guards the id → game map; it is never held while
/// waiting on a game's lock, and is held for writing only while a new game
/// is created.
///
/// [`update`](Self::update) works on a copy of the game and commits it
/// only after the backend accepted the write: a rejected command or a
/// failed write leaves the stored and in-memory game untouched.
pub struct GameStore<B: Backend> {
    backend: B,
    games: RwLock<HashMap<GameId, Arc<Mutex<Game>>>>,
}

impl<B: Backend> GameStore<B> {
    /// Opens a store, loading every game the backend holds.
    pub async fn open(backend: B) -> Result<Self, GameError> {
        let games = backend
            .load_all()
            .await?
            .into_iter()
            .map(|game| (game.id(), Arc::new(Mutex::new(game))))
            .collect::<HashMap<_, _>>();
        tracing::info!(count = games.len(), "game store opened");
        Ok(Self {
            backend,
            games: RwLock::new(games),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates and persists an empty game.
    ///
    /// # Errors
    /// [`GameError::GameExists`] if `id` is taken.
    pub async fn create_game(&self, id: GameId, name: &str) -> Result<Game, GameError> {
        self.insert(Game::new(id, name)).await
    }

    /// Persists and registers a fully built game (e.g. with seeded settings).
    ///
    /// # Errors
    /// [`GameError::GameExists`] if the game's id is taken.
    pub async fn insert(&self, game: Game) -> Result<Game, GameError> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.id()) {
            return Err(GameError::GameExists(game.id()));
        }
        self.backend.persist(&game).await?;
        games.insert(game.id(), Arc::new(Mutex::new(game.clone())));
        tracing::info!(game_id = %game.id(), name = game.name(), "game created");
        Ok(game)
    }

    /// Resolves a locator to a game id.
    ///
    /// Names match the game name or any alias, case-insensitively. When
    /// several games match, the lowest id wins.
    ///
    /// # Errors
    /// [`GameError::GameNotFound`] if nothing matches.
    pub async fn resolve(&self, locator: &GameLocator) -> Result<GameId, GameError> {
        let not_found = || GameError::GameNotFound(locator.clone());
        match locator {
            GameLocator::Topic(id) => {
                if self.games.read().await.contains_key(id) {
                    Ok(*id)
                } else {
                    Err(not_found())
                }
            }
            GameLocator::Chat(chat) => self
                .find_first(|game| game.has_chat(*chat))
                .await
                .ok_or_else(not_found),
            GameLocator::Name(name) => self
                .find_first(|game| game.answers_to(name))
                .await
                .ok_or_else(not_found),
        }
    }

    /// A snapshot of the game at `locator`.
    pub async fn get(&self, locator: &GameLocator) -> Result<Game, GameError> {
        let id = self.resolve(locator).await?;
        self.read(id, Game::clone).await
    }

    pub async fn game_by_id(&self, id: GameId) -> Result<Game, GameError> {
        self.get(&GameLocator::Topic(id)).await
    }

    pub async fn game_by_name(&self, name: &str) -> Result<Game, GameError> {
        self.get(&GameLocator::Name(name.to_string())).await
    }

    pub async fn game_by_chat_id(&self, chat: ChatId) -> Result<Game, GameError> {
        self.get(&GameLocator::Chat(chat)).await
    }

    /// Runs `f` against the current state of a game.
    pub async fn read<T>(&self, id: GameId, f: impl FnOnce(&Game) -> T) -> Result<T, GameError> {
        let handle = self.handle(id).await?;
        let game = handle.lock().await;
        Ok(f(&game))
    }

    /// Applies `f` to a game as one atomic, persisted step.
    ///
    /// `f` runs on a copy. If it returns an error nothing is written; if it
    /// succeeds the copy is persisted and only then replaces the live game.
    pub async fn update<T, E, F>(&self, id: GameId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Game) -> Result<T, E> + Send,
        T: Send,
        E: From<GameError> + Send,
    {
        let handle = self.handle(id).await?;
        let mut live = handle.lock().await;

        let mut draft = live.clone();
        let output = f(&mut draft)?;
        self.backend.persist(&draft).await?;
        *live = draft;
        Ok(output)
    }

    /// Ids of every game, ascending.
    pub async fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<_> = self.games.read().await.keys().copied().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn handle(&self, id: GameId) -> Result<Arc<Mutex<Game>>, GameError> {
        self.games
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| GameError::GameNotFound(GameLocator::Topic(id)))
    }

    async fn find_first(&self, matches: impl Fn(&Game) -> bool) -> Option<GameId> {
        let handles: Vec<_> = {
            let games = self.games.read().await;
            let mut handles: Vec<_> = games.iter().map(|(id, h)| (*id, h.clone())).collect();
            handles.sort_by_key(|(id, _)| *id);
            handles
        };
        for (id, handle) in handles {
            if matches(&*handle.lock().await) {
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use nightfall_protocol::EventId;

    use super::*;
    use crate::MemoryBackend;

    async fn store() -> GameStore<MemoryBackend> {
        GameStore::open(MemoryBackend::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_game_twice_fails() {
        let store = store().await;
        store.create_game(GameId(1), "Beach City").await.unwrap();

        let err = store.create_game(GameId(1), "Again").await.unwrap_err();
        assert!(matches!(err, GameError::GameExists(GameId(1))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_resolve_by_name_alias_and_chat() {
        let store = store().await;
        store.create_game(GameId(1), "Beach City").await.unwrap();
        store
            .update(GameId(1), |game| {
                game.add_alias("bc");
                game.add_chat(ChatId(40));
                Ok::<_, GameError>(())
            })
            .await
            .unwrap();

        let by_name = GameLocator::Name("BEACH CITY".into());
        assert_eq!(store.resolve(&by_name).await.unwrap(), GameId(1));
        assert_eq!(store.game_by_name("Bc").await.unwrap().id(), GameId(1));
        assert_eq!(store.game_by_chat_id(ChatId(40)).await.unwrap().id(), GameId(1));

        let err = store.game_by_chat_id(ChatId(41)).await.unwrap_err();
        assert!(matches!(err, GameError::GameNotFound(GameLocator::Chat(ChatId(41)))));
    }

    #[tokio::test]
    async fn test_update_rejected_leaves_game_untouched() {
        let store = store().await;
        store.create_game(GameId(1), "g").await.unwrap();

        let result = store
            .update(GameId(1), |game| {
                game.add_player("Lars")?;
                game.cast_vote(EventId(1), "Lars", None)
            })
            .await;
        assert!(matches!(result, Err(GameError::InvalidPhase(_))));

        let game = store.game_by_id(GameId(1)).await.unwrap();
        assert!(game.players().is_empty());
    }

    #[tokio::test]
    async fn test_update_store_failure_leaves_game_untouched() {
        let store = store().await;
        store.create_game(GameId(1), "g").await.unwrap();
        store.backend().set_failing(true);

        let result = store
            .update(GameId(1), |game| game.add_player("Lars").map(|_| ()))
            .await;
        assert!(matches!(result, Err(GameError::StoreFailure(_))));

        let game = store.game_by_id(GameId(1)).await.unwrap();
        assert!(game.players().is_empty());
    }

    #[tokio::test]
    async fn test_update_persists_before_commit() {
        let store = store().await;
        store.create_game(GameId(1), "g").await.unwrap();
        store
            .update(GameId(1), |game| game.add_player("Lars").map(|_| ()))
            .await
            .unwrap();

        let stored = store.backend().stored(GameId(1)).unwrap().unwrap();
        assert!(stored.player("lars").is_ok());
    }

    #[tokio::test]
    async fn test_update_unknown_game_fails() {
        let store = store().await;
        let result = store.update(GameId(5), |_| Ok::<_, GameError>(())).await;
        assert!(matches!(result, Err(GameError::GameNotFound(_))));
    }
}
