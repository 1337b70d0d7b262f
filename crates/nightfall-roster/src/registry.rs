//! The player registry: every participant of one game.
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is a plain value with no interior locking. It is owned
//! by a `Game`, and the game store serializes every mutation of a game, so
//! the registry never sees two writers at once.

use std::collections::HashMap;

use nightfall_protocol::PlayerProperty;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Player, RosterError, slug};

/// Tracks the players and moderators of a game in join order.
///
/// ## Views
///
/// ```text
///   all_players ─┬─ live_players   (alive, not moderator)
///                └─ dead_players   (dead, not moderator)
///   moderators                     (never counted as players)
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Player>", into = "Vec<Player>")]
pub struct PlayerRegistry {
    /// Every participant, in the order they joined.
    players: Vec<Player>,

    /// Slug → position in `players`. Rebuilt on load, kept in sync on add.
    index: HashMap<String, usize>,
}

impl PlayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new living player.
    ///
    /// # Errors
    /// - [`RosterError::UserExists`] if the name is already registered,
    ///   as a player or as a moderator.
    /// - [`RosterError::InvalidName`] if the name is empty.
    pub fn add_player(&mut self, username: &str) -> Result<&Player, RosterError> {
        self.insert(Player::new(username, false))
    }

    /// Registers a moderator. Same existence rule as [`add_player`](Self::add_player).
    pub fn add_moderator(&mut self, username: &str) -> Result<&Player, RosterError> {
        self.insert(Player::new(username, true))
    }

    fn insert(&mut self, player: Player) -> Result<&Player, RosterError> {
        if player.key().is_empty() {
            return Err(RosterError::InvalidName(player.username().to_string()));
        }
        if self.index.contains_key(player.key()) {
            return Err(RosterError::UserExists(player.username().to_string()));
        }

        let position = self.players.len();
        self.index.insert(player.key().to_string(), position);
        tracing::debug!(
            player = %player,
            moderator = player.is_moderator(),
            "registered"
        );
        self.players.push(player);
        Ok(&self.players[position])
    }

    /// Looks a participant up by name (case-insensitive).
    ///
    /// # Errors
    /// Returns [`RosterError::PlayerNotFound`] if nobody has that name.
    pub fn get(&self, username: &str) -> Result<&Player, RosterError> {
        self.find(username)
            .ok_or_else(|| RosterError::PlayerNotFound(username.to_string()))
    }

    /// Like [`get`](Self::get), but `None` instead of an error.
    pub fn find(&self, username: &str) -> Option<&Player> {
        self.index.get(&slug(username)).map(|&i| &self.players[i])
    }

    pub fn contains(&self, username: &str) -> bool {
        self.index.contains_key(&slug(username))
    }

    fn get_mut(&mut self, username: &str) -> Result<&mut Player, RosterError> {
        match self.index.get(&slug(username)) {
            Some(&i) => Ok(&mut self.players[i]),
            None => Err(RosterError::PlayerNotFound(username.to_string())),
        }
    }

    /// Marks a player dead.
    ///
    /// Idempotent: killing a dead player changes nothing and returns
    /// `Ok(false)`. Returns `Ok(true)` when the player was alive.
    pub fn kill(&mut self, username: &str) -> Result<bool, RosterError> {
        let player = self.get_mut(username)?;
        if !player.is_alive() {
            return Ok(false);
        }
        player.set_alive(false);
        tracing::info!(player = %player, "player killed");
        Ok(true)
    }

    /// Brings a dead player back. Returns `Ok(false)` if already alive.
    pub fn revive(&mut self, username: &str) -> Result<bool, RosterError> {
        let player = self.get_mut(username)?;
        if player.is_alive() {
            return Ok(false);
        }
        player.set_alive(true);
        tracing::info!(player = %player, "player revived");
        Ok(true)
    }

    pub fn has_property(
        &self,
        username: &str,
        property: PlayerProperty,
    ) -> Result<bool, RosterError> {
        Ok(self.get(username)?.has_property(property))
    }

    /// Attaches a property. Returns `Ok(false)` if the player already had it.
    pub fn set_property(
        &mut self,
        username: &str,
        property: PlayerProperty,
    ) -> Result<bool, RosterError> {
        let player = self.get_mut(username)?;
        let added = player.properties_mut().insert(property);
        if added {
            tracing::info!(player = %player, %property, "property set");
        }
        Ok(added)
    }

    /// Detaches a property. Returns `Ok(false)` if the player didn't have it.
    pub fn remove_property(
        &mut self,
        username: &str,
        property: PlayerProperty,
    ) -> Result<bool, RosterError> {
        let player = self.get_mut(username)?;
        let removed = player.properties_mut().remove(property);
        if removed {
            tracing::info!(player = %player, %property, "property removed");
        }
        Ok(removed)
    }

    /// Stores a free-form value on a participant, returning the prior value.
    pub fn set_value(
        &mut self,
        username: &str,
        key: &str,
        value: Value,
    ) -> Result<Option<Value>, RosterError> {
        Ok(self.get_mut(username)?.set_value(key, value))
    }

    // -- Views -------------------------------------------------------------

    /// Living players in join order.
    pub fn live_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_live_player())
    }

    /// Dead players in join order.
    pub fn dead_players(&self) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .filter(|p| !p.is_alive() && !p.is_moderator())
    }

    /// Moderators in the order they were added.
    pub fn moderators(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_moderator())
    }

    /// Every non-moderator, living or dead, in join order.
    pub fn all_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_moderator())
    }

    /// Number of living players; the basis of the lynch threshold.
    pub fn live_count(&self) -> usize {
        self.live_players().count()
    }

    /// Number of registered participants, moderators included.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl TryFrom<Vec<Player>> for PlayerRegistry {
    type Error = RosterError;

    fn try_from(players: Vec<Player>) -> Result<Self, Self::Error> {
        let mut index = HashMap::with_capacity(players.len());
        for (i, player) in players.iter().enumerate() {
            if index.insert(player.key().to_string(), i).is_some() {
                return Err(RosterError::DuplicateEntry(player.key().to_string()));
            }
        }
        Ok(Self { players, index })
    }
}

impl From<PlayerRegistry> for Vec<Player> {
    fn from(registry: PlayerRegistry) -> Self {
        registry.players
    }
}

// =========================================================================
// Tests
// =========================================================================
