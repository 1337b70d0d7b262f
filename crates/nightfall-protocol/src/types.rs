//! Identity types: how games and venue events are addressed.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a game.
///
/// A game lives in exactly one venue topic, and the topic's id doubles as
/// the game's id. Newtype so it can't be confused with an [`EventId`] even
/// though both are `u64` underneath. Serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// The id of the venue event (a post) that caused an action.
///
/// Actions are stamped with the event that created them, and revoked
/// actions with the event that revoked them, so a vote history can link
/// back to the posts where votes were cast and withdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The id of a private chat attached to a game (scum chat, role cards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub u64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// GameLocator: where did a command come from?
// ---------------------------------------------------------------------------

/// How a command names the game it applies to.
///
/// Commands posted in the game topic carry the topic id; commands posted in
/// a private chat carry the chat id; moderator commands may name a game
/// explicitly (`set Lars loved in Town Of Salem`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameLocator {
    /// The game whose id is this topic.
    Topic(GameId),
    /// The game that owns this chat.
    Chat(ChatId),
    /// The game with this name or alias.
    Name(String),
}

impl fmt::Display for GameLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic(id) => write!(f, "{id}"),
            Self::Chat(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<GameId> for GameLocator {
    fn from(id: GameId) -> Self {
        Self::Topic(id)
    }
}

impl From<ChatId> for GameLocator {
    fn from(id: ChatId) -> Self {
        Self::Chat(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_with_prefix() {
        assert_eq!(GameId(45).to_string(), "G-45");
        assert_eq!(EventId(7).to_string(), "#7");
        assert_eq!(ChatId(3).to_string(), "C-3");
    }

    #[test]
    fn test_locator_from_ids() {
        assert_eq!(GameLocator::from(GameId(1)), GameLocator::Topic(GameId(1)));
        assert_eq!(GameLocator::from(ChatId(2)), GameLocator::Chat(ChatId(2)));
    }
}
