//! Error types for the roster layer.

/// Errors that can occur while managing a game's players.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// A player or moderator with this name is already registered.
    #[error("user {0} is already in the game")]
    UserExists(String),

    /// No player or moderator with this name is registered.
    #[error("player {0} not found")]
    PlayerNotFound(String),

    /// The name is empty once normalised.
    #[error("invalid player name: {0:?}")]
    InvalidName(String),

    /// A persisted roster contained two entries with the same slug.
    #[error("duplicate player in stored roster: {0}")]
    DuplicateEntry(String),
}
