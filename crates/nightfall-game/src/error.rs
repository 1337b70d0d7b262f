//! Error types for the game layer.

use std::fmt;

use nightfall_protocol::{GameId, GameLocator};
use nightfall_roster::RosterError;

/// Which side of an action a name referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Actor,
    Target,
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actor => write!(f, "actor"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// A phase guard that was not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseViolation {
    /// The game has not been started (or has ended).
    NotActive,
    /// The operation needs daytime.
    NotDay,
    /// The game is already running; joining is closed.
    AlreadyStarted,
    /// The game is over.
    Ended,
}

impl fmt::Display for PhaseViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotActive => write!(f, "game is not active"),
            Self::NotDay => write!(f, "it is not day"),
            Self::AlreadyStarted => write!(f, "game already in progress"),
            Self::Ended => write!(f, "game has ended"),
        }
    }
}

/// Errors raised by game rules and the game store.
///
/// Every failure is scoped to the one command that caused it. The calling
/// layer decides which of these are shown to the user and which are
/// silently ignored (`GameNotFound`).
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No game matches the locator.
    #[error("game {0} not found")]
    GameNotFound(GameLocator),

    /// A game with this id already exists.
    #[error("game {0} already exists")]
    GameExists(GameId),

    /// A registry error (duplicate user, unknown player, bad name).
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// The actor or target of an action is not in the game.
    #[error("{role} {name} is not in this game")]
    PlayerNotFound { role: Participant, name: String },

    /// The actor or target of an action is dead.
    #[error("{role} {name} is not alive")]
    DeadParticipant { role: Participant, name: String },

    /// The actor or target of an action is a moderator.
    #[error("{role} {name} is a moderator, not a player")]
    NotAPlayer { role: Participant, name: String },

    /// The user issuing a moderator command is not a moderator of the game.
    #[error("{0} is not a moderator")]
    NotModerator(String),

    /// A phase guard was not met.
    #[error("invalid phase: {0}")]
    InvalidPhase(PhaseViolation),

    /// Persisting or loading a game record failed. Not retried.
    #[error("store failure: {0}")]
    StoreFailure(String),
}

impl From<PhaseViolation> for GameError {
    fn from(violation: PhaseViolation) -> Self {
        Self::InvalidPhase(violation)
    }
}
