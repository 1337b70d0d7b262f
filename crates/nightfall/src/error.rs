//! Unified error type for Nightfall.

use nightfall_game::GameError;
use nightfall_protocol::{CommandKind, ProtocolError};
use nightfall_roster::RosterError;

/// Top-level error that wraps all crate-specific errors.
///
/// Command handlers return this single type. The `#[from]` attribute on
/// each wrapped variant lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum NightfallError {
    /// An unknown command, property, or a codec failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A player registry error.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// A game rule or store error.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A required argument is missing.
    #[error("usage: {usage}")]
    Validation {
        command: CommandKind,
        usage: &'static str,
    },

    /// The configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl NightfallError {
    pub(crate) fn usage(command: CommandKind, usage: &'static str) -> Self {
        Self::Validation { command, usage }
    }
}
