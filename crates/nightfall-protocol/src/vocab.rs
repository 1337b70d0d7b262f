//! Closed vocabularies checked by the rules engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// PlayerProperty
// ---------------------------------------------------------------------------

/// A named property a moderator can attach to a player.
///
/// The set is closed: the threshold and targeting rules match on it
/// exhaustively, so adding a property is a compile-time visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerProperty {
    /// Needs one extra vote to be lynched.
    Loved,
    /// Needs one fewer vote to be lynched.
    Hated,
    /// May hold two current votes at once.
    Doublevoter,
    /// Can never be auto-lynched.
    Lynchproof,
    /// Member of the first scum faction; targets for the whole faction.
    Scum,
    /// Member of the second scum faction.
    Scum2,
    Cultleader,
    Cultist,
    Cop,
    Wanderer,
}

impl PlayerProperty {
    /// Every property, in declaration order.
    pub const ALL: [PlayerProperty; 10] = [
        Self::Loved,
        Self::Hated,
        Self::Doublevoter,
        Self::Lynchproof,
        Self::Scum,
        Self::Scum2,
        Self::Cultleader,
        Self::Cultist,
        Self::Cop,
        Self::Wanderer,
    ];

    /// The canonical lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loved => "loved",
            Self::Hated => "hated",
            Self::Doublevoter => "doublevoter",
            Self::Lynchproof => "lynchproof",
            Self::Scum => "scum",
            Self::Scum2 => "scum2",
            Self::Cultleader => "cultleader",
            Self::Cultist => "cultist",
            Self::Cop => "cop",
            Self::Wanderer => "wanderer",
        }
    }

    /// A distinct bit for this property, for compact sets.
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for PlayerProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerProperty {
    type Err = ProtocolError;

    /// Case-insensitive. `mafia` is accepted as a synonym for `scum`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("mafia") {
            return Ok(Self::Scum);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ProtocolError::UnknownProperty(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// What kind of action a ledger entry records.
///
/// `vote` and `target` are built in; moderators may run games with other
/// action types (e.g. `investigate`), which are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    Vote,
    Target,
    Custom(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Vote => "vote",
            Self::Target => "target",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for ActionType {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("vote") {
            Self::Vote
        } else if s.eq_ignore_ascii_case("target") {
            Self::Target
        } else {
            Self::Custom(s.to_string())
        }
    }
}

impl From<String> for ActionType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ActionType> for String {
    fn from(kind: ActionType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionToken
// ---------------------------------------------------------------------------

/// Disambiguates concurrent action classes of the same type.
///
/// An actor holds at most one current action per `(type, token)`, so a
/// doublevoter's two votes live under `vote` and `doubleVote`, and a scum
/// player's faction kill lives under `scum` rather than their personal
/// `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionToken {
    Vote,
    DoubleVote,
    Target,
    Scum,
    Scum2,
    Cult,
    Custom(String),
}

impl ActionToken {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Vote => "vote",
            Self::DoubleVote => "doubleVote",
            Self::Target => "target",
            Self::Scum => "scum",
            Self::Scum2 => "scum2",
            Self::Cult => "cult",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for ActionToken {
    fn from(s: &str) -> Self {
        [
            Self::Vote,
            Self::DoubleVote,
            Self::Target,
            Self::Scum,
            Self::Scum2,
            Self::Cult,
        ]
        .into_iter()
        .find(|token| token.as_str().eq_ignore_ascii_case(s))
        .unwrap_or_else(|| Self::Custom(s.to_string()))
    }
}

impl From<String> for ActionToken {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ActionToken> for String {
    fn from(token: ActionToken) -> Self {
        token.as_str().to_string()
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
