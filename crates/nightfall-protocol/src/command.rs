//! The closed set of commands the engine understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Every command a player or moderator can issue.
///
/// The venue's parser turns post text into a command name plus arguments;
/// [`CommandKind::from_str`] maps the name (or one of its aliases) onto this
/// enum, and the dispatcher matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    // -- Player commands --
    Join,
    Vote,
    For,
    Unvote,
    NoLynch,
    Target,
    ListPlayers,
    ListAllPlayers,
    ListVotes,

    // -- Moderator commands --
    Prepare,
    Start,
    Set,
    Kill,
    NewDay,
    NextPhase,
    End,
}

impl CommandKind {
    /// Every command, in help-listing order.
    pub const ALL: [CommandKind; 16] = [
        Self::Join,
        Self::Vote,
        Self::For,
        Self::Unvote,
        Self::NoLynch,
        Self::Target,
        Self::ListPlayers,
        Self::ListAllPlayers,
        Self::ListVotes,
        Self::Prepare,
        Self::Start,
        Self::Set,
        Self::Kill,
        Self::NewDay,
        Self::NextPhase,
        Self::End,
    ];

    /// The canonical command name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Vote => "vote",
            Self::For => "for",
            Self::Unvote => "unvote",
            Self::NoLynch => "nolynch",
            Self::Target => "target",
            Self::ListPlayers => "list-players",
            Self::ListAllPlayers => "list-all-players",
            Self::ListVotes => "list-votes",
            Self::Prepare => "prepare",
            Self::Start => "start",
            Self::Set => "set",
            Self::Kill => "kill",
            Self::NewDay => "new-day",
            Self::NextPhase => "next-phase",
            Self::End => "end",
        }
    }

    /// Alternate spellings accepted for this command.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::NoLynch => &["no-lynch"],
            Self::ListPlayers => &["listplayers"],
            Self::ListAllPlayers => &["listallplayers"],
            Self::ListVotes => &["listvotes"],
            _ => &[],
        }
    }

    /// One-line help text shown next to the command name.
    pub fn description(self) -> &'static str {
        match self {
            Self::Join => "join current mafia game",
            Self::Vote => "vote for a player to be executed (alt. form)",
            Self::For => "vote for a player to be executed",
            Self::Unvote => "rescind your vote",
            Self::NoLynch => "vote for noone to be lynched",
            Self::Target => "target a player with any night action you may have",
            Self::ListPlayers => "list all players still alive",
            Self::ListAllPlayers => "list all players, dead and alive",
            Self::ListVotes => "list all votes from the day's start",
            Self::Prepare => "start a new game",
            Self::Start => "move a game into active play (mod only)",
            Self::Set => "assign a player a property (mod only)",
            Self::Kill => "kill a player (mod only)",
            Self::NewDay => "move on to a new day (mod only)",
            Self::NextPhase => "move on to the next phase (mod only)",
            Self::End => "end the game (mod only)",
        }
    }

    /// Returns `true` if only a moderator of the game may issue this.
    pub fn is_moderator_only(self) -> bool {
        matches!(
            self,
            Self::Start | Self::Set | Self::Kill | Self::NewDay | Self::NextPhase | Self::End
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('!');
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.name().eq_ignore_ascii_case(wanted)
                    || kind.aliases().iter().any(|a| a.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| ProtocolError::UnknownCommand(s.to_string()))
    }
}
