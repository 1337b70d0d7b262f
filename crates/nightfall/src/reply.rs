//! Typed replies returned by command handlers.
//!
//! A reply is data, not prose: the venue integration picks a template and
//! renders it. Names are display usernames, never slugs.

use serde::Serialize;
use serde_json::Value;

use nightfall_game::{ActionFilter, Game, PhaseChange, TimeOfDay, lynch};
use nightfall_protocol::{ActionToken, ActionType, EventId, GameId, PlayerProperty};
use nightfall_roster::Player;

/// The outcome of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reply", rename_all = "kebab-case")]
pub enum Reply {
    /// The command doesn't apply here (no game, or a listing outside play).
    Ignored,

    Joined { player: String },

    /// The user was already registered; nothing changed.
    AlreadyJoined { player: String },

    Voted {
        voter: String,
        /// `None` for a no-lynch vote.
        target: Option<String>,
        token: ActionToken,
        votes: usize,
        required: usize,
        /// The threshold was met but the target is lynchproof.
        lynchproof: bool,
    },

    /// The vote was the hammer: the target is dead and the day is over.
    Lynched {
        voter: String,
        target: String,
        votes: usize,
        required: usize,
        phase: PhaseChange,
    },

    /// No-lynch reached a majority: the day is over with no elimination.
    NoLynch {
        voter: String,
        votes: usize,
        required: usize,
        phase: PhaseChange,
    },

    Unvoted { voter: String, withdrawn: usize },

    Targeted {
        actor: String,
        target: String,
        token: ActionToken,
    },

    Players(PlayerListing),

    Votes(VoteReport),

    GamePrepared {
        game: GameId,
        name: String,
        /// `false` when an existing game was augmented instead.
        created: bool,
    },

    Started {
        game: GameId,
        players: Vec<String>,
        required: usize,
    },

    PropertySet {
        player: String,
        property: PlayerProperty,
        added: bool,
    },

    Killed {
        player: String,
        /// `false` if the player was already dead.
        was_alive: bool,
    },

    PhaseAdvanced {
        day: u32,
        time: TimeOfDay,
        new_day: bool,
        phase_end: Option<String>,
        live_players: Vec<String>,
        required: usize,
    },

    Ended { game: GameId },
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

/// Result of `list-players` / `list-all-players`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerListing {
    pub living: Vec<String>,
    /// Only filled by `list-all-players`.
    pub dead: Option<Vec<String>>,
    pub moderators: Vec<String>,
}

impl PlayerListing {
    pub fn from_game(game: &Game, include_dead: bool) -> Self {
        let roster = game.players();
        Self {
            living: usernames(roster.live_players()),
            dead: include_dead.then(|| usernames(roster.dead_players())),
            moderators: usernames(roster.moderators()),
        }
    }
}

pub(crate) fn usernames<'a>(players: impl Iterator<Item = &'a Player>) -> Vec<String> {
    players.map(|p| p.username().to_string()).collect()
}

/// Result of `list-votes`: today's votes grouped by target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteReport {
    pub day: u32,
    /// Votes needed to lynch an unmodified target.
    pub required: usize,
    /// The moderator's announced end of the phase, if any.
    pub phase_end: Option<Value>,
    /// One bucket per voted target, in order of first vote.
    pub buckets: Vec<VoteBucket>,
    /// Living players with no current vote today.
    pub not_voting: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteBucket {
    /// `None` is the no-lynch bucket.
    pub target: Option<String>,
    /// Current votes only.
    pub count: usize,
    /// Threshold adjustment for this target (loved +1, hated −1).
    pub modifier: i32,
    /// Every vote cast today, revoked ones included.
    pub votes: Vec<VoteEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteEntry {
    pub voter: String,
    pub event: EventId,
    pub token: ActionToken,
    pub current: bool,
    pub revoked_by: Option<EventId>,
}

impl VoteReport {
    pub fn from_game(game: &Game) -> Self {
        let roster = game.players();
        let display = |key: &str| {
            roster
                .find(key)
                .map_or_else(|| key.to_string(), |p| p.username().to_string())
        };

        let today = ActionFilter::new().kind(ActionType::Vote).day(game.day());
        let mut buckets: Vec<VoteBucket> = Vec::new();
        let mut voting: Vec<&str> = Vec::new();

        for action in game.actions(&today) {
            let target = action.target().map(display);
            let position = match buckets.iter().position(|b| b.target == target) {
                Some(i) => i,
                None => {
                    let modifier = action
                        .target()
                        .and_then(|key| roster.find(key))
                        .map_or(0, lynch::vote_modifier);
                    buckets.push(VoteBucket {
                        target,
                        count: 0,
                        modifier,
                        votes: Vec::new(),
                    });
                    buckets.len() - 1
                }
            };

            let bucket = &mut buckets[position];
            if action.is_current() {
                bucket.count += 1;
                voting.push(action.actor());
            }
            bucket.votes.push(VoteEntry {
                voter: display(action.actor()),
                event: action.event(),
                token: action.token().clone(),
                current: action.is_current(),
                revoked_by: action.revoked_by(),
            });
        }

        let not_voting = roster
            .live_players()
            .filter(|p| !voting.contains(&p.key()))
            .map(|p| p.username().to_string())
            .collect();

        Self {
            day: game.day(),
            required: lynch::votes_required(roster.live_count(), None),
            phase_end: game.value(crate::PHASE_END).cloned(),
            buckets,
            not_voting,
        }
    }
}
