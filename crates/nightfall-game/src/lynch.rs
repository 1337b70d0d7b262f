//! Lynch thresholds, tallies and the auto-lynch check.
//!
//! Everything here is a pure function of the roster and the ledger; the
//! [`Game`](crate::Game) wrappers supply the current day.

use serde::Serialize;

use nightfall_protocol::{ActionType, PlayerProperty};
use nightfall_roster::{Player, PlayerRegistry, slug};

use crate::{ActionFilter, ActionLedger, GameError, Participant};

/// Votes cast against a target versus votes needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteCount {
    pub votes: usize,
    pub required: usize,
}

impl VoteCount {
    pub fn reached(&self) -> bool {
        self.votes >= self.required
    }
}

/// Outcome of checking a target after a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum LynchVerdict {
    /// Threshold reached; the target is lynched.
    Hammer(VoteCount),
    /// Not enough votes yet.
    Short(VoteCount),
    /// Threshold reached, but the target cannot be auto-lynched.
    Lynchproof(VoteCount),
}

impl LynchVerdict {
    pub fn fires(&self) -> bool {
        matches!(self, Self::Hammer(_))
    }

    pub fn count(&self) -> VoteCount {
        match *self {
            Self::Hammer(c) | Self::Short(c) | Self::Lynchproof(c) => c,
        }
    }
}

/// Threshold adjustment for a target: loved +1, hated −1.
///
/// A player carrying both counts as loved.
pub fn vote_modifier(target: &Player) -> i32 {
    if target.has_property(PlayerProperty::Loved) {
        1
    } else if target.has_property(PlayerProperty::Hated) {
        -1
    } else {
        0
    }
}

/// Votes needed to lynch `target` (or to no-lynch, when `None`) with
/// `live_players` alive: a strict majority, `⌈(n+1)/2⌉`, plus the target's
/// modifier.
pub fn votes_required(live_players: usize, target: Option<&Player>) -> usize {
    let majority = (live_players + 2) / 2;
    let modifier = target.map_or(0, vote_modifier);
    majority.saturating_add_signed(modifier as isize)
}

/// Current votes cast on `day` against `target` (`None` counts no-lynch votes).
pub fn tally(ledger: &ActionLedger, day: u32, target: Option<&str>) -> usize {
    let target = target.map(slug);
    let filter = ActionFilter::new()
        .kind(ActionType::Vote)
        .day(day)
        .current_only();
    ledger
        .actions(&filter)
        .filter(|a| a.target() == target.as_deref())
        .count()
}

/// Decides whether the votes on `target` lynch them.
///
/// # Errors
/// [`GameError::PlayerNotFound`] if the target is not registered.
pub fn check_auto_lynch(
    roster: &PlayerRegistry,
    ledger: &ActionLedger,
    day: u32,
    target: &str,
) -> Result<LynchVerdict, GameError> {
    let player = roster.find(target).ok_or_else(|| GameError::PlayerNotFound {
        role: Participant::Target,
        name: target.to_string(),
    })?;
    let count = VoteCount {
        votes: tally(ledger, day, Some(player.key())),
        required: votes_required(roster.live_count(), Some(player)),
    };

    Ok(if !count.reached() {
        LynchVerdict::Short(count)
    } else if player.has_property(PlayerProperty::Lynchproof) {
        LynchVerdict::Lynchproof(count)
    } else {
        LynchVerdict::Hammer(count)
    })
}

/// Decides whether the no-lynch votes end the day.
pub fn check_no_lynch(roster: &PlayerRegistry, ledger: &ActionLedger, day: u32) -> LynchVerdict {
    let count = VoteCount {
        votes: tally(ledger, day, None),
        required: votes_required(roster.live_count(), None),
    };
    if count.reached() {
        LynchVerdict::Hammer(count)
    } else {
        LynchVerdict::Short(count)
    }
}
