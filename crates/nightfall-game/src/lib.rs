//! Game rules engine for Nightfall.
//!
//! A [`Game`] composes a player registry, an [`ActionLedger`], a
//! [`PhaseMachine`] and a settings map. The lynch calculator
//! ([`lynch`]) derives thresholds and tallies from them. A [`GameStore`]
//! owns every game and serializes all mutations of one game, persisting
//! each change through a [`Backend`] before it becomes visible.
//!
//! # Key types
//!
//! - [`Game`]: the aggregate command handlers work against
//! - [`ActionLedger`]: append-and-revoke record of votes and targets
//! - [`PhaseMachine`]: Pending → Active (day/night) → Ended
//! - [`GameStore`]: per-game serialized, persisted access
//! - [`Backend`]: where game records live ([`MemoryBackend`], [`JsonFileBackend`])

mod backend;
mod error;
mod game;
mod ledger;
pub mod lynch;
mod phase;
mod store;

pub use backend::{Backend, FileBackend, JsonFileBackend, MemoryBackend};
pub use error::{GameError, Participant, PhaseViolation};
pub use game::{Ballot, Game};
pub use ledger::{Action, ActionFilter, ActionId, ActionLedger};
pub use lynch::{LynchVerdict, VoteCount};
pub use phase::{Lifecycle, PhaseChange, PhaseMachine, TimeOfDay};
pub use store::GameStore;
