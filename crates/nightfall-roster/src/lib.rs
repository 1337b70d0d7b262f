//! Player registry for Nightfall.
//!
//! This crate tracks who is in a game:
//!
//! 1. **Identity**: usernames are matched case-insensitively through a
//!    slug ([`slug`]), while the display name keeps its casing.
//! 2. **Status**: alive or dead, player or moderator ([`Player`]).
//! 3. **Properties**: the closed set of rule-changing tags a moderator
//!    attaches to a player ([`PropertySet`]).
//!
//! # How it fits in the stack
//!
//! ```text
//! Game layer (above)  ← resolves actors and targets, counts live players
//!     ↕
//! Roster layer (this crate)  ← owns players, never deletes them
//!     ↕
//! Protocol layer (below)  ← provides PlayerProperty
//! ```

mod error;
mod player;
mod registry;

pub use error::RosterError;
pub use player::{Player, PropertySet, slug};
pub use registry::PlayerRegistry;
