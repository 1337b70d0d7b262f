//! Shared vocabulary for Nightfall.
//!
//! This crate defines the words every other layer speaks:
//!
//! - **Identity** ([`GameId`], [`EventId`], [`ChatId`], [`GameLocator`]):
//!   how games and the venue events that drive them are addressed.
//! - **Vocabulary** ([`PlayerProperty`], [`ActionType`], [`ActionToken`],
//!   [`CommandKind`]): the closed sets the rules engine checks exhaustively.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how a game record is
//!   converted to and from bytes for persistence.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Protocol (vocabulary) → Roster (players) → Game (rules + store) → Nightfall (commands)
//! ```
//!
//! Nothing here knows about players or games; it only names things.

mod codec;
mod command;
mod error;
mod types;
mod vocab;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::CommandKind;
pub use error::ProtocolError;
pub use types::{ChatId, EventId, GameId, GameLocator};
pub use vocab::{ActionToken, ActionType, PlayerProperty};
