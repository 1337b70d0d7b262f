//! # Nightfall
//!
//! A rules engine for forum-hosted mafia games.
//!
//! Players join a game, vote to lynch one another during the day, and a
//! moderator moves the game through day and night until it ends. Nightfall
//! owns the rules: who may vote, how many votes a lynch needs, when the
//! hammer falls. The venue integration owns everything else (parsing posts,
//! rendering replies, talking to the forum).
//!
//! ## Layers
//!
//! ```text
//!   venue integration ── CommandRequest ──→ dispatch ──→ Reply
//!                                              │
//!   nightfall        handlers + moderation ────┤
//!   nightfall-game   GameStore → Game → {PhaseMachine, ActionLedger, lynch}
//!   nightfall-roster PlayerRegistry → Player
//!   nightfall-protocol ids, vocabularies, CommandKind, Codec
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nightfall::prelude::*;
//!
//! # async fn demo() -> Result<(), NightfallError> {
//! let ctx = Context::builder().build_in_memory().await?;
//!
//! let prepare = CommandRequest::new(GameId(45), EventId(1), "Garnet", CommandKind::Prepare)
//!     .with_args(["Beach", "City"]);
//! ctx.handle(&prepare).await?;
//!
//! let join = CommandRequest::new(GameId(45), EventId(2), "Lars", CommandKind::Join);
//! let reply = ctx.handle(&join).await?;
//! assert_eq!(reply, Reply::Joined { player: "Lars".into() });
//! # Ok(())
//! # }
//! ```

mod command;
mod config;
mod context;
mod error;
mod handler;
mod moderation;
mod reply;

pub use command::{CommandRequest, dispatch};
pub use config::Config;
pub use context::{Context, ContextBuilder};
pub use error::NightfallError;
pub use reply::{PlayerListing, Reply, VoteBucket, VoteEntry, VoteReport};

/// Game setting holding the moderator's announced end of the current phase.
pub const PHASE_END: &str = "phaseEnd";

/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls do nothing.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

pub mod prelude {
    //! Everything a venue integration needs, in one import.

    pub use crate::{
        CommandRequest, Config, Context, ContextBuilder, NightfallError, PlayerListing, Reply,
        VoteReport, init_tracing,
    };
    pub use nightfall_game::{
        Backend, Game, GameError, GameStore, JsonFileBackend, LynchVerdict, MemoryBackend,
        PhaseChange, TimeOfDay,
    };
    pub use nightfall_protocol::{
        ActionToken, ActionType, ChatId, CommandKind, EventId, GameId, GameLocator,
        PlayerProperty,
    };
}
