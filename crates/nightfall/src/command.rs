//! Typed command requests and compile-time dispatch.

use serde::{Deserialize, Serialize};

use nightfall_game::{Backend, GameError};
use nightfall_protocol::{CommandKind, EventId, GameId, GameLocator};

use crate::{Context, NightfallError, Reply, handler, moderation};

/// One command, already tokenised by the venue integration.
///
/// # Example
///
/// ```rust
/// use nightfall::CommandRequest;
/// use nightfall_protocol::{CommandKind, EventId, GameId};
///
/// // "!vote for @Sadie" posted as post #12 in topic 45
/// let request = CommandRequest::new(GameId(45), EventId(12), "Lars", CommandKind::Vote)
///     .with_args(["for", "@Sadie"]);
/// assert_eq!(request.vote_target(), Some("Sadie"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Where the command was posted.
    pub locator: GameLocator,
    /// The post carrying the command; becomes the action id.
    pub event: EventId,
    /// Username of the poster.
    pub actor: String,
    pub kind: CommandKind,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(
        locator: impl Into<GameLocator>,
        event: EventId,
        actor: impl Into<String>,
        kind: CommandKind,
    ) -> Self {
        Self {
            locator: locator.into(),
            event,
            actor: actor.into(),
            kind,
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// The player name at `index`, without `@` or trailing punctuation.
    pub fn name_arg(&self, index: usize) -> Option<&str> {
        self.arg(index).and_then(clean_name)
    }

    /// The vote target, accepting both `vote Sadie` and `vote for Sadie`.
    pub fn vote_target(&self) -> Option<&str> {
        let skip = match self.arg(0) {
            Some(first) if first.eq_ignore_ascii_case("for") => 1,
            _ => 0,
        };
        self.name_arg(skip)
    }

    /// Arguments from `index` on, joined by spaces.
    pub fn rest(&self, index: usize) -> Option<String> {
        let rest = self.args.get(index..)?.join(" ");
        let rest = rest.trim();
        (!rest.is_empty()).then(|| rest.to_string())
    }

    /// The text after a leading `ends`, as in `next-phase ends at noon`.
    pub fn phase_end(&self) -> Option<String> {
        match self.arg(0) {
            Some(first) if first.eq_ignore_ascii_case("ends") => self.rest(1),
            _ => None,
        }
    }

    /// An explicit `in <game>` suffix starting at `index`, if present.
    ///
    /// A numeric game names a topic id, anything else a game name or alias.
    pub fn game_override(&self, index: usize) -> Option<GameLocator> {
        if !self.arg(index)?.eq_ignore_ascii_case("in") {
            return None;
        }
        let game = self.rest(index + 1)?;
        Some(match game.parse::<u64>() {
            Ok(id) => GameLocator::Topic(GameId(id)),
            Err(_) => GameLocator::Name(game),
        })
    }
}

fn clean_name(arg: &str) -> Option<&str> {
    let name = arg
        .trim()
        .trim_start_matches('@')
        .trim_end_matches(['.', '!', '?', ',']);
    (!name.is_empty()).then_some(name)
}

/// Routes a request to its handler.
///
/// The match is exhaustive over [`CommandKind`], so adding a command
/// without a handler does not compile.
pub async fn dispatch<B: Backend>(
    ctx: &Context<B>,
    request: &CommandRequest,
) -> Result<Reply, NightfallError> {
    tracing::debug!(
        locator = %request.locator,
        event = %request.event,
        actor = %request.actor,
        command = %request.kind,
        "dispatching"
    );
    match request.kind {
        CommandKind::Join => handler::join(ctx, request).await,
        CommandKind::Vote | CommandKind::For => handler::vote(ctx, request).await,
        CommandKind::Unvote => handler::unvote(ctx, request).await,
        CommandKind::NoLynch => handler::no_lynch(ctx, request).await,
        CommandKind::Target => handler::target(ctx, request).await,
        CommandKind::ListPlayers => handler::list_players(ctx, request, false).await,
        CommandKind::ListAllPlayers => handler::list_players(ctx, request, true).await,
        CommandKind::ListVotes => handler::list_votes(ctx, request).await,
        CommandKind::Prepare => moderation::prepare(ctx, request).await,
        CommandKind::Start => moderation::start(ctx, request).await,
        CommandKind::Set => moderation::set(ctx, request).await,
        CommandKind::Kill => moderation::kill(ctx, request).await,
        CommandKind::NewDay => moderation::advance(ctx, request, true).await,
        CommandKind::NextPhase => moderation::advance(ctx, request, false).await,
        CommandKind::End => moderation::end(ctx, request).await,
    }
}

/// Resolves a locator, mapping an unknown game to `None`.
///
/// A command in a topic or chat that holds no game is not an error: it is
/// most likely aimed at something else.
pub(crate) async fn locate<B: Backend>(
    ctx: &Context<B>,
    locator: &GameLocator,
) -> Result<Option<GameId>, NightfallError> {
    match ctx.store().resolve(locator).await {
        Ok(id) => Ok(Some(id)),
        Err(GameError::GameNotFound(_)) => {
            tracing::debug!(%locator, "no game here, ignoring command");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(args: &[&str]) -> CommandRequest {
        CommandRequest::new(GameId(1), EventId(1), "Lars", CommandKind::Vote).with_args(args.iter().copied())
    }

    #[test]
    fn test_vote_target_skips_for_and_mention() {
        assert_eq!(request(&["@Sadie"]).vote_target(), Some("Sadie"));
        assert_eq!(request(&["for", "Sadie."]).vote_target(), Some("Sadie"));
        assert_eq!(request(&["FOR", "@Sadie!"]).vote_target(), Some("Sadie"));
        assert_eq!(request(&["for"]).vote_target(), None);
        assert_eq!(request(&[]).vote_target(), None);
    }

    #[test]
    fn test_phase_end_needs_text_after_ends() {
        assert_eq!(request(&["ends", "at", "noon"]).phase_end(), Some("at noon".into()));
        assert_eq!(request(&["ends"]).phase_end(), None);
        assert_eq!(request(&["at", "noon"]).phase_end(), None);
    }

    #[test]
    fn test_game_override_numeric_and_named() {
        let by_id = request(&["Lars", "loved", "in", "45"]);
        assert_eq!(by_id.game_override(2), Some(GameLocator::Topic(GameId(45))));

        let by_name = request(&["Lars", "loved", "in", "Beach", "City"]);
        assert_eq!(by_name.game_override(2), Some(GameLocator::Name("Beach City".into())));

        assert_eq!(request(&["Lars", "loved"]).game_override(2), None);
        assert_eq!(request(&["Lars", "loved", "in"]).game_override(2), None);
    }

    #[test]
    fn test_request_deserializes_without_args() {
        let json = r#"{
            "locator": { "Topic": 7 },
            "event": 3,
            "actor": "Lars",
            "kind": "list-votes"
        }"#;
        let request: CommandRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, CommandKind::ListVotes);
        assert!(request.args.is_empty());
    }
}
