//! Moderator command handlers.
//!
//! Every command here checks that the poster moderates the game before
//! anything else; all but `prepare` and `start` also need a running game.

use nightfall_game::{Backend, GameError, Participant, lynch};
use nightfall_protocol::{GameLocator, PlayerProperty};
use nightfall_roster::RosterError;

use crate::command::locate;
use crate::reply::usernames;
use crate::{CommandRequest, Context, NightfallError, PHASE_END, Reply};

/// `prepare <name>`: creates the game for this topic with the poster as
/// moderator. On an existing game, adds the poster as a moderator and
/// records `<name>` as an alias; a poster who already joined as a player
/// gets `UserExists`.
pub(crate) async fn prepare<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    const USAGE: &str = "prepare <game name> (posted in the game topic)";

    let GameLocator::Topic(id) = req.locator else {
        return Err(NightfallError::usage(req.kind, USAGE));
    };
    let name = req
        .rest(0)
        .ok_or_else(|| NightfallError::usage(req.kind, USAGE))?;

    let mut game = ctx.seeded_game(id, &name);
    game.add_moderator(&req.actor)?;
    match ctx.store().insert(game).await {
        Ok(game) => {
            return Ok(Reply::GamePrepared {
                game: id,
                name: game.name().to_string(),
                created: true,
            });
        }
        Err(GameError::GameExists(_)) => {
            tracing::info!(game_id = %id, "game exists, augmenting");
        }
        Err(e) => return Err(e.into()),
    }

    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            // A moderator re-preparing is fine; a joined player can't promote
            // themselves.
            match game.players().find(&req.actor) {
                Some(user) if user.is_moderator() => {}
                Some(user) => {
                    return Err(RosterError::UserExists(user.username().to_string()).into());
                }
                None => {
                    game.add_moderator(&req.actor)?;
                }
            }
            game.add_alias(&name);
            Ok(Reply::GamePrepared {
                game: id,
                name: game.name().to_string(),
                created: false,
            })
        })
        .await
}

/// `start`: moves the game from signups into day 1.
pub(crate) async fn start<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            game.ensure_moderator(&req.actor)?;
            game.activate()?;
            Ok(Reply::Started {
                game: id,
                players: usernames(game.players().live_players()),
                required: game.votes_required(None)?,
            })
        })
        .await
}

/// `set <player> <property> [in <game>]`.
pub(crate) async fn set<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    const USAGE: &str = "set <player> <property> [in <game>]";

    let locator = req.game_override(2).unwrap_or_else(|| req.locator.clone());
    let Some(id) = locate(ctx, &locator).await? else {
        return Ok(Reply::Ignored);
    };
    let (Some(player), Some(property)) = (req.name_arg(0), req.arg(1)) else {
        return Err(NightfallError::usage(req.kind, USAGE));
    };
    let property: PlayerProperty = property.parse()?;

    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            game.ensure_moderator(&req.actor)?;
            game.ensure_active()?;
            let player = game
                .live_player(player, Participant::Target)?
                .username()
                .to_string();
            let added = game.set_property(&player, property)?;
            Ok(Reply::PropertySet {
                player,
                property,
                added,
            })
        })
        .await
}

/// `kill <player>`: a moderator kill outside the vote.
pub(crate) async fn kill<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    let player = req
        .name_arg(0)
        .ok_or_else(|| NightfallError::usage(req.kind, "kill <player>"))?;

    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            game.ensure_moderator(&req.actor)?;
            game.ensure_active()?;
            let was_alive = game.kill_player(player)?;
            Ok(Reply::Killed {
                player: game.player(player)?.username().to_string(),
                was_alive,
            })
        })
        .await
}

/// `new-day [ends <text>]` and `next-phase [ends <text>]`.
///
/// The announced phase end is stored as the `phaseEnd` setting; advancing
/// without one clears the previous phase's.
pub(crate) async fn advance<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
    new_day: bool,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    let phase_end = req.phase_end();

    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            game.ensure_moderator(&req.actor)?;
            let change = if new_day {
                game.new_day()?
            } else {
                game.next_phase()?
            };
            match &phase_end {
                Some(text) => game.set_value(PHASE_END, text.as_str().into()),
                None => game.remove_value(PHASE_END),
            };

            let live = game.players().live_players();
            Ok(Reply::PhaseAdvanced {
                day: change.day,
                time: change.time,
                new_day: change.new_day,
                phase_end: phase_end.clone(),
                live_players: usernames(live),
                required: lynch::votes_required(game.players().live_count(), None),
            })
        })
        .await
}

/// `end`: closes the game for good.
pub(crate) async fn end<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            game.ensure_moderator(&req.actor)?;
            game.end()?;
            Ok(Reply::Ended { game: id })
        })
        .await
}
