//! Player command handlers.
//!
//! Each handler resolves the game, then runs all of its reads and writes
//! inside a single [`GameStore::update`](nightfall_game::GameStore::update)
//! or `read`, so a command is applied and persisted as one step.

use rand::seq::SliceRandom;

use nightfall_game::{Backend, Game, GameError, LynchVerdict, VoteCount};
use nightfall_roster::RosterError;

use crate::command::locate;
use crate::{CommandRequest, Context, NightfallError, PlayerListing, Reply, VoteReport};

/// `join`: registers the poster as a player.
pub(crate) async fn join<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            match game.add_player(&req.actor) {
                Ok(player) => Ok(Reply::Joined {
                    player: player.username().to_string(),
                }),
                Err(GameError::Roster(RosterError::UserExists(player))) => {
                    tracing::debug!(game_id = %id, %player, "already joined");
                    Ok(Reply::AlreadyJoined { player })
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
}

/// `vote <player>`, `vote for <player>`, `for <player>`.
pub(crate) async fn vote<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    let target = req
        .vote_target()
        .ok_or_else(|| NightfallError::usage(req.kind, "vote <player>"))?;
    ctx.store()
        .update(id, |game| cast(game, req, Some(target)))
        .await
}

/// `nolynch`: a vote with no target.
pub(crate) async fn no_lynch<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    ctx.store().update(id, |game| cast(game, req, None)).await
}

/// Casts the vote and, on a hammer, carries out the lynch in the same step.
fn cast(game: &mut Game, req: &CommandRequest, target: Option<&str>) -> Result<Reply, NightfallError> {
    let ballot = game.cast_vote(req.event, &req.actor, target)?;
    let voter = game.player(&req.actor)?.username().to_string();
    let VoteCount { votes, required } = ballot.verdict.count();

    if !ballot.verdict.fires() {
        return Ok(Reply::Voted {
            voter,
            target: ballot.target,
            token: ballot.token,
            votes,
            required,
            lynchproof: matches!(ballot.verdict, LynchVerdict::Lynchproof(_)),
        });
    }

    match ballot.target {
        Some(target) => {
            let phase = game.lynch(&target)?;
            Ok(Reply::Lynched {
                voter,
                target,
                votes,
                required,
                phase,
            })
        }
        None => {
            let phase = game.no_lynch()?;
            Ok(Reply::NoLynch {
                voter,
                votes,
                required,
                phase,
            })
        }
    }
}

/// `unvote [player]`: withdraws the poster's votes (both of a doublevoter's).
pub(crate) async fn unvote<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    let target = req.vote_target();
    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            let withdrawn = game.withdraw_vote(req.event, &req.actor, target)?.len();
            let voter = game.player(&req.actor)?.username().to_string();
            Ok(Reply::Unvoted { voter, withdrawn })
        })
        .await
}

/// `target <player>`: files a night action.
pub(crate) async fn target<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    let target = req
        .name_arg(0)
        .ok_or_else(|| NightfallError::usage(req.kind, "target <player>"))?;
    ctx.store()
        .update(id, |game| -> Result<Reply, NightfallError> {
            let token = game.target(req.event, &req.actor, target)?.token().clone();
            Ok(Reply::Targeted {
                actor: game.player(&req.actor)?.username().to_string(),
                target: game.player(target)?.username().to_string(),
                token,
            })
        })
        .await
}

/// `list-players` / `list-all-players`. Silent outside an active game.
pub(crate) async fn list_players<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
    include_dead: bool,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    let listing = ctx
        .store()
        .read(id, |game| {
            game.is_active()
                .then(|| PlayerListing::from_game(game, include_dead))
        })
        .await?;
    let Some(mut listing) = listing else {
        tracing::debug!(game_id = %id, "listing outside active play ignored");
        return Ok(Reply::Ignored);
    };

    if ctx.config().shuffle_listings {
        let mut rng = rand::rng();
        listing.living.shuffle(&mut rng);
        if let Some(dead) = listing.dead.as_mut() {
            dead.shuffle(&mut rng);
        }
    }
    Ok(Reply::Players(listing))
}

/// `list-votes`: today's vote report. Silent outside an active game.
pub(crate) async fn list_votes<B: Backend>(
    ctx: &Context<B>,
    req: &CommandRequest,
) -> Result<Reply, NightfallError> {
    let Some(id) = locate(ctx, &req.locator).await? else {
        return Ok(Reply::Ignored);
    };
    let report = ctx
        .store()
        .read(id, |game| game.is_active().then(|| VoteReport::from_game(game)))
        .await?;
    Ok(match report {
        Some(report) => Reply::Votes(report),
        None => {
            tracing::debug!(game_id = %id, "vote report outside active play ignored");
            Reply::Ignored
        }
    })
}
