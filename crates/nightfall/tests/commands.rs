//! End-to-end command tests: requests in, typed replies out.

use nightfall::prelude::*;
use nightfall_game::{Participant, PhaseViolation};
use nightfall_roster::RosterError;

const TOPIC: GameId = GameId(45);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Table {
    ctx: Context<MemoryBackend>,
    next_event: std::cell::Cell<u64>,
}

impl Table {
    async fn new() -> Self {
        let ctx = Context::builder()
            .shuffle_listings(false)
            .build_in_memory()
            .await
            .unwrap();
        Self {
            ctx,
            next_event: std::cell::Cell::new(1),
        }
    }

    async fn run(&self, actor: &str, kind: CommandKind, args: &[&str]) -> Result<Reply, NightfallError> {
        let event = self.next_event.get();
        self.next_event.set(event + 1);
        let request = CommandRequest::new(TOPIC, EventId(event), actor, kind)
            .with_args(args.iter().copied());
        self.ctx.handle(&request).await
    }

    /// A started game moderated by Garnet.
    async fn started(players: &[&str]) -> Self {
        let table = Self::new().await;
        table.run("Garnet", CommandKind::Prepare, &["Beach", "City"]).await.unwrap();
        for player in players {
            table.run(player, CommandKind::Join, &[]).await.unwrap();
        }
        table.run("Garnet", CommandKind::Start, &[]).await.unwrap();
        table
    }

    async fn game(&self) -> Game {
        self.ctx.store().game_by_id(TOPIC).await.unwrap()
    }
}

// =========================================================================
// Setup
// =========================================================================

#[tokio::test]
async fn test_prepare_creates_game_with_default_settings() {
    let table = Table::new().await;
    let reply = table.run("Garnet", CommandKind::Prepare, &["Beach", "City"]).await.unwrap();
    assert_eq!(
        reply,
        Reply::GamePrepared {
            game: TOPIC,
            name: "Beach City".into(),
            created: true,
        }
    );

    let game = table.game().await;
    assert!(game.player("garnet").unwrap().is_moderator());
    assert_eq!(game.value("voteBars"), Some(&"bastard".into()));
}

#[tokio::test]
async fn test_prepare_existing_game_adds_moderator() {
    let table = Table::new().await;
    table.run("Garnet", CommandKind::Prepare, &["Beach", "City"]).await.unwrap();
    let reply = table.run("Pearl", CommandKind::Prepare, &["Little", "Homeworld"]).await.unwrap();
    assert!(matches!(reply, Reply::GamePrepared { created: false, .. }));

    let game = table.game().await;
    assert!(game.player("Pearl").unwrap().is_moderator());
    assert!(game.answers_to("little homeworld"));
}

#[tokio::test]
async fn test_prepare_existing_game_by_player_rejected() {
    let table = Table::new().await;
    table.run("Garnet", CommandKind::Prepare, &["Beach", "City"]).await.unwrap();
    table.run("Lars", CommandKind::Join, &[]).await.unwrap();

    let err = table.run("Lars", CommandKind::Prepare, &["Lars", "Game"]).await.unwrap_err();
    assert!(matches!(err, NightfallError::Roster(RosterError::UserExists(_))));

    let game = table.game().await;
    assert!(!game.player("Lars").unwrap().is_moderator());
    assert!(!game.answers_to("lars game"));
}

#[tokio::test]
async fn test_prepare_again_by_moderator_adds_alias() {
    let table = Table::new().await;
    table.run("Garnet", CommandKind::Prepare, &["Beach", "City"]).await.unwrap();
    let reply = table.run("Garnet", CommandKind::Prepare, &["Crystal", "Temple"]).await.unwrap();
    assert!(matches!(reply, Reply::GamePrepared { created: false, .. }));
    assert!(table.game().await.answers_to("crystal temple"));
}

#[tokio::test]
async fn test_prepare_without_name_is_usage_error() {
    let table = Table::new().await;
    let err = table.run("Garnet", CommandKind::Prepare, &[]).await.unwrap_err();
    assert!(matches!(err, NightfallError::Validation { command: CommandKind::Prepare, .. }));
}

#[tokio::test]
async fn test_join_twice_answers_already_joined() {
    let table = Table::new().await;
    table.run("Garnet", CommandKind::Prepare, &["Beach", "City"]).await.unwrap();

    let first = table.run("Lars", CommandKind::Join, &[]).await.unwrap();
    let second = table.run("lars", CommandKind::Join, &[]).await.unwrap();
    assert_eq!(first, Reply::Joined { player: "Lars".into() });
    assert!(matches!(second, Reply::AlreadyJoined { .. }));
}

#[tokio::test]
async fn test_join_after_start_rejected() {
    let table = Table::started(&["Lars", "Sadie"]).await;
    let err = table.run("Steven", CommandKind::Join, &[]).await.unwrap_err();
    assert!(matches!(
        err,
        NightfallError::Game(GameError::InvalidPhase(PhaseViolation::AlreadyStarted))
    ));
}

#[tokio::test]
async fn test_command_in_unknown_game_is_ignored() {
    let table = Table::new().await;
    for kind in [CommandKind::Join, CommandKind::Vote, CommandKind::ListVotes, CommandKind::Kill] {
        let reply = table.run("Lars", kind, &["Sadie"]).await.unwrap();
        assert_eq!(reply, Reply::Ignored, "{kind}");
    }
}

// =========================================================================
// Voting
// =========================================================================

#[tokio::test]
async fn test_loved_player_lynched_on_fourth_vote() {
    let table = Table::started(&["Lars", "Sadie", "Steven", "Pearl"]).await;
    table.run("Garnet", CommandKind::Set, &["Sadie", "loved"]).await.unwrap();

    for (voter, expected) in [("Lars", 1), ("Steven", 2), ("Pearl", 3)] {
        let reply = table.run(voter, CommandKind::Vote, &["for", "@Sadie"]).await.unwrap();
        match reply {
            Reply::Voted { votes, required, .. } => {
                assert_eq!(votes, expected);
                assert_eq!(required, 4);
            }
            other => panic!("expected a plain vote, got {other:?}"),
        }
    }

    let reply = table.run("Sadie", CommandKind::For, &["Sadie"]).await.unwrap();
    let Reply::Lynched { target, votes, required, phase, .. } = reply else {
        panic!("expected the hammer, got {reply:?}");
    };
    assert_eq!(target, "Sadie");
    assert_eq!((votes, required), (4, 4));
    assert_eq!(phase.time, TimeOfDay::Night);

    let game = table.game().await;
    assert!(!game.player("Sadie").unwrap().is_alive());
    assert!(!game.is_day());
}

#[tokio::test]
async fn test_vote_without_target_is_usage_error() {
    let table = Table::started(&["Lars", "Sadie"]).await;
    let err = table.run("Lars", CommandKind::Vote, &["for"]).await.unwrap_err();
    assert!(matches!(err, NightfallError::Validation { command: CommandKind::Vote, .. }));
}

#[tokio::test]
async fn test_vote_by_outsider_rejected() {
    let table = Table::started(&["Lars", "Sadie"]).await;
    let err = table.run("Jasper", CommandKind::Vote, &["Lars"]).await.unwrap_err();
    assert!(matches!(
        err,
        NightfallError::Game(GameError::PlayerNotFound { .. })
    ));
}

#[tokio::test]
async fn test_unvote_withdraws_current_vote() {
    let table = Table::started(&["Lars", "Sadie", "Steven", "Pearl"]).await;
    table.run("Lars", CommandKind::Vote, &["Sadie"]).await.unwrap();

    let reply = table.run("Lars", CommandKind::Unvote, &[]).await.unwrap();
    assert_eq!(reply, Reply::Unvoted { voter: "Lars".into(), withdrawn: 1 });
    assert_eq!(table.game().await.tally(Some("Sadie")), 0);
}

#[tokio::test]
async fn test_no_lynch_majority_ends_day() {
    let table = Table::started(&["Lars", "Sadie", "Steven"]).await;
    table.run("Lars", CommandKind::NoLynch, &[]).await.unwrap();
    let reply = table.run("Sadie", CommandKind::NoLynch, &[]).await.unwrap();

    assert!(matches!(reply, Reply::NoLynch { votes: 2, required: 2, .. }));
    let game = table.game().await;
    assert!(!game.is_day());
    assert_eq!(game.players().live_count(), 3);
}

#[tokio::test]
async fn test_scum_target_uses_faction_token() {
    let table = Table::started(&["Lars", "Sadie", "Steven"]).await;
    table.run("Garnet", CommandKind::Set, &["Lars", "mafia"]).await.unwrap();
    table.run("Garnet", CommandKind::NextPhase, &[]).await.unwrap();

    let reply = table.run("Lars", CommandKind::Target, &["@Steven"]).await.unwrap();
    assert_eq!(
        reply,
        Reply::Targeted {
            actor: "Lars".into(),
            target: "Steven".into(),
            token: ActionToken::Scum,
        }
    );
}

// =========================================================================
// Listings
// =========================================================================

#[tokio::test]
async fn test_listing_before_start_is_ignored() {
    let table = Table::new().await;
    table.run("Garnet", CommandKind::Prepare, &["Beach", "City"]).await.unwrap();
    table.run("Lars", CommandKind::Join, &[]).await.unwrap();

    for kind in [CommandKind::ListPlayers, CommandKind::ListAllPlayers, CommandKind::ListVotes] {
        assert_eq!(table.run("Lars", kind, &[]).await.unwrap(), Reply::Ignored);
    }
}

#[tokio::test]
async fn test_list_all_players_includes_dead() {
    let table = Table::started(&["Lars", "Sadie", "Steven"]).await;
    table.run("Garnet", CommandKind::Kill, &["Sadie"]).await.unwrap();

    let living_only = table.run("Lars", CommandKind::ListPlayers, &[]).await.unwrap();
    assert_eq!(
        living_only,
        Reply::Players(PlayerListing {
            living: vec!["Lars".into(), "Steven".into()],
            dead: None,
            moderators: vec!["Garnet".into()],
        })
    );

    let everyone = table.run("Lars", CommandKind::ListAllPlayers, &[]).await.unwrap();
    let Reply::Players(listing) = everyone else {
        panic!("expected a listing");
    };
    assert_eq!(listing.dead, Some(vec!["Sadie".to_string()]));
}

#[tokio::test]
async fn test_list_votes_reports_revoked_and_not_voting() {
    let table = Table::started(&["Lars", "Sadie", "Steven", "Pearl", "Amethyst"]).await;
    table.run("Garnet", CommandKind::Set, &["Steven", "hated"]).await.unwrap();
    table.run("Lars", CommandKind::Vote, &["Sadie"]).await.unwrap();
    table.run("Lars", CommandKind::Vote, &["Steven"]).await.unwrap();
    table.run("Pearl", CommandKind::NoLynch, &[]).await.unwrap();

    let Reply::Votes(report) = table.run("Sadie", CommandKind::ListVotes, &[]).await.unwrap() else {
        panic!("expected a vote report");
    };
    assert_eq!(report.day, 1);
    assert_eq!(report.required, 3);
    assert_eq!(report.buckets.len(), 3);

    let sadie = &report.buckets[0];
    assert_eq!(sadie.target.as_deref(), Some("Sadie"));
    assert_eq!(sadie.count, 0);
    assert!(!sadie.votes[0].current);
    assert!(sadie.votes[0].revoked_by.is_some());

    let steven = &report.buckets[1];
    assert_eq!((steven.count, steven.modifier), (1, -1));

    let no_lynch = &report.buckets[2];
    assert_eq!(no_lynch.target, None);
    assert_eq!(no_lynch.count, 1);

    assert_eq!(report.not_voting, vec!["Sadie", "Steven", "Amethyst"]);
}

// =========================================================================
// Moderation
// =========================================================================

#[tokio::test]
async fn test_moderator_commands_reject_players() {
    let table = Table::started(&["Lars", "Sadie"]).await;
    for (kind, args) in [
        (CommandKind::Kill, &["Sadie"][..]),
        (CommandKind::Set, &["Sadie", "loved"][..]),
        (CommandKind::NextPhase, &[][..]),
        (CommandKind::End, &[][..]),
    ] {
        let err = table.run("Lars", kind, args).await.unwrap_err();
        assert!(matches!(err, NightfallError::Game(GameError::NotModerator(_))), "{kind}");
    }
}

#[tokio::test]
async fn test_set_unknown_property_rejected() {
    let table = Table::started(&["Lars"]).await;
    let err = table.run("Garnet", CommandKind::Set, &["Lars", "vanilla"]).await.unwrap_err();
    assert!(matches!(err, NightfallError::Protocol(_)));
}

#[tokio::test]
async fn test_set_in_named_game() {
    let table = Table::started(&["Lars"]).await;
    let reply = table
        .run("Garnet", CommandKind::Set, &["Lars", "cop", "in", "beach", "city"])
        .await
        .unwrap();
    assert!(matches!(reply, Reply::PropertySet { added: true, .. }));
}

#[tokio::test]
async fn test_kill_twice_reports_already_dead() {
    let table = Table::started(&["Lars", "Sadie"]).await;
    let first = table.run("Garnet", CommandKind::Kill, &["Sadie"]).await.unwrap();
    let second = table.run("Garnet", CommandKind::Kill, &["sadie"]).await.unwrap();
    assert_eq!(first, Reply::Killed { player: "Sadie".into(), was_alive: true });
    assert_eq!(second, Reply::Killed { player: "Sadie".into(), was_alive: false });
}

#[tokio::test]
async fn test_kill_moderator_rejected() {
    let table = Table::started(&["Lars", "Sadie"]).await;
    let err = table.run("Garnet", CommandKind::Kill, &["Garnet"]).await.unwrap_err();
    assert!(matches!(
        err,
        NightfallError::Game(GameError::NotAPlayer { role: Participant::Target, .. })
    ));
    assert!(table.game().await.player("Garnet").unwrap().is_alive());
}

#[tokio::test]
async fn test_unvote_dead_target_rejected() {
    let table = Table::started(&["Lars", "Sadie", "Steven", "Pearl"]).await;
    table.run("Lars", CommandKind::Vote, &["Sadie"]).await.unwrap();
    table.run("Garnet", CommandKind::Kill, &["Sadie"]).await.unwrap();

    let err = table.run("Lars", CommandKind::Unvote, &["Sadie"]).await.unwrap_err();
    assert!(matches!(
        err,
        NightfallError::Game(GameError::DeadParticipant { role: Participant::Target, .. })
    ));
}

#[tokio::test]
async fn test_target_by_moderator_rejected() {
    let table = Table::started(&["Lars", "Sadie"]).await;
    let err = table.run("Garnet", CommandKind::Target, &["Lars"]).await.unwrap_err();
    assert!(matches!(
        err,
        NightfallError::Game(GameError::NotAPlayer { role: Participant::Actor, .. })
    ));
}

#[tokio::test]
async fn test_next_phase_stores_phase_end() {
    let table = Table::started(&["Lars", "Sadie", "Steven"]).await;
    let reply = table
        .run("Garnet", CommandKind::NextPhase, &["ends", "at", "dawn"])
        .await
        .unwrap();
    let Reply::PhaseAdvanced { time, new_day, phase_end, .. } = reply else {
        panic!("expected a phase change");
    };
    assert_eq!(time, TimeOfDay::Night);
    assert!(!new_day);
    assert_eq!(phase_end.as_deref(), Some("at dawn"));
    assert_eq!(table.game().await.value(nightfall::PHASE_END), Some(&"at dawn".into()));

    let reply = table.run("Garnet", CommandKind::NewDay, &[]).await.unwrap();
    assert!(matches!(reply, Reply::PhaseAdvanced { day: 2, new_day: true, phase_end: None, .. }));
    assert_eq!(table.game().await.value(nightfall::PHASE_END), None);
}

#[tokio::test]
async fn test_end_closes_game() {
    let table = Table::started(&["Lars", "Sadie"]).await;
    assert_eq!(
        table.run("Garnet", CommandKind::End, &[]).await.unwrap(),
        Reply::Ended { game: TOPIC }
    );
    assert_eq!(table.run("Lars", CommandKind::ListPlayers, &[]).await.unwrap(), Reply::Ignored);

    let err = table.run("Lars", CommandKind::Vote, &["Sadie"]).await.unwrap_err();
    assert!(matches!(
        err,
        NightfallError::Game(GameError::InvalidPhase(PhaseViolation::Ended))
    ));
}

// =========================================================================
// Persistence
// =========================================================================

#[tokio::test]
async fn test_file_context_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::from_json_str(&format!(
        r#"{{ "data_dir": {:?}, "shuffle_listings": false }}"#,
        dir.path().display().to_string()
    ))
    .unwrap();

    {
        let ctx = Context::builder().config(config.clone()).build_file().await.unwrap();
        let prepare = CommandRequest::new(TOPIC, EventId(1), "Garnet", CommandKind::Prepare)
            .with_args(["Beach", "City"]);
        ctx.handle(&prepare).await.unwrap();
        ctx.handle(&CommandRequest::new(TOPIC, EventId(2), "Lars", CommandKind::Join))
            .await
            .unwrap();
    }

    let ctx = Context::builder().config(config).build_file().await.unwrap();
    let game = ctx.store().game_by_name("beach city").await.unwrap();
    assert!(game.player("Lars").is_ok());
}

#[tokio::test]
async fn test_build_file_without_data_dir_fails() {
    let result = Context::builder().build_file().await;
    assert!(matches!(result, Err(NightfallError::Config(_))));
}

#[tokio::test]
async fn test_store_failure_surfaces_and_keeps_state() {
    let table = Table::started(&["Lars", "Sadie", "Steven"]).await;
    table.ctx.store().backend().set_failing(true);

    let err = table.run("Lars", CommandKind::Vote, &["Sadie"]).await.unwrap_err();
    assert!(matches!(err, NightfallError::Game(GameError::StoreFailure(_))));

    table.ctx.store().backend().set_failing(false);
    assert_eq!(table.game().await.tally(Some("Sadie")), 0);
}
