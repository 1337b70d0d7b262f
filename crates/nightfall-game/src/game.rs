//! The game aggregate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nightfall_protocol::{ActionToken, ActionType, ChatId, EventId, GameId, PlayerProperty};
use nightfall_roster::{Player, PlayerRegistry};

use crate::lynch::{self, LynchVerdict};
use crate::{
    Action, ActionFilter, ActionId, ActionLedger, GameError, Participant, PhaseChange,
    PhaseMachine,
};

/// The result of a successful vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ballot {
    /// The ledger entry the vote was recorded as.
    pub action: ActionId,
    /// `vote`, or `doubleVote` for a doublevoter's second vote.
    pub token: ActionToken,
    /// Display name of the target; `None` for a no-lynch vote.
    pub target: Option<String>,
    /// Whether this vote was the hammer.
    pub verdict: LynchVerdict,
}

/// One game: its players, its action history, its phase, its settings.
///
/// All mutation goes through `&mut self`; the [`GameStore`](crate::GameStore)
/// hands out exclusive access one command at a time and persists the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    chats: Vec<ChatId>,
    phase: PhaseMachine,
    players: PlayerRegistry,
    actions: ActionLedger,
    #[serde(default)]
    settings: BTreeMap<String, Value>,
}

impl Game {
    pub fn new(id: GameId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            aliases: Vec::new(),
            chats: Vec::new(),
            phase: PhaseMachine::new(),
            players: PlayerRegistry::new(),
            actions: ActionLedger::new(),
            settings: BTreeMap::new(),
        }
    }

    // -- Identity ----------------------------------------------------------

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn chats(&self) -> &[ChatId] {
        &self.chats
    }

    /// Case-insensitive match against the name and every alias.
    pub fn answers_to(&self, name: &str) -> bool {
        let wanted = name.trim();
        self.name.eq_ignore_ascii_case(wanted)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(wanted))
    }

    /// Returns `false` if the game already answers to `alias`.
    pub fn add_alias(&mut self, alias: &str) -> bool {
        let alias = alias.trim();
        if alias.is_empty() || self.answers_to(alias) {
            return false;
        }
        self.aliases.push(alias.to_string());
        true
    }

    pub fn remove_alias(&mut self, alias: &str) -> bool {
        let before = self.aliases.len();
        self.aliases.retain(|a| !a.eq_ignore_ascii_case(alias.trim()));
        self.aliases.len() != before
    }

    pub fn has_chat(&self, chat: ChatId) -> bool {
        self.chats.contains(&chat)
    }

    pub fn add_chat(&mut self, chat: ChatId) -> bool {
        if self.has_chat(chat) {
            return false;
        }
        self.chats.push(chat);
        true
    }

    pub fn remove_chat(&mut self, chat: ChatId) -> bool {
        let before = self.chats.len();
        self.chats.retain(|c| *c != chat);
        self.chats.len() != before
    }

    // -- Phase -------------------------------------------------------------

    pub fn phase(&self) -> &PhaseMachine {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn is_day(&self) -> bool {
        self.phase.is_day()
    }

    pub fn day(&self) -> u32 {
        self.phase.day()
    }

    pub fn ensure_active(&self) -> Result<(), GameError> {
        Ok(self.phase.ensure_active()?)
    }

    pub fn activate(&mut self) -> Result<(), GameError> {
        self.phase.activate()?;
        tracing::info!(game_id = %self.id, "game started");
        Ok(())
    }

    pub fn next_phase(&mut self) -> Result<PhaseChange, GameError> {
        let change = self.phase.next_phase()?;
        tracing::info!(game_id = %self.id, day = change.day, time = %change.time, "phase advanced");
        Ok(change)
    }

    pub fn new_day(&mut self) -> Result<PhaseChange, GameError> {
        let change = self.phase.new_day()?;
        tracing::info!(game_id = %self.id, day = change.day, "new day");
        Ok(change)
    }

    pub fn end(&mut self) -> Result<(), GameError> {
        self.phase.end()?;
        tracing::info!(game_id = %self.id, "game ended");
        Ok(())
    }

    // -- Players -----------------------------------------------------------

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// Joins a player. Only allowed before the game starts.
    pub fn add_player(&mut self, username: &str) -> Result<&Player, GameError> {
        self.phase.ensure_pending()?;
        let player = self.players.add_player(username)?;
        tracing::info!(game_id = %self.id, player = %player, "player joined");
        Ok(player)
    }

    /// Adds a moderator, in any phase.
    pub fn add_moderator(&mut self, username: &str) -> Result<&Player, GameError> {
        let moderator = self.players.add_moderator(username)?;
        tracing::info!(game_id = %self.id, moderator = %moderator, "moderator added");
        Ok(moderator)
    }

    pub fn player(&self, username: &str) -> Result<&Player, GameError> {
        Ok(self.players.get(username)?)
    }

    /// Returns `Ok(false)` if the player was already dead. Moderators can't
    /// be killed.
    pub fn kill_player(&mut self, username: &str) -> Result<bool, GameError> {
        self.participant(username, Participant::Target)?;
        Ok(self.players.kill(username)?)
    }

    pub fn revive_player(&mut self, username: &str) -> Result<bool, GameError> {
        Ok(self.players.revive(username)?)
    }

    pub fn has_property(&self, username: &str, property: PlayerProperty) -> Result<bool, GameError> {
        Ok(self.players.has_property(username, property)?)
    }

    pub fn set_property(&mut self, username: &str, property: PlayerProperty) -> Result<bool, GameError> {
        Ok(self.players.set_property(username, property)?)
    }

    pub fn remove_property(
        &mut self,
        username: &str,
        property: PlayerProperty,
    ) -> Result<bool, GameError> {
        Ok(self.players.remove_property(username, property)?)
    }

    pub fn player_value(&self, username: &str, key: &str) -> Result<Option<&Value>, GameError> {
        Ok(self.players.get(username)?.value(key))
    }

    pub fn set_player_value(
        &mut self,
        username: &str,
        key: &str,
        value: Value,
    ) -> Result<Option<Value>, GameError> {
        Ok(self.players.set_value(username, key, value)?)
    }

    /// Fails unless `username` is the name of one of this game's moderators.
    pub fn ensure_moderator(&self, username: &str) -> Result<&Player, GameError> {
        match self.players.find(username) {
            Some(player) if player.is_moderator() => Ok(player),
            _ => Err(GameError::NotModerator(username.to_string())),
        }
    }

    // -- Settings ----------------------------------------------------------

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Stores a setting and returns the previous value.
    pub fn set_value(&mut self, key: &str, value: Value) -> Option<Value> {
        self.settings.insert(key.to_string(), value)
    }

    pub fn remove_value(&mut self, key: &str) -> Option<Value> {
        self.settings.remove(key)
    }

    pub fn settings(&self) -> &BTreeMap<String, Value> {
        &self.settings
    }

    // -- Ledger ------------------------------------------------------------

    pub fn ledger(&self) -> &ActionLedger {
        &self.actions
    }

    /// Records an action on the current day. See [`ActionLedger::register`].
    pub fn register_action(
        &mut self,
        event: EventId,
        actor: &str,
        target: Option<&str>,
        kind: ActionType,
        token: ActionToken,
    ) -> Result<&Action, GameError> {
        let day = self.phase.day();
        let action = self
            .actions
            .register(&self.players, day, event, actor, target, kind, token)?;
        tracing::info!(
            game_id = %self.id,
            %event,
            actor = action.actor(),
            target = action.target().unwrap_or("-"),
            kind = %action.kind(),
            token = %action.token(),
            "action registered"
        );
        Ok(action)
    }

    /// See [`ActionLedger::revoke`].
    pub fn revoke_action(
        &mut self,
        event: EventId,
        actor: &str,
        target: Option<&str>,
        kind: &ActionType,
        token: &ActionToken,
    ) -> Result<Option<ActionId>, GameError> {
        let revoked = self
            .actions
            .revoke(&self.players, event, actor, target, kind, token)?;
        if let Some(id) = revoked {
            tracing::info!(game_id = %self.id, %event, actor, action = id.0, "action revoked");
        }
        Ok(revoked)
    }

    /// See [`ActionLedger::revoke_all`].
    pub fn revoke_all(&mut self, event: EventId, kind: &ActionType, token: &ActionToken) -> Vec<ActionId> {
        let revoked = self.actions.revoke_all(event, kind, token);
        if !revoked.is_empty() {
            tracing::info!(game_id = %self.id, %event, %kind, %token, count = revoked.len(), "actions revoked");
        }
        revoked
    }

    pub fn actions<'a, 'f>(&'a self, filter: &'f ActionFilter) -> impl Iterator<Item = &'a Action> + use<'a, 'f> {
        self.actions.actions(filter)
    }

    // -- Rules -------------------------------------------------------------

    /// Votes needed today to lynch `target`, or to no-lynch when `None`.
    pub fn votes_required(&self, target: Option<&str>) -> Result<usize, GameError> {
        let target = target
            .map(|t| self.resolve(t, Participant::Target))
            .transpose()?;
        Ok(lynch::votes_required(self.players.live_count(), target))
    }

    /// Current votes cast today against `target` (`None` = no-lynch).
    pub fn tally(&self, target: Option<&str>) -> usize {
        lynch::tally(&self.actions, self.phase.day(), target)
    }

    pub fn check_auto_lynch(&self, target: &str) -> Result<LynchVerdict, GameError> {
        lynch::check_auto_lynch(&self.players, &self.actions, self.phase.day(), target)
    }

    /// Casts a day vote against `target`, or a no-lynch vote when `None`.
    ///
    /// # Errors
    /// - [`GameError::InvalidPhase`] unless the game is active and it is day.
    /// - [`GameError::PlayerNotFound`], [`GameError::NotAPlayer`] or
    ///   [`GameError::DeadParticipant`] for the voter or the target.
    ///
    /// The ledger is untouched on error. A verdict that
    /// [fires](LynchVerdict::fires) is the caller's cue to call
    /// [`lynch`](Self::lynch) or [`no_lynch`](Self::no_lynch).
    pub fn cast_vote(
        &mut self,
        event: EventId,
        voter: &str,
        target: Option<&str>,
    ) -> Result<Ballot, GameError> {
        self.phase.ensure_day()?;
        let voter = self.live_player(voter, Participant::Actor)?;
        let token = self.vote_token(voter);
        let voter = voter.key().to_string();
        let target = target
            .map(|t| {
                self.live_player(t, Participant::Target)
                    .map(|p| (p.key().to_string(), p.username().to_string()))
            })
            .transpose()?;

        let target_key = target.as_ref().map(|(key, _)| key.as_str());
        let action = self
            .register_action(event, &voter, target_key, ActionType::Vote, token.clone())?
            .id();

        let verdict = match target_key {
            Some(key) => self.check_auto_lynch(key)?,
            None => lynch::check_no_lynch(&self.players, &self.actions, self.phase.day()),
        };
        let count = verdict.count();
        tracing::info!(
            game_id = %self.id,
            voter = %voter,
            target = target_key.unwrap_or("no-lynch"),
            votes = count.votes,
            required = count.required,
            hammer = verdict.fires(),
            "vote cast"
        );

        Ok(Ballot {
            action,
            token,
            target: target.map(|(_, name)| name),
            verdict,
        })
    }

    /// Withdraws the voter's current votes under both vote tokens.
    ///
    /// With a `target`, only votes pointing at it are withdrawn; the target
    /// must be alive, as for a vote.
    pub fn withdraw_vote(
        &mut self,
        event: EventId,
        voter: &str,
        target: Option<&str>,
    ) -> Result<Vec<ActionId>, GameError> {
        self.phase.ensure_day()?;
        self.live_player(voter, Participant::Actor)?;
        if let Some(target) = target {
            self.live_player(target, Participant::Target)?;
        }

        let mut revoked = Vec::new();
        for token in [ActionToken::Vote, ActionToken::DoubleVote] {
            if let Some(id) = self.revoke_action(event, voter, target, &ActionType::Vote, &token)? {
                revoked.push(id);
            }
        }
        Ok(revoked)
    }

    /// Registers a night action.
    ///
    /// Scum and scum2 members act for their faction: the action is filed
    /// under the faction token and replaces every current faction action,
    /// whichever member made it. Cult leaders file under `cult`, everyone
    /// else under `target`. Moderators take no part on either side.
    pub fn target(
        &mut self,
        event: EventId,
        actor: &str,
        target: &str,
    ) -> Result<&Action, GameError> {
        let token = faction_token(self.participant(actor, Participant::Actor)?);
        self.participant(target, Participant::Target)?;

        if matches!(token, ActionToken::Scum | ActionToken::Scum2) {
            self.revoke_all(event, &ActionType::Target, &token);
        }
        self.register_action(event, actor, Some(target), ActionType::Target, token)
    }

    /// Kills a lynched player and moves the game into night.
    pub fn lynch(&mut self, target: &str) -> Result<PhaseChange, GameError> {
        self.players.kill(target)?;
        tracing::info!(game_id = %self.id, target, "player lynched");
        self.next_phase()
    }

    /// Ends the day without an elimination.
    pub fn no_lynch(&mut self) -> Result<PhaseChange, GameError> {
        tracing::info!(game_id = %self.id, "day ended with no lynch");
        self.next_phase()
    }

    // -- Helpers -----------------------------------------------------------

    fn resolve(&self, name: &str, role: Participant) -> Result<&Player, GameError> {
        self.players.find(name).ok_or_else(|| GameError::PlayerNotFound {
            role,
            name: name.to_string(),
        })
    }

    /// Resolves `name` to a registered non-moderator, living or dead.
    pub fn participant(&self, name: &str, role: Participant) -> Result<&Player, GameError> {
        let player = self.resolve(name, role)?;
        if player.is_moderator() {
            return Err(GameError::NotAPlayer {
                role,
                name: player.username().to_string(),
            });
        }
        Ok(player)
    }

    /// Resolves `name` to a registered, non-moderator, living participant.
    pub fn live_player(&self, name: &str, role: Participant) -> Result<&Player, GameError> {
        let player = self.participant(name, role)?;
        if !player.is_alive() {
            return Err(GameError::DeadParticipant {
                role,
                name: player.username().to_string(),
            });
        }
        Ok(player)
    }

    /// Picks the token a vote by `voter` is filed under.
    ///
    /// A doublevoter fills `vote` first, then `doubleVote`; once both hold
    /// a vote cast today, the older one is replaced.
    fn vote_token(&self, voter: &Player) -> ActionToken {
        if !voter.has_property(PlayerProperty::Doublevoter) {
            return ActionToken::Vote;
        }
        let today = |token: &ActionToken| {
            self.actions
                .current(voter.key(), &ActionType::Vote, token)
                .filter(|a| a.day() == self.phase.day())
                .map(Action::id)
        };
        match (today(&ActionToken::Vote), today(&ActionToken::DoubleVote)) {
            (None, _) => ActionToken::Vote,
            (Some(_), None) => ActionToken::DoubleVote,
            (Some(first), Some(second)) if first < second => ActionToken::Vote,
            (Some(_), Some(_)) => ActionToken::DoubleVote,
        }
    }
}

/// The token a `target` action by `actor` is filed under.
fn faction_token(actor: &Player) -> ActionToken {
    if actor.has_property(PlayerProperty::Scum) {
        ActionToken::Scum
    } else if actor.has_property(PlayerProperty::Scum2) {
        ActionToken::Scum2
    } else if actor.has_property(PlayerProperty::Cultleader) {
        ActionToken::Cult
    } else {
        ActionToken::Target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(names: &[&str]) -> Game {
        let mut game = Game::new(GameId(1), "Beach City");
        game.add_moderator("Garnet").unwrap();
        for name in names {
            game.add_player(name).unwrap();
        }
        game.activate().unwrap();
        game
    }

    #[test]
    fn test_add_player_after_start_fails() {
        let mut game = started(&["Lars"]);
        let err = game.add_player("Sadie").unwrap_err();
        assert!(matches!(err, GameError::InvalidPhase(crate::PhaseViolation::AlreadyStarted)));
    }

    #[test]
    fn test_add_player_twice_fails() {
        let mut game = Game::new(GameId(1), "g");
        game.add_player("Lars").unwrap();
        let err = game.add_player("@lars").unwrap_err();
        assert!(matches!(err, GameError::Roster(nightfall_roster::RosterError::UserExists(_))));
    }

    #[test]
    fn test_revive_player_restores_vote_eligibility() {
        let mut game = started(&["Lars", "Sadie", "Steven"]);
        assert!(game.kill_player("Sadie").unwrap());
        assert!(game.cast_vote(EventId(1), "Lars", Some("Sadie")).is_err());

        assert!(game.revive_player("sadie").unwrap());
        assert!(!game.revive_player("Sadie").unwrap());
        assert!(game.cast_vote(EventId(2), "Lars", Some("Sadie")).is_ok());
    }

    #[test]
    fn test_player_value_set_and_replaced() {
        let mut game = started(&["Lars"]);
        assert_eq!(game.player_value("Lars", "role").unwrap(), None);
        assert_eq!(game.set_player_value("Lars", "role", "cop".into()).unwrap(), None);
        let old = game.set_player_value("@lars", "role", "vigilante".into()).unwrap();
        assert_eq!(old, Some(Value::from("cop")));
        assert_eq!(game.player_value("Lars", "role").unwrap(), Some(&Value::from("vigilante")));
        assert!(game.player_value("Jasper", "role").is_err());
    }

    #[test]
    fn test_answers_to_name_and_alias() {
        let mut game = Game::new(GameId(1), "Beach City");
        assert!(game.add_alias("BC"));
        assert!(!game.add_alias("bc"), "duplicate alias");
        assert!(!game.add_alias("beach city"), "alias equal to name");

        assert!(game.answers_to("beach city"));
        assert!(game.answers_to("bc"));
        assert!(!game.answers_to("homeworld"));

        assert!(game.remove_alias("BC"));
        assert!(!game.answers_to("bc"));
    }

    #[test]
    fn test_chats_are_a_set() {
        let mut game = Game::new(GameId(1), "g");
        assert!(game.add_chat(ChatId(7)));
        assert!(!game.add_chat(ChatId(7)));
        assert!(game.has_chat(ChatId(7)));
        assert!(game.remove_chat(ChatId(7)));
        assert!(!game.remove_chat(ChatId(7)));
    }

    #[test]
    fn test_set_value_returns_previous() {
        let mut game = Game::new(GameId(1), "g");
        assert_eq!(game.set_value("phaseEnd", "noon".into()), None);
        assert_eq!(game.set_value("phaseEnd", "dusk".into()), Some("noon".into()));
        assert_eq!(game.value("phaseEnd"), Some(&Value::from("dusk")));
    }

    #[test]
    fn test_cast_vote_by_moderator_fails() {
        let mut game = started(&["Lars", "Sadie"]);
        let err = game.cast_vote(EventId(1), "Garnet", Some("Lars")).unwrap_err();
        assert!(matches!(err, GameError::NotAPlayer { role: Participant::Actor, .. }));
        assert!(game.ledger().is_empty());
    }

    #[test]
    fn test_cast_vote_dead_voter_fails() {
        let mut game = started(&["Lars", "Sadie", "Steven"]);
        game.kill_player("Lars").unwrap();
        let err = game.cast_vote(EventId(1), "Lars", Some("Sadie")).unwrap_err();
        assert!(matches!(err, GameError::DeadParticipant { role: Participant::Actor, .. }));
    }

    #[test]
    fn test_withdraw_vote_dead_target_fails() {
        let mut game = started(&["Lars", "Sadie", "Steven"]);
        game.cast_vote(EventId(1), "Lars", Some("Sadie")).unwrap();
        game.kill_player("Sadie").unwrap();

        let err = game.withdraw_vote(EventId(2), "Lars", Some("Sadie")).unwrap_err();
        assert!(matches!(err, GameError::DeadParticipant { role: Participant::Target, .. }));
        assert_eq!(game.ledger().len(), 1);
        assert!(game.ledger().get(ActionId(0)).unwrap().is_current());
    }

    #[test]
    fn test_doublevoter_third_vote_replaces_oldest() {
        let mut game = started(&["Lars", "Sadie", "Steven", "Pearl", "Amethyst", "Peridot"]);
        game.set_property("Lars", PlayerProperty::Doublevoter).unwrap();

        let first = game.cast_vote(EventId(1), "Lars", Some("Sadie")).unwrap();
        let second = game.cast_vote(EventId(2), "Lars", Some("Steven")).unwrap();
        let third = game.cast_vote(EventId(3), "Lars", Some("Pearl")).unwrap();

        assert_eq!(first.token, ActionToken::Vote);
        assert_eq!(second.token, ActionToken::DoubleVote);
        assert_eq!(third.token, ActionToken::Vote);

        let replaced = game.ledger().get(first.action).unwrap();
        assert_eq!(replaced.revoked_by(), Some(EventId(3)));
        assert_eq!(game.tally(Some("Sadie")), 0);
        assert_eq!(game.tally(Some("Steven")), 1);
        assert_eq!(game.tally(Some("Pearl")), 1);
    }

    #[test]
    fn test_withdraw_vote_revokes_both_tokens() {
        let mut game = started(&["Lars", "Sadie", "Steven", "Pearl", "Amethyst"]);
        game.set_property("Lars", PlayerProperty::Doublevoter).unwrap();
        game.cast_vote(EventId(1), "Lars", Some("Sadie")).unwrap();
        game.cast_vote(EventId(2), "Lars", Some("Steven")).unwrap();

        let revoked = game.withdraw_vote(EventId(3), "Lars", None).unwrap();
        assert_eq!(revoked.len(), 2);
        assert_eq!(game.tally(Some("Sadie")), 0);
        assert_eq!(game.tally(Some("Steven")), 0);
    }

    #[test]
    fn test_target_by_scum_replaces_faction_action() {
        let mut game = started(&["Lars", "Sadie", "Steven", "Pearl"]);
        game.set_property("Lars", PlayerProperty::Scum).unwrap();
        game.set_property("Sadie", PlayerProperty::Scum).unwrap();

        game.target(EventId(1), "Lars", "Steven").unwrap();
        let action = game.target(EventId(2), "Sadie", "Pearl").unwrap();
        assert_eq!(action.token(), &ActionToken::Scum);

        let filter = ActionFilter::new().kind(ActionType::Target).current_only();
        let current: Vec<_> = game.actions(&filter).map(|a| a.target()).collect();
        assert_eq!(current, vec![Some("pearl")]);
    }

    #[test]
    fn test_target_by_townie_uses_personal_token() {
        let mut game = started(&["Lars", "Sadie"]);
        game.set_property("Sadie", PlayerProperty::Cop).unwrap();
        let action = game.target(EventId(1), "Sadie", "Lars").unwrap();
        assert_eq!(action.token(), &ActionToken::Target);
    }

    #[test]
    fn test_target_by_cultleader_keeps_other_actions() {
        let mut game = started(&["Lars", "Sadie", "Steven", "Pearl"]);
        game.set_property("Lars", PlayerProperty::Cultleader).unwrap();
        game.set_property("Sadie", PlayerProperty::Cultleader).unwrap();

        game.target(EventId(1), "Lars", "Steven").unwrap();
        let action = game.target(EventId(2), "Sadie", "Pearl").unwrap();
        assert_eq!(action.token(), &ActionToken::Cult);

        let filter = ActionFilter::new().kind(ActionType::Target).current_only();
        assert_eq!(game.actions(&filter).count(), 2);
    }

    #[test]
    fn test_target_with_moderator_fails() {
        let mut game = started(&["Lars", "Sadie"]);

        let err = game.target(EventId(1), "Garnet", "Lars").unwrap_err();
        assert!(matches!(err, GameError::NotAPlayer { role: Participant::Actor, .. }));

        let err = game.target(EventId(2), "Lars", "Garnet").unwrap_err();
        assert!(matches!(err, GameError::NotAPlayer { role: Participant::Target, .. }));
        assert!(game.ledger().is_empty());
    }

    #[test]
    fn test_target_by_dead_player_allowed() {
        let mut game = started(&["Lars", "Sadie", "Steven"]);
        game.kill_player("Lars").unwrap();
        assert!(game.target(EventId(1), "Lars", "Sadie").is_ok());
    }

    #[test]
    fn test_kill_player_moderator_fails() {
        let mut game = started(&["Lars"]);
        let err = game.kill_player("Garnet").unwrap_err();
        assert!(matches!(err, GameError::NotAPlayer { role: Participant::Target, .. }));
        assert!(game.player("Garnet").unwrap().is_alive());
    }

    #[test]
    fn test_lynch_kills_and_moves_to_night() {
        let mut game = started(&["Lars", "Sadie", "Steven"]);
        let change = game.lynch("Sadie").unwrap();
        assert!(!game.player("Sadie").unwrap().is_alive());
        assert!(!change.new_day);
        assert!(!game.is_day());
    }

    #[test]
    fn test_ensure_moderator() {
        let game = started(&["Lars"]);
        assert!(game.ensure_moderator("garnet").is_ok());
        assert!(matches!(game.ensure_moderator("Lars"), Err(GameError::NotModerator(_))));
        assert!(matches!(game.ensure_moderator("Nobody"), Err(GameError::NotModerator(_))));
    }

    #[test]
    fn test_serde_round_trip_keeps_state() {
        let mut game = started(&["Lars", "Sadie", "Steven"]);
        game.set_property("Sadie", PlayerProperty::Loved).unwrap();
        game.cast_vote(EventId(10), "Lars", Some("Sadie")).unwrap();
        game.add_chat(ChatId(3));

        let json = serde_json::to_string(&game).unwrap();
        let back: Game = serde_json::from_str(&json).unwrap();

        assert!(back.is_day());
        assert!(back.has_property("sadie", PlayerProperty::Loved).unwrap());
        assert_eq!(back.tally(Some("Sadie")), 1);
        assert!(back.has_chat(ChatId(3)));
    }
}
