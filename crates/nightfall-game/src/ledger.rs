//! The action ledger: an append-only record of votes and night actions.
//!
//! Entries are never deleted. Replacing an action marks the old entry as
//! revoked by the event that replaced it, so the full history stays
//! available to the vote report.
//!
//! # Invariant
//!
//! For any `(actor, type, token)` at most one entry is current
//! (`revoked_by` is `None`). [`ActionLedger::register`] revokes the prior
//! current entry in the same step that appends the new one.

use serde::{Deserialize, Serialize};

use nightfall_protocol::{ActionToken, ActionType, EventId};
use nightfall_roster::{Player, PlayerRegistry, slug};

use crate::{GameError, Participant};

/// Position of an action in the ledger. Stable for the life of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub usize);

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    id: ActionId,
    /// The post that created this action.
    event: EventId,
    #[serde(rename = "action")]
    kind: ActionType,
    token: ActionToken,
    /// Actor slug.
    actor: String,
    /// Target slug; `None` for a no-lynch vote.
    target: Option<String>,
    day: u32,
    /// The post that revoked this action, if any.
    revoked_by: Option<EventId>,
}

impl Action {
    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn event(&self) -> EventId {
        self.event
    }

    pub fn kind(&self) -> &ActionType {
        &self.kind
    }

    pub fn token(&self) -> &ActionToken {
        &self.token
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn revoked_by(&self) -> Option<EventId> {
        self.revoked_by
    }

    pub fn is_current(&self) -> bool {
        self.revoked_by.is_none()
    }

    fn is_slot(&self, actor: &str, kind: &ActionType, token: &ActionToken) -> bool {
        self.actor == actor && &self.kind == kind && &self.token == token
    }
}

// ---------------------------------------------------------------------------
// ActionFilter
// ---------------------------------------------------------------------------

/// Selects ledger entries. An empty filter matches everything.
///
/// ```ignore
/// let today = ActionFilter::new()
///     .kind(ActionType::Vote)
///     .day(game.day())
///     .current_only();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    kind: Option<ActionType>,
    token: Option<ActionToken>,
    actor: Option<String>,
    day: Option<u32>,
    current_only: bool,
}

impl ActionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: ActionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn token(mut self, token: ActionToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn actor(mut self, actor: &str) -> Self {
        self.actor = Some(slug(actor));
        self
    }

    pub fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    /// Skip revoked entries.
    pub fn current_only(mut self) -> Self {
        self.current_only = true;
        self
    }

    fn matches(&self, action: &Action) -> bool {
        self.kind.as_ref().is_none_or(|k| &action.kind == k)
            && self.token.as_ref().is_none_or(|t| &action.token == t)
            && self.actor.as_ref().is_none_or(|a| &action.actor == a)
            && self.day.is_none_or(|d| action.day == d)
            && (!self.current_only || action.is_current())
    }
}

// ---------------------------------------------------------------------------
// ActionLedger
// ---------------------------------------------------------------------------

/// Every action recorded in one game, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLedger {
    actions: Vec<Action>,
}

impl ActionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new action, revoking the actor's prior current action
    /// under the same `(kind, token)`.
    ///
    /// # Errors
    /// [`GameError::PlayerNotFound`] if the actor or the target is not
    /// registered in `roster`.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &mut self,
        roster: &PlayerRegistry,
        day: u32,
        event: EventId,
        actor: &str,
        target: Option<&str>,
        kind: ActionType,
        token: ActionToken,
    ) -> Result<&Action, GameError> {
        let actor = resolve(roster, actor, Participant::Actor)?.key().to_string();
        let target = target
            .map(|t| resolve(roster, t, Participant::Target).map(|p| p.key().to_string()))
            .transpose()?;

        if let Some(prior) = self.current_index(&actor, &kind, &token) {
            self.actions[prior].revoked_by = Some(event);
            tracing::debug!(%event, actor = %actor, %kind, %token, "prior action replaced");
        }

        let id = ActionId(self.actions.len());
        self.actions.push(Action {
            id,
            event,
            kind,
            token,
            actor,
            target,
            day,
            revoked_by: None,
        });
        Ok(&self.actions[id.0])
    }

    /// Revokes the actor's current action under `(kind, token)`.
    ///
    /// When `target` is given, the action is only revoked if it points at
    /// that target. Returns `Ok(None)` when nothing was revoked.
    ///
    /// # Errors
    /// [`GameError::PlayerNotFound`] if the actor or the target is not
    /// registered in `roster`.
    pub fn revoke(
        &mut self,
        roster: &PlayerRegistry,
        event: EventId,
        actor: &str,
        target: Option<&str>,
        kind: &ActionType,
        token: &ActionToken,
    ) -> Result<Option<ActionId>, GameError> {
        let actor = resolve(roster, actor, Participant::Actor)?.key().to_string();
        let target = target
            .map(|t| resolve(roster, t, Participant::Target).map(|p| p.key().to_string()))
            .transpose()?;

        let Some(index) = self.current_index(&actor, kind, token) else {
            return Ok(None);
        };
        let action = &mut self.actions[index];
        if let Some(wanted) = target {
            if action.target.as_deref() != Some(wanted.as_str()) {
                return Ok(None);
            }
        }
        action.revoked_by = Some(event);
        Ok(Some(action.id))
    }

    /// Revokes every current action under `(kind, token)`, whoever the actor.
    ///
    /// Used for faction actions, where one member's choice replaces the
    /// whole faction's.
    pub fn revoke_all(
        &mut self,
        event: EventId,
        kind: &ActionType,
        token: &ActionToken,
    ) -> Vec<ActionId> {
        self.actions
            .iter_mut()
            .filter(|a| a.is_current() && &a.kind == kind && &a.token == token)
            .map(|a| {
                a.revoked_by = Some(event);
                a.id
            })
            .collect()
    }

    /// The actor's current action under `(kind, token)`, if any.
    pub fn current(&self, actor: &str, kind: &ActionType, token: &ActionToken) -> Option<&Action> {
        self.current_index(&slug(actor), kind, token)
            .map(|i| &self.actions[i])
    }

    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.0)
    }

    /// Entries matching `filter`, in insertion order.
    pub fn actions<'a, 'f>(&'a self, filter: &'f ActionFilter) -> impl Iterator<Item = &'a Action> + use<'a, 'f> {
        self.actions.iter().filter(move |a| filter.matches(a))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn current_index(&self, actor_key: &str, kind: &ActionType, token: &ActionToken) -> Option<usize> {
        self.actions
            .iter()
            .rposition(|a| a.is_current() && a.is_slot(actor_key, kind, token))
    }
}

fn resolve<'r>(
    roster: &'r PlayerRegistry,
    name: &str,
    role: Participant,
) -> Result<&'r Player, GameError> {
    roster.find(name).ok_or_else(|| GameError::PlayerNotFound {
        role,
        name: name.to_string(),
    })
}
