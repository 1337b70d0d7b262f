//! Player records and their property sets.

use std::collections::BTreeMap;
use std::fmt;

use nightfall_protocol::PlayerProperty;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalises a username into the key players are matched by.
///
/// Surrounding whitespace and a leading `@` are dropped and the result is
/// lower-cased, so `@Lars`, `lars` and ` LARS ` all name the same player.
pub fn slug(username: &str) -> String {
    username.trim().trim_start_matches('@').trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// PropertySet
// ---------------------------------------------------------------------------

/// A set of [`PlayerProperty`] tags stored as one bit per property.
///
/// Serialized as a list of property names so stored games stay readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<PlayerProperty>", into = "Vec<PlayerProperty>")]
pub struct PropertySet(u16);

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(self, property: PlayerProperty) -> bool {
        self.0 & property.bit() != 0
    }

    /// Adds `property`. Returns `true` if it was not already present.
    pub fn insert(&mut self, property: PlayerProperty) -> bool {
        let added = !self.contains(property);
        self.0 |= property.bit();
        added
    }

    /// Removes `property`. Returns `true` if it was present.
    pub fn remove(&mut self, property: PlayerProperty) -> bool {
        let present = self.contains(property);
        self.0 &= !property.bit();
        present
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the properties in declaration order.
    pub fn iter(self) -> impl Iterator<Item = PlayerProperty> {
        PlayerProperty::ALL
            .into_iter()
            .filter(move |p| self.contains(*p))
    }
}

impl From<Vec<PlayerProperty>> for PropertySet {
    fn from(properties: Vec<PlayerProperty>) -> Self {
        properties.into_iter().collect()
    }
}

impl From<PropertySet> for Vec<PlayerProperty> {
    fn from(set: PropertySet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<PlayerProperty> for PropertySet {
    fn from_iter<I: IntoIterator<Item = PlayerProperty>>(iter: I) -> Self {
        let mut set = Self::new();
        for property in iter {
            set.insert(property);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One participant of a game: a player or a moderator.
///
/// Players are never removed. Killing one flips `alive`, and the record
/// stays visible in the dead view for the rest of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    username: String,
    #[serde(rename = "userslug")]
    key: String,
    alive: bool,
    moderator: bool,
    #[serde(default)]
    properties: PropertySet,
    /// Free-form values attached by the moderator (role card title, etc.).
    #[serde(default)]
    values: BTreeMap<String, Value>,
}

impl Player {
    pub(crate) fn new(username: &str, moderator: bool) -> Self {
        let username = username.trim().trim_start_matches('@').trim();
        Self {
            key: slug(username),
            username: username.to_string(),
            alive: true,
            moderator,
            properties: PropertySet::new(),
            values: BTreeMap::new(),
        }
    }

    /// The display name, as the user first wrote it.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The normalised key this player is matched by.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_moderator(&self) -> bool {
        self.moderator
    }

    /// A living, non-moderator participant.
    pub fn is_live_player(&self) -> bool {
        self.alive && !self.moderator
    }

    pub fn has_property(&self, property: PlayerProperty) -> bool {
        self.properties.contains(property)
    }

    pub fn properties(&self) -> PropertySet {
        self.properties
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub(crate) fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    pub(crate) fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }

    pub(crate) fn set_value(&mut self, key: &str, value: Value) -> Option<Value> {
        self.values.insert(key.to_string(), value)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
