//! Runtime configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NightfallError;

/// Settings for a Nightfall [`Context`](crate::Context).
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for game records. `None` keeps games in memory.
    pub data_dir: Option<PathBuf>,

    /// Shuffle the player lists returned by listing commands, so the order
    /// doesn't reveal who joined when.
    pub shuffle_listings: bool,

    /// Settings copied into every newly prepared game.
    pub default_settings: BTreeMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        let mut default_settings = BTreeMap::new();
        default_settings.insert("voteBars".to_string(), Value::from("bastard"));
        Self {
            data_dir: None,
            shuffle_listings: true,
            default_settings,
        }
    }
}

impl Config {
    /// Parses a JSON config document.
    ///
    /// # Errors
    /// [`NightfallError::Config`] if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, NightfallError> {
        serde_json::from_str(json).map_err(|e| NightfallError::Config(e.to_string()))
    }
}
