//! Game phase state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PhaseViolation;

// ---------------------------------------------------------------------------
// Lifecycle / TimeOfDay
// ---------------------------------------------------------------------------

/// The lifecycle of a game.
///
/// ```text
/// Pending ──activate()──→ Active ──end()──→ Ended
/// ```
///
/// - **Pending**: created, accepting joins.
/// - **Active**: running; subdivided into day and night.
/// - **Ended**: over. Never deleted, only marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Pending,
    Active,
    Ended,
}

/// Which half of the day/night cycle an active game is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Day,
    Night,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Night => write!(f, "night"),
        }
    }
}

/// The result of a phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    /// Day number after the transition.
    pub day: u32,
    /// Time of day after the transition.
    pub time: TimeOfDay,
    /// `true` if the transition started a new day.
    pub new_day: bool,
}

// ---------------------------------------------------------------------------
// PhaseMachine
// ---------------------------------------------------------------------------

/// Tracks activation, day/night, and the day counter of one game.
///
/// Guards are exposed per operation (`ensure_*`) rather than as one shared
/// gate, because each command has its own legality rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    lifecycle: Lifecycle,
    time: TimeOfDay,
    day: u32,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self {
            lifecycle: Lifecycle::Pending,
            time: TimeOfDay::Day,
            day: 1,
        }
    }
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// `true` only while active and in the day half of the cycle.
    pub fn is_day(&self) -> bool {
        self.is_active() && self.time == TimeOfDay::Day
    }

    /// Pending → Active, starting on day 1.
    pub fn activate(&mut self) -> Result<(), PhaseViolation> {
        match self.lifecycle {
            Lifecycle::Pending => {
                self.lifecycle = Lifecycle::Active;
                self.time = TimeOfDay::Day;
                self.day = 1;
                Ok(())
            }
            Lifecycle::Active => Err(PhaseViolation::AlreadyStarted),
            Lifecycle::Ended => Err(PhaseViolation::Ended),
        }
    }

    /// Toggles day and night. Night → Day increments the day counter.
    pub fn next_phase(&mut self) -> Result<PhaseChange, PhaseViolation> {
        self.ensure_active()?;
        let new_day = match self.time {
            TimeOfDay::Day => {
                self.time = TimeOfDay::Night;
                false
            }
            TimeOfDay::Night => {
                self.time = TimeOfDay::Day;
                self.day += 1;
                true
            }
        };
        Ok(self.change(new_day))
    }

    /// Jumps to the day phase of the next day, from either half of the cycle.
    pub fn new_day(&mut self) -> Result<PhaseChange, PhaseViolation> {
        self.ensure_active()?;
        self.time = TimeOfDay::Day;
        self.day += 1;
        Ok(self.change(true))
    }

    /// Active → Ended.
    pub fn end(&mut self) -> Result<(), PhaseViolation> {
        self.ensure_active()?;
        self.lifecycle = Lifecycle::Ended;
        Ok(())
    }

    fn change(&self, new_day: bool) -> PhaseChange {
        PhaseChange {
            day: self.day,
            time: self.time,
            new_day,
        }
    }

    // -- Guards ------------------------------------------------------------

    /// Joining needs a game that hasn't started.
    pub fn ensure_pending(&self) -> Result<(), PhaseViolation> {
        match self.lifecycle {
            Lifecycle::Pending => Ok(()),
            Lifecycle::Active => Err(PhaseViolation::AlreadyStarted),
            Lifecycle::Ended => Err(PhaseViolation::Ended),
        }
    }

    pub fn ensure_active(&self) -> Result<(), PhaseViolation> {
        match self.lifecycle {
            Lifecycle::Active => Ok(()),
            Lifecycle::Pending => Err(PhaseViolation::NotActive),
            Lifecycle::Ended => Err(PhaseViolation::Ended),
        }
    }

    /// Voting needs an active game in the day phase.
    pub fn ensure_day(&self) -> Result<(), PhaseViolation> {
        self.ensure_active()?;
        if self.time != TimeOfDay::Day {
            return Err(PhaseViolation::NotDay);
        }
        Ok(())
    }
}
