//! Flag store - the per-session record driving all narrative logic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when flags cross a serialization boundary.
#[derive(Debug, Error)]
pub enum FlagsError {
    #[error("Invalid flags payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Terminal narrative outcome of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Ending {
    #[default]
    None,
    /// The door opened with HAVEN's consent.
    Success,
    /// The Resident gave up.
    Resignation,
    /// The Resident agreed to stay inside.
    Compliance,
}

impl Ending {
    /// Wire name of the ending.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ending::None => "none",
            Ending::Success => "success",
            Ending::Resignation => "resignation",
            Ending::Compliance => "compliance",
        }
    }

    /// Whether this ending concludes the session.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Ending::None)
    }
}

impl std::fmt::Display for Ending {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrative flags for one game session.
///
/// Every boolean only ever goes from `false` to `true`, and `ending` leaves
/// [`Ending::None`] at most once. The phase is derived from these flags and is
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Flags {
    /// Sensor failure evidence has been seen in the control room or maintenance bay.
    pub sensors_dead_discovered: bool,

    /// The junction hatch was tried after the sensors were known dead.
    pub repair_attempted: bool,

    /// Repair was raised in conversation after a repair attempt.
    pub paradox_revealed: bool,

    /// HAVEN accepted a valid argument while the paradox was revealed.
    pub ai_concedes: bool,

    /// The door was requested after HAVEN conceded.
    pub door_opened: bool,

    pub ending: Ending,
}

impl Flags {
    /// Fresh flags for a new session, everything unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the session has reached an ending.
    pub fn is_game_over(&self) -> bool {
        self.ending.is_terminal()
    }

    /// The ending, if one has been reached.
    pub fn ending_type(&self) -> Option<Ending> {
        self.is_game_over().then_some(self.ending)
    }

    /// Record an ending unless one is already set.
    ///
    /// Returns `true` if the ending was written.
    pub(crate) fn settle_ending(&mut self, ending: Ending) -> bool {
        if self.is_game_over() || !ending.is_terminal() {
            return false;
        }
        self.ending = ending;
        true
    }

    /// Check that `self` is reachable from `earlier` without clearing anything.
    ///
    /// Every flag set in `earlier` must still be set, and a set ending must be unchanged.
    pub fn extends(&self, earlier: &Flags) -> bool {
        let kept = |before: bool, after: bool| !before || after;

        kept(earlier.sensors_dead_discovered, self.sensors_dead_discovered)
            && kept(earlier.repair_attempted, self.repair_attempted)
            && kept(earlier.paradox_revealed, self.paradox_revealed)
            && kept(earlier.ai_concedes, self.ai_concedes)
            && kept(earlier.door_opened, self.door_opened)
            && (!earlier.is_game_over() || earlier.ending == self.ending)
    }

    /// Decode flags from JSON, rejecting unknown keys and unknown endings.
    pub fn from_json(json: &str) -> Result<Self, FlagsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode flags as JSON.
    pub fn to_json(&self) -> Result<String, FlagsError> {
        Ok(serde_json::to_string(self)?)
    }
}
