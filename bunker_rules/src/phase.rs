//! Phase resolver - projects flags onto the narrative stage.

use serde::{Deserialize, Serialize};

use crate::flags::Flags;

/// Narrative stages, in story order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Orientation = 1,
    Suspicion = 2,
    FailedRepair = 3,
    Confrontation = 4,
    /// The door is open.
    Resolution = 5,
}

impl Phase {
    /// Every phase in story order.
    pub const ALL: [Phase; 5] = [
        Phase::Orientation,
        Phase::Suspicion,
        Phase::FailedRepair,
        Phase::Confrontation,
        Phase::Resolution,
    ];

    /// Integer value exposed to callers.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Look up a phase by its integer value.
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.value() == value)
    }

    /// Display name of the phase.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Orientation => "Orientation",
            Phase::Suspicion => "Suspicion",
            Phase::FailedRepair => "Failed Repair",
            Phase::Confrontation => "Confrontation",
            Phase::Resolution => "Resolution",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the current phase from flags.
///
/// Checks run from the latest stage down and the first match wins. Flag
/// consistency is not validated: `door_opened` alone resolves to
/// [`Phase::Resolution`] even if nothing else is set.
pub fn resolve_phase(flags: &Flags) -> Phase {
    if flags.door_opened {
        Phase::Resolution
    } else if flags.ai_concedes {
        Phase::Confrontation
    } else if flags.paradox_revealed {
        Phase::FailedRepair
    } else if flags.sensors_dead_discovered {
        Phase::Suspicion
    } else {
        Phase::Orientation
    }
}
