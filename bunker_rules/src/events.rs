//! Event processor - environment interactions reported by the frontend.

use serde::{Deserialize, Serialize};

use crate::flags::Flags;

/// Rooms of the bunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Room {
    /// Where the Resident wakes up.
    #[default]
    LivingQuarters,
    ControlRoom,
    MaintenanceBay,
}

impl Room {
    pub const ALL: [Room; 3] = [Room::LivingQuarters, Room::ControlRoom, Room::MaintenanceBay];

    /// Wire name of the room.
    pub fn as_str(&self) -> &'static str {
        match self {
            Room::LivingQuarters => "living_quarters",
            Room::ControlRoom => "control_room",
            Room::MaintenanceBay => "maintenance_bay",
        }
    }

    /// Parse a wire name. Unknown rooms yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|room| room.as_str() == name)
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The environment interactions that affect the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentEvent {
    /// Sensor logs on the control room terminal.
    ViewSensorLogs,
    /// Diagnostic panel in the maintenance bay.
    ViewSensorDiagnostic,
    /// The junction box hatch in the maintenance bay.
    ClickJunctionHatch,
}

impl EnvironmentEvent {
    pub const ALL: [EnvironmentEvent; 3] = [
        EnvironmentEvent::ViewSensorLogs,
        EnvironmentEvent::ViewSensorDiagnostic,
        EnvironmentEvent::ClickJunctionHatch,
    ];

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            EnvironmentEvent::ViewSensorLogs => "view_sensor_logs",
            EnvironmentEvent::ViewSensorDiagnostic => "view_sensor_diagnostic",
            EnvironmentEvent::ClickJunctionHatch => "click_junction_hatch",
        }
    }

    /// The only room this event counts in.
    pub fn room(&self) -> Room {
        match self {
            EnvironmentEvent::ViewSensorLogs => Room::ControlRoom,
            EnvironmentEvent::ViewSensorDiagnostic | EnvironmentEvent::ClickJunctionHatch => {
                Room::MaintenanceBay
            }
        }
    }

    /// Recognize an (event, room) pair. Anything outside the vocabulary is `None`.
    pub fn recognize(event: &str, room: &str) -> Option<Self> {
        let room = Room::parse(room)?;
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.name() == event && candidate.room() == room)
    }
}

/// Apply a raw frontend event to flags, returning the updated copy.
///
/// Unrecognized (event, room) pairs return the flags unchanged.
pub fn apply_event(flags: &Flags, event: &str, room: &str) -> Flags {
    match EnvironmentEvent::recognize(event, room) {
        Some(event) => apply_environment_event(flags, event),
        None => *flags,
    }
}

/// Apply a recognized environment event to flags, returning the updated copy.
pub fn apply_environment_event(flags: &Flags, event: EnvironmentEvent) -> Flags {
    let mut next = *flags;

    match event {
        EnvironmentEvent::ViewSensorLogs | EnvironmentEvent::ViewSensorDiagnostic => {
            next.sensors_dead_discovered = true;
        }
        EnvironmentEvent::ClickJunctionHatch => {
            // The hatch means nothing until the sensors are known dead
            if next.sensors_dead_discovered {
                next.repair_attempted = true;
            }
        }
    }

    next
}
