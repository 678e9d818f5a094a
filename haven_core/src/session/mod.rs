//! Sessions - the per-player record kept around the flags.

mod store;

pub use store::*;

use bunker_rules::{Flags, Intent, Room};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for game sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pseudo intent label for HAVEN's opening line.
pub const GREETING_LABEL: &str = "greeting";

/// Pseudo intent label for messages sent after an ending.
pub const GAME_OVER_LABEL: &str = "game_over";

/// One turn of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub player: String,
    pub haven: String,
    /// Intent label, or one of the pseudo labels for system turns.
    pub intent: String,
}

impl Exchange {
    /// A player turn with its classified intent.
    pub fn new(player: impl Into<String>, haven: impl Into<String>, intent: Intent) -> Self {
        Self::labeled(player, haven, intent.as_str())
    }

    /// A turn carrying an arbitrary label.
    pub fn labeled(
        player: impl Into<String>,
        haven: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            player: player.into(),
            haven: haven.into(),
            intent: label.into(),
        }
    }
}

/// Everything kept for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub flags: Flags,
    /// Last room the player interacted in. Not read by the state machine.
    pub current_room: Room,
    pub history: Vec<Exchange>,
}

impl Session {
    /// Start a fresh session in the living quarters.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            flags: Flags::new(),
            current_room: Room::LivingQuarters,
            history: Vec::new(),
        }
    }

    /// The last `window` exchanges, oldest first.
    pub fn recent_history(&self, window: usize) -> &[Exchange] {
        recent(&self.history, window)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The last `window` entries of `history`, oldest first.
pub(crate) fn recent(history: &[Exchange], window: usize) -> &[Exchange] {
    &history[history.len().saturating_sub(window)..]
}
