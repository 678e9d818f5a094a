//! # Bunker Rules
//!
//! The state machine behind The Bunker - flags, phases, and the rules that move
//! the story forward. This crate holds no AI logic and no session state; every
//! operation takes flags by reference and returns a new copy.
//!
//! - **flags**: the per-session flag record and ending queries
//! - **phase**: projection of flags onto the narrative stage
//! - **events**: environment clicks reported by the frontend
//! - **intents**: classified player utterances

pub mod events;
pub mod flags;
pub mod intents;
pub mod phase;

pub use events::*;
pub use flags::*;
pub use intents::*;
pub use phase::*;
