//! # Haven Core
//!
//! Everything around the bunker's state machine: HAVEN's voice and the game
//! service that drives `bunker_rules` from player messages and clicks.
//!
//! ## Core Components
//!
//! - **classifier**: intent classification contract and the LLM-backed classifier
//! - **prompts**: HAVEN's system prompt for each phase and ending
//! - **beats**: scripted passages for the story's one-way transitions
//! - **session**: per-player sessions and the session store
//! - **orchestrator**: the `Bunker` game service
//! - **config**: TOML configuration
//! - **testing**: scripted classifier and canned backend for tests

pub mod beats;
pub mod classifier;
pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod session;
pub mod testing;

pub use beats::*;
pub use classifier::*;
pub use config::*;
pub use orchestrator::*;
pub use prompts::*;
pub use session::*;
