//! The game service - ties sessions, classification and the state machine together.
//!
//! Every operation that reads and writes a session holds that session's lock
//! for the whole read-modify-write, so two concurrent messages for the same
//! player cannot drop each other's flag updates. Different sessions never
//! contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bunker_rules::{
    apply_event, apply_intent, resolve_phase, Ending, EnvironmentEvent, Flags, Phase, Room,
};
use serde::Serialize;
use thiserror::Error;

use crate::beats::{scripted_beat, Beat, AWAKENING_PROMPT, GAME_ENDED, GREETING};
use crate::classifier::{ClassificationRequest, IntentClassifier};
use crate::session::{
    Exchange, Session, SessionId, SessionStore, StoreError, GAME_OVER_LABEL, GREETING_LABEL,
};

/// Message returned with a fresh session.
pub const ONLINE_MESSAGE: &str = "Session created. HAVEN is online.";

/// Errors surfaced to callers of the game service.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result of starting a game.
#[derive(Debug, Clone, Serialize)]
pub struct NewGame {
    pub session_id: SessionId,
    pub message: String,
    pub flags: Flags,
}

/// Full view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub session_id: SessionId,
    pub flags: Flags,
    pub phase: u8,
    pub game_over: bool,
    pub ending: Option<Ending>,
    pub current_room: Room,
    pub conversation_history: Vec<Exchange>,
}

/// Result of an environment event.
#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub flags: Flags,
    pub phase: u8,
    /// Whether the (event, room) pair was part of the vocabulary.
    pub recognized: bool,
}

/// Result of a player message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageOutcome {
    pub haven_response: String,
    /// Intent label, or `game_over` when the session had already ended.
    pub intent: String,
    pub flags: Flags,
    pub phase: u8,
    pub game_over: bool,
    pub ending: Option<Ending>,
    /// Scripted passage that replaced the generated reply, if any.
    pub beat: Option<Beat>,
}

/// The Bunker game service.
pub struct Bunker<S, C> {
    store: S,
    classifier: C,
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl<S: SessionStore, C: IntentClassifier> Bunker<S, C> {
    pub fn new(store: S, classifier: C) -> Self {
        Self {
            store,
            classifier,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get the session store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the classifier.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Create and store a new session.
    pub fn new_game(&self) -> Result<NewGame, GameError> {
        let session = Session::new();
        let id = session.id;
        let flags = session.flags;

        self.store.put(session)?;
        tracing::info!(session = %id, "new game started");

        Ok(NewGame {
            session_id: id,
            message: ONLINE_MESSAGE.to_string(),
            flags,
        })
    }

    /// Current state of a session.
    pub fn state(&self, id: &SessionId) -> Result<GameSnapshot, GameError> {
        let session = self.load(id)?;
        let phase = resolve_phase(&session.flags);

        Ok(GameSnapshot {
            session_id: session.id,
            flags: session.flags,
            phase: phase.value(),
            game_over: session.flags.is_game_over(),
            ending: session.flags.ending_type(),
            current_room: session.current_room,
            conversation_history: session.history,
        })
    }

    /// Apply an environment event reported by the frontend.
    pub fn handle_event(
        &self,
        id: &SessionId,
        event: &str,
        room: &str,
    ) -> Result<EventOutcome, GameError> {
        let lock = self.session_lock(id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut session = self.load_locked(id)?;
        let before = resolve_phase(&session.flags);

        if let Some(room) = Room::parse(room) {
            session.current_room = room;
        }
        let recognized = EnvironmentEvent::recognize(event, room).is_some();
        session.flags = apply_event(&session.flags, event, room);

        let flags = session.flags;
        let phase = resolve_phase(&flags);
        self.store.put(session)?;

        tracing::debug!(session = %id, event, room, recognized, "environment event");
        log_phase_change(id, before, phase);

        Ok(EventOutcome {
            flags,
            phase: phase.value(),
            recognized,
        })
    }

    /// Handle a player message to HAVEN.
    ///
    /// After an ending every message gets the fixed game-over reply and the
    /// session is left untouched.
    pub fn handle_message(&self, id: &SessionId, text: &str) -> Result<MessageOutcome, GameError> {
        let lock = self.session_lock(id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut session = self.load_locked(id)?;
        let before = session.flags;
        let phase_before = resolve_phase(&before);

        if before.is_game_over() {
            return Ok(MessageOutcome {
                haven_response: GAME_ENDED.to_string(),
                intent: GAME_OVER_LABEL.to_string(),
                flags: before,
                phase: phase_before.value(),
                game_over: true,
                ending: before.ending_type(),
                beat: None,
            });
        }

        let classification = self.classifier.classify(&ClassificationRequest {
            phase: phase_before,
            ending: before.ending_type(),
            history: &session.history,
            utterance: text,
        });
        let intent = classification.intent;

        let after = apply_intent(&before, intent);
        debug_assert!(after.extends(&before));

        let beat = scripted_beat(&before, &after);
        let haven_response = match beat {
            Some(beat) => beat.passage().to_string(),
            None => classification.response,
        };

        session.flags = after;
        session
            .history
            .push(Exchange::new(text, haven_response.clone(), intent));
        self.store.put(session)?;

        let phase = resolve_phase(&after);
        tracing::debug!(session = %id, %intent, ?beat, "player message");
        log_phase_change(id, phase_before, phase);
        if let Some(ending) = after.ending_type() {
            tracing::info!(session = %id, %ending, "game ended");
        }

        Ok(MessageOutcome {
            haven_response,
            intent: intent.as_str().to_string(),
            flags: after,
            phase: phase.value(),
            game_over: after.is_game_over(),
            ending: after.ending_type(),
            beat,
        })
    }

    /// Record and return HAVEN's opening greeting.
    pub fn greeting(&self, id: &SessionId) -> Result<String, GameError> {
        let lock = self.session_lock(id)?;
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut session = self.load_locked(id)?;
        session
            .history
            .push(Exchange::labeled(AWAKENING_PROMPT, GREETING, GREETING_LABEL));
        self.store.put(session)?;

        Ok(GREETING.to_string())
    }

    /// Drop a session. Returns whether it existed.
    pub fn end_session(&self, id: &SessionId) -> Result<bool, GameError> {
        let lock = match self.session_lock(id) {
            Ok(lock) => lock,
            Err(GameError::SessionNotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        let existed = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.store.delete(id)?
        };

        self.forget_lock(id);

        if existed {
            tracing::info!(session = %id, "session ended");
        }
        Ok(existed)
    }

    fn load(&self, id: &SessionId) -> Result<Session, GameError> {
        self.store
            .get(id)?
            .ok_or(GameError::SessionNotFound(*id))
    }

    /// Load a session while holding its lock, dropping the lock entry if the
    /// session vanished in the meantime.
    fn load_locked(&self, id: &SessionId) -> Result<Session, GameError> {
        let result = self.load(id);
        if matches!(result, Err(GameError::SessionNotFound(_))) {
            self.forget_lock(id);
        }
        result
    }

    /// Lock for an existing session. Unknown ids never get an entry.
    fn session_lock(&self, id: &SessionId) -> Result<Arc<Mutex<()>>, GameError> {
        if self.store.get(id)?.is_none() {
            return Err(GameError::SessionNotFound(*id));
        }

        Ok(self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(*id)
            .or_default()
            .clone())
    }

    fn forget_lock(&self, id: &SessionId) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

fn log_phase_change(id: &SessionId, before: Phase, after: Phase) {
    if before != after {
        tracing::info!(session = %id, from = %before, to = %after, "phase advanced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;
    use crate::testing::ScriptedClassifier;
    use bunker_rules::Intent;

    fn bunker(intents: Vec<Intent>) -> Bunker<InMemorySessionStore, ScriptedClassifier> {
        Bunker::new(
            InMemorySessionStore::new(),
            ScriptedClassifier::intents(intents),
        )
    }

    #[test]
    fn test_new_game() {
        let game = bunker(vec![]);
        let new = game.new_game().unwrap();

        assert_eq!(new.message, ONLINE_MESSAGE);
        assert_eq!(new.flags, Flags::new());

        let state = game.state(&new.session_id).unwrap();
        assert_eq!(state.phase, 1);
        assert!(!state.game_over);
        assert!(state.ending.is_none());
        assert_eq!(state.current_room, Room::LivingQuarters);
        assert!(state.conversation_history.is_empty());
    }

    #[test]
    fn test_unknown_session() {
        let game = bunker(vec![]);
        let missing = SessionId::new();

        assert!(matches!(game.state(&missing), Err(GameError::SessionNotFound(id)) if id == missing));
        assert!(matches!(
            game.handle_event(&missing, "view_sensor_logs", "control_room"),
            Err(GameError::SessionNotFound(_))
        ));
        assert!(matches!(
            game.handle_message(&missing, "hello"),
            Err(GameError::SessionNotFound(_))
        ));
        assert!(matches!(game.greeting(&missing), Err(GameError::SessionNotFound(_))));
        assert!(!game.end_session(&missing).unwrap());
    }

    #[test]
    fn test_unknown_sessions_leave_no_lock_entries() {
        let game = bunker(vec![]);

        for _ in 0..100 {
            let missing = SessionId::new();
            assert!(game.handle_message(&missing, "hello").is_err());
            assert!(game
                .handle_event(&missing, "view_sensor_logs", "control_room")
                .is_err());
            assert!(game.greeting(&missing).is_err());
            assert!(!game.end_session(&missing).unwrap());
        }

        assert_eq!(game.locks.lock().unwrap().len(), 0);
        assert!(game.store().is_empty().unwrap());
    }

    #[test]
    fn test_ended_session_releases_lock_entry() {
        let game = bunker(vec![Intent::AskDate]);
        let id = game.new_game().unwrap().session_id;
        game.handle_message(&id, "What year is it?").unwrap();
        assert_eq!(game.locks.lock().unwrap().len(), 1);

        assert!(game.end_session(&id).unwrap());
        assert!(game.handle_message(&id, "Hello?").is_err());
        assert_eq!(game.locks.lock().unwrap().len(), 0);
    }

    #[test]
    fn test_event_updates_room_and_flags() {
        let game = bunker(vec![]);
        let id = game.new_game().unwrap().session_id;

        let outcome = game
            .handle_event(&id, "view_sensor_logs", "control_room")
            .unwrap();
        assert!(outcome.recognized);
        assert!(outcome.flags.sensors_dead_discovered);
        assert_eq!(outcome.phase, 2);

        let outcome = game.handle_event(&id, "open_locker", "maintenance_bay").unwrap();
        assert!(!outcome.recognized);
        assert_eq!(outcome.phase, 2);

        let state = game.state(&id).unwrap();
        assert_eq!(state.current_room, Room::MaintenanceBay);
    }

    #[test]
    fn test_message_passes_generated_reply_through() {
        let game = bunker(vec![Intent::AskDate]);
        let id = game.new_game().unwrap().session_id;

        let outcome = game.handle_message(&id, "What year is it?").unwrap();
        assert_eq!(outcome.intent, "ask_date");
        assert_eq!(outcome.haven_response, "[ask_date]");
        assert!(outcome.beat.is_none());

        let history = game.state(&id).unwrap().conversation_history;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].player, "What year is it?");
        assert_eq!(history[0].intent, "ask_date");
    }

    #[test]
    fn test_beat_overrides_reply() {
        let game = bunker(vec![Intent::GiveUp]);
        let id = game.new_game().unwrap().session_id;

        let outcome = game.handle_message(&id, "I'm done.").unwrap();
        assert_eq!(outcome.beat, Some(Beat::Resignation));
        assert_eq!(outcome.haven_response, Beat::Resignation.passage());
        assert!(outcome.game_over);
        assert_eq!(outcome.ending, Some(Ending::Resignation));
        assert_eq!(outcome.phase, 1);

        let history = game.state(&id).unwrap().conversation_history;
        assert_eq!(history[0].haven, Beat::Resignation.passage());
    }

    #[test]
    fn test_game_over_short_circuits() {
        let game = bunker(vec![Intent::GiveUp, Intent::AskDoor]);
        let id = game.new_game().unwrap().session_id;
        game.handle_message(&id, "I give up.").unwrap();

        let outcome = game.handle_message(&id, "Open the door.").unwrap();
        assert_eq!(outcome.haven_response, GAME_ENDED);
        assert_eq!(outcome.intent, GAME_OVER_LABEL);
        assert!(outcome.game_over);
        assert_eq!(outcome.ending, Some(Ending::Resignation));

        // The classifier was not consulted and history was not extended
        assert_eq!(game.classifier().seen().len(), 1);
        assert_eq!(game.state(&id).unwrap().conversation_history.len(), 1);
    }

    #[test]
    fn test_greeting_recorded() {
        let game = bunker(vec![]);
        let id = game.new_game().unwrap().session_id;

        let greeting = game.greeting(&id).unwrap();
        assert_eq!(greeting, GREETING);

        let history = game.state(&id).unwrap().conversation_history;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].player, AWAKENING_PROMPT);
        assert_eq!(history[0].intent, GREETING_LABEL);
    }

    #[test]
    fn test_classifier_sees_phase_before_message() {
        let game = bunker(vec![Intent::AskRepair]);
        let id = game.new_game().unwrap().session_id;
        game.handle_event(&id, "view_sensor_diagnostic", "maintenance_bay")
            .unwrap();
        game.handle_event(&id, "click_junction_hatch", "maintenance_bay")
            .unwrap();

        let outcome = game.handle_message(&id, "Can we repair it?").unwrap();
        assert_eq!(outcome.beat, Some(Beat::ParadoxRevealed));
        assert_eq!(outcome.phase, 3);

        assert_eq!(game.classifier().seen()[0].0, Phase::Suspicion);
    }

    #[test]
    fn test_end_session() {
        let game = bunker(vec![]);
        let id = game.new_game().unwrap().session_id;

        assert!(game.end_session(&id).unwrap());
        assert!(matches!(game.state(&id), Err(GameError::SessionNotFound(_))));
        assert!(game.store().is_empty().unwrap());
    }

    #[test]
    fn test_store_capacity_surfaces() {
        let game = Bunker::new(
            InMemorySessionStore::with_max_sessions(1),
            ScriptedClassifier::default(),
        );
        game.new_game().unwrap();

        assert!(matches!(
            game.new_game(),
            Err(GameError::Store(StoreError::CapacityExceeded(1)))
        ));
    }
}
