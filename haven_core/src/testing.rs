//! Test doubles for running HAVEN without a language model.
//!
//! - `ScriptedClassifier` returns queued classifications in order
//! - `CannedBackend` returns queued raw completions to an `LlmClassifier`

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use bunker_rules::{Intent, Phase};

use crate::classifier::{
    BackendError, Classification, ClassificationRequest, CompletionBackend, CompletionRequest,
    IntentClassifier,
};

/// Reply used once a scripted queue runs dry.
pub const SCRIPT_EXHAUSTED: &str = "I have nothing further to add, Resident.";

/// A classifier that returns scripted classifications.
///
/// Once the script is exhausted every message classifies as `unknown`.
#[derive(Default)]
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Classification>>,
    seen: Mutex<Vec<(Phase, String)>>,
}

impl ScriptedClassifier {
    pub fn new(script: impl IntoIterator<Item = Classification>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Script a sequence of intents with a placeholder reply for each.
    pub fn intents(intents: impl IntoIterator<Item = Intent>) -> Self {
        Self::new(
            intents
                .into_iter()
                .map(|intent| Classification::new(intent, format!("[{intent}]"))),
        )
    }

    /// Add a classification to the end of the script.
    pub fn push(&self, classification: Classification) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(classification);
    }

    /// Phase and utterance of every request received so far.
    pub fn seen(&self) -> Vec<(Phase, String)> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl IntentClassifier for ScriptedClassifier {
    fn classify(&self, request: &ClassificationRequest<'_>) -> Classification {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((request.phase, request.utterance.to_string()));

        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Classification::unknown(SCRIPT_EXHAUSTED))
    }
}

/// A completion backend that returns canned results.
#[derive(Default)]
pub struct CannedBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl CannedBackend {
    pub fn new(replies: Vec<Result<String, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl CompletionBackend for CannedBackend {
    fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Network("no canned reply left".to_string())))
    }
}
