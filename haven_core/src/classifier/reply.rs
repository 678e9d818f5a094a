//! Parsing of the model's JSON reply.

use bunker_rules::Intent;
use serde::Deserialize;

use super::Classification;
use crate::config::FallbackConfig;

#[derive(Debug, Deserialize)]
struct RawReply {
    intent: Option<String>,
    response: Option<String>,
}

/// Turn raw model output into a classification. Never fails.
///
/// - Malformed JSON: `unknown` with the parse-error line.
/// - Missing or out-of-vocabulary intent: `unknown`.
/// - Missing response: the missing-response line.
pub fn parse_reply(raw: &str, fallback: &FallbackConfig) -> Classification {
    let reply: RawReply = match serde_json::from_str(raw) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "classifier reply is not valid JSON");
            return Classification::unknown(fallback.parse_error.clone());
        }
    };

    let intent = reply
        .intent
        .as_deref()
        .map(Intent::parse)
        .unwrap_or(Intent::Unknown);

    if intent == Intent::Unknown {
        if let Some(label) = reply.intent.as_deref().filter(|l| *l != "unknown") {
            tracing::debug!(label, "intent outside vocabulary");
        }
    }

    Classification {
        intent,
        response: reply
            .response
            .unwrap_or_else(|| fallback.missing_response.clone()),
    }
}
