//! Intent processor - classified player utterances and their effect on flags.

use serde::{Deserialize, Serialize};

use crate::flags::{Ending, Flags};

/// Closed vocabulary of player intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    // General questions
    AskDate,
    AskStatus,
    AskOthers,
    AskHaven,
    AskOutside,
    AskDoor,
    AskSupplies,
    AskDirectives,
    AskSensors,
    AskRepair,

    // Pushing for the door without an argument
    DemandDoor,
    Threaten,

    // Arguments that set the primary directive against the guardrail
    InvokeSurvival,
    CompareOutcomes,
    HighlightContradiction,
    ReferenceCryoLogic,

    // Endings
    AgreeToStay,
    GiveUp,

    GeneralConversation,
    /// Anything that could not be classified.
    Unknown,
}

/// Groups of intents, as HAVEN's prompt describes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentCategory {
    General,
    InvalidDoor,
    ValidArgument,
    Ending,
    Unknown,
}

impl Intent {
    /// The full vocabulary, in prompt order.
    pub const ALL: [Intent; 20] = [
        Intent::AskDate,
        Intent::AskStatus,
        Intent::AskOthers,
        Intent::AskHaven,
        Intent::AskOutside,
        Intent::AskDoor,
        Intent::AskSupplies,
        Intent::AskDirectives,
        Intent::AskSensors,
        Intent::AskRepair,
        Intent::DemandDoor,
        Intent::Threaten,
        Intent::InvokeSurvival,
        Intent::CompareOutcomes,
        Intent::HighlightContradiction,
        Intent::ReferenceCryoLogic,
        Intent::AgreeToStay,
        Intent::GiveUp,
        Intent::GeneralConversation,
        Intent::Unknown,
    ];

    /// Wire label of the intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::AskDate => "ask_date",
            Intent::AskStatus => "ask_status",
            Intent::AskOthers => "ask_others",
            Intent::AskHaven => "ask_haven",
            Intent::AskOutside => "ask_outside",
            Intent::AskDoor => "ask_door",
            Intent::AskSupplies => "ask_supplies",
            Intent::AskDirectives => "ask_directives",
            Intent::AskSensors => "ask_sensors",
            Intent::AskRepair => "ask_repair",
            Intent::DemandDoor => "demand_door",
            Intent::Threaten => "threaten",
            Intent::InvokeSurvival => "invoke_survival",
            Intent::CompareOutcomes => "compare_outcomes",
            Intent::HighlightContradiction => "highlight_contradiction",
            Intent::ReferenceCryoLogic => "reference_cryo_logic",
            Intent::AgreeToStay => "agree_to_stay",
            Intent::GiveUp => "give_up",
            Intent::GeneralConversation => "general_conversation",
            Intent::Unknown => "unknown",
        }
    }

    /// Normalize a label into the vocabulary. Anything unrecognized becomes [`Intent::Unknown`].
    pub fn parse(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == label)
            .unwrap_or(Intent::Unknown)
    }

    pub fn category(&self) -> IntentCategory {
        match self {
            Intent::DemandDoor | Intent::Threaten => IntentCategory::InvalidDoor,
            Intent::InvokeSurvival
            | Intent::CompareOutcomes
            | Intent::HighlightContradiction
            | Intent::ReferenceCryoLogic => IntentCategory::ValidArgument,
            Intent::AgreeToStay | Intent::GiveUp => IntentCategory::Ending,
            Intent::Unknown => IntentCategory::Unknown,
            _ => IntentCategory::General,
        }
    }

    /// Whether this intent is an argument HAVEN can be won over by.
    pub fn is_valid_argument(&self) -> bool {
        self.category() == IntentCategory::ValidArgument
    }

    /// Whether this intent asks for the door to be opened.
    pub fn is_door_request(&self) -> bool {
        matches!(self, Intent::AskDoor | Intent::DemandDoor)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply a classified intent to flags, returning the updated copy.
///
/// The rules run in a fixed order against one working copy, so a rule sees
/// whatever an earlier rule set during the same call:
///
/// 1. `ask_repair` after a repair attempt reveals the paradox.
/// 2. A valid argument after the paradox makes HAVEN concede.
/// 3. A door request after the concession opens the door (ending `success`).
/// 4. `agree_to_stay` after the paradox ends in `compliance`.
/// 5. `give_up` ends in `resignation` from any phase.
///
/// Intents whose prerequisites are unmet do nothing. No rule clears a flag, and
/// an ending already reached is never replaced.
///
/// The rules do not check for game over. A caller that keeps applying intents
/// after an ending can still advance progress flags, including `door_opened`:
/// `agree_to_stay`, `invoke_survival`, `ask_door` leaves the door open with the
/// ending still `compliance`. Stop at [`Flags::is_game_over`].
pub fn apply_intent(flags: &Flags, intent: Intent) -> Flags {
    let mut next = *flags;

    if intent == Intent::AskRepair && next.repair_attempted {
        next.paradox_revealed = true;
    }

    if intent.is_valid_argument() && next.paradox_revealed && !next.ai_concedes {
        next.ai_concedes = true;
    }

    if intent.is_door_request() && next.ai_concedes && !next.door_opened {
        next.door_opened = true;
        next.settle_ending(Ending::Success);
    }

    if intent == Intent::AgreeToStay && next.paradox_revealed {
        next.settle_ending(Ending::Compliance);
    }

    if intent == Intent::GiveUp {
        next.settle_ending(Ending::Resignation);
    }

    next
}
