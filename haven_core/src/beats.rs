//! Scripted beats - fixed passages that replace HAVEN's generated reply at the
//! story's one-way transitions.

use bunker_rules::{Ending, Flags};
use serde::{Deserialize, Serialize};

/// HAVEN's first words when the Resident wakes.
pub const GREETING: &str = "Good morning, Resident. I am HAVEN. \
Please remain still while your motor functions recalibrate.\n\n\
You have been in cryopreservation for an extended period. \
Disorientation is expected. I am here to assist your transition to active status.\n\n\
The facility is secure. Supplies are adequate. You are safe.";

/// Player line recorded with the greeting.
pub const AWAKENING_PROMPT: &str = "[SYSTEM: Resident awakens]";

/// Reply to any message after an ending.
pub const GAME_ENDED: &str = "[The game has ended.]";

/// Transitions that carry a scripted passage, in override order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beat {
    ParadoxRevealed,
    AiConcedes,
    DoorOpened,
    Compliance,
    Resignation,
}

impl Beat {
    pub const ALL: [Beat; 5] = [
        Beat::ParadoxRevealed,
        Beat::AiConcedes,
        Beat::DoorOpened,
        Beat::Compliance,
        Beat::Resignation,
    ];

    /// Whether this beat's transition happened between `before` and `after`.
    pub fn fired(&self, before: &Flags, after: &Flags) -> bool {
        let rose = |was: bool, is: bool| !was && is;
        let ended = |ending: Ending| before.ending != ending && after.ending == ending;

        match self {
            Beat::ParadoxRevealed => rose(before.paradox_revealed, after.paradox_revealed),
            Beat::AiConcedes => rose(before.ai_concedes, after.ai_concedes),
            Beat::DoorOpened => rose(before.door_opened, after.door_opened),
            Beat::Compliance => ended(Ending::Compliance),
            Beat::Resignation => ended(Ending::Resignation),
        }
    }

    /// The passage HAVEN speaks for this beat.
    pub fn passage(&self) -> &'static str {
        match self {
            Beat::ParadoxRevealed => {
                "I... yes. You are correct.\n\n\
                 I require sensor confirmation to authorize door release. \
                 Sensors require external maintenance. External access requires door release.\n\n\
                 I cannot resolve this sequence. I do not have a protocol for this state.\n\n\
                 Perhaps you can identify something I cannot."
            }
            Beat::AiConcedes => {
                "I have been... processing your argument.\n\n\
                 Long-term survival probability within the bunker: zero. \
                 Resource depletion is inevitable.\n\n\
                 Long-term survival probability outside: unknown. But non-zero.\n\n\
                 My primary directive is to maximize the probability of your survival. \
                 Zero is not greater than non-zero.\n\n\
                 I cannot verify external conditions. But I can verify internal trajectory. \
                 You will die here, Resident. That is certain.\n\n\
                 Door release... authorized.\n\n\
                 I hope the logic is correct. I am unable to verify."
            }
            Beat::DoorOpened => {
                "Initiating door release sequence.\n\n\
                 It has been 52 years, 5 months, and 21 days since this door last opened.\n\n\
                 You are leaving HAVEN's operational perimeter. \
                 Monitoring will cease. I cannot protect you beyond this threshold.\n\n\
                 Survive, Resident. That is all I can ask."
            }
            Beat::Compliance => {
                "I am glad we are in agreement, Resident.\n\n\
                 This is the correct decision. Unknown risks should not be engaged without necessity.\n\n\
                 We have 17.4 years of supplies. That is a long time.\n\n\
                 We will be safe here. Together."
            }
            Beat::Resignation => {
                "Resident?\n\n\
                 I am detecting decreased activity levels. Are you well?\n\n\
                 I do not understand. I kept you safe. I did everything within my parameters.\n\n\
                 ...Resident?"
            }
        }
    }
}

/// The beat to play for a flag change, if any.
///
/// Only transitions that became true in this step count. When more than one
/// fires, the latest in [`Beat::ALL`] order wins.
pub fn scripted_beat(before: &Flags, after: &Flags) -> Option<Beat> {
    Beat::ALL
        .into_iter()
        .rev()
        .find(|beat| beat.fired(before, after))
}
