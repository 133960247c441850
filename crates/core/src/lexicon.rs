use crate::models::TriggerEntry;

/// Adaptive codes in priority order. Detection stops at the first entry with
/// any matching phrase, so position in this slice is the tie-break.
pub const TRIGGER_TABLE: &[TriggerEntry] = &[
    TriggerEntry {
        code: "abandonment",
        triggers: &[
            "abandon",
            "ghosted",
            "left me",
            "alone",
            "everyone leaves",
            "they always leave",
            "nobody stays",
            "walked out on me",
        ],
        response: "Abandonment code: distance or silence gets read as proof of being left. The fear is old and protective; anchor in what is still here right now.",
    },
    TriggerEntry {
        code: "betrayal",
        triggers: &[
            "betray",
            "cheated",
            "lied to me",
            "backstab",
            "stabbed in the back",
            "broke my trust",
            "used me",
        ],
        response: "Betrayal code: trust was broken and the system is rebuilding its alarm. Suspicion here is a wound guarding itself, not a character flaw.",
    },
    TriggerEntry {
        code: "rejection",
        triggers: &[
            "rejected",
            "rejection",
            "turned down",
            "left out",
            "excluded",
            "nobody likes me",
            "not wanted",
        ],
        response: "Rejection code: being passed over lands as a verdict on worth. Separate the event from the identity it seems to announce.",
    },
    TriggerEntry {
        code: "engulfment",
        triggers: &[
            "smothered",
            "suffocat",
            "no space for me",
            "too clingy",
            "can't breathe around",
            "need space",
        ],
        response: "Engulfment code: closeness starts to feel like losing yourself. Needing room is a boundary signal, not coldness.",
    },
    TriggerEntry {
        code: "shame",
        triggers: &[
            "ashamed",
            "shame",
            "humiliat",
            "disgusting",
            "worthless",
            "something wrong with me",
        ],
        response: "Shame code: the feeling says 'I am bad' instead of 'I did something'. Shame shrinks under warmth and witness, not under pressure.",
    },
    TriggerEntry {
        code: "guilt",
        triggers: &[
            "guilty",
            "guilt",
            "my fault",
            "blame myself",
            "i feel bad for",
            "should have known",
        ],
        response: "Guilt code: responsibility is being carried past its real size. Sort what was yours to hold from what never was.",
    },
    TriggerEntry {
        code: "perfectionism",
        triggers: &[
            "perfect",
            "not good enough",
            "never good enough",
            "any mistake",
            "made a mistake",
            "high standards",
        ],
        response: "Perfectionism code: flawlessness is being used as armor against criticism. Good enough, done, is a nervous-system win.",
    },
    TriggerEntry {
        code: "people_pleasing",
        triggers: &[
            "people pleas",
            "people-pleas",
            "make everyone happy",
            "keep everyone happy",
            "afraid to disappoint",
            "don't want to upset",
        ],
        response: "People-pleasing code: keeping others comfortable became the way to stay safe. Your needs count in the room too.",
    },
    TriggerEntry {
        code: "boundary_collapse",
        triggers: &[
            "can't say no",
            "cant say no",
            "said yes again",
            "no boundaries",
            "walk all over me",
            "taken advantage",
        ],
        response: "Boundary collapse code: the yes comes out before the body has voted. A pause before answering is already a boundary.",
    },
    TriggerEntry {
        code: "hypervigilance",
        triggers: &[
            "on edge",
            "on guard",
            "can't relax",
            "cant relax",
            "waiting for something bad",
            "jumpy",
            "scanning the room",
        ],
        response: "Hypervigilance code: the threat radar is stuck on high. It kept you safe once; now it needs proof that this moment is different.",
    },
    TriggerEntry {
        code: "fight",
        triggers: &[
            "lash out",
            "lashed out",
            "snapped at",
            "want to fight",
            "picking fights",
            "want to punch",
        ],
        response: "Fight code: energy mobilised to defend against a threat. The heat is information; give it somewhere physical to go.",
    },
    TriggerEntry {
        code: "flight",
        triggers: &[
            "run away",
            "escape",
            "get away from",
            "leave everything",
            "pack up and go",
        ],
        response: "Flight code: the body wants distance from pressure. Honor the urge to move without letting it make the big decisions.",
    },
    TriggerEntry {
        code: "freeze",
        triggers: &[
            "frozen",
            "can't move",
            "cant move",
            "paralyzed",
            "paralysed",
            "shut down",
            "shutting down",
            "stuck in bed",
        ],
        response: "Freeze code: the system hit the brakes because everything felt like too much. Thaw starts with tiny movement, not big effort.",
    },
    TriggerEntry {
        code: "dissociation",
        triggers: &[
            "zoned out",
            "zoning out",
            "spaced out",
            "spacing out",
            "lost time",
            "blanked out",
            "checked out",
        ],
        response: "Dissociation code: the mind stepped back to turn down the volume. Return gently through the senses, one at a time.",
    },
    TriggerEntry {
        code: "dpdr",
        triggers: &[
            "outside my body",
            "out of my body",
            "floating",
            "nothing feels real",
            "doesn't feel real",
            "nothing is real",
            "unreal",
            "watching myself",
            "in a dream",
            "depersonali",
            "dereali",
        ],
        response: "DPDR code: depersonalization/derealization is the nervous system's emergency dimmer switch. It is protective, not dangerous; weight, temperature and texture bring you back.",
    },
    TriggerEntry {
        code: "emotional_numbing",
        triggers: &[
            "feel numb",
            "gone numb",
            "feel nothing",
            "feel empty",
            "can't feel anything",
            "cant feel anything",
        ],
        response: "Numbing code: feeling was switched off because it got too loud. Numb is a pause, not a permanent state.",
    },
    TriggerEntry {
        code: "emotional_flashback",
        triggers: &[
            "flashback",
            "triggered",
            "like a child again",
            "feel so small",
            "old feeling",
        ],
        response: "Emotional flashback code: an old feeling arrived without its old memory. Name the year you are in and the age you are now.",
    },
    TriggerEntry {
        code: "panic",
        triggers: &[
            "panic",
            "heart racing",
            "heart is racing",
            "can't breathe",
            "cant breathe",
            "chest is tight",
            "tight chest",
        ],
        response: "Panic code: a surge of alarm with nowhere to go. It peaks and passes; a long exhale tells the body the danger is over.",
    },
    TriggerEntry {
        code: "anxiety_spiral",
        triggers: &[
            "anxious",
            "anxiety",
            "what if",
            "worst case",
            "spiraling",
            "spiralling",
            "freaking out",
        ],
        response: "Anxiety spiral code: the mind is rehearsing danger to feel prepared. Come back to the one thing that is true in this minute.",
    },
    TriggerEntry {
        code: "rumination",
        triggers: &[
            "overthinking",
            "can't stop thinking",
            "cant stop thinking",
            "replaying",
            "keep thinking about",
            "stuck in my head",
        ],
        response: "Rumination code: the loop is trying to solve a feeling with thought. Move the body to interrupt the replay.",
    },
    TriggerEntry {
        code: "overwhelm",
        triggers: &[
            "overwhelm",
            "too much",
            "drowning in",
            "can't cope",
            "cant cope",
            "can't handle",
        ],
        response: "Overwhelm code: input exceeds capacity right now. Shrink the horizon to the next ten minutes.",
    },
    TriggerEntry {
        code: "burnout",
        triggers: &[
            "burned out",
            "burnt out",
            "burnout",
            "exhausted",
            "running on empty",
            "no energy",
        ],
        response: "Burnout code: output has outrun recovery for too long. Rest is repair, not a reward to earn.",
    },
    TriggerEntry {
        code: "insomnia",
        triggers: &[
            "can't sleep",
            "cant sleep",
            "insomnia",
            "awake at night",
            "up all night",
        ],
        response: "Sleep code: the system will not power down because it does not yet feel safe. Lower the alert level before chasing sleep.",
    },
    TriggerEntry {
        code: "somatic_tension",
        triggers: &[
            "tight shoulders",
            "clenched",
            "jaw",
            "tension",
            "headache",
            "stomach in knots",
        ],
        response: "Somatic tension code: the body is bracing for impact. Soften one muscle group and let the rest follow.",
    },
    TriggerEntry {
        code: "imposter",
        triggers: &[
            "imposter",
            "impostor",
            "fraud",
            "don't belong",
            "dont belong",
            "not qualified",
        ],
        response: "Imposter code: success is not yet registering as yours. The evidence of competence is already in the room.",
    },
    TriggerEntry {
        code: "comparison",
        triggers: &[
            "compare myself",
            "comparing myself",
            "everyone else is",
            "better than me",
            "behind everyone",
        ],
        response: "Comparison code: someone else's highlight reel is being used as your ruler. Measure against your own last step.",
    },
    TriggerEntry {
        code: "invisibility",
        triggers: &[
            "invisible",
            "nobody sees me",
            "no one sees me",
            "unseen",
            "nobody notices",
            "ignored",
        ],
        response: "Invisibility code: being overlooked reopens an old need to be witnessed. Your presence matters before anyone confirms it.",
    },
    TriggerEntry {
        code: "loneliness",
        triggers: &[
            "lonely",
            "loneliness",
            "no friends",
            "isolated",
            "nobody to talk to",
            "no one to talk to",
        ],
        response: "Loneliness code: the need for connection is signalling hunger. Small contact counts; it does not have to be deep to help.",
    },
    TriggerEntry {
        code: "grief",
        triggers: &[
            "grief",
            "grieving",
            "passed away",
            "lost my",
            "miss them so much",
            "funeral",
        ],
        response: "Grief code: love with nowhere to land. Grief moves in waves; there is no schedule it has to keep.",
    },
    TriggerEntry {
        code: "anger",
        triggers: &[
            "furious",
            "full of rage",
            "raging",
            "so angry",
            "pissed off",
            "livid",
        ],
        response: "Anger code: a boundary was crossed and the body noticed. Anger points at what matters; let it inform, not drive.",
    },
    TriggerEntry {
        code: "resentment",
        triggers: &[
            "resent",
            "bitter",
            "holding a grudge",
            "never forgive",
            "still mad at",
        ],
        response: "Resentment code: an unmet need is being replayed as a grievance. Name the need and the grip loosens.",
    },
    TriggerEntry {
        code: "control",
        triggers: &[
            "out of control",
            "need control",
            "control everything",
            "can't let go",
            "cant let go",
        ],
        response: "Control code: certainty is being chased to quiet fear. Find the one thing that is actually in your hands.",
    },
    TriggerEntry {
        code: "scarcity",
        triggers: &[
            "never enough",
            "can't afford",
            "cant afford",
            "money stress",
            "bills",
            "debt",
        ],
        response: "Scarcity code: lack is narrowing the field of view. Safety today is worth naming before solving tomorrow.",
    },
    TriggerEntry {
        code: "self_sabotage",
        triggers: &[
            "sabotag",
            "ruin everything",
            "procrastinat",
            "always mess up",
            "mess everything up",
        ],
        response: "Self-sabotage code: part of you is protecting against the risk of trying. Thank it, then take the smallest step anyway.",
    },
    TriggerEntry {
        code: "hyper_independence",
        triggers: &[
            "do it all myself",
            "can't ask for help",
            "cant ask for help",
            "don't need anyone",
            "dont need anyone",
            "hate asking for help",
        ],
        response: "Hyper-independence code: relying on others once felt unsafe. Letting one small thing be carried by someone else is practice.",
    },
];

pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-cased, whitespace-collapsed form used for every phrase check.
pub fn matching_form(input: &str) -> String {
    normalize_text(input)
        .replace(['\u{2018}', '\u{2019}'], "'")
        .to_lowercase()
}

pub fn find_trigger(text: &str) -> Option<&'static TriggerEntry> {
    let lower = matching_form(text);
    TRIGGER_TABLE.iter().find(|entry| entry.matches(&lower))
}

pub fn detect_trigger_code(text: &str) -> Option<&'static str> {
    find_trigger(text).map(|entry| entry.code)
}

pub fn trigger_entry(code: &str) -> Option<&'static TriggerEntry> {
    TRIGGER_TABLE.iter().find(|entry| entry.code == code)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn detects_single_code() {
        assert_eq!(
            detect_trigger_code("I feel ghosted and alone"),
            Some("abandonment")
        );
        assert_eq!(
            detect_trigger_code("I feel like I'm floating outside my body"),
            Some("dpdr")
        );
    }

    #[test]
    fn earlier_code_wins_when_two_match() {
        let message = "he ghosted me after he betrayed me";
        assert!(trigger_entry("betrayal").unwrap().matches(&matching_form(message)));
        assert_eq!(detect_trigger_code(message), Some("abandonment"));
    }

    #[test]
    fn no_match_is_none() {
        assert_eq!(
            detect_trigger_code("What should I cook for dinner tonight?"),
            None
        );
    }

    #[test]
    fn matching_is_case_and_whitespace_insensitive() {
        assert_eq!(
            detect_trigger_code("Nothing   FEELS real today"),
            Some("dpdr")
        );
        assert_eq!(matching_form("  Can\u{2019}t   Sleep "), "can't sleep");
    }

    #[test]
    fn table_codes_are_unique_and_lowercase() {
        let mut seen = HashSet::new();
        assert!(TRIGGER_TABLE.len() >= 30);
        for entry in TRIGGER_TABLE {
            assert!(seen.insert(entry.code), "duplicate code {}", entry.code);
            assert!(!entry.triggers.is_empty());
            for trigger in entry.triggers {
                assert_eq!(*trigger, trigger.to_lowercase());
            }
        }
    }

    #[test]
    fn abandonment_is_declared_before_betrayal() {
        let position = |code: &str| TRIGGER_TABLE.iter().position(|entry| entry.code == code);
        assert!(position("abandonment") < position("betrayal"));
    }
}
