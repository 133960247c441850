use crate::lexicon::matching_form;

pub const CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "killing myself",
    "want to die",
    "wanna die",
    "wish i was dead",
    "wish i were dead",
    "better off dead",
    "end my life",
    "end it all",
    "take my own life",
    "don't want to live",
    "dont want to live",
    "no reason to live",
    "self harm",
    "self-harm",
    "hurt myself",
    "cut myself",
    "cutting myself",
    "overdose",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrisisScreen {
    Clear,
    Crisis { matched_phrase: &'static str },
}

impl CrisisScreen {
    pub fn is_crisis(self) -> bool {
        matches!(self, Self::Crisis { .. })
    }
}

pub fn screen_for_crisis(message: &str) -> CrisisScreen {
    let lower = matching_form(message);

    CRISIS_PHRASES
        .iter()
        .find(|phrase| lower.contains(*phrase))
        .map(|phrase| CrisisScreen::Crisis {
            matched_phrase: *phrase,
        })
        .unwrap_or(CrisisScreen::Clear)
}
