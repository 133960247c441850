pub mod crisis;
pub mod directive;
pub mod error;
pub mod lexicon;
pub mod models;
pub mod replies;

pub use crisis::{screen_for_crisis, CrisisScreen, CRISIS_PHRASES};
pub use directive::{build_directive, plan_turn, IMPLICIT_SCAN_INSTRUCTION};
pub use error::TurnValidationError;
pub use lexicon::{
    detect_trigger_code, find_trigger, matching_form, normalize_text, trigger_entry, TRIGGER_TABLE,
};
pub use models::*;
pub use replies::{CRISIS_REPLY, EMPTY_COMPLETION_REPLY, PROVIDER_FAILURE_REPLY};
