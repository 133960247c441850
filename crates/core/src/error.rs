use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnValidationError {
    #[error("message is required")]
    Missing,
    #[error("message must be a string, got {found}")]
    NotAString { found: &'static str },
    #[error("message must not be empty")]
    Empty,
}
