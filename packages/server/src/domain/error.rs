//! Domain errors.

use thiserror::Error;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Display name is empty after trimming
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// Login-or-register answer is neither `1` nor `2`
    #[error("invalid auth choice: '{0}'")]
    InvalidAuthChoice(String),
}
