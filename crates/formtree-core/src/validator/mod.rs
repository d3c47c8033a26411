pub mod num;
pub mod text;

pub use num::*;
pub use text::*;

use thiserror::Error as ThisError;

///
/// ValidateIssue
///
/// A single validation outcome. Rule violations carry the user-facing
/// message verbatim; configuration issues indicate a bad validator setup
/// and are programmer errors.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidateIssue {
    #[error("{0}")]
    Validation(String),

    #[error("invalid validator configuration: {0}")]
    InvalidConfig(String),
}

impl ValidateIssue {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// The user-facing message for rule violations; config issues render
    /// with their prefix since they should never reach an end user.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

///
/// Validator
///

pub trait Validator<T: ?Sized> {
    fn validate(&self, t: &T) -> Result<(), ValidateIssue>;
}
