// =============================================================================
// Indicator errors
// =============================================================================
//
// Two classes only.  `InvalidInput` is structural and must reach the caller.
// `InsufficientData` is recoverable: the table builder turns it into an
// unavailable field instead of failing the whole row.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },
}

impl IndicatorError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// `true` for the degradable class of errors.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, IndicatorError>;
