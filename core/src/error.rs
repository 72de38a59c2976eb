use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A record, window or threshold that breaks the engine's input contract.
    /// Raised by the first component that observes it, never coerced.
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field:  field.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the offending field with its location, e.g. `sales[3].quantity`.
    pub fn within(self, location: &str) -> Self {
        match self {
            Self::InvalidInput { field, reason } => Self::InvalidInput {
                field: format!("{location}.{field}"),
                reason,
            },
            other => other,
        }
    }

    /// True for contract violations, false for boundary failures.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
