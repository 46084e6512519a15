//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Prompt is required")]
    MissingPrompt,

    #[error("No enabled backend configs in request")]
    NoEnabledConfigs,

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid tier definition: {0}")]
    InvalidTier(String),

    #[error("Billing invariant violation: {0}")]
    BillingInvariantViolation(String),

    #[error("No adapter registered for backend: {0}")]
    NoAdapter(String),
}

impl DomainError {
    /// Validation errors are rejected before any adapter call is issued
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::MissingPrompt
                | DomainError::NoEnabledConfigs
                | DomainError::InvalidIdentifier(_)
        )
    }

    /// Billing violations are always fatal and never retried
    pub fn is_billing_violation(&self) -> bool {
        matches!(self, DomainError::BillingInvariantViolation(_))
    }
}
