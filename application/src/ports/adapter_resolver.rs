//! Adapter resolution port
//!
//! Maps (tier, backend) to the adapter instance allowed to serve it.

use super::backend_adapter::BackendAdapter;
use std::sync::Arc;
use verdict_domain::{BackendKind, DomainError};

/// Outcome of resolving an adapter for a tier
///
/// Exactly one of `adapter` / `error` is set.
#[derive(Clone)]
pub struct Resolution {
    pub adapter: Option<Arc<dyn BackendAdapter>>,
    pub error: Option<DomainError>,
}

impl Resolution {
    pub fn found(adapter: Arc<dyn BackendAdapter>) -> Self {
        Self {
            adapter: Some(adapter),
            error: None,
        }
    }

    pub fn rejected(error: DomainError) -> Self {
        Self {
            adapter: None,
            error: Some(error),
        }
    }

    pub fn into_result(self) -> Result<Arc<dyn BackendAdapter>, DomainError> {
        match (self.adapter, self.error) {
            (Some(adapter), None) => Ok(adapter),
            (_, Some(error)) => Err(error),
            (None, None) => Err(DomainError::NoAdapter("unresolved".to_string())),
        }
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("adapter", &self.adapter.as_ref().map(|a| a.name().to_string()))
            .field("error", &self.error)
            .finish()
    }
}

/// Selects adapters under a billing tier
///
/// Subscription tiers never resolve to a metered adapter: the resolver
/// returns a `BillingInvariantViolation` instead of substituting one.
pub trait AdapterResolver: Send + Sync {
    fn resolve(&self, tier: &str, backend: &BackendKind) -> Resolution;

    /// Recheck, right before a call, that `adapter` is allowed under `tier`
    fn assert_binding(&self, tier: &str, adapter: &dyn BackendAdapter) -> Result<(), DomainError>;
}
