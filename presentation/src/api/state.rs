//! Shared handler state

use std::sync::Arc;
use verdict_application::{AdapterResolver, HealthHistory, RunConsensusUseCase, RunDebateUseCase};
use verdict_domain::DebateBindings;

pub struct ApiState<R: AdapterResolver + 'static> {
    pub consensus: Arc<RunConsensusUseCase<R>>,
    pub debate: Arc<RunDebateUseCase<R>>,
    pub health: Arc<dyn HealthHistory>,
    /// Persona bindings used when a debate request names none
    pub default_bindings: Option<DebateBindings>,
}

impl<R: AdapterResolver + 'static> ApiState<R> {
    pub fn new(
        consensus: RunConsensusUseCase<R>,
        debate: RunDebateUseCase<R>,
        health: Arc<dyn HealthHistory>,
    ) -> Self {
        Self {
            consensus: Arc::new(consensus),
            debate: Arc::new(debate),
            health,
            default_bindings: None,
        }
    }

    pub fn with_default_bindings(mut self, bindings: Option<DebateBindings>) -> Self {
        self.default_bindings = bindings;
        self
    }
}

impl<R: AdapterResolver + 'static> Clone for ApiState<R> {
    fn clone(&self) -> Self {
        Self {
            consensus: Arc::clone(&self.consensus),
            debate: Arc::clone(&self.debate),
            health: Arc::clone(&self.health),
            default_bindings: self.default_bindings.clone(),
        }
    }
}
