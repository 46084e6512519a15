//! Multi-round persona debate.
//!
//! The debate is a sequence of stages driven by [`stage::DebateState`]:
//! each round runs analyst → critic → synthesizer, and the session is
//! sealed after the last round's synthesizer decision.

pub mod persona;
pub mod session;
pub mod stage;

pub use persona::{DebateBindings, Persona, PersonaBinding};
pub use session::{DebateSession, DebateStatus, DebateTurn, FinalDecision, SessionError};
pub use stage::{DebateStage, DebateState};
