//! Progress notification port
//!
//! Defines the interface for reporting progress during fan-out and debate.

use verdict_domain::DebateStage;

/// Callback for progress updates
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a fan-out starts
    fn on_fanout_start(&self, total: usize);

    /// Called when one backend call finishes
    fn on_backend_complete(&self, label: &str, success: bool);

    /// Called when every branch has finished
    fn on_fanout_complete(&self);

    // ==================== Debate Callbacks ====================

    /// Called before a debate stage calls its backend
    fn on_stage_start(&self, _stage: &DebateStage, _model: &str) {}

    /// Called after a debate stage succeeded or failed
    fn on_stage_complete(&self, _stage: &DebateStage, _success: bool) {}

    /// Called when a judge starts synthesizing
    fn on_judge_start(&self, _model: &str) {}

    fn on_judge_complete(&self, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_fanout_start(&self, _total: usize) {}
    fn on_backend_complete(&self, _label: &str, _success: bool) {}
    fn on_fanout_complete(&self) {}
}
