//! Progress reporting SPI.
//!
//! The controller narrates execution through this sink. The default sink
//! does nothing; a presentation layer may pace or render events however it
//! likes. Correctness never depends on what a reporter does with an event.

use async_trait::async_trait;

/// Lifecycle phase labels emitted by the controller and workflow.
pub mod phase {
    pub const RESOURCE_CREATED: &str = "resource_created";
    pub const RESOURCE_IN_PROGRESS: &str = "resource_in_progress";
    pub const RESOURCE_COMPLETED: &str = "resource_completed";
    pub const ACTION_STARTED: &str = "action_started";
    pub const ACTION_COMPLETED: &str = "action_completed";
    pub const FAULT_DETECTED: &str = "fault_detected";
    pub const RESTORE_COMPLETED: &str = "restore_completed";
    pub const WORKFLOW_PHASE: &str = "workflow_phase";
}

/// One progress event.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Resource the event belongs to, when there is one.
    pub resource: Option<String>,
    /// Action label (`Action::kind`) for action-scoped events.
    pub action: Option<String>,
    /// Phase label, one of [`phase`].
    pub phase: String,
    /// Position of the current action within the resource's list (1-based).
    pub step: usize,
    /// Total actions for the resource.
    pub total: usize,
    /// Deterministic simulated work size of the current action.
    pub work_units: u64,
    /// Optional human-readable message.
    pub message: Option<String>,
    /// Extra structured metadata.
    pub metadata: serde_json::Value,
}

impl ProgressEvent {
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            resource: None,
            action: None,
            phase: phase.into(),
            step: 0,
            total: 0,
            work_units: 0,
            message: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_position(mut self, step: usize, total: usize) -> Self {
        self.step = step;
        self.total = total;
        self
    }

    pub fn with_work_units(mut self, work_units: u64) -> Self {
        self.work_units = work_units;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Sink interface for progress reporting.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, event: ProgressEvent) -> Result<(), String>;
}

/// Reporter that swallows every event.
pub struct NoopProgressReporter;

#[async_trait]
impl ProgressReporter for NoopProgressReporter {
    async fn report(&self, _event: ProgressEvent) -> Result<(), String> {
        Ok(())
    }
}
