//! # vnfvault core
//!
//! Deterministic planning and control logic for the vnfvault backup
//! simulator.
//!
//! This crate contains:
//! - Policy / Component / Resource / Condition / Topology definitions
//! - The action planner (policy × targets -> resources + action lists)
//! - The controller loop (condition state machine, strictly sequential)
//! - The cluster workflow (node-oriented phased pass with switchover)
//! - Fault-injection and progress-reporting capabilities
//!
//! This crate does NOT care about:
//! - Where the policy document came from
//! - How output is rendered or paced
//! - Process exit semantics

pub mod action;
pub mod controller;
pub mod fault;
pub mod planner;
pub mod progress;
pub mod types;
pub mod workflow;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{Action, STORAGE_LOCATION_PREFIX};
    pub use crate::controller::{Controller, SummaryRow};
    pub use crate::fault::{
        FaultInjector, NeverFail, SeededFaultInjector, DEFAULT_FAULT_PROBABILITY,
    };
    pub use crate::planner::{plan, PlanError, PlanOutput, DEFAULT_COMPONENT_VM_SIZE_MB};
    pub use crate::progress::{phase, NoopProgressReporter, ProgressEvent, ProgressReporter};
    pub use crate::types::{
        derived_resource_name, switchover, BackupMode, BackupPolicy, BackupResource,
        ClusterTopology, Component, Condition, ConditionStatus, Node, NodeRole, RetentionPolicy,
        TargetRef, API_VERSION, BACKUP_COMPLETE_CONDITION, KIND,
    };
    pub use crate::workflow::{ClusterRunReport, ClusterWorkflow, BACKUP_PACKAGES};
}

// Re-export key types at crate root
pub use action::Action;
pub use controller::{Controller, SummaryRow};
pub use fault::{FaultInjector, NeverFail, SeededFaultInjector};
pub use planner::{plan, PlanError, PlanOutput};
pub use progress::{NoopProgressReporter, ProgressEvent, ProgressReporter};
pub use types::{
    switchover, BackupPolicy, BackupResource, ClusterTopology, Component, Condition,
    ConditionStatus,
};
pub use workflow::{ClusterRunReport, ClusterWorkflow};
