//! Controller loop
//!
//! Drives planned resources through their condition state machine:
//! Pending -> InProgress -> Completed, or through the compensating
//! HostDown -> RestoredAfterFault path when the fault injector declares a
//! target down.
//!
//! Execution is strictly sequential on purpose: one action at a time, one
//! resource at a time. This models a simplified reconciliation pass, not a
//! production scheduler.

use std::sync::Arc;

use serde::Serialize;

use crate::action::Action;
use crate::fault::{FaultInjector, NeverFail};
use crate::planner::PlanOutput;
use crate::progress::{phase, NoopProgressReporter, ProgressEvent, ProgressReporter};
use crate::types::{BackupResource, ClusterTopology, Condition, ConditionStatus};

/// One aggregated result row per resource, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub target: String,
    pub resource_name: String,
    pub status: ConditionStatus,
}

/// The controller. Holds the injected fault decision and progress sink;
/// both default to inert implementations.
pub struct Controller {
    fault: Arc<dyn FaultInjector>,
    progress: Arc<dyn ProgressReporter>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            fault: Arc::new(NeverFail),
            progress: Arc::new(NoopProgressReporter),
        }
    }

    pub fn with_fault_injector(mut self, fault: Arc<dyn FaultInjector>) -> Self {
        self.fault = fault;
        self
    }

    pub fn with_progress_reporter(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Run every planned resource to completion and aggregate a summary.
    ///
    /// Simulated faults are absorbed into status history; nothing escapes
    /// this loop as an error.
    pub async fn run(
        &self,
        plan: &mut PlanOutput,
        topology: Option<&ClusterTopology>,
    ) -> Vec<SummaryRow> {
        let PlanOutput { resources, actions } = plan;
        let mut summary = Vec::with_capacity(resources.len());

        for resource in resources.iter_mut() {
            let name = resource.name().to_string();
            let target = resource.target().to_string();
            let action_list = actions.get(&name).map(Vec::as_slice).unwrap_or_default();

            self.mark_created(resource).await;
            self.mark_in_progress(resource).await;

            let total = action_list.len();
            for (index, action) in action_list.iter().enumerate() {
                self.execute_action(&name, action, index + 1, total).await;
            }

            if self.fault.should_fail(&target) {
                self.recover_from_fault(resource, action_list, topology).await;
            } else {
                self.mark_completed(resource).await;
            }

            summary.push(SummaryRow {
                target,
                resource_name: name,
                status: resource
                    .current_condition()
                    .map(|c| c.status)
                    .unwrap_or(ConditionStatus::Unknown),
            });
        }

        summary
    }

    async fn mark_created(&self, resource: &mut BackupResource) {
        resource.push_condition(Condition::backup_complete(
            ConditionStatus::Unknown,
            "Created",
            "resource created",
        ));
        tracing::info!(resource = %resource.name(), "VNFBackup created. status=Pending");
        self.report(
            ProgressEvent::new(phase::RESOURCE_CREATED).with_resource(resource.name()),
        )
        .await;
    }

    async fn mark_in_progress(&self, resource: &mut BackupResource) {
        resource.push_condition(Condition::backup_complete(
            ConditionStatus::Unknown,
            "InProgress",
            "backup workflow started",
        ));
        tracing::info!(resource = %resource.name(), "VNFBackup status=InProgress");
        self.report(
            ProgressEvent::new(phase::RESOURCE_IN_PROGRESS).with_resource(resource.name()),
        )
        .await;
    }

    async fn mark_completed(&self, resource: &mut BackupResource) {
        resource.push_condition(Condition::backup_complete(
            ConditionStatus::True,
            "Completed",
            format!("simulated backup for {} completed successfully", resource.name()),
        ));
        tracing::info!(resource = %resource.name(), "VNFBackup status=Completed");
        self.report(
            ProgressEvent::new(phase::RESOURCE_COMPLETED).with_resource(resource.name()),
        )
        .await;
    }

    /// Compensation path: declare the host down, re-provision it, restore
    /// every VM it hosted, and close the history on a recovered status.
    async fn recover_from_fault(
        &self,
        resource: &mut BackupResource,
        completed_actions: &[Action],
        topology: Option<&ClusterTopology>,
    ) {
        let name = resource.name().to_string();
        let target = resource.target().to_string();

        resource.push_condition(Condition::backup_complete(
            ConditionStatus::False,
            "HostDown",
            format!("compute host {} detected down", target),
        ));
        tracing::warn!(resource = %name, target = %target, "ALERT: compute host down");
        self.report(
            ProgressEvent::new(phase::FAULT_DETECTED)
                .with_resource(&name)
                .with_message(format!("compute host {} down", target)),
        )
        .await;

        let vms = restore_candidates(&target, completed_actions, topology);
        let restore_sequence: Vec<Action> = std::iter::once(Action::ReprovisionNode {
            node_id: target.clone(),
        })
        .chain(vms.iter().map(|(vm_name, size_mb)| Action::RestoreVm {
            vm_name: vm_name.clone(),
            size_mb: *size_mb,
        }))
        .collect();

        let total = restore_sequence.len();
        for (index, action) in restore_sequence.iter().enumerate() {
            self.execute_action(&name, action, index + 1, total).await;
        }

        resource.push_condition(Condition::backup_complete(
            ConditionStatus::True,
            "RestoredAfterFault",
            format!("restored {} VM(s) after host fault", vms.len()),
        ));
        tracing::info!(resource = %name, target = %target, restored = vms.len(), "VNFBackup status=RestoredAfterFault");
        self.report(
            ProgressEvent::new(phase::RESTORE_COMPLETED).with_resource(&name),
        )
        .await;
    }

    async fn execute_action(&self, resource: &str, action: &Action, step: usize, total: usize) {
        tracing::info!(
            resource = %resource,
            action = action.kind(),
            step,
            total,
            "START {}",
            action.describe()
        );
        self.report(
            ProgressEvent::new(phase::ACTION_STARTED)
                .with_resource(resource)
                .with_action(action.kind())
                .with_position(step, total)
                .with_work_units(action.work_units())
                .with_message(action.describe()),
        )
        .await;

        if let Action::BackupFiles {
            pod_ref,
            path_includes,
            path_excludes,
        } = action
        {
            for path in path_includes {
                tracing::info!(resource = %resource, pod = %pod_ref, path = %path, "file backup path");
            }
            if !path_excludes.is_empty() {
                let excluded: Vec<&str> = path_excludes.iter().map(String::as_str).collect();
                tracing::info!(resource = %resource, excluded = ?excluded, "excluding paths");
            }
        }

        tracing::info!(
            resource = %resource,
            action = action.kind(),
            "COMPLETE {}",
            action.describe()
        );
        self.report(
            ProgressEvent::new(phase::ACTION_COMPLETED)
                .with_resource(resource)
                .with_action(action.kind())
                .with_position(step, total)
                .with_metadata(serde_json::json!({ "action": action.kind() })),
        )
        .await;
    }

    async fn report(&self, event: ProgressEvent) {
        if let Err(err) = self.progress.report(event).await {
            tracing::warn!("failed to report progress: {}", err);
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

/// VMs to restore for a downed target: topology placement when known,
/// otherwise whatever the resource itself backed up.
fn restore_candidates(
    target: &str,
    completed_actions: &[Action],
    topology: Option<&ClusterTopology>,
) -> Vec<(String, u64)> {
    if let Some(topology) = topology {
        let hosted = topology.vms_on(target);
        if !hosted.is_empty() {
            return hosted
                .iter()
                .map(|vm| {
                    (
                        vm.clone(),
                        topology.vm_size(vm).unwrap_or(crate::types::DEFAULT_VM_SIZE_MB),
                    )
                })
                .collect();
        }
    }

    completed_actions
        .iter()
        .filter_map(|action| match action {
            Action::BackupVm { vm_name, size_mb } => Some((vm_name.clone(), *size_mb)),
            _ => None,
        })
        .collect()
}
