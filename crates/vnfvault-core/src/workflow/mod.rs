//! Cluster backup/restore workflow
//!
//! The node-oriented variant: a phased pass over an explicit cluster
//! topology. Standby nodes are backed up first, roles are swapped, the
//! previous active set is backed up, and a post-check pass handles an
//! optionally injected host fault plus the simulated package restore.
//!
//! The workflow owns no hidden state; the topology value flows through the
//! switchover and comes back out in the final report.

use std::sync::Arc;

use crate::action::Action;
use crate::controller::{Controller, SummaryRow};
use crate::fault::{FaultInjector, NeverFail};
use crate::planner::PlanOutput;
use crate::progress::{phase, NoopProgressReporter, ProgressEvent, ProgressReporter};
use crate::types::{switchover, BackupResource, ClusterTopology, DEFAULT_VM_SIZE_MB};

/// Packages the pre-check phase verifies and the restore phase replays.
pub const BACKUP_PACKAGES: [&str; 2] = ["BKUP.PKG", "CRTE-FW.PKG"];

const PREFIX_STANDBY: &str = "backup-standby";
const PREFIX_PREV_ACTIVE: &str = "backup-prevactive";
const SYSTEM_RESTORE_NAME: &str = "restore-system";

/// Outcome of a full cluster pass.
#[derive(Debug, Clone)]
pub struct ClusterRunReport {
    /// Summary rows from every phase, in execution order.
    pub summary: Vec<SummaryRow>,
    /// Topology after the switchover.
    pub topology: ClusterTopology,
    /// Node the fault injector took down during post-checks, if any.
    pub faulted_node: Option<String>,
}

/// Drives the phased cluster pass. Fault decisions and progress both
/// default to inert implementations, as in [`Controller`].
pub struct ClusterWorkflow {
    fault: Arc<dyn FaultInjector>,
    progress: Arc<dyn ProgressReporter>,
}

impl ClusterWorkflow {
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

    /// Run the full phased pass over the given topology.
    pub async fn run(&self, topology: ClusterTopology) -> ClusterRunReport {
        let controller = Controller::new().with_progress_reporter(self.progress.clone());
        let mut summary = Vec::new();

        self.pre_checks(&topology).await;

        // Standby nodes first, while the active set keeps serving.
        self.announce("Backup standby nodes").await;
        let mut standby_plan =
            node_backup_plan(PREFIX_STANDBY, &topology.standby_nodes(), &topology);
        summary.extend(controller.run(&mut standby_plan, Some(&topology)).await);

        self.announce("Fast failover / switchover").await;
        tracing::info!("initiating fast failover; standby nodes promoted to active");
        let topology = switchover(topology);
        tracing::info!(
            active = ?topology.active_nodes(),
            standby = ?topology.standby_nodes(),
            "switchover complete"
        );

        // The previous active set is now standby; back it up too.
        self.announce("Backup previous active nodes").await;
        let mut prev_active_plan =
            node_backup_plan(PREFIX_PREV_ACTIVE, &topology.standby_nodes(), &topology);
        summary.extend(controller.run(&mut prev_active_plan, Some(&topology)).await);

        self.announce("Post-checks and restore").await;
        let faulted_node = self.post_checks(&controller, &topology, &mut summary).await;

        self.announce("Summary").await;
        tracing::info!(rows = summary.len(), "cluster backup and restore pass complete");

        ClusterRunReport {
            summary,
            topology,
            faulted_node,
        }
    }

    async fn pre_checks(&self, topology: &ClusterTopology) {
        self.announce("Pre-checks").await;
        tracing::info!(packages = ?BACKUP_PACKAGES, "verifying backup packages");
        for package in BACKUP_PACKAGES {
            tracing::info!(package = %package, "available");
        }
        tracing::info!("running RTRV-NODE-STS to gather VNF node status");
        for node in &topology.nodes {
            tracing::info!(node = %node.id, role = %node.role, "RTRV-NODE-STS");
        }
        tracing::info!(
            crd = %format!("vnfbackups.{}", crate::types::API_VERSION),
            "CRD present"
        );
    }

    /// Post-check phase: consult the fault injector over the current active
    /// set, recover the victim if one is declared, then replay the system
    /// packages through a dedicated restore resource.
    async fn post_checks(
        &self,
        controller: &Controller,
        topology: &ClusterTopology,
        summary: &mut Vec<SummaryRow>,
    ) -> Option<String> {
        let active = topology.active_nodes();
        let faulted = self
            .fault
            .select_victim(&active)
            .filter(|victim| self.fault.should_fail(victim))
            .map(str::to_string);

        match &faulted {
            Some(node) => {
                tracing::warn!(node = %node, "ALERT: detected compute host down");
                self.report(
                    ProgressEvent::new(phase::FAULT_DETECTED)
                        .with_message(format!("compute host {} down", node)),
                )
                .await;

                let mut recovery_plan = node_recovery_plan(node, topology);
                summary.extend(controller.run(&mut recovery_plan, Some(topology)).await);
            }
            None => tracing::info!("all compute hosts healthy"),
        }

        let mut restore_plan = system_restore_plan();
        summary.extend(controller.run(&mut restore_plan, Some(topology)).await);

        faulted
    }

    async fn announce(&self, label: &str) {
        tracing::info!(phase = %label, "PHASE");
        self.report(ProgressEvent::new(phase::WORKFLOW_PHASE).with_message(label)).await;
    }

    async fn report(&self, event: ProgressEvent) {
        if let Err(err) = self.progress.report(event).await {
            tracing::warn!("failed to report progress: {}", err);
        }
    }
}

impl Default for ClusterWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

/// Plan one backup resource per node: a `BackupVm` action for every VM the
/// topology places on that node, sizes resolved with the topology default.
pub fn node_backup_plan(
    prefix: &str,
    nodes: &[String],
    topology: &ClusterTopology,
) -> PlanOutput {
    let mut output = PlanOutput::default();
    for node in nodes {
        let resource = BackupResource::synthetic(
            &format!("{}-{}", prefix, node),
            prefix,
            node,
            "VNFNode",
        );
        let actions: Vec<Action> = topology
            .vms_on(node)
            .iter()
            .map(|vm| Action::BackupVm {
                vm_name: vm.clone(),
                size_mb: topology.vm_size(vm).unwrap_or(DEFAULT_VM_SIZE_MB),
            })
            .collect();
        output.actions.insert(resource.name().to_string(), actions);
        output.resources.push(resource);
    }
    output
}

/// Plan the recovery of a downed node: re-provision, then restore every VM
/// the topology placed there.
fn node_recovery_plan(node: &str, topology: &ClusterTopology) -> PlanOutput {
    let resource =
        BackupResource::synthetic(&format!("recover-{}", node), "recover", node, "VNFNode");
    let actions: Vec<Action> = std::iter::once(Action::ReprovisionNode {
        node_id: node.to_string(),
    })
    .chain(topology.vms_on(node).iter().map(|vm| Action::RestoreVm {
        vm_name: vm.clone(),
        size_mb: topology.vm_size(vm).unwrap_or(DEFAULT_VM_SIZE_MB),
    }))
    .collect();

    let mut output = PlanOutput::default();
    output.actions.insert(resource.name().to_string(), actions);
    output.resources.push(resource);
    output
}

/// Plan the system package restore that closes every cluster pass.
fn system_restore_plan() -> PlanOutput {
    let resource =
        BackupResource::synthetic(SYSTEM_RESTORE_NAME, "recover", "system:restore", "System");
    let actions: Vec<Action> = BACKUP_PACKAGES
        .iter()
        .map(|package| Action::RestorePackage {
            package: package.to_string(),
        })
        .collect();

    let mut output = PlanOutput::default();
    output.actions.insert(resource.name().to_string(), actions);
    output.resources.push(resource);
    output
}
