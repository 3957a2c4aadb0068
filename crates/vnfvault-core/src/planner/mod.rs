//! Action planner
//!
//! The planner is responsible for:
//! - Synthesizing one BackupResource per target
//! - Expanding declared components into ordered primitive actions
//!
//! The planner does NOT handle:
//! - Status transitions (controller territory)
//! - Fault decisions or pacing
//!
//! Planning is pure: the same policy, target list, and topology always
//! produce the same resources and action sequences.

use std::collections::HashMap;

use thiserror::Error;

use crate::action::Action;
use crate::types::{BackupPolicy, BackupResource, ClusterTopology, Component};

/// Size assumed for a VM component when no topology can resolve it.
pub const DEFAULT_COMPONENT_VM_SIZE_MB: u64 = 500;

/// Planner errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Two targets derived the same resource name. The reference behavior
    /// silently kept the last one; here the collision is rejected.
    #[error("duplicate resource name '{0}' derived from target list")]
    DuplicateResource(String),
}

/// The planner's output: resources in target order plus the action list
/// keyed by resource name.
#[derive(Debug, Clone, Default)]
pub struct PlanOutput {
    pub resources: Vec<BackupResource>,
    pub actions: HashMap<String, Vec<Action>>,
}

impl PlanOutput {
    pub fn actions_for(&self, resource_name: &str) -> &[Action] {
        self.actions
            .get(resource_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Expand a policy across an ordered target list.
///
/// Target order is preserved. An empty target list is a valid degenerate
/// plan, not an error.
pub fn plan(
    policy: &BackupPolicy,
    targets: &[String],
    topology: Option<&ClusterTopology>,
) -> Result<PlanOutput, PlanError> {
    let mut output = PlanOutput::default();

    for target in targets {
        let resource = BackupResource::from_policy(policy, target);
        let name = resource.name().to_string();
        if output.actions.contains_key(&name) {
            return Err(PlanError::DuplicateResource(name));
        }

        let mut actions = Vec::new();
        for component in &policy.components {
            expand_component(component, topology, &mut actions);
        }

        tracing::debug!(
            resource = %name,
            target = %target,
            action_count = actions.len(),
            "planned backup resource"
        );
        output.actions.insert(name, actions);
        output.resources.push(resource);
    }

    Ok(output)
}

fn expand_component(
    component: &Component,
    topology: Option<&ClusterTopology>,
    actions: &mut Vec<Action>,
) {
    match component {
        Component::VirtualMachine { vm_name, .. } => {
            let size_mb = topology
                .and_then(|t| t.vm_size(vm_name))
                .unwrap_or(DEFAULT_COMPONENT_VM_SIZE_MB);
            actions.push(Action::BackupVm {
                vm_name: vm_name.clone(),
                size_mb,
            });
        }
        Component::Database { databases, .. } => {
            for db_name in databases {
                actions.push(Action::BackupDatabase {
                    db_name: db_name.clone(),
                });
            }
        }
        Component::Volume { pvc_name, use_csi } => {
            actions.push(Action::BackupVolume {
                pvc_name: pvc_name.clone(),
                use_csi: *use_csi,
            });
        }
        Component::File {
            pod_ref,
            path_includes,
            path_excludes,
        } => {
            actions.push(Action::BackupFiles {
                pod_ref: pod_ref.clone(),
                path_includes: path_includes.clone(),
                path_excludes: path_excludes.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Node, NodeRole, TargetRef};
    use std::collections::BTreeSet;

    fn vm(name: &str) -> Component {
        Component::VirtualMachine {
            vm_name: name.to_string(),
            consistency_mode: "GuestAgent".to_string(),
            volume_selection: BTreeSet::new(),
        }
    }

    fn sample_policy() -> BackupPolicy {
        BackupPolicy::new(
            "vnf-core-backup-policy",
            TargetRef::new("vnf-core-instance-01", "VirtualNetworkFunction", "telco.vnf.io"),
            "swift-vnf-backend-storage",
        )
        .with_component(vm("vnf-a"))
        .with_component(Component::Database {
            db_type: "MariaDB".to_string(),
            app_binding_ref: "mariadb-vnf-appbinding".to_string(),
            databases: vec!["core-telemetry".to_string(), "cdr-data".to_string()],
        })
    }

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_plan_expands_components_in_declaration_order() {
        let output = plan(&sample_policy(), &targets(&["vim-a"]), None).unwrap();

        assert_eq!(output.resources.len(), 1);
        let name = output.resources[0].name();
        assert_eq!(name, "vnfbackup-vim-a-vnf-core-instance-01");
        assert_eq!(
            output.actions_for(name),
            &[
                Action::BackupVm {
                    vm_name: "vnf-a".to_string(),
                    size_mb: DEFAULT_COMPONENT_VM_SIZE_MB,
                },
                Action::BackupDatabase {
                    db_name: "core-telemetry".to_string(),
                },
                Action::BackupDatabase {
                    db_name: "cdr-data".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let policy = sample_policy();
        let list = targets(&["vim-a", "vim-b"]);
        let first = plan(&policy, &list, None).unwrap();
        let second = plan(&policy, &list, None).unwrap();

        let first_names: Vec<_> = first.resources.iter().map(|r| r.name().to_string()).collect();
        let second_names: Vec<_> = second.resources.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(first_names, second_names);
        for name in &first_names {
            assert_eq!(first.actions_for(name), second.actions_for(name));
        }
    }

    #[test]
    fn test_resource_count_matches_unique_targets() {
        let policy = sample_policy();
        let output = plan(&policy, &targets(&["vim-a", "vim-b", "vim-c"]), None).unwrap();
        assert_eq!(output.resources.len(), 3);

        let empty_components = BackupPolicy::new(
            "p",
            TargetRef::new("t", "VirtualNetworkFunction", "telco.vnf.io"),
            "s",
        );
        let output = plan(&empty_components, &targets(&["vim-a", "vim-b"]), None).unwrap();
        assert_eq!(output.resources.len(), 2);
        assert!(output.actions_for(output.resources[0].name()).is_empty());
    }

    #[test]
    fn test_duplicate_target_is_rejected() {
        let policy = sample_policy();
        let result = plan(&policy, &targets(&["vim-a", "vim-a"]), None);
        assert!(matches!(result, Err(PlanError::DuplicateResource(_))));
    }

    #[test]
    fn test_empty_targets_produce_empty_plan() {
        let output = plan(&sample_policy(), &[], None).unwrap();
        assert!(output.is_empty());
        assert!(output.actions.is_empty());
    }

    #[test]
    fn test_file_component_emits_single_action() {
        let policy = BackupPolicy::new(
            "p",
            TargetRef::new("t", "VirtualNetworkFunction", "telco.vnf.io"),
            "s",
        )
        .with_component(Component::File {
            pod_ref: "vnf-config-manager-pod-0".to_string(),
            path_includes: vec![
                "/etc/vnf/configs/".to_string(),
                "/var/log/startup-scripts/".to_string(),
                "/opt/vnf/state/".to_string(),
            ],
            path_excludes: BTreeSet::from(["/etc/vnf/configs/tmp/logs".to_string()]),
        });

        let output = plan(&policy, &targets(&["vim-a"]), None).unwrap();
        assert_eq!(output.actions_for(output.resources[0].name()).len(), 1);
    }

    #[test]
    fn test_vm_size_resolves_from_topology_when_available() {
        let topology = ClusterTopology::new(vec![Node {
            id: "vnf-node-01".to_string(),
            role: NodeRole::Active,
        }])
        .with_vms("vnf-node-01", vec!["vnf-a".to_string()])
        .with_vm_size("vnf-a", 1200);

        let policy = BackupPolicy::new(
            "p",
            TargetRef::new("t", "VirtualNetworkFunction", "telco.vnf.io"),
            "s",
        )
        .with_component(vm("vnf-a"))
        .with_component(vm("vnf-unknown"));

        let output = plan(&policy, &targets(&["vim-a"]), Some(&topology)).unwrap();
        assert_eq!(
            output.actions_for(output.resources[0].name()),
            &[
                Action::BackupVm {
                    vm_name: "vnf-a".to_string(),
                    size_mb: 1200,
                },
                Action::BackupVm {
                    vm_name: "vnf-unknown".to_string(),
                    size_mb: DEFAULT_COMPONENT_VM_SIZE_MB,
                },
            ]
        );
    }
}
