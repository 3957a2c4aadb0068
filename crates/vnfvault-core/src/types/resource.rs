//! Backup resource type definitions
//!
//! BackupResource is the per-target instantiation of a policy, shaped like
//! a namespaced custom resource (apiVersion/kind/metadata/spec/status).
//! Status is a strictly append-only condition history; the current status
//! is the last-appended condition of the tracked type.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::policy::{BackupMode, BackupPolicy, Component, TargetRef};

/// API group/version stamped on every generated resource.
pub const API_VERSION: &str = "telco.vnf.io/v1alpha1";
/// Resource kind stamped on every generated resource.
pub const KIND: &str = "VNFBackup";
/// The condition type the controller tracks for overall completion.
pub const BACKUP_COMPLETE_CONDITION: &str = "backup-complete";

/// Label keys carried in resource metadata.
pub const LABEL_ORIGIN_POLICY: &str = "originBackupPolicy";
pub const LABEL_TARGET: &str = "target";

/// Condition status values, in the upstream string convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// A timestamped status entry in a resource's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: ConditionStatus,
    pub last_update_time: DateTime<Utc>,
    pub reason: String,
    pub message: String,
}

impl Condition {
    /// Create a condition of the tracked backup-complete type, stamped now.
    pub fn backup_complete(
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            condition_type: BACKUP_COMPLETE_CONDITION.to_string(),
            status,
            last_update_time: Utc::now(),
            reason: reason.into(),
            message: message.into(),
        }
    }
}

/// Resource metadata in the usual name/namespace/labels shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Copy-by-value snapshot of the policy declarations this resource executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    pub policy_ref: String,
    #[serde(rename = "targetVNFRef")]
    pub target_vnf_ref: TargetRef,
    pub storage_ref: String,
    pub backup_mode: BackupMode,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// One backup resource per (policy × target) pair. Created once per
/// planning pass; status is mutated only by the controller loop and the
/// resource is never deleted within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResource {
    pub api_version: String,
    pub kind: String,
    pub metadata: ResourceMeta,
    pub spec: ResourceSpec,
    #[serde(default)]
    pub status: ResourceStatus,
}

/// Derive the deterministic resource name for a (target, targetRef) pair:
/// `vnfbackup-<target>-<targetRef.name>`, lowercased, `_` folded to `-`.
pub fn derived_resource_name(target: &str, target_ref_name: &str) -> String {
    format!("vnfbackup-{}-{}", target, target_ref_name)
        .to_lowercase()
        .replace('_', "-")
}

impl BackupResource {
    /// Synthesize the resource for one target of a policy.
    pub fn from_policy(policy: &BackupPolicy, target: &str) -> Self {
        let name = derived_resource_name(target, &policy.target_ref.name);
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_ORIGIN_POLICY.to_string(), policy.name.clone());
        labels.insert(LABEL_TARGET.to_string(), target.to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ResourceMeta {
                name,
                namespace: policy.namespace.clone(),
                labels,
            },
            spec: ResourceSpec {
                policy_ref: policy.name.clone(),
                target_vnf_ref: policy.target_ref.clone(),
                storage_ref: policy.storage_ref.clone(),
                backup_mode: policy.backup_mode,
                components: policy.components.clone(),
            },
            status: ResourceStatus::default(),
        }
    }

    /// Synthesize a resource that is not derived from a policy document
    /// (node backups and the system-restore pass of the cluster workflow).
    pub fn synthetic(name: &str, origin: &str, target: &str, target_kind: &str) -> Self {
        let name = name.to_lowercase().replace('_', "-");
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_ORIGIN_POLICY.to_string(), origin.to_string());
        labels.insert(LABEL_TARGET.to_string(), target.to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ResourceMeta {
                name,
                namespace: "default".to_string(),
                labels,
            },
            spec: ResourceSpec {
                policy_ref: origin.to_string(),
                target_vnf_ref: TargetRef::new(target, target_kind, "telco.vnf.io"),
                storage_ref: crate::action::STORAGE_LOCATION_PREFIX.to_string(),
                backup_mode: BackupMode::OneTime,
                components: Vec::new(),
            },
            status: ResourceStatus::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Target label this resource was planned for.
    pub fn target(&self) -> &str {
        self.metadata
            .labels
            .get(LABEL_TARGET)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Append a condition. History is append-only and time-ordered.
    pub fn push_condition(&mut self, condition: Condition) {
        self.status.conditions.push(condition);
    }

    /// Most recent condition of the tracked type, if any.
    pub fn current_condition(&self) -> Option<&Condition> {
        self.status
            .conditions
            .iter()
            .rev()
            .find(|c| c.condition_type == BACKUP_COMPLETE_CONDITION)
    }

    /// Render the resource in its structured wire form.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_policy() -> BackupPolicy {
        BackupPolicy::new(
            "vnf-core-backup-policy",
            TargetRef::new("vnf-core-instance-01", "VirtualNetworkFunction", "telco.vnf.io"),
            "swift-vnf-backend-storage",
        )
        .with_namespace("telco-vnf-a")
    }

    #[test]
    fn test_derived_name_is_lowercased_and_kebabed() {
        assert_eq!(
            derived_resource_name("VIM_A", "VNF_Core_01"),
            "vnfbackup-vim-a-vnf-core-01"
        );
    }

    #[test]
    fn test_from_policy_copies_metadata_and_spec() {
        let resource = BackupResource::from_policy(&sample_policy(), "vim-a");
        assert_eq!(resource.name(), "vnfbackup-vim-a-vnf-core-instance-01");
        assert_eq!(resource.metadata.namespace, "telco-vnf-a");
        assert_eq!(resource.target(), "vim-a");
        assert_eq!(
            resource.metadata.labels.get(LABEL_ORIGIN_POLICY),
            Some(&"vnf-core-backup-policy".to_string())
        );
        assert_eq!(resource.spec.policy_ref, "vnf-core-backup-policy");
        assert!(resource.status.conditions.is_empty());
    }

    #[test]
    fn test_current_condition_is_last_of_tracked_type() {
        let mut resource = BackupResource::from_policy(&sample_policy(), "vim-a");
        resource.push_condition(Condition::backup_complete(
            ConditionStatus::Unknown,
            "Created",
            "resource created",
        ));
        resource.push_condition(Condition::backup_complete(
            ConditionStatus::True,
            "Completed",
            "all actions completed",
        ));

        let current = resource.current_condition().unwrap();
        assert_eq!(current.status, ConditionStatus::True);
        assert_eq!(current.reason, "Completed");
        assert_eq!(resource.status.conditions.len(), 2);
    }

    #[test]
    fn test_yaml_rendering_has_custom_resource_shape() {
        let resource = BackupResource::from_policy(&sample_policy(), "vim-a");
        let yaml = resource.to_yaml().unwrap();
        assert!(yaml.contains("apiVersion: telco.vnf.io/v1alpha1"));
        assert!(yaml.contains("kind: VNFBackup"));
        assert!(yaml.contains("targetVNFRef:"));
        assert!(yaml.contains("status:"));
    }
}
