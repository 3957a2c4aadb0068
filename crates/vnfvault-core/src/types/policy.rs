//! Backup policy type definitions
//!
//! BackupPolicy is the normalized in-memory form of a declarative
//! VNFBackupConfiguration document. Component ordering is preserved and is
//! the execution order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Opaque reference to the backup target (the VNF instance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub name: String,
    pub kind: String,
    pub api_group: String,
}

impl TargetRef {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        api_group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            api_group: api_group.into(),
        }
    }
}

/// Backup mode declared by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackupMode {
    #[default]
    OneTime,
    Incremental,
}

/// Retention declaration. Informational only; nothing here is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    /// Time-to-live in the document's duration format, e.g. "720h0m0s".
    pub ttl: String,
    #[serde(default)]
    pub max_fulls: u32,
    #[serde(default)]
    pub max_incrementals: u32,
}

/// One backup-able unit within a policy.
///
/// Exactly one variant payload is populated per component. Unknown `type`
/// tags in the source document are dropped during normalization, so this
/// union is closed by the time planning sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Component {
    #[serde(rename_all = "camelCase")]
    VirtualMachine {
        vm_name: String,
        consistency_mode: String,
        volume_selection: BTreeSet<String>,
    },
    #[serde(rename_all = "camelCase")]
    Database {
        db_type: String,
        app_binding_ref: String,
        databases: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Volume { pvc_name: String, use_csi: bool },
    #[serde(rename_all = "camelCase")]
    File {
        pod_ref: String,
        path_includes: Vec<String>,
        path_excludes: BTreeSet<String>,
    },
}

impl Component {
    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Component::VirtualMachine { .. } => "VirtualMachine",
            Component::Database { .. } => "Database",
            Component::Volume { .. } => "Volume",
            Component::File { .. } => "File",
        }
    }
}

/// Normalized declarative backup policy record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPolicy {
    pub name: String,
    pub namespace: String,
    pub target_ref: TargetRef,
    pub storage_ref: String,
    pub backup_mode: BackupMode,
    /// Cron-like schedule string, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<RetentionPolicy>,
    /// Execution-ordered component list.
    #[serde(default)]
    pub components: Vec<Component>,
    /// Target identifiers embedded in the document, overridden by explicit
    /// target selection. May be empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vims: Vec<String>,
}

impl BackupPolicy {
    /// Create a minimal policy with defaults for everything optional.
    pub fn new(name: impl Into<String>, target_ref: TargetRef, storage_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: "default".to_string(),
            target_ref,
            storage_ref: storage_ref.into(),
            backup_mode: BackupMode::default(),
            schedule: None,
            retention: None,
            components: Vec::new(),
            vims: Vec::new(),
        }
    }

    /// Append a component, preserving declaration order.
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_serializes_in_tagged_camel_case_form() {
        let component = Component::Database {
            db_type: "MariaDB".to_string(),
            app_binding_ref: "mariadb-vnf-appbinding".to_string(),
            databases: vec!["core-telemetry".to_string(), "cdr-data".to_string()],
        };
        let yaml = serde_yaml::to_string(&component).unwrap();
        assert!(yaml.contains("type: Database"));
        assert!(yaml.contains("dbType: MariaDB"));
        assert!(yaml.contains("appBindingRef: mariadb-vnf-appbinding"));
    }

    #[test]
    fn test_component_round_trips_through_yaml() {
        let component = Component::File {
            pod_ref: "vnf-config-manager-pod-0".to_string(),
            path_includes: vec!["/etc/vnf/configs/".to_string()],
            path_excludes: BTreeSet::from(["/etc/vnf/configs/tmp/logs".to_string()]),
        };
        let yaml = serde_yaml::to_string(&component).unwrap();
        let back: Component = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, component);
    }

    #[test]
    fn test_backup_mode_defaults_to_one_time() {
        assert_eq!(BackupMode::default(), BackupMode::OneTime);
    }
}
