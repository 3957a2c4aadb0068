//! Primitive simulated actions.
//!
//! An Action is one unit of simulated work emitted by the planner and
//! executed (logged) by the controller. Actions carry everything needed to
//! describe themselves; they have no behavior of their own.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Simulated storage backend every backup claims to land in.
pub const STORAGE_LOCATION_PREFIX: &str = "external-storage://backups/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    BackupVm { vm_name: String, size_mb: u64 },
    #[serde(rename_all = "camelCase")]
    BackupDatabase { db_name: String },
    #[serde(rename_all = "camelCase")]
    BackupVolume { pvc_name: String, use_csi: bool },
    #[serde(rename_all = "camelCase")]
    BackupFiles {
        pod_ref: String,
        path_includes: Vec<String>,
        path_excludes: BTreeSet<String>,
    },
    #[serde(rename_all = "camelCase")]
    RestoreVm { vm_name: String, size_mb: u64 },
    #[serde(rename_all = "camelCase")]
    ReprovisionNode { node_id: String },
    #[serde(rename_all = "camelCase")]
    RestorePackage { package: String },
}

impl Action {
    /// Stable action label for logs and progress events.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::BackupVm { .. } => "backup_vm",
            Action::BackupDatabase { .. } => "backup_database",
            Action::BackupVolume { .. } => "backup_volume",
            Action::BackupFiles { .. } => "backup_files",
            Action::RestoreVm { .. } => "restore_vm",
            Action::ReprovisionNode { .. } => "reprovision_node",
            Action::RestorePackage { .. } => "restore_package",
        }
    }

    /// Human-readable one-line description.
    pub fn describe(&self) -> String {
        match self {
            Action::BackupVm { vm_name, size_mb } => format!(
                "backup of VM {} | PV size: {}MB | target: {}{}.tgz",
                vm_name, size_mb, STORAGE_LOCATION_PREFIX, vm_name
            ),
            Action::BackupDatabase { db_name } => format!("database backup: {}", db_name),
            Action::BackupVolume { pvc_name, use_csi } => {
                if *use_csi {
                    format!("volume backup: {} using CSI snapshot", pvc_name)
                } else {
                    format!("volume backup: {}", pvc_name)
                }
            }
            Action::BackupFiles {
                pod_ref,
                path_includes,
                ..
            } => format!(
                "file backup from pod {} ({} path(s))",
                pod_ref,
                path_includes.len()
            ),
            Action::RestoreVm { vm_name, .. } => format!(
                "restore of VM {} from {}{}.tgz",
                vm_name, STORAGE_LOCATION_PREFIX, vm_name
            ),
            Action::ReprovisionNode { node_id } => {
                format!("platform re-installation on {}", node_id)
            }
            Action::RestorePackage { package } => format!("package restore: {}", package),
        }
    }

    /// Deterministic simulated work size. Reporters may use this to pace
    /// output; nothing in the core depends on it for correctness.
    pub fn work_units(&self) -> u64 {
        match self {
            Action::BackupVm { size_mb, .. } => size_mb / 50 + 2,
            Action::RestoreVm { size_mb, .. } => size_mb / 50 + 3,
            Action::BackupDatabase { .. } | Action::BackupVolume { .. } => 2,
            Action::BackupFiles { path_includes, .. } => path_includes.len().max(1) as u64,
            Action::ReprovisionNode { .. } => 4,
            Action::RestorePackage { .. } => 2,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}
