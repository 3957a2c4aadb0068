//! # vnfvault config
//!
//! Loading and normalization of declarative `VNFBackupConfiguration`
//! documents. The wire schema below mirrors the document shape; the loader
//! turns it into the normalized [`vnfvault_core::BackupPolicy`] record,
//! failing closed on missing required fields and skipping unknown component
//! types with a warning.

mod loader;

pub use loader::{
    load_policy, parse_policy, resolve_targets, PolicyError, DEFAULT_POLICY_DOCUMENT,
    DEFAULT_TARGETS,
};

use serde::Deserialize;

/// Top-level document shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: PolicyMetadata,
    #[serde(default)]
    pub spec: Option<PolicySpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    #[serde(default, rename = "targetVNFRef")]
    pub target_vnf_ref: Option<TargetVnfRef>,
    #[serde(default)]
    pub storage_ref: Option<String>,
    #[serde(default)]
    pub backup_mode: Option<vnfvault_core::types::BackupMode>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub retention_policy: Option<RetentionSpec>,
    /// Target list embedded in the document, either a comma-separated
    /// string or a sequence.
    #[serde(default)]
    pub vims: Option<VimList>,
    #[serde(default)]
    pub components: Vec<serde_yaml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetVnfRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub api_group: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionSpec {
    pub ttl: String,
    #[serde(default)]
    pub max_fulls: u32,
    #[serde(default)]
    pub max_incrementals: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VimList {
    Csv(String),
    List(Vec<String>),
}

impl VimList {
    /// Flatten either form into a clean ordered list.
    pub fn into_targets(self) -> Vec<String> {
        match self {
            VimList::Csv(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            VimList::List(list) => list,
        }
    }
}

/// `vmComponent` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmComponentSpec {
    pub vm_name: String,
    #[serde(default)]
    pub consistency_mode: Option<String>,
    #[serde(default)]
    pub volume_selection: Vec<String>,
}

/// `dbComponent` payload. `taskParams.databases` is required; a database
/// component with nothing to dump is a schema error, not an empty plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbComponentSpec {
    pub db_type: String,
    pub app_binding_ref: String,
    pub task_params: TaskParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskParams {
    pub databases: Vec<String>,
}

/// `volumeComponent` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeComponentSpec {
    pub pvc_name: String,
    #[serde(default, rename = "useCSI")]
    pub use_csi: bool,
}

/// `fileComponent` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileComponentSpec {
    pub pod_ref: String,
    #[serde(default)]
    pub path_includes: Vec<String>,
    #[serde(default)]
    pub path_excludes: Vec<String>,
}
