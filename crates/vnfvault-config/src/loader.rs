//! Policy document loading and normalization.

use std::fs;
use std::path::Path;

use thiserror::Error;

use vnfvault_core::types::{
    BackupPolicy, Component, RetentionPolicy, TargetRef,
};

use crate::{
    DbComponentSpec, FileComponentSpec, PolicyDocument, VimList, VmComponentSpec,
    VolumeComponentSpec,
};

/// Fallback targets when neither the caller nor the document names any.
pub const DEFAULT_TARGETS: [&str; 2] = ["vim-default-1", "vim-default-2"];

/// Consistency mode assumed for VM components that do not declare one.
const DEFAULT_CONSISTENCY_MODE: &str = "Crash";

/// Embedded sample policy, used when no document path is supplied.
pub const DEFAULT_POLICY_DOCUMENT: &str = r#"
apiVersion: telco.vnf.io/v1alpha1
kind: VNFBackupConfiguration
metadata:
  name: vnf-core-backup-policy
  namespace: telco-vnf-a
spec:
  targetVNFRef:
    name: vnf-core-instance-01
    kind: VirtualNetworkFunction
    apiGroup: telco.vnf.io
  storageRef: "swift-vnf-backend-storage"
  backupMode: Incremental
  schedule: "0 3 * * *"
  retentionPolicy:
    ttl: "720h0m0s"
    maxFulls: 7
    maxIncrementals: 30
  components:
    - type: VirtualMachine
      vmComponent:
        vmName: vnf-core-processor-vm-0
        consistencyMode: GuestAgent
        volumeSelection:
          - root-disk
          - configuration-disk
    - type: Database
      dbComponent:
        dbType: MariaDB
        appBindingRef: mariadb-vnf-appbinding
        addonName: mariadb-addon
        taskParams:
          databases:
            - core-telemetry
            - cdr-data
    - type: Volume
      volumeComponent:
        pvcName: general-storage-pvc
        useCSI: true
    - type: File
      fileComponent:
        podRef: vnf-config-manager-pod-0
        volumeMountName: 'config-volume'
        pathIncludes:
          - /etc/vnf/configs/
          - /var/log/startup-scripts/
        pathExcludes:
          - /etc/vnf/configs/tmp/logs
"#;

/// Policy loading errors. Everything here is fatal: a policy that cannot
/// be decoded never reaches planning.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy document: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse policy document: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("policy document missing required field '{0}'")]
    MissingField(&'static str),
    #[error("component {index} has no type tag")]
    UntypedComponent { index: usize },
    #[error("component {index} of type '{kind}' is missing its payload")]
    MissingPayload { index: usize, kind: String },
    #[error("invalid '{kind}' component at index {index}: {source}")]
    InvalidComponent {
        index: usize,
        kind: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Load and normalize a policy document from disk.
pub fn load_policy(path: &Path) -> Result<BackupPolicy, PolicyError> {
    let content = fs::read_to_string(path)?;
    parse_policy(&content)
}

/// Parse and normalize a policy document from raw text.
pub fn parse_policy(text: &str) -> Result<BackupPolicy, PolicyError> {
    let document: PolicyDocument = serde_yaml::from_str(text)?;
    normalize(document)
}

/// Pick the effective target list: explicit selection wins over the
/// document's embedded list, which wins over the fixed fallback pair.
pub fn resolve_targets(explicit: Option<&[String]>, policy: &BackupPolicy) -> Vec<String> {
    if let Some(targets) = explicit {
        if !targets.is_empty() {
            return targets.to_vec();
        }
    }
    if !policy.vims.is_empty() {
        return policy.vims.clone();
    }
    DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect()
}

fn normalize(document: PolicyDocument) -> Result<BackupPolicy, PolicyError> {
    let name = document
        .metadata
        .name
        .ok_or(PolicyError::MissingField("metadata.name"))?;
    let namespace = document
        .metadata
        .namespace
        .unwrap_or_else(|| "default".to_string());
    let spec = document.spec.ok_or(PolicyError::MissingField("spec"))?;

    let target_ref = spec
        .target_vnf_ref
        .ok_or(PolicyError::MissingField("spec.targetVNFRef"))?;
    let target_ref = TargetRef::new(
        target_ref
            .name
            .ok_or(PolicyError::MissingField("spec.targetVNFRef.name"))?,
        target_ref
            .kind
            .unwrap_or_else(|| "VirtualNetworkFunction".to_string()),
        target_ref
            .api_group
            .unwrap_or_else(|| "telco.vnf.io".to_string()),
    );
    let storage_ref = spec
        .storage_ref
        .ok_or(PolicyError::MissingField("spec.storageRef"))?;

    let mut components = Vec::new();
    for (index, raw) in spec.components.iter().enumerate() {
        if let Some(component) = decode_component(index, raw)? {
            components.push(component);
        }
    }

    Ok(BackupPolicy {
        name,
        namespace,
        target_ref,
        storage_ref,
        backup_mode: spec.backup_mode.unwrap_or_default(),
        schedule: spec.schedule,
        retention: spec.retention_policy.map(|r| RetentionPolicy {
            ttl: r.ttl,
            max_fulls: r.max_fulls,
            max_incrementals: r.max_incrementals,
        }),
        components,
        vims: spec.vims.map(VimList::into_targets).unwrap_or_default(),
    })
}

/// Decode one raw component value. Unknown type tags are skipped with a
/// warning; known types with a malformed or missing payload fail closed.
fn decode_component(
    index: usize,
    raw: &serde_yaml::Value,
) -> Result<Option<Component>, PolicyError> {
    let kind = raw
        .get("type")
        .and_then(serde_yaml::Value::as_str)
        .ok_or(PolicyError::UntypedComponent { index })?;

    let component = match kind {
        "VirtualMachine" => {
            let payload: VmComponentSpec = decode_payload(index, kind, raw, "vmComponent")?;
            Component::VirtualMachine {
                vm_name: payload.vm_name,
                consistency_mode: payload
                    .consistency_mode
                    .unwrap_or_else(|| DEFAULT_CONSISTENCY_MODE.to_string()),
                volume_selection: payload.volume_selection.into_iter().collect(),
            }
        }
        "Database" => {
            let payload: DbComponentSpec = decode_payload(index, kind, raw, "dbComponent")?;
            Component::Database {
                db_type: payload.db_type,
                app_binding_ref: payload.app_binding_ref,
                databases: payload.task_params.databases,
            }
        }
        "Volume" => {
            let payload: VolumeComponentSpec = decode_payload(index, kind, raw, "volumeComponent")?;
            Component::Volume {
                pvc_name: payload.pvc_name,
                use_csi: payload.use_csi,
            }
        }
        "File" => {
            let payload: FileComponentSpec = decode_payload(index, kind, raw, "fileComponent")?;
            Component::File {
                pod_ref: payload.pod_ref,
                path_includes: payload.path_includes,
                path_excludes: payload.path_excludes.into_iter().collect(),
            }
        }
        other => {
            tracing::warn!(index, component_type = %other, "skipping unknown component type");
            return Ok(None);
        }
    };

    Ok(Some(component))
}

fn decode_payload<T: serde::de::DeserializeOwned>(
    index: usize,
    kind: &str,
    raw: &serde_yaml::Value,
    payload_key: &str,
) -> Result<T, PolicyError> {
    let payload = raw.get(payload_key).ok_or_else(|| PolicyError::MissingPayload {
        index,
        kind: kind.to_string(),
    })?;
    serde_yaml::from_value(payload.clone()).map_err(|source| PolicyError::InvalidComponent {
        index,
        kind: kind.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnfvault_core::types::BackupMode;

    #[test]
    fn test_embedded_default_document_normalizes() {
        let policy = parse_policy(DEFAULT_POLICY_DOCUMENT).unwrap();

        assert_eq!(policy.name, "vnf-core-backup-policy");
        assert_eq!(policy.namespace, "telco-vnf-a");
        assert_eq!(policy.target_ref.name, "vnf-core-instance-01");
        assert_eq!(policy.storage_ref, "swift-vnf-backend-storage");
        assert_eq!(policy.backup_mode, BackupMode::Incremental);
        assert_eq!(policy.schedule.as_deref(), Some("0 3 * * *"));
        assert_eq!(policy.retention.as_ref().unwrap().max_fulls, 7);
        assert_eq!(policy.components.len(), 4);
        assert!(policy.vims.is_empty());

        match &policy.components[1] {
            Component::Database { databases, .. } => {
                assert_eq!(databases, &["core-telemetry", "cdr-data"]);
            }
            other => panic!("expected database component, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_component_type_is_skipped() {
        let text = r#"
metadata:
  name: policy-a
spec:
  targetVNFRef:
    name: vnf-01
  storageRef: store-a
  components:
    - type: QuantumSnapshot
      quantumComponent:
        qubits: 512
    - type: Volume
      volumeComponent:
        pvcName: data-pvc
"#;
        let policy = parse_policy(text).unwrap();
        assert_eq!(policy.components.len(), 1);
        assert!(matches!(policy.components[0], Component::Volume { .. }));
    }

    #[test]
    fn test_missing_required_component_field_fails_closed() {
        let text = r#"
metadata:
  name: policy-a
spec:
  targetVNFRef:
    name: vnf-01
  storageRef: store-a
  components:
    - type: VirtualMachine
      vmComponent:
        consistencyMode: GuestAgent
"#;
        let result = parse_policy(text);
        assert!(matches!(
            result,
            Err(PolicyError::InvalidComponent { index: 0, .. })
        ));
    }

    #[test]
    fn test_component_without_payload_fails_closed() {
        let text = r#"
metadata:
  name: policy-a
spec:
  targetVNFRef:
    name: vnf-01
  storageRef: store-a
  components:
    - type: Database
"#;
        let result = parse_policy(text);
        assert!(matches!(result, Err(PolicyError::MissingPayload { .. })));
    }

    #[test]
    fn test_missing_storage_ref_is_fatal() {
        let text = r#"
metadata:
  name: policy-a
spec:
  targetVNFRef:
    name: vnf-01
"#;
        let result = parse_policy(text);
        assert!(matches!(
            result,
            Err(PolicyError::MissingField("spec.storageRef"))
        ));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let result = parse_policy("metadata: [unclosed");
        assert!(matches!(result, Err(PolicyError::Parse(_))));
    }

    #[test]
    fn test_vims_accepts_csv_and_sequence_forms() {
        let csv = r#"
metadata:
  name: policy-a
spec:
  targetVNFRef:
    name: vnf-01
  storageRef: store-a
  vims: "vim-a, vim-b"
"#;
        let policy = parse_policy(csv).unwrap();
        assert_eq!(policy.vims, vec!["vim-a", "vim-b"]);

        let list = r#"
metadata:
  name: policy-a
spec:
  targetVNFRef:
    name: vnf-01
  storageRef: store-a
  vims:
    - vim-a
    - vim-b
"#;
        let policy = parse_policy(list).unwrap();
        assert_eq!(policy.vims, vec!["vim-a", "vim-b"]);
    }

    #[test]
    fn test_resolve_targets_precedence() {
        let mut policy = parse_policy(DEFAULT_POLICY_DOCUMENT).unwrap();

        // Nothing anywhere: fixed fallback pair.
        assert_eq!(
            resolve_targets(None, &policy),
            vec!["vim-default-1", "vim-default-2"]
        );

        // Document list beats the fallback.
        policy.vims = vec!["vim-doc".to_string()];
        assert_eq!(resolve_targets(None, &policy), vec!["vim-doc"]);

        // Explicit selection beats the document.
        let explicit = vec!["vim-x".to_string(), "vim-y".to_string()];
        assert_eq!(
            resolve_targets(Some(&explicit), &policy),
            vec!["vim-x", "vim-y"]
        );
    }
}
