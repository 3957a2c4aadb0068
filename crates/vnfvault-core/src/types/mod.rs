//! Core type definitions: policy, resource, and topology values.

mod policy;
mod resource;
mod topology;

pub use policy::{BackupMode, BackupPolicy, Component, RetentionPolicy, TargetRef};
pub use resource::{
    derived_resource_name, BackupResource, Condition, ConditionStatus, ResourceMeta, ResourceSpec,
    ResourceStatus, API_VERSION, BACKUP_COMPLETE_CONDITION, KIND, LABEL_ORIGIN_POLICY, LABEL_TARGET,
};
pub use topology::{switchover, ClusterTopology, Node, NodeRole, DEFAULT_VM_SIZE_MB};
