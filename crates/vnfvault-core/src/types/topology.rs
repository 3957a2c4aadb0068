//! Cluster topology for the node-oriented backup variant.
//!
//! The topology is an explicit value passed into and returned from the
//! switchover operation; there is no process-wide node state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Size substituted for a VM that the topology hosts but has no size entry
/// for.
pub const DEFAULT_VM_SIZE_MB: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeRole {
    Active,
    Standby,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Active => f.write_str("ACTIVE"),
            NodeRole::Standby => f.write_str("STANDBY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub role: NodeRole,
}

/// Ordered node set plus VM placement and sizing data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterTopology {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub node_to_vms: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub vm_size_mb: BTreeMap<String, u64>,
}

impl ClusterTopology {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            node_to_vms: BTreeMap::new(),
            vm_size_mb: BTreeMap::new(),
        }
    }

    pub fn with_vms(mut self, node_id: impl Into<String>, vms: Vec<String>) -> Self {
        self.node_to_vms.insert(node_id.into(), vms);
        self
    }

    pub fn with_vm_size(mut self, vm_id: impl Into<String>, size_mb: u64) -> Self {
        self.vm_size_mb.insert(vm_id.into(), size_mb);
        self
    }

    /// Node ids with the given role, in declaration order.
    pub fn nodes_in_role(&self, role: NodeRole) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.role == role)
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn active_nodes(&self) -> Vec<String> {
        self.nodes_in_role(NodeRole::Active)
    }

    pub fn standby_nodes(&self) -> Vec<String> {
        self.nodes_in_role(NodeRole::Standby)
    }

    /// VMs hosted on a node, in placement order. Unknown nodes host nothing.
    pub fn vms_on(&self, node_id: &str) -> &[String] {
        self.node_to_vms
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve a VM's size. A VM the topology knows about (placed on some
    /// node) without a size entry gets [`DEFAULT_VM_SIZE_MB`]; a VM the
    /// topology has never heard of resolves to nothing.
    pub fn vm_size(&self, vm_id: &str) -> Option<u64> {
        if let Some(size) = self.vm_size_mb.get(vm_id) {
            return Some(*size);
        }
        let hosted = self.node_to_vms.values().any(|vms| vms.iter().any(|v| v == vm_id));
        hosted.then_some(DEFAULT_VM_SIZE_MB)
    }
}

/// Swap the active and standby role assignment across the node set.
///
/// The swap is atomic and total: every role flips, nothing else changes,
/// and applying it twice returns the original partition exactly.
pub fn switchover(topology: ClusterTopology) -> ClusterTopology {
    let nodes = topology
        .nodes
        .into_iter()
        .map(|node| Node {
            role: match node.role {
                NodeRole::Active => NodeRole::Standby,
                NodeRole::Standby => NodeRole::Active,
            },
            ..node
        })
        .collect();
    ClusterTopology { nodes, ..topology }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_topology() -> ClusterTopology {
        ClusterTopology::new(vec![
            Node {
                id: "vnf-node-01".to_string(),
                role: NodeRole::Active,
            },
            Node {
                id: "vnf-node-02".to_string(),
                role: NodeRole::Standby,
            },
            Node {
                id: "vnf-node-03".to_string(),
                role: NodeRole::Standby,
            },
        ])
        .with_vms("vnf-node-01", vec!["vnf-a".to_string(), "vnf-b".to_string()])
        .with_vm_size("vnf-a", 1200)
    }

    #[test]
    fn test_partition_preserves_declaration_order() {
        let topology = sample_topology();
        assert_eq!(topology.active_nodes(), vec!["vnf-node-01"]);
        assert_eq!(topology.standby_nodes(), vec!["vnf-node-02", "vnf-node-03"]);
    }

    #[test]
    fn test_vm_size_falls_back_for_hosted_vms_only() {
        let topology = sample_topology();
        assert_eq!(topology.vm_size("vnf-a"), Some(1200));
        assert_eq!(topology.vm_size("vnf-b"), Some(DEFAULT_VM_SIZE_MB));
        assert_eq!(topology.vm_size("vnf-z"), None);
    }

    #[test]
    fn test_switchover_is_an_involution() {
        let original = sample_topology();
        let swapped = switchover(original.clone());
        assert_eq!(swapped.active_nodes(), vec!["vnf-node-02", "vnf-node-03"]);
        assert_eq!(swapped.standby_nodes(), vec!["vnf-node-01"]);

        let restored = switchover(swapped);
        assert_eq!(restored, original);
    }
}
