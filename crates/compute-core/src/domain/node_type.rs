//! Node type descriptors and the ranking used to pick a default.
//!
//! The remote listing returns node types in no useful order. `rank` gives a
//! deterministic total order where the "plainest" usable shape comes first:
//! not deprecated, no extra local disks, then smallest by memory, cores and
//! GPUs, with the instance type id as the final tie-break.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Local storage attached to the underlying cloud instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInstanceType {
    #[serde(default)]
    pub instance_type_id: String,
    #[serde(default)]
    pub local_disks: i32,
    #[serde(default)]
    pub local_disk_size_gb: i32,
    #[serde(default)]
    pub local_nvme_disks: i32,
    #[serde(default)]
    pub local_nvme_disk_size_gb: i32,
}

/// Quota information reported by the cloud provider for a node type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,
    #[serde(default)]
    pub available_core_quota: f32,
    #[serde(default)]
    pub total_core_quota: f32,
}

/// One entry of the node type listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    #[serde(default)]
    pub node_type_id: String,
    #[serde(default)]
    pub memory_mb: i32,
    #[serde(default)]
    pub num_cores: f32,
    #[serde(default)]
    pub num_gpus: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default)]
    pub instance_type_id: String,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub support_ebs_volumes: bool,
    #[serde(default)]
    pub is_io_cache_enabled: bool,
    #[serde(default)]
    pub support_port_forwarding: bool,
    #[serde(default)]
    pub support_cluster_tags: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub photon_worker_capable: bool,
    #[serde(default)]
    pub photon_driver_capable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_info: Option<NodeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_instance_type: Option<NodeInstanceType>,
}

impl NodeType {
    pub fn memory_gb(&self) -> i32 {
        self.memory_mb / 1024
    }

    /// `(local_disks, local_disk_size_gb)`, or `(0, 0)` without instance info.
    pub fn local_disk_key(&self) -> (i32, i32) {
        self.node_instance_type
            .as_ref()
            .map_or((0, 0), |it| (it.local_disks, it.local_disk_size_gb))
    }
}

/// Compare two node types; `Less` means `a` is the better default.
///
/// Keys, earlier ones dominate:
/// 1. non-deprecated first
/// 2. fewer local disks, then smaller local disks (no instance info counts
///    as no disks)
/// 3. less memory
/// 4. fewer cores
/// 5. fewer GPUs
/// 6. instance type id, ascending
///
/// Every key is total, so this is a total order and `sort_by` / `min_by`
/// give the same result for any input order.
pub fn rank(a: &NodeType, b: &NodeType) -> Ordering {
    a.is_deprecated
        .cmp(&b.is_deprecated)
        .then_with(|| a.local_disk_key().cmp(&b.local_disk_key()))
        .then_with(|| a.memory_mb.cmp(&b.memory_mb))
        .then_with(|| a.num_cores.total_cmp(&b.num_cores))
        .then_with(|| a.num_gpus.cmp(&b.num_gpus))
        .then_with(|| a.instance_type_id.cmp(&b.instance_type_id))
}

/// Constraints used when auto-selecting a node type from a listing.
///
/// Zero / `None` / `false` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTypeRequest {
    pub min_memory_gb: i32,
    pub min_cores: f32,
    pub min_gpus: i32,
    pub local_disk: bool,
    pub category: Option<String>,
    pub photon_worker_capable: bool,
    pub photon_driver_capable: bool,
    pub include_deprecated: bool,
}

impl NodeTypeRequest {
    pub fn matches(&self, nt: &NodeType) -> bool {
        if nt.is_hidden {
            return false;
        }
        if nt.is_deprecated && !self.include_deprecated {
            return false;
        }
        if nt.memory_gb() < self.min_memory_gb
            || nt.num_cores < self.min_cores
            || nt.num_gpus < self.min_gpus
        {
            return false;
        }
        if self.local_disk
            && !nt
                .node_instance_type
                .as_ref()
                .is_some_and(|it| it.local_disks > 0 || it.local_nvme_disks > 0)
        {
            return false;
        }
        if let Some(category) = &self.category
            && !nt.category.eq_ignore_ascii_case(category)
        {
            return false;
        }
        (!self.photon_worker_capable || nt.photon_worker_capable)
            && (!self.photon_driver_capable || nt.photon_driver_capable)
    }
}

/// Response of the list-node-types call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTypeList {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_types: Vec<NodeType>,
}

impl NodeTypeList {
    pub fn new(node_types: Vec<NodeType>) -> Self {
        Self { node_types }
    }

    /// Sort in place by [`rank`]. Does not filter or deduplicate.
    pub fn sort(&mut self) {
        self.node_types.sort_by(rank);
    }

    /// First entry matching `request` in ranked order.
    ///
    /// Ranks a borrowed view, so the listing itself keeps its order.
    pub fn best(&self, request: &NodeTypeRequest) -> Option<&NodeType> {
        self.node_types
            .iter()
            .filter(|nt| request.matches(nt))
            .min_by(|a, b| rank(a, b))
    }
}
