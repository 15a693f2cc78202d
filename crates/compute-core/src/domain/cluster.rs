//! Cluster records mirrored from the remote clusters API.
//!
//! These are passive wire shapes. The only behavior here is small derived
//! queries; lifecycle decisions live in [`super::state`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{ClusterId, IdempotencyToken, InstancePoolId, PolicyId};
use super::state::ClusterState;

/// Autoscaling bounds for a cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScale {
    #[serde(default)]
    pub min_workers: i32,
    #[serde(default)]
    pub max_workers: i32,
}

/// Instance purchasing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Spot,
    OnDemand,
    SpotWithFallback,
    SpotAzure,
    OnDemandAzure,
    SpotWithFallbackAzure,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsAttributes {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub first_on_demand: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_profile_arn: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub spot_bid_price_percent: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebs_volume_type: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ebs_volume_count: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ebs_volume_size: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureAttributes {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub first_on_demand: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub spot_bid_max_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcpAttributes {
    #[serde(default)]
    pub use_preemptible_executors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_service_account: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerBasicAuth {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<DockerBasicAuth>,
}

/// A library installed on the cluster running a task. Exactly one source is
/// expected per entry; the remote API enforces that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pypi: Option<PackageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maven: Option<MavenRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cran: Option<PackageRef>,
}

/// PyPI or CRAN package reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MavenRef {
    pub coordinates: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,
}

/// Create/edit payload for a cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<ClusterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    pub spark_version: String,

    /// Fixed size. Ignored by the remote side when `autoscale` is set.
    #[serde(default)]
    pub num_workers: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<AutoScale>,
    #[serde(default)]
    pub enable_elastic_disk: bool,
    #[serde(default)]
    pub enable_local_disk_encryption: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_node_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_pool_id: Option<InstancePoolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_instance_pool_id: Option<InstancePoolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<PolicyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_attributes: Option<AwsAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_attributes: Option<AzureAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_attributes: Option<GcpAttributes>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub autotermination_minutes: i32,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub spark_conf: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub spark_env_vars: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_public_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<DockerImage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_token: Option<IdempotencyToken>,
}

impl ClusterSpec {
    pub fn new(spark_version: impl Into<String>) -> Self {
        Self {
            spark_version: spark_version.into(),
            ..Self::default()
        }
    }

    pub fn with_node_type(mut self, node_type_id: impl Into<String>) -> Self {
        self.node_type_id = Some(node_type_id.into());
        self
    }

    pub fn with_idempotency_token(mut self, token: IdempotencyToken) -> Self {
        self.idempotency_token = Some(token);
        self
    }
}

/// Termination code and its parameters, as reported by the remote side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationReason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// GET response for a single cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub cluster_id: ClusterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub spark_version: String,
    #[serde(default)]
    pub num_workers: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<AutoScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_node_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_user_name: Option<String>,
    pub state: ClusterState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_message: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub start_time: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub terminate_time: i64,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub cluster_memory_mb: i64,
    #[serde(default)]
    pub cluster_cores: f32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,
}

impl ClusterInfo {
    pub fn new(cluster_id: ClusterId, state: ClusterState) -> Self {
        Self {
            cluster_id,
            cluster_name: None,
            spark_version: String::new(),
            num_workers: 0,
            autoscale: None,
            node_type_id: None,
            driver_node_type_id: None,
            creator_user_name: None,
            state,
            state_message: None,
            start_time: 0,
            terminate_time: 0,
            cluster_memory_mb: 0,
            cluster_cores: 0.0,
            default_tags: BTreeMap::new(),
            termination_reason: None,
        }
    }

    /// Usable for work: running, or running while changing size.
    pub fn is_running_or_resizing(&self) -> bool {
        matches!(self.state, ClusterState::Running | ClusterState::Resizing)
    }
}

/// Cluster size before/after a resize event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSize {
    #[serde(default)]
    pub num_workers: i32,
    #[serde(default)]
    pub autoscale: Option<AutoScale>,
}

/// Kinds of entries in a cluster's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterEventType {
    Creating,
    DidNotExpandDisk,
    ExpandedDisk,
    FailedToExpandDisk,
    InitScriptsStarting,
    InitScriptsFinished,
    Starting,
    Restarting,
    Terminating,
    Edited,
    Running,
    Resizing,
    UpsizeCompleted,
    NodesLost,
    DriverHealthy,
    DriverUnavailable,
    SparkException,
    DriverNotResponding,
    DbfsDown,
    MetastoreDown,
    NodeBlacklisted,
    Pinned,
    Unpinned,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub current_num_workers: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub target_num_workers: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_cluster_size: Option<ClusterSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_size: Option<ClusterSize>,
    #[serde(default, rename = "cause", skip_serializing_if = "Option::is_none")]
    pub resize_cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<TerminationReason>,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterEvent {
    pub cluster_id: ClusterId,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: ClusterEventType,
    #[serde(default)]
    pub details: EventDetails,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::running(ClusterState::Running, true)]
    #[case::resizing(ClusterState::Resizing, true)]
    #[case::pending(ClusterState::Pending, false)]
    #[case::restarting(ClusterState::Restarting, false)]
    #[case::terminated(ClusterState::Terminated, false)]
    fn running_or_resizing(#[case] state: ClusterState, #[case] expected: bool) {
        let info = ClusterInfo::new(ClusterId::new("c-1"), state);
        assert_eq!(info.is_running_or_resizing(), expected);
    }

    #[test]
    fn cluster_info_parses_minimal_response() {
        let json = r#"{
          "cluster_id": "0412-abc",
          "state": "TERMINATED",
          "state_message": "Inactive cluster terminated",
          "termination_reason": {"code": "INACTIVITY", "type": "SUCCESS",
                                 "parameters": {"inactivity_duration_min": "120"}}
        }"#;
        let info: ClusterInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.cluster_id.as_str(), "0412-abc");
        assert_eq!(info.state, ClusterState::Terminated);
        let reason = info.termination_reason.unwrap();
        assert_eq!(reason.kind.as_deref(), Some("SUCCESS"));
        assert_eq!(reason.parameters["inactivity_duration_min"], "120");
    }

    #[test]
    fn cluster_spec_omits_unset_fields() {
        let spec = ClusterSpec::new("13.3.x-scala2.12").with_node_type("m5.large");
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["spark_version"], "13.3.x-scala2.12");
        assert_eq!(v["node_type_id"], "m5.large");
        assert!(v.get("autoscale").is_none());
        assert!(v.get("custom_tags").is_none());
    }

    #[test]
    fn event_type_uses_wire_names() {
        let event: ClusterEvent = serde_json::from_str(
            r#"{"cluster_id": "c", "timestamp": 1, "type": "UPSIZE_COMPLETED",
                "details": {"current_num_workers": 4, "target_num_workers": 4}}"#,
        )
        .unwrap();
        assert_eq!(event.kind, ClusterEventType::UpsizeCompleted);
        assert_eq!(event.details.target_num_workers, 4);
    }
}
