//! ScriptedClusterStates - 決められた観測列を再生するクラスタ状態ソース
//!
//! # 動作
//! - クラスタごとに `ClusterInfo` のキューを持つ
//! - fetch のたびに先頭を取り出す
//! - 最後の要素は取り出さない（スクリプトが尽きたら最終状態のまま）

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::cluster::ClusterInfo;
use crate::domain::ids::ClusterId;
use crate::domain::state::ClusterState;
use crate::ports::{ClusterStateSource, PortError};

#[derive(Default)]
struct Script {
    remaining: VecDeque<ClusterInfo>,
    fetches: usize,
}

#[derive(Default)]
pub struct ScriptedClusterStates {
    scripts: Mutex<HashMap<ClusterId, Script>>,
}

impl ScriptedClusterStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a cluster by state only.
    ///
    /// An empty `states` leaves the cluster unknown (fetches return
    /// `NotFound`).
    pub fn with_states(
        self,
        cluster_id: ClusterId,
        states: impl IntoIterator<Item = ClusterState>,
    ) -> Self {
        let infos: Vec<ClusterInfo> = states
            .into_iter()
            .map(|state| ClusterInfo::new(cluster_id.clone(), state))
            .collect();
        self.with_infos(cluster_id, infos)
    }

    /// Script a cluster with full observations.
    pub fn with_infos(
        self,
        cluster_id: ClusterId,
        infos: impl IntoIterator<Item = ClusterInfo>,
    ) -> Self {
        let remaining: VecDeque<ClusterInfo> = infos.into_iter().collect();
        if !remaining.is_empty() {
            self.scripts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(
                    cluster_id,
                    Script {
                        remaining,
                        fetches: 0,
                    },
                );
        }
        self
    }

    /// How many times `cluster_id` has been fetched.
    pub fn fetches(&self, cluster_id: &ClusterId) -> usize {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(cluster_id)
            .map_or(0, |s| s.fetches)
    }
}

#[async_trait]
impl ClusterStateSource for ScriptedClusterStates {
    async fn cluster_info(&self, cluster_id: &ClusterId) -> Result<ClusterInfo, PortError> {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let script = scripts.get_mut(cluster_id).ok_or(PortError::NotFound)?;
        script.fetches += 1;

        let info = if script.remaining.len() > 1 {
            script.remaining.pop_front()
        } else {
            script.remaining.front().cloned()
        };
        info.ok_or(PortError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ClusterState::*;

    #[tokio::test]
    async fn replays_then_sticks_on_last() {
        let id = ClusterId::new("c-1");
        let source = ScriptedClusterStates::new().with_states(id.clone(), [Pending, Running]);

        assert_eq!(source.cluster_info(&id).await.unwrap().state, Pending);
        assert_eq!(source.cluster_info(&id).await.unwrap().state, Running);
        assert_eq!(source.cluster_info(&id).await.unwrap().state, Running);
        assert_eq!(source.fetches(&id), 3);
    }

    #[tokio::test]
    async fn unknown_cluster_is_not_found() {
        let source = ScriptedClusterStates::new().with_states(ClusterId::new("empty"), []);
        let err = source
            .cluster_info(&ClusterId::new("empty"))
            .await
            .unwrap_err();
        assert_eq!(err, PortError::NotFound);
        assert_eq!(source.fetches(&ClusterId::new("empty")), 0);
    }
}
