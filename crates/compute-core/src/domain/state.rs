//! Cluster lifecycle states and the transition graph between them.
//!
//! Design:
//! - `ClusterState` is the closed set of states reported by the remote API.
//! - `StateGraph` maps a state to its directly reachable successors.
//! - A state with no entry in the graph is a sink (terminal or unknown).
//!   Reachability treats it as a dead end, not as an error.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a cluster.
///
/// Serialized as SCREAMING_SNAKE_CASE to match the wire format
/// (`"PENDING"`, `"RUNNING"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClusterState {
    /// Cluster is being created.
    Pending,

    /// Cluster has started and is ready for use.
    Running,

    /// Cluster is restarting.
    Restarting,

    /// Cluster is adding or removing nodes.
    Resizing,

    /// Cluster is being destroyed.
    Terminating,

    /// Cluster has been destroyed.
    Terminated,

    /// Legacy failure state. Creation failures now surface as
    /// Terminating/Terminated instead.
    Error,

    /// The remote side does not know. A cluster should never be here.
    Unknown,
}

impl ClusterState {
    pub const ALL: [ClusterState; 8] = [
        ClusterState::Pending,
        ClusterState::Running,
        ClusterState::Restarting,
        ClusterState::Resizing,
        ClusterState::Terminating,
        ClusterState::Terminated,
        ClusterState::Error,
        ClusterState::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClusterState::Pending => "PENDING",
            ClusterState::Running => "RUNNING",
            ClusterState::Restarting => "RESTARTING",
            ClusterState::Resizing => "RESIZING",
            ClusterState::Terminating => "TERMINATING",
            ClusterState::Terminated => "TERMINATED",
            ClusterState::Error => "ERROR",
            ClusterState::Unknown => "UNKNOWN",
        }
    }

    /// Can a cluster in this state ever reach `desired` on its own?
    ///
    /// Uses the process-wide [`StateGraph::standard`] table.
    pub fn can_reach(self, desired: ClusterState) -> bool {
        ClusterLifecycle::standard().can_reach(self, desired)
    }

    /// Is this a sink in the standard graph (no outgoing transitions)?
    pub fn is_terminal(self) -> bool {
        ClusterLifecycle::standard().is_terminal(self)
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known cluster state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cluster state: {0:?}")]
pub struct ParseStateError(pub String);

impl FromStr for ClusterState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ClusterState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

static STANDARD: LazyLock<StateGraph> = LazyLock::new(|| {
    use ClusterState::*;
    StateGraph::from_edges([
        (Pending, vec![Running, Terminating]),
        (Running, vec![Resizing, Restarting, Terminating]),
        (Restarting, vec![Running, Terminating]),
        (Resizing, vec![Running, Terminating]),
        (Terminating, vec![Terminated]),
    ])
});

/// Directed graph of legal lifecycle transitions.
///
/// Built once and read-only afterwards, so it can be shared freely between
/// threads without synchronization.
#[derive(Debug, Clone)]
pub struct StateGraph {
    edges: HashMap<ClusterState, Vec<ClusterState>>,
}

impl StateGraph {
    /// Build a graph from `(state, successors)` pairs.
    ///
    /// States that never appear as a key have no entry and act as sinks.
    pub fn from_edges(
        edges: impl IntoIterator<Item = (ClusterState, Vec<ClusterState>)>,
    ) -> Self {
        Self {
            edges: edges.into_iter().collect(),
        }
    }

    /// The transition table used by the remote cluster manager.
    pub fn standard() -> &'static StateGraph {
        &STANDARD
    }

    /// Direct successors of `state`, or `None` if the state has no entry.
    pub fn successors(&self, state: ClusterState) -> Option<&[ClusterState]> {
        self.edges.get(&state).map(Vec::as_slice)
    }

    /// Is there a directed path from `current` to `desired`?
    ///
    /// The zero-length path counts, so a state always reaches itself.
    /// Breadth-first with early exit on the first successor equal to
    /// `desired`. A state without an entry ends its branch only; the rest of
    /// the frontier is still explored.
    pub fn can_reach(&self, current: ClusterState, desired: ClusterState) -> bool {
        if current == desired {
            return true;
        }

        let mut visited: HashSet<ClusterState> = HashSet::new();
        let mut frontier: VecDeque<ClusterState> = VecDeque::from([current]);

        while let Some(state) = frontier.pop_front() {
            if !visited.insert(state) {
                continue;
            }
            let Some(next) = self.successors(state) else {
                continue;
            };
            for &possible in next {
                if possible == desired {
                    return true;
                }
                frontier.push_back(possible);
            }
        }
        false
    }
}

/// Reachability queries a poller asks while waiting on a cluster.
#[derive(Debug, Clone, Copy)]
pub struct ClusterLifecycle<'g> {
    graph: &'g StateGraph,
}

impl ClusterLifecycle<'static> {
    pub fn standard() -> Self {
        Self::new(StateGraph::standard())
    }
}

impl<'g> ClusterLifecycle<'g> {
    pub fn new(graph: &'g StateGraph) -> Self {
        Self { graph }
    }

    pub fn can_reach(&self, current: ClusterState, desired: ClusterState) -> bool {
        self.graph.can_reach(current, desired)
    }

    pub fn is_terminal(&self, state: ClusterState) -> bool {
        self.graph.successors(state).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use ClusterState::*;

    #[test]
    fn every_state_reaches_itself() {
        for state in ClusterState::ALL {
            assert!(state.can_reach(state), "{state} should reach itself");
        }
    }

    #[test]
    fn only_sinks_are_terminal() {
        let terminal: Vec<_> = ClusterState::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![Terminated, Error, Unknown]);
    }

    #[rstest]
    #[case::pending_to_terminated(Pending, Terminated, true)]
    #[case::pending_to_running(Pending, Running, true)]
    #[case::pending_to_restarting(Pending, Restarting, true)]
    #[case::restarting_to_resizing(Restarting, Resizing, true)]
    #[case::terminated_to_running(Terminated, Running, false)]
    #[case::terminating_to_running(Terminating, Running, false)]
    #[case::running_to_pending(Running, Pending, false)]
    #[case::error_to_running(Error, Running, false)]
    #[case::unknown_to_terminated(Unknown, Terminated, false)]
    fn reachability_over_standard_graph(
        #[case] current: ClusterState,
        #[case] desired: ClusterState,
        #[case] expected: bool,
    ) {
        assert_eq!(current.can_reach(desired), expected);
    }

    #[test]
    fn resizing_reaches_restarting_through_running() {
        // Resizing -> Running -> Restarting is a legal path.
        assert!(Resizing.can_reach(Restarting));
    }

    #[test]
    fn dead_end_does_not_stop_other_branches() {
        // A -> {Error, Running}; Error has no entry, Running -> Terminated.
        let graph = StateGraph::from_edges([
            (Pending, vec![Error, Running]),
            (Running, vec![Terminated]),
        ]);
        assert!(graph.can_reach(Pending, Terminated));
    }

    #[test]
    fn lifecycle_over_custom_graph() {
        let graph = StateGraph::from_edges([(Pending, vec![Running])]);
        let lifecycle = ClusterLifecycle::new(&graph);
        assert!(lifecycle.can_reach(Pending, Running));
        assert!(!lifecycle.can_reach(Pending, Terminated));
        assert!(lifecycle.is_terminal(Running));
        assert!(!ClusterLifecycle::standard().is_terminal(Running));
    }

    #[test]
    fn cycles_in_graph_terminate() {
        let graph = StateGraph::from_edges([
            (Running, vec![Restarting]),
            (Restarting, vec![Running]),
        ]);
        assert!(!graph.can_reach(Running, Terminated));
    }

    #[test]
    fn state_parses_case_insensitively() {
        assert_eq!("running".parse::<ClusterState>(), Ok(Running));
        assert_eq!(" TERMINATED ".parse::<ClusterState>(), Ok(Terminated));
        assert!("STOPPED".parse::<ClusterState>().is_err());
    }

    #[test]
    fn state_serializes_as_wire_name() {
        let s = serde_json::to_string(&Restarting).unwrap();
        assert_eq!(s, "\"RESTARTING\"");
        let back: ClusterState = serde_json::from_str("\"UNKNOWN\"").unwrap();
        assert_eq!(back, Unknown);
    }
}
