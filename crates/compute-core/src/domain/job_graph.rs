//! Dependency graph over the tasks of a multi-task job, and job validation.
//!
//! Design:
//! - Forward edges: task -> tasks it depends on (waits for)
//! - Reverse edges: task -> tasks that depend on it
//! - Keys are held in `BTreeMap`s so every walk is in ascending key order
//!   and errors come out the same way on every run.
//!
//! Validation order for multi-task jobs (first failure wins):
//! 1. empty / duplicate task keys
//! 2. payload exclusivity per task
//! 3. dangling `depends_on` references
//! 4. cycles

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::errors::GraphIntegrityError;
use super::job::{JobMode, JobSettings, JobTask, TaskKind};

/// Key-indexed dependency edges of a multi-task job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTaskGraph {
    edges: BTreeMap<String, Vec<String>>,
    reverse_edges: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl JobTaskGraph {
    /// Same as [`JobSettings::mode`].
    pub fn mode(settings: &JobSettings) -> JobMode {
        settings.mode()
    }

    /// Check a job definition and return an immutable, validated view.
    ///
    /// Never mutates `settings`.
    pub fn validate(settings: &JobSettings) -> Result<ValidatedJob, GraphIntegrityError> {
        match settings.mode() {
            JobMode::Legacy => {
                let kind = settings
                    .payload
                    .kind()
                    .map_err(|e| GraphIntegrityError::from_payload("", e))?;
                Ok(ValidatedJob {
                    settings: settings.clone(),
                    mode: JobMode::Legacy,
                    legacy_kind: Some(kind),
                    tasks: Vec::new(),
                    graph: JobTaskGraph::default(),
                })
            }
            JobMode::MultiTask => Self::validate_multi_task(settings),
        }
    }

    fn validate_multi_task(settings: &JobSettings) -> Result<ValidatedJob, GraphIntegrityError> {
        let mut by_key: BTreeMap<&str, &JobTask> = BTreeMap::new();
        for (index, task) in settings.tasks.iter().enumerate() {
            if task.task_key.is_empty() {
                return Err(GraphIntegrityError::EmptyTaskKey { index });
            }
            if by_key.insert(task.task_key.as_str(), task).is_some() {
                return Err(GraphIntegrityError::DuplicateTaskKey {
                    key: task.task_key.clone(),
                });
            }
        }

        let mut kinds: BTreeMap<&str, TaskKind> = BTreeMap::new();
        for (&key, task) in &by_key {
            let kind = task
                .payload
                .kind()
                .map_err(|e| GraphIntegrityError::from_payload(key, e))?;
            kinds.insert(key, kind);
        }

        for (&key, task) in &by_key {
            if let Some(missing) = task.dependency_keys().find(|dep| !by_key.contains_key(dep)) {
                return Err(GraphIntegrityError::DanglingDependency {
                    task_key: key.to_string(),
                    missing: missing.to_string(),
                });
            }
        }

        let graph = JobTaskGraph::from_tasks(by_key.values().copied());
        if let Some(cycle) = graph.find_cycle() {
            return Err(GraphIntegrityError::CyclicDependency {
                task_key: cycle[0].clone(),
                cycle,
            });
        }

        let tasks = kinds
            .into_iter()
            .map(|(key, kind)| ValidatedTask {
                key: key.to_string(),
                depends_on: graph.dependencies(key).to_vec(),
                kind,
            })
            .collect();

        Ok(ValidatedJob {
            settings: settings.clone(),
            mode: JobMode::MultiTask,
            legacy_kind: None,
            tasks,
            graph,
        })
    }

    /// Build edges from tasks. Later tasks with the same key replace earlier ones.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a JobTask>) -> Self {
        let mut graph = JobTaskGraph::default();
        for task in tasks {
            let deps: Vec<String> = task.dependency_keys().map(str::to_string).collect();
            for dep in &deps {
                graph
                    .reverse_edges
                    .entry(dep.clone())
                    .or_default()
                    .insert(task.task_key.clone());
            }
            graph.edges.insert(task.task_key.clone(), deps);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Keys `key` waits for, in declaration order. Empty for unknown keys.
    pub fn dependencies(&self, key: &str) -> &[String] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Keys waiting for `key`, ascending.
    pub fn dependents(&self, key: &str) -> Vec<&str> {
        self.reverse_edges
            .get(key)
            .map(|waiting| waiting.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Tasks with no dependencies, ascending.
    pub fn roots(&self) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// First cycle found, as a path that starts and ends on the same key.
    ///
    /// Depth-first from each key in ascending order, following dependencies
    /// in declaration order. A dependency that is still in progress closes a
    /// cycle. Iterative, so deep chains do not grow the call stack.
    /// References to unknown keys are ignored.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();

        for start in self.edges.keys() {
            if marks.contains_key(start.as_str()) {
                continue;
            }
            marks.insert(start.as_str(), Mark::InProgress);
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let next = self.dependencies(node).get(top.1);
                top.1 += 1;

                let Some(dep) = next else {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                    continue;
                };
                if !self.edges.contains_key(dep) {
                    continue;
                }
                match marks.get(dep.as_str()) {
                    Some(Mark::Done) => {}
                    Some(Mark::InProgress) => {
                        let from = stack
                            .iter()
                            .position(|(key, _)| *key == dep.as_str())
                            .unwrap_or_default();
                        let mut cycle: Vec<String> =
                            stack[from..].iter().map(|(key, _)| key.to_string()).collect();
                        cycle.push(dep.clone());
                        return Some(cycle);
                    }
                    None => {
                        marks.insert(dep.as_str(), Mark::InProgress);
                        stack.push((dep.as_str(), 0));
                    }
                }
            }
        }
        None
    }

    /// Keys ordered so each task comes after everything it depends on.
    ///
    /// Kahn's algorithm; among ready tasks the smallest key goes first.
    /// Returns `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        let mut pending: BTreeMap<&str, usize> = self
            .edges
            .iter()
            .map(|(key, deps)| {
                let known = deps.iter().filter(|d| self.edges.contains_key(*d)).count();
                (key.as_str(), known)
            })
            .collect();
        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(key, _)| *key)
            .collect();

        let mut order = Vec::with_capacity(self.edges.len());
        while let Some(key) = ready.pop_first() {
            order.push(key);
            for waiting in self.dependents(key) {
                let Some(n) = pending.get_mut(waiting) else {
                    continue;
                };
                // one decrement per declared edge, duplicates included
                let edges = self
                    .dependencies(waiting)
                    .iter()
                    .filter(|d| d.as_str() == key)
                    .count();
                *n = n.saturating_sub(edges);
                if *n == 0 {
                    ready.insert(waiting);
                }
            }
        }

        (order.len() == self.edges.len()).then_some(order)
    }
}

/// One task of a validated multi-task job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTask {
    key: String,
    depends_on: Vec<String>,
    kind: TaskKind,
}

impl ValidatedTask {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }
}

/// A job definition that passed [`JobTaskGraph::validate`].
///
/// Only obtainable through validation, so holding one proves the graph is
/// well formed: unique keys, one payload per task, no dangling edges, no
/// cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedJob {
    settings: JobSettings,
    mode: JobMode,
    legacy_kind: Option<TaskKind>,
    tasks: Vec<ValidatedTask>,
    graph: JobTaskGraph,
}

impl ValidatedJob {
    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    pub fn mode(&self) -> JobMode {
        self.mode
    }

    pub fn name(&self) -> Option<&str> {
        self.settings.name.as_deref()
    }

    /// Payload of the implicit task of a legacy job. `None` for multi-task.
    pub fn legacy_task(&self) -> Option<&TaskKind> {
        self.legacy_kind.as_ref()
    }

    /// Tasks sorted by key. Empty for legacy jobs.
    pub fn tasks(&self) -> &[ValidatedTask] {
        &self.tasks
    }

    pub fn task(&self, key: &str) -> Option<&ValidatedTask> {
        self.tasks
            .binary_search_by(|t| t.key.as_str().cmp(key))
            .ok()
            .map(|i| &self.tasks[i])
    }

    pub fn dependencies_of(&self, key: &str) -> &[String] {
        self.graph.dependencies(key)
    }

    pub fn dependents_of(&self, key: &str) -> Vec<&str> {
        self.graph.dependents(key)
    }

    pub fn roots(&self) -> Vec<&str> {
        self.graph.roots()
    }

    /// Dependency-respecting order of task keys.
    pub fn execution_order(&self) -> Vec<&str> {
        // validated graphs are acyclic
        self.graph.topological_order().unwrap_or_default()
    }

    pub fn into_settings(self) -> JobSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::{JobFormat, NotebookTask, SparkSubmitTask, TaskPayloadFields};
    use rstest::rstest;

    fn notebook(path: &str) -> TaskKind {
        TaskKind::Notebook(NotebookTask {
            notebook_path: path.to_string(),
            base_parameters: Default::default(),
        })
    }

    fn task(key: &str, deps: &[&str]) -> JobTask {
        deps.iter()
            .fold(JobTask::new(key, notebook(&format!("/{key}"))), |t, d| t.depends_on(*d))
    }

    fn job(tasks: Vec<JobTask>) -> JobSettings {
        JobSettings::multi_task("test", tasks)
    }

    #[test]
    fn diamond_validates_and_exposes_edges() {
        let settings = job(vec![
            task("d", &["b", "c"]),
            task("b", &["a"]),
            task("c", &["a"]),
            task("a", &[]),
        ]);
        let validated = JobTaskGraph::validate(&settings).unwrap();

        assert_eq!(validated.mode(), JobMode::MultiTask);
        let keys: Vec<_> = validated.tasks().iter().map(ValidatedTask::key).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert_eq!(validated.roots(), vec!["a"]);
        assert_eq!(validated.dependents_of("a"), vec!["b", "c"]);
        assert_eq!(validated.dependencies_of("d"), ["b", "c"]);
        assert_eq!(validated.execution_order(), vec!["a", "b", "c", "d"]);
        assert!(validated.task("c").is_some());
        assert!(validated.task("z").is_none());

        // input untouched
        assert_eq!(validated.into_settings(), settings);
    }

    #[test]
    fn two_task_cycle_is_rejected() {
        let settings = job(vec![task("a", &["b"]), task("b", &["a"])]);
        let err = JobTaskGraph::validate(&settings).unwrap_err();
        assert_eq!(
            err,
            GraphIntegrityError::CyclicDependency {
                task_key: "a".into(),
                cycle: vec!["a".into(), "b".into(), "a".into()],
            }
        );
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let settings = job(vec![task("solo", &["solo"])]);
        let err = JobTaskGraph::validate(&settings).unwrap_err();
        assert!(matches!(
            err,
            GraphIntegrityError::CyclicDependency { ref task_key, ref cycle }
                if task_key == "solo" && cycle.len() == 2
        ));
    }

    #[test]
    fn cycle_reported_with_key_on_the_cycle() {
        // a -> b -> c -> b; a itself is not on the cycle
        let settings = job(vec![task("a", &["b"]), task("b", &["c"]), task("c", &["b"])]);
        let err = JobTaskGraph::validate(&settings).unwrap_err();
        let GraphIntegrityError::CyclicDependency { task_key, cycle } = err else {
            panic!("expected a cycle error");
        };
        assert_eq!(task_key, "b");
        assert_eq!(cycle, vec!["b", "c", "b"]);
    }

    #[test]
    fn dangling_dependency_names_both_ends() {
        let settings = job(vec![task("a", &[]), task("b", &["a"]), task("c", &["z"])]);
        let err = JobTaskGraph::validate(&settings).unwrap_err();
        assert_eq!(
            err,
            GraphIntegrityError::DanglingDependency {
                task_key: "c".into(),
                missing: "z".into(),
            }
        );
    }

    #[test]
    fn dangling_is_reported_before_cycle() {
        let settings = job(vec![task("a", &["b"]), task("b", &["a", "ghost"])]);
        assert!(matches!(
            JobTaskGraph::validate(&settings),
            Err(GraphIntegrityError::DanglingDependency { .. })
        ));
    }

    #[rstest]
    #[case::empty_key(vec![task("a", &[]), task("", &[])], GraphIntegrityError::EmptyTaskKey { index: 1 })]
    #[case::duplicate(vec![task("a", &[]), task("b", &[]), task("a", &[])], GraphIntegrityError::DuplicateTaskKey { key: "a".into() })]
    fn key_errors(#[case] tasks: Vec<JobTask>, #[case] expected: GraphIntegrityError) {
        assert_eq!(JobTaskGraph::validate(&job(tasks)).unwrap_err(), expected);
    }

    #[test]
    fn payload_checked_before_edges() {
        let mut both = task("b", &["missing"]);
        both.payload.spark_submit_task = Some(SparkSubmitTask::default());
        let none = JobTask {
            task_key: "a".into(),
            ..JobTask::default()
        };

        let err = JobTaskGraph::validate(&job(vec![both.clone(), none])).unwrap_err();
        assert_eq!(
            err,
            GraphIntegrityError::MissingTaskPayload {
                task_key: "a".into()
            }
        );

        let err = JobTaskGraph::validate(&job(vec![both])).unwrap_err();
        assert_eq!(
            err,
            GraphIntegrityError::AmbiguousTaskPayload {
                task_key: "b".into(),
                kinds: vec!["notebook_task", "spark_submit_task"],
            }
        );
    }

    #[test]
    fn legacy_job_checks_only_payload() {
        let settings = JobSettings::single_task("nightly", notebook("/etl"));
        let validated = JobTaskGraph::validate(&settings).unwrap();
        assert_eq!(validated.mode(), JobMode::Legacy);
        assert!(validated.tasks().is_empty());
        assert!(matches!(validated.legacy_task(), Some(TaskKind::Notebook(_))));

        let empty = JobSettings::default();
        assert_eq!(
            JobTaskGraph::validate(&empty).unwrap_err(),
            GraphIntegrityError::MissingTaskPayload {
                task_key: String::new()
            }
        );
    }

    #[test]
    fn single_task_list_is_multi_task() {
        let settings = JobSettings {
            tasks: vec![task("only", &[])],
            payload: TaskPayloadFields::default(),
            ..JobSettings::default()
        };
        let validated = JobTaskGraph::validate(&settings).unwrap();
        assert_eq!(JobTaskGraph::mode(&settings), JobMode::MultiTask);
        assert_eq!(validated.tasks().len(), 1);
        assert!(validated.legacy_task().is_none());
    }

    #[test]
    fn marker_without_tasks_validates_empty() {
        let settings = JobSettings {
            format: Some(JobFormat::MultiTask),
            ..JobSettings::default()
        };
        let validated = JobTaskGraph::validate(&settings).unwrap();
        assert_eq!(validated.mode(), JobMode::MultiTask);
        assert!(validated.tasks().is_empty());
        assert!(validated.execution_order().is_empty());
    }

    #[test]
    fn topological_order_none_on_cycle() {
        let tasks = [task("x", &["y"]), task("y", &["x"]), task("w", &[])];
        let graph = JobTaskGraph::from_tasks(tasks.iter());
        assert_eq!(graph.topological_order(), None);
        assert_eq!(graph.roots(), vec!["w"]);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn duplicate_edges_do_not_block_order() {
        let tasks = [task("a", &[]), task("b", &["a", "a"])];
        let graph = JobTaskGraph::from_tasks(tasks.iter());
        assert_eq!(graph.topological_order(), Some(vec!["a", "b"]));
    }
}
