//! Job definitions as exchanged with the remote jobs API.
//!
//! Two shapes coexist:
//! - legacy single-task: the task payload and cluster sit directly on
//!   `JobSettings`, and there is no task key;
//! - multi-task: `JobSettings::tasks` holds keyed tasks with `depends_on`
//!   edges.
//!
//! Which shape a job uses is derived (see [`JobSettings::mode`]), never
//! stored twice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cluster::{ClusterSpec, Library};
use super::errors::PayloadError;
use super::ids::{ClusterId, JobId, PipelineId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookTask {
    pub notebook_path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub base_parameters: BTreeMap<String, String>,
}

/// Runs a Python file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkPythonTask {
    pub python_file: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkJarTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

/// Runs an entry point from a packaged wheel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonWheelTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub named_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparkSubmitTask {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

/// Triggers an update of an existing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTask {
    pub pipeline_id: PipelineId,
}

/// What a task runs. Exactly one kind per task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Notebook(NotebookTask),
    SparkPython(SparkPythonTask),
    SparkJar(SparkJarTask),
    PythonWheel(PythonWheelTask),
    SparkSubmit(SparkSubmitTask),
    Pipeline(PipelineTask),
}

impl TaskKind {
    /// Wire field name carrying this kind (e.g. `"notebook_task"`).
    pub fn field_name(&self) -> &'static str {
        match self {
            TaskKind::Notebook(_) => "notebook_task",
            TaskKind::SparkPython(_) => "spark_python_task",
            TaskKind::SparkJar(_) => "spark_jar_task",
            TaskKind::PythonWheel(_) => "python_wheel_task",
            TaskKind::SparkSubmit(_) => "spark_submit_task",
            TaskKind::Pipeline(_) => "pipeline_task",
        }
    }
}

/// Wire shape of the task payload: one optional field per kind.
///
/// The remote API expects at most one of these to be set. Code that builds
/// jobs should go through [`TaskKind`]; this type only exists at the
/// serialization boundary and is checked by [`TaskPayloadFields::kind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayloadFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_task: Option<NotebookTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_python_task: Option<SparkPythonTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_jar_task: Option<SparkJarTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_wheel_task: Option<PythonWheelTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spark_submit_task: Option<SparkSubmitTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_task: Option<PipelineTask>,
}

impl TaskPayloadFields {
    /// Names of the payload fields that are set, in declaration order.
    pub fn set_fields(&self) -> Vec<&'static str> {
        let candidates = [
            ("notebook_task", self.notebook_task.is_some()),
            ("spark_python_task", self.spark_python_task.is_some()),
            ("spark_jar_task", self.spark_jar_task.is_some()),
            ("python_wheel_task", self.python_wheel_task.is_some()),
            ("spark_submit_task", self.spark_submit_task.is_some()),
            ("pipeline_task", self.pipeline_task.is_some()),
        ];
        candidates
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }

    /// Resolve to the single task kind, or explain why there isn't one.
    pub fn kind(&self) -> Result<TaskKind, PayloadError> {
        let set = self.set_fields();
        if set.len() > 1 {
            return Err(PayloadError::Ambiguous(set));
        }
        if let Some(t) = &self.notebook_task {
            return Ok(TaskKind::Notebook(t.clone()));
        }
        if let Some(t) = &self.spark_python_task {
            return Ok(TaskKind::SparkPython(t.clone()));
        }
        if let Some(t) = &self.spark_jar_task {
            return Ok(TaskKind::SparkJar(t.clone()));
        }
        if let Some(t) = &self.python_wheel_task {
            return Ok(TaskKind::PythonWheel(t.clone()));
        }
        if let Some(t) = &self.spark_submit_task {
            return Ok(TaskKind::SparkSubmit(t.clone()));
        }
        if let Some(t) = &self.pipeline_task {
            return Ok(TaskKind::Pipeline(t.clone()));
        }
        Err(PayloadError::Missing)
    }
}

impl From<TaskKind> for TaskPayloadFields {
    fn from(kind: TaskKind) -> Self {
        let mut fields = TaskPayloadFields::default();
        match kind {
            TaskKind::Notebook(t) => fields.notebook_task = Some(t),
            TaskKind::SparkPython(t) => fields.spark_python_task = Some(t),
            TaskKind::SparkJar(t) => fields.spark_jar_task = Some(t),
            TaskKind::PythonWheel(t) => fields.python_wheel_task = Some(t),
            TaskKind::SparkSubmit(t) => fields.spark_submit_task = Some(t),
            TaskKind::Pipeline(t) => fields.pipeline_task = Some(t),
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    pub task_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailNotifications {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_start: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_success: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_failure: Vec<String>,
    #[serde(default)]
    pub no_alert_for_skipped_runs: bool,
}

/// Quartz cron schedule for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronSchedule {
    pub quartz_cron_expression: String,
    pub timezone_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_status: Option<String>,
}

/// One task of a multi-task job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTask {
    #[serde(default)]
    pub task_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskDependency>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_cluster_id: Option<ClusterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_cluster: Option<ClusterSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<Library>,

    #[serde(flatten)]
    pub payload: TaskPayloadFields,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<EmailNotifications>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout_seconds: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub max_retries: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub min_retry_interval_millis: i32,
    #[serde(default)]
    pub retry_on_timeout: bool,
}

impl JobTask {
    /// A task running exactly `kind`.
    pub fn new(task_key: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            task_key: task_key.into(),
            payload: kind.into(),
            ..Self::default()
        }
    }

    /// Add a dependency on another task of the same job.
    pub fn depends_on(mut self, task_key: impl Into<String>) -> Self {
        self.depends_on.push(TaskDependency {
            task_key: task_key.into(),
        });
        self
    }

    pub fn on_existing_cluster(mut self, cluster_id: ClusterId) -> Self {
        self.existing_cluster_id = Some(cluster_id);
        self
    }

    pub fn on_new_cluster(mut self, cluster: ClusterSpec) -> Self {
        self.new_cluster = Some(cluster);
        self
    }

    /// Keys this task waits for, in declaration order.
    pub fn dependency_keys(&self) -> impl Iterator<Item = &str> {
        self.depends_on.iter().map(|d| d.task_key.as_str())
    }
}

/// Explicit job format marker.
///
/// Values the API adds later land in `Other` and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobFormat {
    SingleTask,
    MultiTask,
    #[serde(untagged)]
    Other(String),
}

/// Shape of a job definition, derived from its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobMode {
    /// One implicit task described directly on the job.
    Legacy,
    /// Explicit keyed tasks with dependencies.
    MultiTask,
}

/// Settings of a job: what it runs, where, and when.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    // Legacy single-task fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_cluster_id: Option<ClusterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_cluster: Option<ClusterSpec>,
    #[serde(flatten)]
    pub payload: TaskPayloadFields,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<Library>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout_seconds: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub max_retries: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub min_retry_interval_millis: i32,
    #[serde(default)]
    pub retry_on_timeout: bool,

    // Multi-task fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<JobTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<JobFormat>,

    // Job-level settings shared by both shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<CronSchedule>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub max_concurrent_runs: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<EmailNotifications>,
}

impl JobSettings {
    /// A legacy job whose single implicit task runs `kind`.
    pub fn single_task(name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            name: Some(name.into()),
            payload: kind.into(),
            ..Self::default()
        }
    }

    /// A multi-task job with the given tasks.
    pub fn multi_task(name: impl Into<String>, tasks: Vec<JobTask>) -> Self {
        Self {
            name: Some(name.into()),
            tasks,
            format: Some(JobFormat::MultiTask),
            ..Self::default()
        }
    }

    /// Multi-task iff there is at least one task or the format says so.
    pub fn mode(&self) -> JobMode {
        if self.format == Some(JobFormat::MultiTask) || !self.tasks.is_empty() {
            JobMode::MultiTask
        } else {
            JobMode::Legacy
        }
    }

    pub fn is_multi_task(&self) -> bool {
        self.mode() == JobMode::MultiTask
    }

    /// Sort tasks by ascending key for stable display and comparison.
    ///
    /// Not an execution order; dependency edges are carried unchanged.
    pub fn sort_tasks_by_key(&mut self) {
        self.tasks.sort_by(|a, b| a.task_key.cmp(&b.task_key));
    }
}

/// A job as returned by the jobs API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<JobSettings>,
    #[serde(default)]
    pub created_time: i64,
}

/// Parameters overriding a job's defaults for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notebook_params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jar_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub python_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spark_submit_params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_cycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_message: Option<String>,
}

/// One run of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRun {
    pub job_id: JobId,
    pub run_id: i64,
    #[serde(default)]
    pub number_in_job: i64,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub state: RunState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_type: Option<String>,
    #[serde(default)]
    pub overriding_parameters: RunParameters,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn notebook(path: &str) -> TaskKind {
        TaskKind::Notebook(NotebookTask {
            notebook_path: path.to_string(),
            base_parameters: BTreeMap::new(),
        })
    }

    #[test]
    fn job_without_tasks_or_marker_is_legacy() {
        let job = JobSettings::single_task("nightly", notebook("/etl"));
        assert_eq!(job.mode(), JobMode::Legacy);
        assert_eq!(JobSettings::default().mode(), JobMode::Legacy);
    }

    #[test]
    fn single_task_without_dependencies_is_multi_task() {
        let job = JobSettings {
            tasks: vec![JobTask::new("only", notebook("/a"))],
            ..JobSettings::default()
        };
        assert_eq!(job.mode(), JobMode::MultiTask);
    }

    #[rstest]
    #[case::multi(Some(JobFormat::MultiTask), JobMode::MultiTask)]
    #[case::single(Some(JobFormat::SingleTask), JobMode::Legacy)]
    #[case::absent(None, JobMode::Legacy)]
    fn format_marker_drives_mode_without_tasks(
        #[case] format: Option<JobFormat>,
        #[case] expected: JobMode,
    ) {
        let job = JobSettings {
            format,
            ..JobSettings::default()
        };
        assert_eq!(job.mode(), expected);
    }

    #[test]
    fn unknown_format_still_parses_and_round_trips() {
        let json = r#"{"name": "nightly", "format": "STREAMING_TASK"}"#;
        let job: JobSettings = serde_json::from_str(json).unwrap();
        assert_eq!(job.format, Some(JobFormat::Other("STREAMING_TASK".into())));
        assert_eq!(job.mode(), JobMode::Legacy);

        let back = serde_json::to_value(&job).unwrap();
        assert_eq!(back["format"], "STREAMING_TASK");

        let known: JobSettings = serde_json::from_str(r#"{"format": "MULTI_TASK"}"#).unwrap();
        assert_eq!(known.format, Some(JobFormat::MultiTask));
    }

    #[test]
    fn payload_fields_resolve_to_single_kind() {
        let fields: TaskPayloadFields = notebook("/x").into();
        assert_eq!(fields.set_fields(), vec!["notebook_task"]);
        assert_eq!(fields.kind().unwrap().field_name(), "notebook_task");
    }

    #[test]
    fn payload_fields_reject_zero_or_many() {
        assert_eq!(
            TaskPayloadFields::default().kind(),
            Err(PayloadError::Missing)
        );

        let fields = TaskPayloadFields {
            spark_submit_task: Some(SparkSubmitTask::default()),
            spark_jar_task: Some(SparkJarTask::default()),
            ..TaskPayloadFields::default()
        };
        assert_eq!(
            fields.kind(),
            Err(PayloadError::Ambiguous(vec![
                "spark_jar_task",
                "spark_submit_task"
            ]))
        );
    }

    #[test]
    fn sort_tasks_by_key_keeps_edges() {
        let mut job = JobSettings::multi_task(
            "j",
            vec![
                JobTask::new("c", notebook("/c")).depends_on("a"),
                JobTask::new("a", notebook("/a")),
                JobTask::new("b", notebook("/b")).depends_on("a"),
            ],
        );
        job.sort_tasks_by_key();
        let keys: Vec<_> = job.tasks.iter().map(|t| t.task_key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(job.tasks[2].dependency_keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn multi_task_job_parses_from_wire_json() {
        let json = r#"{
          "name": "pipeline",
          "format": "MULTI_TASK",
          "max_concurrent_runs": 1,
          "tasks": [
            {"task_key": "ingest", "notebook_task": {"notebook_path": "/ingest"},
             "existing_cluster_id": "0412-abc"},
            {"task_key": "train", "depends_on": [{"task_key": "ingest"}],
             "python_wheel_task": {"package_name": "trainer", "entry_point": "main"}}
          ]
        }"#;
        let job: JobSettings = serde_json::from_str(json).unwrap();
        assert_eq!(job.mode(), JobMode::MultiTask);
        assert_eq!(job.tasks.len(), 2);
        assert!(matches!(
            job.tasks[1].payload.kind(),
            Ok(TaskKind::PythonWheel(_))
        ));
        assert_eq!(
            job.tasks[0].existing_cluster_id.as_ref().map(|c| c.as_str()),
            Some("0412-abc")
        );
    }

    #[test]
    fn serialized_task_carries_one_payload_field() {
        let task = JobTask::new(
            "refresh",
            TaskKind::Pipeline(PipelineTask {
                pipeline_id: PipelineId::new("p-1"),
            }),
        )
        .depends_on("ingest");
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["pipeline_task"]["pipeline_id"], "p-1");
        assert_eq!(v["depends_on"][0]["task_key"], "ingest");
        assert!(v.get("notebook_task").is_none());
    }
}
