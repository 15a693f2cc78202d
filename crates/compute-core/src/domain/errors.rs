//! Errors produced by domain validation.

use thiserror::Error;

/// Why a task payload could not be resolved to a single [`TaskKind`].
///
/// [`TaskKind`]: super::job::TaskKind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("no task payload set")]
    Missing,

    #[error("more than one task payload set: {}", .0.join(", "))]
    Ambiguous(Vec<&'static str>),
}

/// A job definition that cannot be submitted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphIntegrityError {
    #[error("task at index {index} has an empty task_key")]
    EmptyTaskKey { index: usize },

    #[error("duplicate task_key={key}")]
    DuplicateTaskKey { key: String },

    #[error("task_key={task_key} has no task payload")]
    MissingTaskPayload { task_key: String },

    #[error("task_key={task_key} sets more than one task payload: {}", .kinds.join(", "))]
    AmbiguousTaskPayload {
        task_key: String,
        kinds: Vec<&'static str>,
    },

    #[error("task_key={task_key} depends on unknown task_key={missing}")]
    DanglingDependency { task_key: String, missing: String },

    #[error("dependency cycle through task_key={task_key}: {}", .cycle.join(" -> "))]
    CyclicDependency { task_key: String, cycle: Vec<String> },
}

impl GraphIntegrityError {
    /// Attach the offending task key to a payload error.
    ///
    /// The legacy single-task shape has no key; callers pass an empty one.
    pub fn from_payload(task_key: impl Into<String>, err: PayloadError) -> Self {
        let task_key = task_key.into();
        match err {
            PayloadError::Missing => GraphIntegrityError::MissingTaskPayload { task_key },
            PayloadError::Ambiguous(kinds) => {
                GraphIntegrityError::AmbiguousTaskPayload { task_key, kinds }
            }
        }
    }

    /// Key of the task the error is about, if it has one.
    pub fn task_key(&self) -> Option<&str> {
        match self {
            GraphIntegrityError::EmptyTaskKey { .. } => None,
            GraphIntegrityError::DuplicateTaskKey { key } => Some(key),
            GraphIntegrityError::MissingTaskPayload { task_key }
            | GraphIntegrityError::AmbiguousTaskPayload { task_key, .. }
            | GraphIntegrityError::DanglingDependency { task_key, .. }
            | GraphIntegrityError::CyclicDependency { task_key, .. } => {
                (!task_key.is_empty()).then_some(task_key.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_shows_path() {
        let err = GraphIntegrityError::CyclicDependency {
            task_key: "a".into(),
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle through task_key=a: a -> b -> a"
        );
        assert_eq!(err.task_key(), Some("a"));
    }

    #[test]
    fn payload_error_gets_task_key() {
        let err = GraphIntegrityError::from_payload(
            "train",
            PayloadError::Ambiguous(vec!["notebook_task", "pipeline_task"]),
        );
        assert_eq!(
            err,
            GraphIntegrityError::AmbiguousTaskPayload {
                task_key: "train".into(),
                kinds: vec!["notebook_task", "pipeline_task"],
            }
        );

        let legacy = GraphIntegrityError::from_payload("", PayloadError::Missing);
        assert_eq!(legacy.task_key(), None);
    }
}
