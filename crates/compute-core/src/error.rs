use thiserror::Error;

use crate::app::{BuildError, PollError, SelectError, SubmitError};
use crate::config::ConfigError;
use crate::domain::{GraphIntegrityError, ParseStateError};
use crate::ports::PortError;

/// Any error the crate can return, for callers that do not care which
/// layer produced it.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error(transparent)]
    Graph(#[from] GraphIntegrityError),

    #[error(transparent)]
    ParseState(#[from] ParseStateError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<crate::domain::ClusterState, ComputeError> {
        Ok(s.parse()?)
    }

    #[test]
    fn layer_errors_convert_with_question_mark() {
        let err = parse("STOPPED").unwrap_err();
        assert!(matches!(err, ComputeError::ParseState(_)));
        assert_eq!(err.to_string(), "unknown cluster state: \"STOPPED\"");

        let err: ComputeError = PortError::NotFound.into();
        assert_eq!(err.to_string(), "resource not found");
    }
}
