//! Job identity and lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Inputs are still being received
    #[default]
    Collecting,
    /// A strategy is executing
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Collecting => "collecting",
            JobState::Running => "running",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }

    /// Collecting may fail before running (upload limit, download failure).
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Collecting, JobState::Running)
                | (JobState::Collecting, JobState::Failed)
                | (JobState::Running, JobState::Succeeded)
                | (JobState::Running, JobState::Failed)
        )
    }

    /// Move to `next`, rejecting anything but the allowed edges.
    pub fn transition(&mut self, next: JobState) -> Result<(), TransitionError> {
        if !self.can_transition_to(next) {
            return Err(TransitionError { from: *self, to: next });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Illegal job state transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: JobState,
    pub to: JobState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_are_final() {
        let mut state = JobState::Collecting;
        state.transition(JobState::Running).unwrap();
        state.transition(JobState::Succeeded).unwrap();
        assert!(state.is_terminal());
        assert!(state.transition(JobState::Failed).is_err());
        assert_eq!(state, JobState::Succeeded);
    }

    #[test]
    fn test_running_resolves_once() {
        let mut state = JobState::Running;
        state.transition(JobState::Failed).unwrap();
        let err = state.transition(JobState::Succeeded).unwrap_err();
        assert_eq!(err.from, JobState::Failed);
    }

    #[test]
    fn test_job_id_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }
}
