use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::BackendError;
use crate::builder::build_execute_request;
use crate::models::{ExecuteRequest, QueryResult};
use crate::selection::QuerySelectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Idle,
    Executing,
    Succeeded,
    Failed,
}

/// Result (rows or file reference) and execution error are mutually
/// exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    #[default]
    Empty,
    Result(QueryResult),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteTicket {
    pub sequence: u64,
    pub request: ExecuteRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecuteRejected {
    #[error("select at least one dimension or measure before executing")]
    NothingSelected,

    #[error("an execution is already in flight")]
    AlreadyExecuting,
}

#[derive(Debug, Clone, Default)]
pub struct QueryExecutionController {
    last_issued: u64,
    in_flight: Option<u64>,
    outcome: ExecutionOutcome,
}

impl QueryExecutionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the execute trigger is enabled.
    #[must_use]
    pub fn can_execute(&self, selection: &QuerySelectionState) -> bool {
        selection.has_selection() && self.in_flight.is_none()
    }

    pub fn begin(
        &mut self,
        selection: &QuerySelectionState,
        topic: Option<&str>,
    ) -> Result<ExecuteTicket, ExecuteRejected> {
        if !selection.has_selection() {
            return Err(ExecuteRejected::NothingSelected);
        }
        if let Some(sequence) = self.in_flight {
            warn!(sequence, "execute requested while another execution is in flight");
            return Err(ExecuteRejected::AlreadyExecuting);
        }

        self.last_issued += 1;
        let sequence = self.last_issued;
        self.in_flight = Some(sequence);
        debug!(sequence, "execute issued");
        Ok(ExecuteTicket {
            sequence,
            request: build_execute_request(selection, topic),
        })
    }

    /// Returns `false` when `sequence` is not the execution in flight.
    pub fn resolve(&mut self, sequence: u64, result: Result<QueryResult, BackendError>) -> bool {
        if self.in_flight != Some(sequence) {
            debug!(sequence, "unexpected execute response dropped");
            return false;
        }

        self.in_flight = None;
        self.outcome = match result {
            Ok(result) => {
                debug!(sequence, rows = ?result.row_count(), "execute succeeded");
                ExecutionOutcome::Result(result)
            }
            Err(error) => {
                debug!(sequence, %error, "execute failed");
                ExecutionOutcome::Error(error.to_string())
            }
        };
        true
    }

    #[must_use]
    pub fn state(&self) -> ExecutionState {
        if self.in_flight.is_some() {
            return ExecutionState::Executing;
        }
        match self.outcome {
            ExecutionOutcome::Empty => ExecutionState::Idle,
            ExecutionOutcome::Result(_) => ExecutionState::Succeeded,
            ExecutionOutcome::Error(_) => ExecutionState::Failed,
        }
    }

    #[must_use]
    pub fn outcome(&self) -> &ExecutionOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn result(&self) -> Option<&QueryResult> {
        match &self.outcome {
            ExecutionOutcome::Result(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn execution_error(&self) -> Option<&str> {
        match &self.outcome {
            ExecutionOutcome::Error(message) => Some(message),
            _ => None,
        }
    }
}
