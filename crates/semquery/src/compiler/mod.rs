//! Re-derives the SQL preview whenever the selection changes.
//!
//! Every compile is tagged with a sequence number. Only the response for the
//! request that is still awaited may touch the outcome, so a slow response
//! for an older selection can never overwrite a newer one.

use serde::Serialize;
use tracing::debug;

use crate::backend::BackendError;
use crate::builder::build_compile_request;
use crate::models::{CompileRequest, CompileResponse};
use crate::selection::QuerySelectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileState {
    Idle,
    Compiling,
    Compiled,
    CompileFailed,
}

/// Generated SQL and compile error are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum CompileOutcome {
    #[default]
    Empty,
    Sql(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileTicket {
    pub sequence: u64,
    pub request: CompileRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileResolution {
    Applied,
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct ReactiveCompiler {
    last_issued: u64,
    awaiting: Option<u64>,
    outcome: CompileOutcome,
}

impl ReactiveCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Call after every change to the selection aggregate. Issues a compile
    /// only when at least one dimension or measure is selected; otherwise the
    /// previous outcome stays as it is and any pending response is abandoned.
    pub fn on_selection_changed(
        &mut self,
        selection: &QuerySelectionState,
        topic: Option<&str>,
    ) -> Option<CompileTicket> {
        if !selection.has_selection() {
            if let Some(abandoned) = self.awaiting.take() {
                debug!(sequence = abandoned, "selection cleared; pending compile abandoned");
            }
            return None;
        }

        self.last_issued += 1;
        let sequence = self.last_issued;
        self.awaiting = Some(sequence);
        let request = build_compile_request(selection, topic);
        debug!(
            sequence,
            dimensions = request.query.dimensions.len(),
            measures = request.query.measures.len(),
            filters = request.query.filters.len(),
            "compile issued"
        );
        Some(CompileTicket { sequence, request })
    }

    pub fn resolve(
        &mut self,
        sequence: u64,
        result: Result<CompileResponse, BackendError>,
    ) -> CompileResolution {
        if self.awaiting != Some(sequence) {
            debug!(sequence, latest = self.last_issued, "stale compile response dropped");
            return CompileResolution::Stale;
        }

        self.awaiting = None;
        self.outcome = match result {
            Ok(response) => {
                debug!(sequence, "compile succeeded");
                CompileOutcome::Sql(response.sql)
            }
            Err(error) => {
                debug!(sequence, %error, "compile failed");
                CompileOutcome::Error(error.to_string())
            }
        };
        CompileResolution::Applied
    }

    #[must_use]
    pub fn state(&self) -> CompileState {
        if self.awaiting.is_some() {
            return CompileState::Compiling;
        }
        match self.outcome {
            CompileOutcome::Empty => CompileState::Idle,
            CompileOutcome::Sql(_) => CompileState::Compiled,
            CompileOutcome::Error(_) => CompileState::CompileFailed,
        }
    }

    #[must_use]
    pub fn outcome(&self) -> &CompileOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn generated_sql(&self) -> Option<&str> {
        match &self.outcome {
            CompileOutcome::Sql(sql) => Some(sql),
            _ => None,
        }
    }

    #[must_use]
    pub fn compile_error(&self) -> Option<&str> {
        match &self.outcome {
            CompileOutcome::Error(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn last_issued(&self) -> u64 {
        self.last_issued
    }
}
