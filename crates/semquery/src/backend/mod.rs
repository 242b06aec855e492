//! Boundary to the compile/execute service.
//!
//! The transport itself lives with the host; the panel only needs two async
//! operations. [`FixtureBackend`] answers from a canned JSON document and is
//! what the CLI replays sessions against.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CompileRequest, CompileResponse, ExecuteRequest, QueryResult};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The service understood the request and refused it.
    #[error("{message}")]
    Rejected { message: String },

    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("unexpected response: {message}")]
    Decode { message: String },
}

impl BackendError {
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

pub trait QueryBackend {
    fn compile(
        &self,
        request: CompileRequest,
    ) -> BoxFuture<'_, Result<CompileResponse, BackendError>>;

    fn execute(&self, request: ExecuteRequest) -> BoxFuture<'_, Result<QueryResult, BackendError>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompileFixture {
    Failure {
        error: String,
    },
    Success(CompileResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecuteFixture {
    Failure {
        error: String,
    },
    Success(QueryResult),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureResponses {
    pub compile: CompileFixture,
    pub execute: ExecuteFixture,
}

#[derive(Debug, Default)]
struct FixtureCalls {
    compile: Vec<CompileRequest>,
    execute: Vec<ExecuteRequest>,
}

#[derive(Debug)]
pub struct FixtureBackend {
    responses: FixtureResponses,
    calls: Mutex<FixtureCalls>,
}

impl FixtureBackend {
    #[must_use]
    pub fn new(responses: FixtureResponses) -> Self {
        Self {
            responses,
            calls: Mutex::new(FixtureCalls::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture responses {}", path.display()))?;
        let responses = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse fixture responses {}", path.display()))?;
        Ok(Self::new(responses))
    }

    #[must_use]
    pub fn compile_calls(&self) -> Vec<CompileRequest> {
        self.call_log().compile.clone()
    }

    #[must_use]
    pub fn execute_calls(&self) -> Vec<ExecuteRequest> {
        self.call_log().execute.clone()
    }

    /// The log is append-only, so a panic while it was held cannot leave it
    /// half-written and the poison flag is ignored.
    fn call_log(&self) -> MutexGuard<'_, FixtureCalls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl QueryBackend for FixtureBackend {
    fn compile(
        &self,
        request: CompileRequest,
    ) -> BoxFuture<'_, Result<CompileResponse, BackendError>> {
        self.call_log().compile.push(request);
        let outcome = match &self.responses.compile {
            CompileFixture::Success(response) => Ok(response.clone()),
            CompileFixture::Failure { error } => Err(BackendError::rejected(error.clone())),
        };
        async move { outcome }.boxed()
    }

    fn execute(&self, request: ExecuteRequest) -> BoxFuture<'_, Result<QueryResult, BackendError>> {
        self.call_log().execute.push(request);
        let outcome = match &self.responses.execute {
            ExecuteFixture::Success(result) => Ok(result.clone()),
            ExecuteFixture::Failure { error } => Err(BackendError::rejected(error.clone())),
        };
        async move { outcome }.boxed()
    }
}
