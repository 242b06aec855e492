//! The JSON document each command prints on stdout.
//!
//! The outcome is flattened into the top level under a `status` tag, so a
//! consumer reads either `data` or `code`/`message` depending on it. Hints
//! point back at the session action or filter they come from.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::Value;

use crate::panel::driver::RejectedAction;
use crate::utils::time::generated_at_utc_now;
use crate::validate::{InputHint, InputHintKind};

pub const ENVELOPE_SCHEMA_VERSION: &str = "semquery.envelope.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    CatalogScopeNotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok {
        data: Value,
    },
    Error {
        code: ErrorCode,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Hint {
    /// A session action the panel refused; the rest of the session still ran.
    Action { action_index: usize, message: String },
    /// Advisory check on a filter value. The filter is still sent.
    Filter {
        filter_index: usize,
        kind: InputHintKind,
        message: String,
    },
    Catalog { message: String },
}

impl From<&RejectedAction> for Hint {
    fn from(rejected: &RejectedAction) -> Self {
        Self::Action {
            action_index: rejected.index,
            message: rejected.rejection.to_string(),
        }
    }
}

impl From<&InputHint> for Hint {
    fn from(hint: &InputHint) -> Self {
        Self::Filter {
            filter_index: hint.filter_index,
            kind: hint.kind,
            message: hint.detail.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub command: &'static str,
    pub generated_at_utc: String,

    #[serde(flatten)]
    pub outcome: Outcome,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<&'static str, usize>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
}

impl Envelope {
    pub fn ok(command: &'static str, data: &impl Serialize) -> serde_json::Result<Self> {
        Ok(Self::new(
            command,
            Outcome::Ok {
                data: serde_json::to_value(data)?,
            },
        ))
    }

    #[must_use]
    pub fn error(command: &'static str, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(
            command,
            Outcome::Error {
                code,
                message: message.into(),
                details: None,
            },
        )
    }

    fn new(command: &'static str, outcome: Outcome) -> Self {
        Self {
            schema_version: ENVELOPE_SCHEMA_VERSION,
            command,
            generated_at_utc: generated_at_utc_now(),
            outcome,
            counts: BTreeMap::new(),
            hints: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok { .. })
    }

    /// No-op on a successful envelope.
    #[must_use]
    pub fn with_details(mut self, value: Value) -> Self {
        if let Outcome::Error { details, .. } = &mut self.outcome {
            *details = Some(value);
        }
        self
    }

    #[must_use]
    pub fn with_count(mut self, name: &'static str, count: usize) -> Self {
        self.counts.insert(name, count);
        self
    }

    #[must_use]
    pub fn with_hints<'a, H>(mut self, hints: impl IntoIterator<Item = &'a H>) -> Self
    where
        H: 'a,
        &'a H: Into<Hint>,
    {
        self.hints.extend(hints.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self
    }

    /// Wraps the envelope for `?`; `main` recovers it by downcasting.
    #[must_use]
    pub fn into_failure(self) -> anyhow::Error {
        anyhow::Error::new(EnvelopeFailure(self))
    }

    pub fn print(&self) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string(self)?);
        Ok(())
    }
}

/// A failed command. `main` prints the envelope and exits non-zero; the
/// `Display` form is the one-line summary for stderr.
#[derive(Debug, Clone)]
pub struct EnvelopeFailure(pub Envelope);

impl Display for EnvelopeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0.outcome {
            Outcome::Error { message, .. } => write!(f, "{} failed: {message}", self.0.command),
            Outcome::Ok { .. } => write!(f, "{} failed", self.0.command),
        }
    }
}

impl std::error::Error for EnvelopeFailure {}
