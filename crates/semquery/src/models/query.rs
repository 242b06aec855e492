use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::Filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    #[must_use]
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

impl Variable {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Partial update merged over an existing variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableUpdate {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    #[default]
    Parquet,
}

/// Wire-level structured query shared by compile and execute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QueryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    pub dimensions: Vec<String>,
    pub measures: Vec<String>,
    pub filters: Vec<Filter>,
    pub orders: Vec<Order>,
    pub variables: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompileRequest {
    pub query: QueryRequest,
}

impl CompileRequest {
    #[must_use]
    pub fn new(query: QueryRequest) -> Self {
        Self { query }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteRequest {
    pub query: QueryRequest,
    pub result_format: ResultFormat,
}

impl ExecuteRequest {
    #[must_use]
    pub fn new(query: QueryRequest) -> Self {
        Self {
            query,
            result_format: ResultFormat::Parquet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompileResponse {
    pub sql: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResultFileRef {
    pub file_name: String,
}

/// Execute payload: inline rows for small results, a server-side artifact
/// reference otherwise. Paging and formatting belong to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum QueryResult {
    Rows(Vec<Vec<String>>),
    File(ResultFileRef),
}

impl QueryResult {
    #[must_use]
    pub fn file(file_name: impl Into<String>) -> Self {
        Self::File(ResultFileRef {
            file_name: file_name.into(),
        })
    }

    #[must_use]
    pub fn row_count(&self) -> Option<usize> {
        match self {
            Self::Rows(rows) => Some(rows.len()),
            Self::File(_) => None,
        }
    }
}

/// JSON schema of the execute request, which embeds the full query request.
pub fn json_schema() -> serde_json::Result<Value> {
    serde_json::to_value(schemars::schema_for!(ExecuteRequest))
}
