use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::{CompileRequest, ExecuteRequest, Filter, QueryRequest, Variable};
use crate::selection::QuerySelectionState;

/// Turns the current selection into the wire query.
///
/// Identifiers are passed through as-is; they are already `view.field`
/// qualified when they enter the selection. Filters that are still being
/// filled in are dropped instead of being sent half-empty.
#[must_use]
pub fn build_query_request(selection: &QuerySelectionState, topic: Option<&str>) -> QueryRequest {
    QueryRequest {
        topic: topic.map(str::to_string),
        dimensions: selection.selected_dimensions().to_vec(),
        measures: selection.selected_measures().to_vec(),
        filters: populated_filters(selection.filters()),
        orders: selection.orders().to_vec(),
        variables: merge_variables(selection.variables()),
    }
}

#[must_use]
pub fn build_compile_request(
    selection: &QuerySelectionState,
    topic: Option<&str>,
) -> CompileRequest {
    CompileRequest::new(build_query_request(selection, topic))
}

#[must_use]
pub fn build_execute_request(
    selection: &QuerySelectionState,
    topic: Option<&str>,
) -> ExecuteRequest {
    ExecuteRequest::new(build_query_request(selection, topic))
}

#[must_use]
pub fn populated_filters(filters: &[Filter]) -> Vec<Filter> {
    filters
        .iter()
        .filter(|filter| filter.is_populated())
        .cloned()
        .collect()
}

/// Later entries win on key collision; entries with an empty key are skipped.
#[must_use]
pub fn merge_variables(variables: &[Variable]) -> BTreeMap<String, Value> {
    variables
        .iter()
        .filter(|variable| !variable.key.is_empty())
        .fold(BTreeMap::new(), |mut merged, variable| {
            merged.insert(variable.key.clone(), Value::String(variable.value.clone()));
            merged
        })
}

#[cfg(test)]
mod tests {
    use super::{build_query_request, merge_variables};
    use crate::models::{Variable, VariableUpdate};
    use crate::selection::QuerySelectionState;
    use serde_json::json;

    #[test]
    fn empty_selection_builds_empty_query() {
        let request = build_query_request(&QuerySelectionState::new(), None);
        assert!(request.dimensions.is_empty());
        assert!(request.measures.is_empty());
        assert!(request.filters.is_empty());
        assert!(request.variables.is_empty());
        assert!(request.topic.is_none());
    }

    #[test]
    fn topic_is_included_only_when_given() {
        let mut selection = QuerySelectionState::new();
        selection.toggle_measure("orders.total");

        let request = build_query_request(&selection, Some("sales"));
        assert_eq!(request.topic.as_deref(), Some("sales"));
        let encoded = serde_json::to_value(build_query_request(&selection, None))
            .expect("query should serialize");
        assert!(encoded.get("topic").is_none());
    }

    #[test]
    fn variables_skip_empty_keys_and_keep_last_value() {
        let merged = merge_variables(&[
            Variable::new("a", "1"),
            Variable::new("", "x"),
            Variable::new("a", "2"),
        ]);
        assert_eq!(
            serde_json::to_value(merged).expect("map should serialize"),
            json!({"a": "2"})
        );
    }

    #[test]
    fn blank_variable_from_panel_is_not_sent() {
        let mut selection = QuerySelectionState::new();
        selection.toggle_dimension("orders.status");
        selection.add_variable();
        selection.add_variable();
        selection
            .update_variable(
                1,
                VariableUpdate {
                    key: Some("region".to_string()),
                    value: Some("emea".to_string()),
                },
            )
            .expect("variable exists");

        let request = build_query_request(&selection, None);
        assert_eq!(request.variables.len(), 1);
        assert_eq!(request.variables.get("region"), Some(&json!("emea")));
    }
}
