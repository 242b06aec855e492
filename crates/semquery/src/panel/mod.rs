//! Composition root for one query panel.
//!
//! The panel is sans-IO: [`PanelController::update`] applies a message and
//! hands back at most one [`PanelTask`] for the host to run against a
//! backend. Finished tasks come back in as [`PanelMessage::CompileFinished`]
//! or [`PanelMessage::ExecuteFinished`].

pub mod driver;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::BackendError;
use crate::builder::build_query_request;
use crate::compiler::{
    CompileOutcome, CompileResolution, CompileState, CompileTicket, ReactiveCompiler,
};
use crate::execution::{
    ExecuteRejected, ExecuteTicket, ExecutionOutcome, ExecutionState, QueryExecutionController,
};
use crate::models::{
    CompileResponse, FieldCatalog, FieldKind, Filter, FilterOp, Order, QueryRequest, QueryResult,
    VariableUpdate,
};
use crate::selection::{QuerySelectionState, SelectionError};
use crate::validate::{InputHint, check_filters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Sql,
    Results,
}

/// User-initiated panel edits. Also the line format of recorded sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PanelAction {
    ToggleDimension {
        field: String,
    },
    ToggleMeasure {
        field: String,
    },
    AddFilter {
        #[serde(default)]
        field: Option<String>,
    },
    UpdateFilter {
        index: usize,
        filter: Filter,
    },
    SetFilterOperator {
        index: usize,
        op: FilterOp,
    },
    SetFilterField {
        index: usize,
        field: String,
    },
    RemoveFilter {
        index: usize,
    },
    AddOrder,
    UpdateOrder {
        index: usize,
        order: Order,
    },
    RemoveOrder {
        index: usize,
    },
    AddVariable,
    UpdateVariable {
        index: usize,
        #[serde(default)]
        key: Option<String>,
        #[serde(default)]
        value: Option<String>,
    },
    RemoveVariable {
        index: usize,
    },
    SetViewMode {
        mode: ViewMode,
    },
    Execute,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelMessage {
    Action(PanelAction),
    CompileFinished {
        sequence: u64,
        result: Result<CompileResponse, BackendError>,
    },
    ExecuteFinished {
        sequence: u64,
        result: Result<QueryResult, BackendError>,
    },
}

impl From<PanelAction> for PanelMessage {
    fn from(action: PanelAction) -> Self {
        Self::Action(action)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelTask {
    Compile(CompileTicket),
    Execute(ExecuteTicket),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelRejection {
    #[error("`{field}` is not a {kind} in the catalog")]
    UnknownField { kind: FieldKind, field: String },

    #[error("`{field}` is not in the catalog")]
    UnknownFilterField { field: String },

    #[error("operator `{op}` is not offered for `{field}`")]
    OperatorUnavailable { op: FilterOp, field: String },

    #[error("catalog has no fields to filter on")]
    EmptyCatalog,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Execute(#[from] ExecuteRejected),
}

/// Everything a renderer needs from the panel at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub view_mode: ViewMode,
    pub compile_state: CompileState,
    pub execution_state: ExecutionState,
    pub can_execute: bool,
    pub request: QueryRequest,
    pub compile: CompileOutcome,
    pub execution: ExecutionOutcome,
    pub hints: Vec<InputHint>,
}

#[derive(Debug, Clone)]
pub struct PanelController {
    catalog: FieldCatalog,
    selection: QuerySelectionState,
    compiler: ReactiveCompiler,
    executor: QueryExecutionController,
    view_mode: ViewMode,
}

impl PanelController {
    /// Fresh panel for `catalog`; selection, filters, orders and variables
    /// start empty.
    #[must_use]
    pub fn new(catalog: FieldCatalog) -> Self {
        Self {
            catalog,
            selection: QuerySelectionState::new(),
            compiler: ReactiveCompiler::new(),
            executor: QueryExecutionController::new(),
            view_mode: ViewMode::default(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn selection(&self) -> &QuerySelectionState {
        &self.selection
    }

    #[must_use]
    pub fn compiler(&self) -> &ReactiveCompiler {
        &self.compiler
    }

    #[must_use]
    pub fn executor(&self) -> &QueryExecutionController {
        &self.executor
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[must_use]
    pub fn can_execute(&self) -> bool {
        self.executor.can_execute(&self.selection)
    }

    #[must_use]
    pub fn request(&self) -> QueryRequest {
        build_query_request(&self.selection, self.topic())
    }

    #[must_use]
    pub fn hints(&self) -> Vec<InputHint> {
        check_filters(self.selection.filters(), &self.catalog)
    }

    #[must_use]
    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            view_mode: self.view_mode,
            compile_state: self.compiler.state(),
            execution_state: self.executor.state(),
            can_execute: self.can_execute(),
            request: self.request(),
            compile: self.compiler.outcome().clone(),
            execution: self.executor.outcome().clone(),
            hints: self.hints(),
        }
    }

    pub fn update(
        &mut self,
        message: impl Into<PanelMessage>,
    ) -> Result<Option<PanelTask>, PanelRejection> {
        match message.into() {
            PanelMessage::Action(PanelAction::Execute) => {
                let topic = self.catalog.topic.as_deref();
                let ticket = self.executor.begin(&self.selection, topic)?;
                Ok(Some(PanelTask::Execute(ticket)))
            }
            PanelMessage::Action(PanelAction::SetViewMode { mode }) => {
                self.view_mode = mode;
                Ok(None)
            }
            PanelMessage::Action(action) => {
                self.apply_edit(action).inspect_err(|rejection| {
                    warn!(%rejection, "panel action rejected");
                })?;
                let topic = self.catalog.topic.as_deref();
                Ok(self
                    .compiler
                    .on_selection_changed(&self.selection, topic)
                    .map(PanelTask::Compile))
            }
            PanelMessage::CompileFinished { sequence, result } => {
                if self.compiler.resolve(sequence, result) == CompileResolution::Applied {
                    self.view_mode = ViewMode::Sql;
                }
                Ok(None)
            }
            PanelMessage::ExecuteFinished { sequence, result } => {
                if self.executor.resolve(sequence, result) {
                    self.view_mode = ViewMode::Results;
                }
                Ok(None)
            }
        }
    }

    fn topic(&self) -> Option<&str> {
        self.catalog.topic.as_deref()
    }

    fn apply_edit(&mut self, action: PanelAction) -> Result<(), PanelRejection> {
        match action {
            PanelAction::ToggleDimension { field } => {
                self.toggle(FieldKind::Dimension, &field)?;
            }
            PanelAction::ToggleMeasure { field } => {
                self.toggle(FieldKind::Measure, &field)?;
            }
            PanelAction::AddFilter { field } => {
                let field = match field {
                    Some(field) => field,
                    None => self
                        .catalog
                        .first_field()
                        .map(|field| field.full_name.clone())
                        .ok_or(PanelRejection::EmptyCatalog)?,
                };
                self.selection.add_filter(field);
            }
            PanelAction::UpdateFilter { index, filter } => {
                self.check_operator(filter.op(), filter.field())?;
                self.selection.update_filter(index, filter)?;
            }
            PanelAction::SetFilterOperator { index, op } => {
                if let Some(filter) = self.selection.filters().get(index) {
                    self.check_operator(op, filter.field())?;
                }
                self.selection
                    .edit_filter(index, |filter| filter.with_operator(op))?;
            }
            PanelAction::SetFilterField { index, field } => {
                let Some((_, target)) = self.catalog.find(&field) else {
                    return Err(PanelRejection::UnknownFilterField { field });
                };
                let new_type = target.field_type;
                let catalog = &self.catalog;
                self.selection.edit_filter(index, |filter| {
                    let old_type = catalog.field_type(filter.field());
                    filter.with_field(field, old_type, new_type)
                })?;
            }
            PanelAction::RemoveFilter { index } => {
                self.selection.remove_filter(index)?;
            }
            PanelAction::AddOrder => {
                self.selection.add_order()?;
            }
            PanelAction::UpdateOrder { index, order } => {
                self.selection.update_order(index, order)?;
            }
            PanelAction::RemoveOrder { index } => {
                self.selection.remove_order(index)?;
            }
            PanelAction::AddVariable => self.selection.add_variable(),
            PanelAction::UpdateVariable { index, key, value } => {
                self.selection
                    .update_variable(index, VariableUpdate { key, value })?;
            }
            PanelAction::RemoveVariable { index } => {
                self.selection.remove_variable(index)?;
            }
            PanelAction::SetViewMode { .. } | PanelAction::Execute => {}
        }
        Ok(())
    }

    /// Range operators only apply to date and datetime fields.
    fn check_operator(&self, op: FilterOp, field: &str) -> Result<(), PanelRejection> {
        if op.is_available_for(self.catalog.field_type(field)) {
            return Ok(());
        }
        Err(PanelRejection::OperatorUnavailable {
            op,
            field: field.to_string(),
        })
    }

    fn toggle(&mut self, kind: FieldKind, field: &str) -> Result<(), PanelRejection> {
        if !self.catalog.contains(kind, field) {
            return Err(PanelRejection::UnknownField {
                kind,
                field: field.to_string(),
            });
        }
        let toggle = self.selection.toggle_field(kind, field);
        debug!(field, ?kind, ?toggle, "field toggled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PanelAction, PanelController, PanelRejection, PanelTask, ViewMode};
    use crate::models::{
        DateValue, Field, FieldCatalog, FieldKind, FieldType, Filter, FilterOp, OperatorFamily,
        RangeOp,
    };

    fn panel() -> PanelController {
        PanelController::new(FieldCatalog::new(
            vec![Field::new("status", "orders.status", Some(FieldType::String))],
            vec![Field::new("total", "orders.total", Some(FieldType::Number))],
        ))
    }

    #[test]
    fn toggling_unknown_field_is_rejected_without_compile() {
        let mut panel = panel();
        let rejection = panel
            .update(PanelAction::ToggleDimension {
                field: "orders.total".to_string(),
            })
            .expect_err("measure is not a dimension");
        assert_eq!(
            rejection,
            PanelRejection::UnknownField {
                kind: FieldKind::Dimension,
                field: "orders.total".to_string(),
            }
        );
        assert_eq!(
            rejection.to_string(),
            "`orders.total` is not a dimension in the catalog"
        );
        assert_eq!(panel.compiler().last_issued(), 0);
    }

    #[test]
    fn add_filter_defaults_to_first_catalog_field() {
        let mut panel = panel();
        let task = panel
            .update(PanelAction::AddFilter { field: None })
            .expect("catalog has fields");
        assert!(task.is_none(), "nothing selected, nothing compiled");
        assert_eq!(panel.selection().filters()[0].field(), "orders.status");
    }

    #[test]
    fn view_mode_is_free_standing() {
        let mut panel = panel();
        panel
            .update(PanelAction::SetViewMode {
                mode: ViewMode::Results,
            })
            .expect("view mode always switches");
        assert_eq!(panel.view_mode(), ViewMode::Results);
    }

    #[test]
    fn execute_task_carries_topic() {
        let mut panel = PanelController::new(
            FieldCatalog::new(
                Vec::new(),
                vec![Field::new("total", "orders.total", Some(FieldType::Number))],
            )
            .with_topic("sales"),
        );
        let compile = panel
            .update(PanelAction::ToggleMeasure {
                field: "orders.total".to_string(),
            })
            .expect("measure exists");
        match compile {
            Some(PanelTask::Compile(ticket)) => {
                assert_eq!(ticket.request.query.topic.as_deref(), Some("sales"));
            }
            other => panic!("expected compile task, got {other:?}"),
        }

        let execute = panel.update(PanelAction::Execute).expect("selection present");
        match execute {
            Some(PanelTask::Execute(ticket)) => {
                assert_eq!(ticket.request.query.topic.as_deref(), Some("sales"));
            }
            other => panic!("expected execute task, got {other:?}"),
        }
    }

    #[test]
    fn session_actions_decode_from_json() {
        let actions: Vec<PanelAction> = serde_json::from_str(
            r#"[
                {"action": "toggle_dimension", "field": "orders.status"},
                {"action": "add_filter"},
                {"action": "set_filter_operator", "index": 0, "op": "in"},
                {"action": "update_variable", "index": 0, "value": "x"},
                {"action": "execute"}
            ]"#,
        )
        .expect("session should decode");
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[1], PanelAction::AddFilter { field: None });
        assert_eq!(actions[4], PanelAction::Execute);
    }

    #[test]
    fn range_operator_is_refused_on_non_temporal_fields() {
        let mut panel = panel();
        panel
            .update(PanelAction::ToggleDimension {
                field: "orders.status".to_string(),
            })
            .expect("known dimension");
        panel
            .update(PanelAction::AddFilter { field: None })
            .expect("catalog has fields");
        let issued = panel.compiler().last_issued();

        let rejection = panel
            .update(PanelAction::SetFilterOperator {
                index: 0,
                op: FilterOp::InDateRange,
            })
            .expect_err("status is a string field");
        assert_eq!(
            rejection,
            PanelRejection::OperatorUnavailable {
                op: FilterOp::InDateRange,
                field: "orders.status".to_string(),
            }
        );
        assert_eq!(
            rejection.to_string(),
            "operator `in_date_range` is not offered for `orders.status`"
        );

        let replaced = panel.update(PanelAction::UpdateFilter {
            index: 0,
            filter: Filter::date_range(
                "orders.status",
                RangeOp::NotInDateRange,
                Some(DateValue::new("7 days ago")),
                Some(DateValue::new("now")),
            ),
        });
        assert!(matches!(
            replaced,
            Err(PanelRejection::OperatorUnavailable {
                op: FilterOp::NotInDateRange,
                ..
            })
        ));

        assert_eq!(panel.compiler().last_issued(), issued, "no compile issued");
        assert_eq!(
            panel.selection().filters()[0].family(),
            OperatorFamily::Scalar
        );
    }

    #[test]
    fn range_operator_is_accepted_on_date_fields() {
        let mut panel = PanelController::new(FieldCatalog::new(
            vec![Field::new("ordered_on", "orders.ordered_on", Some(FieldType::Date))],
            Vec::new(),
        ));
        panel
            .update(PanelAction::AddFilter { field: None })
            .expect("catalog has fields");
        panel
            .update(PanelAction::SetFilterOperator {
                index: 0,
                op: FilterOp::InDateRange,
            })
            .expect("date fields take range operators");
        assert_eq!(
            panel.selection().filters()[0].family(),
            OperatorFamily::Range
        );
    }
}
