//! Mutable selection aggregate behind one query panel.
//!
//! Selected fields and sort orders live in one value so that deselecting a
//! field and dropping the orders that reference it happen in the same
//! transition. Every [`Order::field`] is a member of the selected dimensions
//! or measures in every reachable state.

use thiserror::Error;

use crate::models::{Direction, FieldKind, Filter, Order, Variable, VariableUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Filters,
    Orders,
    Variables,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filters => "filters",
            Self::Orders => "orders",
            Self::Variables => "variables",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("{collection} index {index} out of range (len {len})")]
    IndexOutOfRange {
        collection: Collection,
        index: usize,
        len: usize,
    },

    #[error("order field `{field}` is not a selected dimension or measure")]
    OrderFieldNotSelected { field: String },

    #[error("no dimension or measure selected")]
    NothingSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed { orders_dropped: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySelectionState {
    selected_dimensions: Vec<String>,
    selected_measures: Vec<String>,
    filters: Vec<Filter>,
    orders: Vec<Order>,
    variables: Vec<Variable>,
}

impl QuerySelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selected_dimensions(&self) -> &[String] {
        &self.selected_dimensions
    }

    #[must_use]
    pub fn selected_measures(&self) -> &[String] {
        &self.selected_measures
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Compile and execute both require at least one selected field.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected_dimensions.is_empty() || !self.selected_measures.is_empty()
    }

    #[must_use]
    pub fn is_selected(&self, full_name: &str) -> bool {
        self.selected_dimensions.iter().any(|name| name == full_name)
            || self.selected_measures.iter().any(|name| name == full_name)
    }

    pub fn toggle_dimension(&mut self, full_name: &str) -> Toggle {
        self.toggle_field(FieldKind::Dimension, full_name)
    }

    pub fn toggle_measure(&mut self, full_name: &str) -> Toggle {
        self.toggle_field(FieldKind::Measure, full_name)
    }

    /// Appends an absent field; removes a present one together with every
    /// order that sorts by it.
    pub fn toggle_field(&mut self, kind: FieldKind, full_name: &str) -> Toggle {
        let selected = match kind {
            FieldKind::Dimension => &mut self.selected_dimensions,
            FieldKind::Measure => &mut self.selected_measures,
        };

        if let Some(position) = selected.iter().position(|name| name == full_name) {
            selected.remove(position);
            let before = self.orders.len();
            if !self.is_selected(full_name) {
                self.orders.retain(|order| order.field != full_name);
            }
            Toggle::Removed {
                orders_dropped: before - self.orders.len(),
            }
        } else {
            selected.push(full_name.to_string());
            Toggle::Added
        }
    }

    pub fn add_filter(&mut self, initial_field: impl Into<String>) {
        self.filters.push(Filter::new(initial_field));
    }

    pub fn update_filter(&mut self, index: usize, filter: Filter) -> Result<(), SelectionError> {
        let slot = slot_mut(&mut self.filters, Collection::Filters, index)?;
        *slot = filter;
        Ok(())
    }

    /// Replaces the filter at `index` with `edit(current)`.
    pub fn edit_filter(
        &mut self,
        index: usize,
        edit: impl FnOnce(Filter) -> Filter,
    ) -> Result<&Filter, SelectionError> {
        let slot = slot_mut(&mut self.filters, Collection::Filters, index)?;
        *slot = edit(slot.clone());
        Ok(&*slot)
    }

    pub fn remove_filter(&mut self, index: usize) -> Result<Filter, SelectionError> {
        check_index(self.filters.len(), Collection::Filters, index)?;
        Ok(self.filters.remove(index))
    }

    /// Sorts ascending by the first selected dimension, else the first
    /// selected measure.
    pub fn add_order(&mut self) -> Result<&Order, SelectionError> {
        let field = self
            .selected_dimensions
            .first()
            .or_else(|| self.selected_measures.first())
            .cloned()
            .ok_or(SelectionError::NothingSelected)?;
        self.orders.push(Order::new(field, Direction::Asc));
        let last = self.orders.len() - 1;
        Ok(&self.orders[last])
    }

    pub fn update_order(&mut self, index: usize, order: Order) -> Result<(), SelectionError> {
        check_index(self.orders.len(), Collection::Orders, index)?;
        if !self.is_selected(&order.field) {
            return Err(SelectionError::OrderFieldNotSelected { field: order.field });
        }
        self.orders[index] = order;
        Ok(())
    }

    pub fn remove_order(&mut self, index: usize) -> Result<Order, SelectionError> {
        check_index(self.orders.len(), Collection::Orders, index)?;
        Ok(self.orders.remove(index))
    }

    pub fn add_variable(&mut self) {
        self.variables.push(Variable::default());
    }

    pub fn update_variable(
        &mut self,
        index: usize,
        updates: VariableUpdate,
    ) -> Result<(), SelectionError> {
        let slot = slot_mut(&mut self.variables, Collection::Variables, index)?;
        if let Some(key) = updates.key {
            slot.key = key;
        }
        if let Some(value) = updates.value {
            slot.value = value;
        }
        Ok(())
    }

    pub fn remove_variable(&mut self, index: usize) -> Result<Variable, SelectionError> {
        check_index(self.variables.len(), Collection::Variables, index)?;
        Ok(self.variables.remove(index))
    }
}

fn check_index(len: usize, collection: Collection, index: usize) -> Result<(), SelectionError> {
    if index < len {
        Ok(())
    } else {
        Err(SelectionError::IndexOutOfRange {
            collection,
            index,
            len,
        })
    }
}

fn slot_mut<T>(
    items: &mut [T],
    collection: Collection,
    index: usize,
) -> Result<&mut T, SelectionError> {
    let len = items.len();
    items.get_mut(index).ok_or(SelectionError::IndexOutOfRange {
        collection,
        index,
        len,
    })
}

#[cfg(test)]
mod tests {
    use super::{Collection, QuerySelectionState, SelectionError, Toggle};
    use crate::models::{Direction, Filter, Order, VariableUpdate};

    #[test]
    fn toggle_appends_in_selection_order() {
        let mut state = QuerySelectionState::new();
        state.toggle_dimension("orders.status");
        state.toggle_dimension("orders.region");
        state.toggle_measure("orders.total");

        assert_eq!(state.selected_dimensions(), ["orders.status", "orders.region"]);
        assert_eq!(state.selected_measures(), ["orders.total"]);
        assert!(state.has_selection());
    }

    #[test]
    fn removing_a_field_drops_its_orders() {
        let mut state = QuerySelectionState::new();
        state.toggle_dimension("orders.status");
        state.toggle_measure("orders.total");
        state.add_order().expect("order should be added");
        state
            .update_order(0, Order::new("orders.total", Direction::Desc))
            .expect("selected field may be ordered");
        state.add_order().expect("second order should be added");

        let toggle = state.toggle_measure("orders.total");

        assert_eq!(toggle, Toggle::Removed { orders_dropped: 1 });
        assert_eq!(state.orders(), [Order::new("orders.status", Direction::Asc)]);
    }

    #[test]
    fn add_order_without_selection_is_a_no_op() {
        let mut state = QuerySelectionState::new();
        assert_eq!(state.add_order(), Err(SelectionError::NothingSelected));
        assert!(state.orders().is_empty());
    }

    #[test]
    fn add_order_falls_back_to_first_measure() {
        let mut state = QuerySelectionState::new();
        state.toggle_measure("orders.total");
        let order = state.add_order().expect("measure can be ordered").clone();
        assert_eq!(order, Order::new("orders.total", Direction::Asc));
    }

    #[test]
    fn update_order_rejects_unselected_field() {
        let mut state = QuerySelectionState::new();
        state.toggle_dimension("orders.status");
        state.add_order().expect("order should be added");

        let error = state
            .update_order(0, Order::new("orders.total", Direction::Desc))
            .expect_err("unselected field must be rejected");
        assert_eq!(
            error,
            SelectionError::OrderFieldNotSelected {
                field: "orders.total".to_string()
            }
        );
        assert_eq!(state.orders()[0].field, "orders.status");
    }

    #[test]
    fn positional_edits_report_out_of_range() {
        let mut state = QuerySelectionState::new();
        state.add_filter("orders.status");

        assert_eq!(
            state.remove_filter(3),
            Err(SelectionError::IndexOutOfRange {
                collection: Collection::Filters,
                index: 3,
                len: 1,
            })
        );
        assert!(state.update_variable(0, VariableUpdate::default()).is_err());
        assert_eq!(state.filters(), [Filter::new("orders.status")]);
    }

    #[test]
    fn update_variable_merges_only_given_parts() {
        let mut state = QuerySelectionState::new();
        state.add_variable();
        state
            .update_variable(
                0,
                VariableUpdate {
                    key: Some("region".to_string()),
                    value: None,
                },
            )
            .expect("variable exists");
        state
            .update_variable(
                0,
                VariableUpdate {
                    key: None,
                    value: Some("emea".to_string()),
                },
            )
            .expect("variable exists");

        assert_eq!(state.variables()[0].key, "region");
        assert_eq!(state.variables()[0].value, "emea");

        state.remove_variable(0).expect("variable exists");
        assert!(state.variables().is_empty());
    }
}
