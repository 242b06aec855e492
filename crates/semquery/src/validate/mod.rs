//! Advisory checks for filter values.
//!
//! Hints are rendered next to the offending control. They never block
//! building or sending a request and never turn into a compile or execution
//! error.

use serde::{Deserialize, Serialize};

use crate::models::{FieldCatalog, FieldType, Filter, FilterOp, InputKind, ListItem, ScalarValue};
use crate::utils::time::{parse_calendar_date, parse_datetime};

const BOOLEAN_LITERALS: [&str; 4] = ["true", "false", "1", "0"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputHintKind {
    UnknownField,
    OperatorUnavailable,
    NotNumeric,
    NotBoolean,
    NotDate,
    NotDateTime,
}

impl InputHintKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownField => "unknown_field",
            Self::OperatorUnavailable => "operator_unavailable",
            Self::NotNumeric => "not_numeric",
            Self::NotBoolean => "not_boolean",
            Self::NotDate => "not_date",
            Self::NotDateTime => "not_datetime",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputHint {
    pub filter_index: usize,
    pub kind: InputHintKind,
    pub detail: String,
}

#[must_use]
pub fn check_filters(filters: &[Filter], catalog: &FieldCatalog) -> Vec<InputHint> {
    filters
        .iter()
        .enumerate()
        .flat_map(|(filter_index, filter)| {
            let Some((_, field)) = catalog.find(filter.field()) else {
                return vec![InputHint {
                    filter_index,
                    kind: InputHintKind::UnknownField,
                    detail: format!("field `{}` is not in the catalog", filter.field()),
                }];
            };
            check_filter(filter, field.field_type)
                .into_iter()
                .map(|(kind, detail)| InputHint {
                    filter_index,
                    kind,
                    detail,
                })
                .collect()
        })
        .collect()
}

/// Checks one filter against its field type. Empty values are not flagged;
/// they simply keep the filter out of the request.
#[must_use]
pub fn check_filter(
    filter: &Filter,
    field_type: Option<FieldType>,
) -> Vec<(InputHintKind, String)> {
    let mut hints = Vec::new();
    if !filter.op().is_available_for(field_type) {
        hints.push((
            InputHintKind::OperatorUnavailable,
            format!(
                "operator `{}` is not offered for {} fields",
                filter.op(),
                field_type.map_or("untyped", FieldType::as_str)
            ),
        ));
    }

    let input_kind = InputKind::for_field_type(field_type);
    match filter {
        Filter::Scalar(scalar) => {
            let flagged = scalar
                .value
                .as_ref()
                .filter(|value| !value.is_empty())
                .and_then(|value| check_scalar(input_kind, value).map(|kind| (kind, value)));
            if let Some((kind, value)) = flagged {
                hints.push((kind, mismatch_detail(input_kind, value)));
            }
        }
        Filter::List(list) => {
            for item in &list.values {
                if let Some(kind) = check_list_item(input_kind, item) {
                    hints.push((kind, mismatch_detail(input_kind, item)));
                }
            }
        }
        // Endpoints that do not parse as timestamps are relative expressions
        // and are resolved server-side.
        Filter::Range(_) => {}
    }
    hints
}

#[must_use]
pub fn check_scalar(input_kind: InputKind, value: &ScalarValue) -> Option<InputHintKind> {
    match (input_kind, value) {
        (InputKind::Text, _) => None,
        (InputKind::Numeric, ScalarValue::Number(_)) => None,
        (InputKind::Boolean, ScalarValue::Bool(_)) => None,
        (InputKind::Boolean, ScalarValue::Number(number)) => {
            check_text(input_kind, &number.to_string())
        }
        (_, ScalarValue::Text(text)) => check_text(input_kind, text),
        (_, ScalarValue::Bool(_) | ScalarValue::Number(_)) => mismatch_kind(input_kind),
    }
}

fn check_list_item(input_kind: InputKind, item: &ListItem) -> Option<InputHintKind> {
    match item {
        ListItem::Number(number) => {
            check_scalar(input_kind, &ScalarValue::Number(number.clone()))
        }
        ListItem::Text(text) => check_text(input_kind, text),
    }
}

/// Validates raw text typed into an input of `input_kind`.
#[must_use]
pub fn check_text(input_kind: InputKind, raw: &str) -> Option<InputHintKind> {
    let candidate = raw.trim();
    let fits = match input_kind {
        InputKind::Text => true,
        InputKind::Numeric => candidate.parse::<f64>().is_ok_and(f64::is_finite),
        InputKind::Boolean => BOOLEAN_LITERALS
            .iter()
            .any(|literal| candidate.eq_ignore_ascii_case(literal)),
        InputKind::Date => parse_calendar_date(candidate).is_ok(),
        InputKind::DateTime => parse_datetime(candidate).is_ok(),
    };
    if fits {
        None
    } else {
        mismatch_kind(input_kind)
    }
}

fn mismatch_detail(input_kind: InputKind, value: &impl std::fmt::Display) -> String {
    format!("value `{value}` does not fit a {input_kind:?} input")
}

/// Hint raised when a value does not fit `input_kind`. Text inputs accept
/// anything.
const fn mismatch_kind(input_kind: InputKind) -> Option<InputHintKind> {
    match input_kind {
        InputKind::Text => None,
        InputKind::Numeric => Some(InputHintKind::NotNumeric),
        InputKind::Boolean => Some(InputHintKind::NotBoolean),
        InputKind::Date => Some(InputHintKind::NotDate),
        InputKind::DateTime => Some(InputHintKind::NotDateTime),
    }
}

/// Operators the panel offers for a field of `field_type`.
#[must_use]
pub fn operators_for(field_type: Option<FieldType>) -> Vec<FilterOp> {
    FilterOp::available_for(field_type)
}
