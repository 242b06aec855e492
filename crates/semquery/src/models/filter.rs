use std::fmt::{Display, Formatter};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use super::field::FieldType;

/// Operator family. Each family owns exactly one value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorFamily {
    Scalar,
    List,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    InDateRange,
    NotInDateRange,
}

impl FilterOp {
    pub const ALL: [Self; 10] = [
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::NotIn,
        Self::InDateRange,
        Self::NotInDateRange,
    ];

    #[must_use]
    pub const fn family(self) -> OperatorFamily {
        match self {
            Self::Eq | Self::Neq | Self::Gt | Self::Gte | Self::Lt | Self::Lte => {
                OperatorFamily::Scalar
            }
            Self::In | Self::NotIn => OperatorFamily::List,
            Self::InDateRange | Self::NotInDateRange => OperatorFamily::Range,
        }
    }

    /// Range operators are only offered for date and datetime fields.
    #[must_use]
    pub fn is_available_for(self, field_type: Option<FieldType>) -> bool {
        match self.family() {
            OperatorFamily::Range => field_type.is_some_and(FieldType::is_temporal),
            OperatorFamily::Scalar | OperatorFamily::List => true,
        }
    }

    #[must_use]
    pub fn available_for(field_type: Option<FieldType>) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|op| op.is_available_for(field_type))
            .collect()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::InDateRange => "in_date_range",
            Self::NotInDateRange => "not_in_date_range",
        }
    }

    fn as_scalar(self) -> Option<ScalarOp> {
        match self {
            Self::Eq => Some(ScalarOp::Eq),
            Self::Neq => Some(ScalarOp::Neq),
            Self::Gt => Some(ScalarOp::Gt),
            Self::Gte => Some(ScalarOp::Gte),
            Self::Lt => Some(ScalarOp::Lt),
            Self::Lte => Some(ScalarOp::Lte),
            _ => None,
        }
    }

    fn as_list(self) -> Option<ListOp> {
        match self {
            Self::In => Some(ListOp::In),
            Self::NotIn => Some(ListOp::NotIn),
            _ => None,
        }
    }

    fn as_range(self) -> Option<RangeOp> {
        match self {
            Self::InDateRange => Some(RangeOp::InDateRange),
            Self::NotInDateRange => Some(RangeOp::NotInDateRange),
            _ => None,
        }
    }
}

impl Display for FilterOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScalarOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListOp {
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RangeOp {
    InDateRange,
    NotInDateRange,
}

impl From<ScalarOp> for FilterOp {
    fn from(op: ScalarOp) -> Self {
        match op {
            ScalarOp::Eq => Self::Eq,
            ScalarOp::Neq => Self::Neq,
            ScalarOp::Gt => Self::Gt,
            ScalarOp::Gte => Self::Gte,
            ScalarOp::Lt => Self::Lt,
            ScalarOp::Lte => Self::Lte,
        }
    }
}

impl From<ListOp> for FilterOp {
    fn from(op: ListOp) -> Self {
        match op {
            ListOp::In => Self::In,
            ListOp::NotIn => Self::NotIn,
        }
    }
}

impl From<RangeOp> for FilterOp {
    fn from(op: RangeOp) -> Self {
        match op {
            RangeOp::InDateRange => Self::InDateRange,
            RangeOp::NotInDateRange => Self::NotInDateRange,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl ScalarValue {
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ListItem {
    Number(Number),
    Text(String),
}

impl Display for ListItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ListItem {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ListItem {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Absolute timestamp or relative expression ("7 days ago"). Relative
/// expressions are resolved server-side and never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DateValue(pub String);

impl DateValue {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.0.trim().is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ScalarFilter {
    pub field: String,
    pub op: ScalarOp,

    #[serde(default)]
    pub value: Option<ScalarValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListFilter {
    pub field: String,
    pub op: ListOp,

    #[serde(default)]
    pub values: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RangeFilter {
    pub field: String,
    pub op: RangeOp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateValue>,

    /// Single expression covering the whole range, e.g. "last 7 days".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
}

impl RangeFilter {
    fn unset(field: String, op: RangeOp) -> Self {
        Self {
            field,
            op,
            from: None,
            to: None,
            relative: None,
        }
    }
}

/// One filter. The variant is the operator family, so a filter can never
/// carry value fields of two shapes at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Filter {
    Scalar(ScalarFilter),
    List(ListFilter),
    Range(RangeFilter),
}

impl Filter {
    /// Fresh filter as appended by the panel: `eq` with an empty value.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self::scalar(field, ScalarOp::Eq, ScalarValue::empty())
    }

    #[must_use]
    pub fn scalar(field: impl Into<String>, op: ScalarOp, value: impl Into<ScalarValue>) -> Self {
        Self::Scalar(ScalarFilter {
            field: field.into(),
            op,
            value: Some(value.into()),
        })
    }

    #[must_use]
    pub fn list<I, V>(field: impl Into<String>, op: ListOp, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ListItem>,
    {
        Self::List(ListFilter {
            field: field.into(),
            op,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    #[must_use]
    pub fn date_range(
        field: impl Into<String>,
        op: RangeOp,
        from: Option<DateValue>,
        to: Option<DateValue>,
    ) -> Self {
        Self::Range(RangeFilter {
            field: field.into(),
            op,
            from,
            to,
            relative: None,
        })
    }

    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Scalar(filter) => &filter.field,
            Self::List(filter) => &filter.field,
            Self::Range(filter) => &filter.field,
        }
    }

    #[must_use]
    pub fn op(&self) -> FilterOp {
        match self {
            Self::Scalar(filter) => filter.op.into(),
            Self::List(filter) => filter.op.into(),
            Self::Range(filter) => filter.op.into(),
        }
    }

    #[must_use]
    pub fn family(&self) -> OperatorFamily {
        match self {
            Self::Scalar(_) => OperatorFamily::Scalar,
            Self::List(_) => OperatorFamily::List,
            Self::Range(_) => OperatorFamily::Range,
        }
    }

    /// Whether the filter carries enough value to be sent. Partially edited
    /// filters stay in the panel but are left out of requests.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        match self {
            Self::Scalar(filter) => filter
                .value
                .as_ref()
                .is_some_and(|value| !value.is_empty()),
            Self::List(filter) => !filter.values.is_empty(),
            Self::Range(filter) => {
                let bounded = filter.from.as_ref().is_some_and(DateValue::is_set)
                    && filter.to.as_ref().is_some_and(DateValue::is_set);
                let relative = filter
                    .relative
                    .as_deref()
                    .is_some_and(|expression| !expression.trim().is_empty());
                bounded || relative
            }
        }
    }

    /// Rebuilds the filter in the shape of `op`'s family. Only state that is
    /// valid for the new shape survives.
    #[must_use]
    pub fn with_operator(self, op: FilterOp) -> Self {
        let field = self.field().to_string();
        match (self, op.family()) {
            (Self::Scalar(mut filter), OperatorFamily::Scalar) => {
                if let Some(scalar_op) = op.as_scalar() {
                    filter.op = scalar_op;
                }
                Self::Scalar(filter)
            }
            (_, OperatorFamily::Scalar) => Self::Scalar(ScalarFilter {
                field,
                op: op.as_scalar().unwrap_or(ScalarOp::Eq),
                value: Some(ScalarValue::empty()),
            }),
            (Self::List(mut filter), OperatorFamily::List) => {
                if let Some(list_op) = op.as_list() {
                    filter.op = list_op;
                }
                Self::List(filter)
            }
            (_, OperatorFamily::List) => Self::List(ListFilter {
                field,
                op: op.as_list().unwrap_or(ListOp::In),
                values: Vec::new(),
            }),
            (Self::Range(mut filter), OperatorFamily::Range) => {
                if let Some(range_op) = op.as_range() {
                    filter.op = range_op;
                }
                Self::Range(filter)
            }
            (_, OperatorFamily::Range) => Self::Range(RangeFilter::unset(
                field,
                op.as_range().unwrap_or(RangeOp::InDateRange),
            )),
        }
    }

    /// Points the filter at another field. The value survives only when the
    /// semantic type is unchanged; a range filter moved onto a non-temporal
    /// field falls back to an empty `eq`.
    #[must_use]
    pub fn with_field(
        self,
        field: impl Into<String>,
        old_type: Option<FieldType>,
        new_type: Option<FieldType>,
    ) -> Self {
        let field = field.into();
        let range_unavailable = matches!(self, Self::Range(_))
            && !FilterOp::InDateRange.is_available_for(new_type);
        if range_unavailable {
            return Self::new(field);
        }

        let mut moved = self.renamed(field);
        if old_type != new_type {
            moved = moved.cleared();
        }
        moved
    }

    /// Same shape and operator, empty value.
    #[must_use]
    pub fn cleared(self) -> Self {
        match self {
            Self::Scalar(filter) => Self::Scalar(ScalarFilter {
                value: Some(ScalarValue::empty()),
                ..filter
            }),
            Self::List(filter) => Self::List(ListFilter {
                values: Vec::new(),
                ..filter
            }),
            Self::Range(filter) => Self::Range(RangeFilter::unset(filter.field, filter.op)),
        }
    }

    fn renamed(self, field: String) -> Self {
        match self {
            Self::Scalar(filter) => Self::Scalar(ScalarFilter { field, ..filter }),
            Self::List(filter) => Self::List(ListFilter { field, ..filter }),
            Self::Range(filter) => Self::Range(RangeFilter { field, ..filter }),
        }
    }
}

/// Input control offered for a filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Numeric,
    Date,
    DateTime,
    Boolean,
    Text,
}

impl InputKind {
    #[must_use]
    pub const fn for_field_type(field_type: Option<FieldType>) -> Self {
        match field_type {
            Some(FieldType::Number) => Self::Numeric,
            Some(FieldType::Date) => Self::Date,
            Some(FieldType::Datetime) => Self::DateTime,
            Some(FieldType::Boolean) => Self::Boolean,
            Some(FieldType::String) | None => Self::Text,
        }
    }
}
