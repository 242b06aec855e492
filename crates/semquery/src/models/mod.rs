pub mod field;
pub mod filter;
pub mod query;

pub use field::{Field, FieldCatalog, FieldKind, FieldType};
pub use filter::{
    DateValue, Filter, FilterOp, InputKind, ListFilter, ListItem, ListOp, OperatorFamily,
    RangeFilter, RangeOp, ScalarFilter, ScalarOp, ScalarValue,
};
pub use query::{
    CompileRequest, CompileResponse, Direction, ExecuteRequest, Order, QueryRequest,
    QueryResult, ResultFileRef, ResultFormat, Variable, VariableUpdate, json_schema,
};
