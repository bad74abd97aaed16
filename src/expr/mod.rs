//! The expression compiler.
//!
//! A closed sum type of expression nodes, compiled bottom-up into
//! `Fragment`s against a `CompileContext`. The tree shape mirrors what
//! the upstream scripting evaluator hands over; this layer owns
//! dependency tracking, type inference, aggregate detection and backend
//! emission.

pub mod backend;
pub mod context;
pub mod fragment;
pub mod functions;

pub use backend::{EmitBackend, PipelineBackend, SqlBackend};
pub use context::{CalculatedColumn, CompileContext, Evaluator};
pub use fragment::{Fragment, FragmentValue};
pub use functions::OperatorClass;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryResult;
use crate::model::ColumnType;

/// A literal value as supplied by the scripting layer or a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    /// Semantic type inferred from the value's shape.
    pub fn inferred_type(&self) -> ColumnType {
        match self {
            ScalarValue::Null => ColumnType::Unknown,
            ScalarValue::Bool(_) => ColumnType::Bool,
            ScalarValue::Int(_) => ColumnType::Integer,
            ScalarValue::Float(_) => ColumnType::Number,
            ScalarValue::Text(_) => ColumnType::Text,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ScalarValue::Null => Value::Null,
            ScalarValue::Bool(b) => Value::Bool(*b),
            ScalarValue::Int(i) => Value::from(*i),
            ScalarValue::Float(f) => Value::from(*f),
            ScalarValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Int(i)
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        ScalarValue::Float(f)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: ScalarValue,
        explicit_type: Option<ColumnType>,
    },
    ColumnRef(String),
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn literal(value: impl Into<ScalarValue>) -> Self {
        Expr::Literal {
            value: value.into(),
            explicit_type: None,
        }
    }

    pub fn typed_literal(value: impl Into<ScalarValue>, explicit_type: ColumnType) -> Self {
        Expr::Literal {
            value: value.into(),
            explicit_type: Some(explicit_type),
        }
    }

    pub fn column(name: impl Into<String>) -> Self {
        Expr::ColumnRef(name.into())
    }

    pub fn binary(left: Expr, op: impl Into<String>, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
        }
    }

    pub fn unary(op: impl Into<String>, operand: Expr) -> Self {
        Expr::Unary {
            op: op.into(),
            operand: Box::new(operand),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Compile this node bottom-up into a fragment.
    pub fn compile(&self, context: &mut CompileContext) -> QueryResult<Fragment> {
        match self {
            Expr::Literal {
                value,
                explicit_type,
            } => {
                let emitted = context.backend.emit_literal(value);
                let column_type = explicit_type.unwrap_or_else(|| value.inferred_type());
                Ok(Fragment::leaf(emitted, column_type))
            }

            Expr::ColumnRef(name) => {
                if let Some(fragment) = context.reference_calculated(name) {
                    return Ok(fragment);
                }
                let model = context.model.clone();
                let column = model.require_column(name)?;
                // Once the FROM clause binds an alias, the table name is
                // no longer addressable; qualify by the alias.
                let qualifier = column
                    .physical_table()
                    .and_then(|table| model.query_object(table))
                    .filter(|object| object.alias != object.name)
                    .map(|object| object.alias.as_str());
                let emitted = context.backend.emit_column_ref(column, qualifier);
                Ok(Fragment::column(
                    emitted,
                    column.referenced(),
                    column.column_type,
                ))
            }

            Expr::Binary { left, op, right } => {
                let left = left.compile(context)?;
                let right = right.compile(context)?;
                let class = functions::classify_operator(op)?;
                let emitted = context.backend.emit_binary(op, &left.value, &right.value)?;
                let column_type =
                    fragment::infer_binary_type(class, op, left.column_type, right.column_type);
                Ok(Fragment::compose(emitted, [&left, &right], column_type))
            }

            Expr::Unary { op, operand } => {
                let operand = operand.compile(context)?;
                let emitted = context.backend.emit_unary(op, &operand.value)?;
                let column_type = match op.as_str() {
                    "-" if operand.column_type.is_numeric() => operand.column_type,
                    "-" => ColumnType::Number,
                    _ => ColumnType::Bool,
                };
                Ok(Fragment::compose(emitted, [&operand], column_type))
            }

            Expr::Call { name, args } => {
                functions::check_allowed(name)?;
                let compiled: Vec<Fragment> = args
                    .iter()
                    .map(|arg| arg.compile(context))
                    .collect::<QueryResult<_>>()?;
                let values: Vec<FragmentValue> =
                    compiled.iter().map(|f| f.value.clone()).collect();
                let emitted = context.backend.emit_call(name, &values);
                let column_type = fragment::infer_call_type(name, &compiled);

                let mut out = Fragment::compose(emitted, compiled.iter(), column_type);
                if functions::is_aggregate(name) {
                    // The kind survives only when this call is the whole
                    // aggregate, not an aggregate over aggregates.
                    if !out.has_aggregate {
                        out.aggregation = functions::aggregation_kind(name);
                    }
                    out.has_aggregate = true;
                }
                Ok(out)
            }
        }
    }
}
