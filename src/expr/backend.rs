//! Backend emission capability.
//!
//! The expression tree is defined once; each backend supplies only its
//! emission rules. The SQL backend renders infix text through the active
//! dialect, the pipeline backend builds keyed operator objects.

use serde_json::{json, Value};

use crate::error::{QueryError, QueryResult};
use crate::expr::fragment::FragmentValue;
use crate::expr::functions;
use crate::expr::ScalarValue;
use crate::model::ModelColumn;
use crate::sql::dialect::{Dialect, SqlDialect};

/// Emission rules for one backend.
pub trait EmitBackend: std::fmt::Debug {
    fn emit_literal(&self, value: &ScalarValue) -> FragmentValue;
    /// `qualifier` is the FROM-clause binding alias when the owning
    /// table declares one distinct from its name.
    fn emit_column_ref(&self, column: &ModelColumn, qualifier: Option<&str>) -> FragmentValue;
    fn emit_binary(
        &self,
        op: &str,
        left: &FragmentValue,
        right: &FragmentValue,
    ) -> QueryResult<FragmentValue>;
    fn emit_unary(&self, op: &str, operand: &FragmentValue) -> QueryResult<FragmentValue>;
    fn emit_call(&self, name: &str, args: &[FragmentValue]) -> FragmentValue;
}

/// SQL text emission for one dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlBackend {
    pub dialect: Dialect,
}

impl SqlBackend {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

fn text_of(value: &FragmentValue) -> &str {
    value.as_text().unwrap_or_default()
}

impl EmitBackend for SqlBackend {
    fn emit_literal(&self, value: &ScalarValue) -> FragmentValue {
        let text = match value {
            ScalarValue::Null => "NULL".to_string(),
            ScalarValue::Bool(true) => "TRUE".to_string(),
            ScalarValue::Bool(false) => "FALSE".to_string(),
            ScalarValue::Int(i) => i.to_string(),
            ScalarValue::Float(f) => f.to_string(),
            ScalarValue::Text(s) => self.dialect.quote_string(s),
        };
        FragmentValue::Text(text)
    }

    fn emit_column_ref(&self, column: &ModelColumn, qualifier: Option<&str>) -> FragmentValue {
        FragmentValue::Text(column.declare(self.dialect, qualifier))
    }

    fn emit_binary(
        &self,
        op: &str,
        left: &FragmentValue,
        right: &FragmentValue,
    ) -> QueryResult<FragmentValue> {
        let sql_op = functions::sql_operator(op)?;
        Ok(FragmentValue::Text(format!(
            "({} {} {})",
            text_of(left),
            sql_op,
            text_of(right)
        )))
    }

    fn emit_unary(&self, op: &str, operand: &FragmentValue) -> QueryResult<FragmentValue> {
        match op {
            "-" => Ok(FragmentValue::Text(format!("(-{})", text_of(operand)))),
            "!" | "not" | "NOT" => Ok(FragmentValue::Text(format!("(NOT {})", text_of(operand)))),
            other => Err(QueryError::UnsupportedOperator(other.to_string())),
        }
    }

    fn emit_call(&self, name: &str, args: &[FragmentValue]) -> FragmentValue {
        let upper = name.to_ascii_uppercase();
        let name = self.dialect.remap_function(&upper).unwrap_or(&upper);
        let rendered: Vec<&str> = args.iter().map(text_of).collect();
        FragmentValue::Text(format!("{}({})", name, rendered.join(", ")))
    }
}

/// Pipeline-object emission for the document-store backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineBackend;

fn doc_of(value: &FragmentValue) -> Value {
    value.as_doc().cloned().unwrap_or(Value::Null)
}

impl EmitBackend for PipelineBackend {
    fn emit_literal(&self, value: &ScalarValue) -> FragmentValue {
        FragmentValue::Doc(value.to_json())
    }

    fn emit_column_ref(&self, column: &ModelColumn, _qualifier: Option<&str>) -> FragmentValue {
        let field = column.physical_column().unwrap_or(&column.name);
        FragmentValue::Doc(Value::String(format!("${}", field)))
    }

    fn emit_binary(
        &self,
        op: &str,
        left: &FragmentValue,
        right: &FragmentValue,
    ) -> QueryResult<FragmentValue> {
        let key = functions::pipeline_operator(op)?;
        Ok(FragmentValue::Doc(
            json!({ key: [doc_of(left), doc_of(right)] }),
        ))
    }

    fn emit_unary(&self, op: &str, operand: &FragmentValue) -> QueryResult<FragmentValue> {
        match op {
            // Negation has no pipeline operator of its own.
            "-" => Ok(FragmentValue::Doc(
                json!({ "$multiply": [doc_of(operand), -1] }),
            )),
            "!" | "not" | "NOT" => Ok(FragmentValue::Doc(json!({ "$not": [doc_of(operand)] }))),
            other => Err(QueryError::UnsupportedOperator(other.to_string())),
        }
    }

    fn emit_call(&self, name: &str, args: &[FragmentValue]) -> FragmentValue {
        let key = format!("${}", name.to_ascii_lowercase());
        let rendered: Vec<Value> = args.iter().map(doc_of).collect();
        FragmentValue::Doc(json!({ key: rendered }))
    }
}
