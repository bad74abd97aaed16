//! Compiled-expression fragments and the type-inference policy.
//!
//! A fragment is the unit the expression compiler produces: the backend
//! value (SQL text or a pipeline object), the physical columns it reads,
//! an inferred semantic type, and aggregate metadata.
//!
//! Aggregate metadata keeps two distinct facts apart: `has_aggregate`
//! ("an aggregate appears somewhere in here") and `aggregation` ("this
//! fragment is exactly one top-level aggregate call"). Every composing
//! node clears `aggregation`; only the single-call case keeps it.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::expr::functions::OperatorClass;
use crate::model::{Aggregation, ColumnId, ColumnType};

/// The backend representation of a compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentValue {
    /// SQL text.
    Text(String),
    /// A pipeline-stage object.
    Doc(Value),
}

impl FragmentValue {
    /// SQL text, when this is the SQL backend's output.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FragmentValue::Text(s) => Some(s),
            FragmentValue::Doc(_) => None,
        }
    }

    /// Pipeline object, when this is the document backend's output.
    pub fn as_doc(&self) -> Option<&Value> {
        match self {
            FragmentValue::Text(_) => None,
            FragmentValue::Doc(v) => Some(v),
        }
    }
}

/// A compiled expression plus its dependency and type metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub value: FragmentValue,
    pub referenced: BTreeSet<ColumnId>,
    pub column_type: ColumnType,
    pub has_aggregate: bool,
    /// Set only when the fragment is exactly one top-level aggregate call.
    pub aggregation: Option<Aggregation>,
}

impl Fragment {
    /// A leaf fragment with no column dependencies.
    pub fn leaf(value: FragmentValue, column_type: ColumnType) -> Self {
        Self {
            value,
            referenced: BTreeSet::new(),
            column_type,
            has_aggregate: false,
            aggregation: None,
        }
    }

    /// A column-reference fragment.
    pub fn column(
        value: FragmentValue,
        referenced: BTreeSet<ColumnId>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            value,
            referenced,
            column_type,
            has_aggregate: false,
            aggregation: None,
        }
    }

    /// Compose a parent fragment over its children: referenced columns
    /// union, `has_aggregate` ORs, `aggregation` is cleared.
    pub fn compose<'a>(
        value: FragmentValue,
        children: impl IntoIterator<Item = &'a Fragment>,
        column_type: ColumnType,
    ) -> Self {
        let mut referenced = BTreeSet::new();
        let mut has_aggregate = false;
        for child in children {
            referenced.extend(child.referenced.iter().cloned());
            has_aggregate |= child.has_aggregate;
        }
        Self {
            value,
            referenced,
            column_type,
            has_aggregate,
            aggregation: None,
        }
    }

    /// SQL text of this fragment; empty for pipeline fragments.
    pub fn text(&self) -> &str {
        self.value.as_text().unwrap_or_default()
    }

    /// Tables this fragment reads from.
    pub fn referenced_tables(&self) -> BTreeSet<String> {
        self.referenced.iter().map(|c| c.table.clone()).collect()
    }
}

// =============================================================================
// Type Inference
// =============================================================================

/// Result type of a binary operation.
///
/// Comparison and logical operators yield BOOL. Arithmetic yields
/// INTEGER only when both sides are INTEGER and the operator is not
/// division; everything else numeric (NUMBER and MONEY included)
/// widens to NUMBER.
pub fn infer_binary_type(class: OperatorClass, op: &str, left: ColumnType, right: ColumnType) -> ColumnType {
    match class {
        OperatorClass::Comparison | OperatorClass::Logical => ColumnType::Bool,
        OperatorClass::Arithmetic => {
            if left == ColumnType::Integer && right == ColumnType::Integer && op != "/" {
                ColumnType::Integer
            } else {
                ColumnType::Number
            }
        }
    }
}

/// Result type of a function call, by a fixed per-function table.
///
/// Functions outside the table yield UNKNOWN rather than a guess.
pub fn infer_call_type(name: &str, args: &[Fragment]) -> ColumnType {
    let first_arg = args.first().map(|f| f.column_type).unwrap_or_default();
    match name.to_ascii_uppercase().as_str() {
        "ABS" | "CEIL" | "CEILING" | "FLOOR" | "ROUND" | "TRUNCATE" | "MOD" | "POWER" | "SQRT"
        | "EXP" | "LN" | "LOG" | "RAND" => ColumnType::Number,
        "SIGN" | "YEAR" | "MONTH" | "DAY" | "HOUR" | "MINUTE" | "SECOND" | "QUARTER" | "WEEK"
        | "DAYOFWEEK" | "DAYOFYEAR" | "DATEDIFF" => ColumnType::Integer,
        "NOW" | "CURDATE" | "CURTIME" | "DATE" | "DATE_ADD" | "DATE_SUB" | "STR_TO_DATE"
        | "LAST_DAY" => ColumnType::DateTime,
        "LENGTH" | "CHAR_LENGTH" | "LEN" | "INSTR" | "LOCATE" => ColumnType::Integer,
        "CONCAT" | "CONCAT_WS" | "UPPER" | "LOWER" | "TRIM" | "LTRIM" | "RTRIM" | "SUBSTRING"
        | "SUBSTR" | "LEFT" | "RIGHT" | "REPLACE" | "LPAD" | "RPAD" | "REVERSE" | "DATE_FORMAT"
        | "STRFTIME" | "TO_CHAR" | "GROUP_CONCAT" | "STRING_AGG" => ColumnType::Text,
        "COALESCE" | "IFNULL" | "NVL" | "ISNULL" | "NULLIF" | "GREATEST" | "LEAST" | "MIN"
        | "MAX" => first_arg,
        "COUNT" => ColumnType::Integer,
        "SUM" | "AVG" => ColumnType::Number,
        _ => ColumnType::Unknown,
    }
}
