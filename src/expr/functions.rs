//! The calculated-field function allow-list and operator tables.
//!
//! Expressions come from user-authored formulas, so only a fixed set of
//! functions may reach the backend; anything else is rejected before
//! emission.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::error::{QueryError, QueryResult};
use crate::model::Aggregation;

static MATH_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["ABS", "CEIL", "CEILING", "FLOOR", "ROUND", "TRUNCATE", "MOD", "POWER", "SQRT", "EXP", "LN", "LOG", "SIGN", "RAND"]
        .into_iter()
        .collect()
});

static DATE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "YEAR", "MONTH", "DAY", "HOUR", "MINUTE", "SECOND", "QUARTER", "WEEK", "DAYOFWEEK",
        "DAYOFYEAR", "NOW", "CURDATE", "CURTIME", "DATE", "DATE_ADD", "DATE_SUB", "DATEDIFF",
        "DATE_FORMAT", "STRFTIME", "TO_CHAR", "STR_TO_DATE", "LAST_DAY",
    ]
    .into_iter()
    .collect()
});

static STRING_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "CONCAT", "CONCAT_WS", "UPPER", "LOWER", "TRIM", "LTRIM", "RTRIM", "SUBSTRING", "SUBSTR",
        "LEFT", "RIGHT", "REPLACE", "LENGTH", "CHAR_LENGTH", "LEN", "LPAD", "RPAD", "INSTR",
        "LOCATE", "REVERSE",
    ]
    .into_iter()
    .collect()
});

static OTHER_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["COALESCE", "IFNULL", "NVL", "ISNULL", "NULLIF", "IF", "IIF", "CASE", "CAST", "CONVERT", "GREATEST", "LEAST"]
        .into_iter()
        .collect()
});

static AGGREGATE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["SUM", "AVG", "COUNT", "MAX", "MIN", "GROUP_CONCAT", "STRING_AGG"]
        .into_iter()
        .collect()
});

/// Whether `name` may appear in a calculated-field expression.
pub fn is_allowed(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    MATH_FUNCTIONS.contains(upper.as_str())
        || DATE_FUNCTIONS.contains(upper.as_str())
        || STRING_FUNCTIONS.contains(upper.as_str())
        || OTHER_FUNCTIONS.contains(upper.as_str())
        || AGGREGATE_FUNCTIONS.contains(upper.as_str())
}

/// Reject a call to a function outside the allow-list.
pub fn check_allowed(name: &str) -> QueryResult<()> {
    if is_allowed(name) {
        Ok(())
    } else {
        Err(QueryError::FunctionNotAllowed(name.to_string()))
    }
}

/// Whether `name` is an aggregate function.
pub fn is_aggregate(name: &str) -> bool {
    AGGREGATE_FUNCTIONS.contains(name.to_ascii_uppercase().as_str())
}

/// The aggregation kind of `name`, when it has one.
///
/// GROUP_CONCAT and STRING_AGG aggregate but carry no kind; a fragment
/// built from them reports `has_aggregate` without an `aggregation`.
pub fn aggregation_kind(name: &str) -> Option<Aggregation> {
    Aggregation::from_name(name)
}

/// How a binary operator combines its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Arithmetic,
    Comparison,
    Logical,
}

/// Classify a scripting-layer binary operator.
pub fn classify_operator(op: &str) -> QueryResult<OperatorClass> {
    match op {
        "+" | "-" | "*" | "/" | "%" => Ok(OperatorClass::Arithmetic),
        "=" | "==" | "===" | "!=" | "<>" | ">" | ">=" | "<" | "<=" => Ok(OperatorClass::Comparison),
        "&&" | "||" | "and" | "or" | "AND" | "OR" => Ok(OperatorClass::Logical),
        _ => Err(QueryError::UnsupportedOperator(op.to_string())),
    }
}

/// SQL text for a scripting-layer binary operator.
pub fn sql_operator(op: &str) -> QueryResult<&'static str> {
    match op {
        "+" => Ok("+"),
        "-" => Ok("-"),
        "*" => Ok("*"),
        "/" => Ok("/"),
        "%" => Ok("%"),
        "=" | "==" | "===" => Ok("="),
        "!=" | "<>" => Ok("<>"),
        ">" => Ok(">"),
        ">=" => Ok(">="),
        "<" => Ok("<"),
        "<=" => Ok("<="),
        "&&" | "and" | "AND" => Ok("AND"),
        "||" | "or" | "OR" => Ok("OR"),
        _ => Err(QueryError::UnsupportedOperator(op.to_string())),
    }
}

/// Pipeline operator key for a scripting-layer binary operator.
pub fn pipeline_operator(op: &str) -> QueryResult<&'static str> {
    match op {
        "+" => Ok("$add"),
        "-" => Ok("$subtract"),
        "*" => Ok("$multiply"),
        "/" => Ok("$divide"),
        "%" => Ok("$mod"),
        "=" | "==" | "===" => Ok("$eq"),
        "!=" | "<>" => Ok("$ne"),
        ">" => Ok("$gt"),
        ">=" => Ok("$gte"),
        "<" => Ok("$lt"),
        "<=" => Ok("$lte"),
        "&&" | "and" | "AND" => Ok("$and"),
        "||" | "or" | "OR" => Ok("$or"),
        _ => Err(QueryError::UnsupportedOperator(op.to_string())),
    }
}
