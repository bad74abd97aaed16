//! The language-agnostic query request shape.
//!
//! Requests arrive as JSON from an upstream endpoint; validation of the
//! comparator set happens there, so the engines treat an unknown `op`
//! as a request defect and fail fast.

use serde::{Deserialize, Serialize};

use crate::expr::ScalarValue;
use crate::model::Aggregation;

/// A query against one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Field names to select: plain columns, measures, dimension
    /// sub-fields, or calculated fields.
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterNode>,
    #[serde(default)]
    pub group_by: Vec<GroupSpec>,
    #[serde(default)]
    pub order_by: Vec<OrderSpec>,
    /// Zero-based row offset.
    #[serde(default)]
    pub start: u64,
    /// Page size; the engine default applies when absent.
    pub limit: Option<u64>,
    /// Whether to also produce a total-count statement/stage list.
    #[serde(default)]
    pub return_total: bool,
}

impl QueryRequest {
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            start: 0,
            limit: None,
            return_total: false,
        }
    }
}

/// One filter: either a leaf comparison or a boolean group of children
/// joined by `op` (`and` / `or`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNode {
    pub field: Option<String>,
    pub op: String,
    pub value: Option<ScalarValue>,
    /// Operand list for `in` and `between`.
    #[serde(default)]
    pub values: Vec<ScalarValue>,
    #[serde(default)]
    pub children: Vec<FilterNode>,
}

impl FilterNode {
    /// A leaf comparison `field op value`.
    pub fn compare(
        field: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<ScalarValue>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            op: op.into(),
            value: Some(value.into()),
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A leaf with an operand list (`in`, `between`).
    pub fn with_values(
        field: impl Into<String>,
        op: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<ScalarValue>>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            op: op.into(),
            value: None,
            values: values.into_iter().map(Into::into).collect(),
            children: Vec::new(),
        }
    }

    /// A boolean group of children.
    pub fn group(op: impl Into<String>, children: Vec<FilterNode>) -> Self {
        Self {
            field: None,
            op: op.into(),
            value: None,
            values: Vec::new(),
            children,
        }
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// One ORDER BY element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSpec {
    pub field: String,
    #[serde(default)]
    pub dir: SortDir,
    /// Explicit null placement; dialect default ordering when absent.
    pub nulls_first: Option<bool>,
}

impl OrderSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
            nulls_first: None,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
            nulls_first: None,
        }
    }
}

/// One GROUP BY element: a grouping key when `agg` is absent, an
/// aggregate value column otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub field: String,
    pub agg: Option<Aggregation>,
}

impl GroupSpec {
    pub fn key(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            agg: None,
        }
    }

    pub fn aggregate(field: impl Into<String>, agg: Aggregation) -> Self {
        Self {
            field: field.into(),
            agg: Some(agg),
        }
    }
}
