//! Column types: semantic types, aggregation kinds, physical and
//! orchestrator-produced columns.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sql::dialect::{Dialect, SqlDialect};

/// Semantic type of a column or compiled expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Integer,
    Bool,
    Date,
    DateTime,
    Money,
    Dict,
    #[default]
    Unknown,
}

impl ColumnType {
    /// Whether arithmetic over this type stays numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Number | ColumnType::Integer | ColumnType::Money
        )
    }
}

/// Aggregation kind of a measure or aggregate call.
///
/// A grouping key carries no kind; `Option<Aggregation>` with `None`
/// is the "plain column" case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Max,
    Min,
}

impl Aggregation {
    /// SQL function name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Avg => "AVG",
            Aggregation::Count => "COUNT",
            Aggregation::Max => "MAX",
            Aggregation::Min => "MIN",
        }
    }

    /// Resolve a kind from a function name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SUM" => Some(Aggregation::Sum),
            "AVG" => Some(Aggregation::Avg),
            "COUNT" => Some(Aggregation::Count),
            "MAX" => Some(Aggregation::Max),
            "MIN" => Some(Aggregation::Min),
            _ => None,
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a physical column: owning table (by query-object name)
/// plus column name. Ordered so referenced-column sets are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId {
    pub table: String,
    pub column: String,
}

impl ColumnId {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Where a model column's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSource {
    /// A physical column on a query object.
    Physical { table: String, column: String },
    /// A pre-rendered formula with the physical columns it reads.
    Formula {
        text: String,
        references: Vec<ColumnId>,
    },
}

/// A column as indexed by the model: a dimension sub-field, a measure,
/// a property, or a plain physical column.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelColumn {
    /// Lookup name (`orderId`, `customer$id`, `product.category$categoryId`).
    pub name: String,
    pub caption: String,
    pub source: ColumnSource,
    pub column_type: ColumnType,
    /// Aggregation semantics, carried by measures.
    pub aggregation: Option<Aggregation>,
    pub deprecated: bool,
}

impl ModelColumn {
    pub fn physical(
        name: impl Into<String>,
        caption: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            source: ColumnSource::Physical {
                table: table.into(),
                column: column.into(),
            },
            column_type,
            aggregation: None,
            deprecated: false,
        }
    }

    pub fn formula(
        name: impl Into<String>,
        caption: impl Into<String>,
        text: impl Into<String>,
        references: Vec<ColumnId>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            source: ColumnSource::Formula {
                text: text.into(),
                references,
            },
            column_type,
            aggregation: None,
            deprecated: false,
        }
    }

    /// Render the backend text of this column for `dialect`.
    ///
    /// `table_alias` overrides the FROM-clause alias the column is
    /// qualified with; formula-backed columns are emitted verbatim.
    pub fn declare(&self, dialect: Dialect, table_alias: Option<&str>) -> String {
        match &self.source {
            ColumnSource::Physical { table, column } => {
                let qualifier = table_alias.unwrap_or(table);
                format!(
                    "{}.{}",
                    dialect.quote_identifier(qualifier),
                    dialect.quote_identifier(column)
                )
            }
            ColumnSource::Formula { text, .. } => text.clone(),
        }
    }

    /// The physical column the value is stored in, if any.
    pub fn physical_column(&self) -> Option<&str> {
        match &self.source {
            ColumnSource::Physical { column, .. } => Some(column),
            ColumnSource::Formula { .. } => None,
        }
    }

    /// The owning physical table, if any.
    pub fn physical_table(&self) -> Option<&str> {
        match &self.source {
            ColumnSource::Physical { table, .. } => Some(table),
            ColumnSource::Formula { .. } => None,
        }
    }

    /// Physical columns this column reads.
    pub fn referenced(&self) -> BTreeSet<ColumnId> {
        match &self.source {
            ColumnSource::Physical { table, column } => {
                let mut set = BTreeSet::new();
                set.insert(ColumnId::new(table.clone(), column.clone()));
                set
            }
            ColumnSource::Formula { references, .. } => references.iter().cloned().collect(),
        }
    }
}

/// A select-list column produced by the orchestrator for a grouped query.
///
/// `group_by_name` is populated only for grouping keys; aggregate value
/// columns never carry one. The two constructors keep that pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationColumn {
    pub name: String,
    /// Already-rendered backend expression for the underlying column.
    pub expr: String,
    pub aggregation: Option<Aggregation>,
    pub group_by_name: Option<String>,
}

impl AggregationColumn {
    /// A grouping-key column.
    pub fn group_key(name: impl Into<String>, expr: impl Into<String>) -> Self {
        let name = name.into();
        let group_by_name = Some(name.clone());
        Self {
            name,
            expr: expr.into(),
            aggregation: None,
            group_by_name,
        }
    }

    /// An aggregate value column.
    pub fn aggregate(
        name: impl Into<String>,
        expr: impl Into<String>,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            name: name.into(),
            expr: expr.into(),
            aggregation: Some(aggregation),
            group_by_name: None,
        }
    }

    /// Select-list text: the expression wrapped in the aggregate call
    /// when one is set.
    pub fn declare(&self) -> String {
        match self.aggregation {
            Some(agg) => format!("{}({})", agg.as_str(), self.expr),
            None => self.expr.clone(),
        }
    }
}
