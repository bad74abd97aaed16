//! Crate-wide error taxonomy.
//!
//! Every compiler error is terminal for the current compilation: no partial
//! or best-effort statement is ever produced. Messages use domain terms only
//! (column/model names, operators) so they can be surfaced to a caller
//! without reconstruction. Retry policy belongs to the execution layer.

/// Result type for query compilation.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while compiling a model or a query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// A referenced column name does not exist in the model.
    #[error("Column not found: '{0}'")]
    ColumnNotFound(String),

    /// Two model members (column, dimension field, or measure) share a name.
    #[error("Duplicate column name in model: '{0}'")]
    DuplicateColumn(String),

    /// An operator not present in the backend operator table.
    #[error("Unsupported operator: '{0}'")]
    UnsupportedOperator(String),

    /// A function outside the calculated-field allow-list.
    #[error("Function not allowed in expression: '{0}'")]
    FunctionNotAllowed(String),

    /// The expression compiler was invoked without an active compilation
    /// context.
    #[error("No active compilation context")]
    MissingCompilationContext,

    /// The join graph contains a cycle reachable from its root.
    #[error("Cyclic join dependency via '{from}' -> '{to}'")]
    CyclicJoinGraph { from: String, to: String },

    /// A join target has no path from the root table.
    #[error("No join path to table '{0}'")]
    UnreachableTarget(String),

    /// An aggregation was used where only a grouping key is valid, or the
    /// other way round.
    #[error("Invalid aggregation usage on '{column}': {message}")]
    InvalidAggregationUsage { column: String, message: String },

    /// A request whose select list would be empty: no fields and no
    /// group columns.
    #[error("Request selects no columns")]
    EmptySelection,
}
