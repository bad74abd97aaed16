//! # Strata
//!
//! A semantic query layer: compiles a declarative dimensional model
//! plus a runtime query request into dialect-correct SQL or a
//! document-store aggregation pipeline, resolving the join path across
//! a graph of related tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Model definition (tables, dimensions,             │
//! │        measures, properties, calculated fields)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [model]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Model (name-indexed columns, query objects)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │    request fields / filters
//!                          ▼ [expr]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Fragments (backend value + referenced columns          │
//! │   + inferred type + aggregate metadata)                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │    referenced tables
//!                          ▼ [join]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Join path (BFS over the table graph)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [engine]
//! ┌─────────────────────────────────────────────────────────┐
//! │     SQL statement (per dialect) / pipeline stages        │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod join;
pub mod model;
pub mod query;
pub mod registry;
pub mod sql;

pub use engine::{
    CalculatedExpr, CompiledPipeline, CompiledSql, PipelineQueryEngine, SqlQueryEngine,
};
pub use error::{QueryError, QueryResult};
pub use expr::{CompileContext, Evaluator, Expr, Fragment, ScalarValue};
pub use join::{JoinEdge, JoinGraph, JoinKind};
pub use model::{Model, ModelDef};
pub use query::{FilterNode, GroupSpec, OrderSpec, QueryRequest, SortDir};
pub use registry::ModelRegistry;
pub use sql::dialect::{Dialect, SqlDialect};
