//! Query orchestration: field resolution and statement assembly.
//!
//! Two engines share the resolution front end: `SqlQueryEngine` emits a
//! dialect-correct SQL statement, `PipelineQueryEngine` emits a
//! document-store aggregation pipeline. Both fail fast; nothing partial
//! ever reaches the caller.

pub mod pipeline;
pub mod sql;

pub use pipeline::{CompiledPipeline, PipelineQueryEngine};
pub use sql::{CompiledSql, SqlQueryEngine};

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::expr::{CompileContext, Expr, Fragment};
use crate::join::{JoinGraph, JoinKind};
use crate::model::{DimensionPath, Model, ResolvedQueryObject};

/// A calculated field handed over by the upstream scripting layer as an
/// already-parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedExpr {
    pub name: String,
    pub caption: String,
    pub expr: Expr,
}

impl CalculatedExpr {
    pub fn new(name: impl Into<String>, caption: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            expr,
        }
    }
}

/// A request field compiled against the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    /// Name as it appeared in the request.
    pub name: String,
    /// Output column alias (underscore form for dimension paths).
    pub alias: String,
    pub fragment: Fragment,
}

/// Compile and register calculated fields, in declaration order so
/// later fields may reference earlier ones.
pub(crate) fn register_calculated(
    context: &mut CompileContext,
    calculated: &[CalculatedExpr],
) -> QueryResult<()> {
    for field in calculated {
        let fragment = field.expr.compile(context)?;
        context.register_calculated(field.name.clone(), field.caption.clone(), fragment);
    }
    Ok(())
}

/// Resolve one request field to its compiled fragment and output alias.
pub(crate) fn resolve_field(context: &mut CompileContext, name: &str) -> QueryResult<ResolvedField> {
    let fragment = Expr::column(name).compile(context)?;
    let alias = DimensionPath::parse(name)
        .map(|p| p.to_column_alias())
        .unwrap_or_else(|| name.to_string());
    Ok(ResolvedField {
        name: name.to_string(),
        alias,
        fragment,
    })
}

/// The joined tables a set of fragments touches, base table excluded.
/// Referenced calculated columns contribute their dependencies too.
pub(crate) fn collect_targets<'a>(
    model: &Model,
    fragments: impl IntoIterator<Item = &'a Fragment>,
    context: &CompileContext,
) -> BTreeSet<String> {
    let mut targets = BTreeSet::new();
    for fragment in fragments {
        targets.extend(fragment.referenced_tables());
    }
    for calculated in context.referenced_calculated() {
        targets.extend(calculated.fragment.referenced_tables());
    }
    targets.remove(&model.base.name);
    targets
}

/// Build the join graph from the model's declared foreign keys.
/// A dimension naming its own foreign key overrides the base table's
/// declared key for that dimension's table.
pub(crate) fn build_join_graph(model: &Model) -> JoinGraph {
    let mut resolved = ResolvedQueryObject::new(model.base.clone());
    for dim in &model.dimensions {
        if let Some(fk) = &dim.foreign_key {
            resolved = resolved.with_override(dim.table.clone(), fk.clone());
        }
    }

    let mut graph = JoinGraph::new(model.base.name.clone());
    let mut base_targets: BTreeSet<&str> = resolved
        .base
        .foreign_keys
        .keys()
        .map(String::as_str)
        .collect();
    base_targets.extend(resolved.overrides.keys().map(String::as_str));
    for target in base_targets {
        if let Some(fk) = resolved.foreign_key_to(target) {
            graph.add_edge(model.base.name.clone(), target, fk, JoinKind::Left);
        }
    }
    for joined in model.joined.values() {
        for (target, fk) in &joined.foreign_keys {
            graph.add_edge(joined.name.clone(), target.clone(), fk.clone(), JoinKind::Left);
        }
    }
    graph
}

/// Page-size limits shared by both engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PageLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl PageLimits {
    pub fn effective(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

pub(crate) fn model_context(
    model: &Arc<Model>,
    backend: Box<dyn crate::expr::EmitBackend>,
) -> CompileContext {
    CompileContext::new(model.clone(), backend)
}
