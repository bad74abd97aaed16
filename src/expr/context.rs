//! Per-compilation state for expression evaluation.

use std::sync::Arc;

use crate::error::{QueryError, QueryResult};
use crate::expr::backend::EmitBackend;
use crate::expr::fragment::Fragment;
use crate::expr::Expr;
use crate::model::Model;

/// A named pseudo-column whose value is a compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedColumn {
    pub name: String,
    pub caption: String,
    pub fragment: Fragment,
    /// Grouping alias; populated only when the fragment carries no
    /// aggregate.
    pub group_by_name: Option<String>,
    /// Whether any later expression has referenced this column.
    pub referenced: bool,
}

impl CalculatedColumn {
    /// The fragment's backend text.
    pub fn declare(&self) -> &str {
        self.fragment.text()
    }
}

/// The per-call state expression nodes compile against: the model, the
/// backend emission rules, and the ordered registry of calculated
/// columns (later fields may reference earlier ones).
#[derive(Debug)]
pub struct CompileContext {
    pub model: Arc<Model>,
    pub backend: Box<dyn EmitBackend>,
    calculated: Vec<CalculatedColumn>,
}

impl CompileContext {
    pub fn new(model: Arc<Model>, backend: Box<dyn EmitBackend>) -> Self {
        Self {
            model,
            backend,
            calculated: Vec::new(),
        }
    }

    /// Register a compiled calculated column under `name`.
    pub fn register_calculated(
        &mut self,
        name: impl Into<String>,
        caption: impl Into<String>,
        fragment: Fragment,
    ) {
        let name = name.into();
        let group_by_name = if fragment.has_aggregate {
            None
        } else {
            Some(name.clone())
        };
        self.calculated.push(CalculatedColumn {
            name,
            caption: caption.into(),
            fragment,
            group_by_name,
            referenced: false,
        });
    }

    /// The registered calculated column named `name`, if any.
    pub fn calculated(&self, name: &str) -> Option<&CalculatedColumn> {
        self.calculated.iter().find(|c| c.name == name)
    }

    /// Resolve a calculated column for a reference: returns a copy of
    /// its fragment and marks the column referenced.
    pub(crate) fn reference_calculated(&mut self, name: &str) -> Option<Fragment> {
        let entry = self.calculated.iter_mut().find(|c| c.name == name)?;
        entry.referenced = true;
        Some(entry.fragment.clone())
    }

    /// Calculated columns that have been referenced so far.
    pub fn referenced_calculated(&self) -> impl Iterator<Item = &CalculatedColumn> {
        self.calculated.iter().filter(|c| c.referenced)
    }
}

/// The upstream evaluator seam: expression trees are evaluated against
/// the active compilation context, and evaluation without one fails.
#[derive(Debug, Default)]
pub struct Evaluator {
    context: Option<CompileContext>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: CompileContext) -> Self {
        Self {
            context: Some(context),
        }
    }

    pub fn set_context(&mut self, context: CompileContext) {
        self.context = Some(context);
    }

    /// Tear down the active context, returning it for inspection.
    pub fn take_context(&mut self) -> Option<CompileContext> {
        self.context.take()
    }

    pub fn context(&self) -> Option<&CompileContext> {
        self.context.as_ref()
    }

    /// Compile `expr` against the active context.
    pub fn evaluate(&mut self, expr: &Expr) -> QueryResult<Fragment> {
        let context = self
            .context
            .as_mut()
            .ok_or(QueryError::MissingCompilationContext)?;
        expr.compile(context)
    }
}
