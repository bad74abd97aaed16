//! SQL statement assembly.

use std::sync::Arc;

use tracing::debug;

use crate::config::Settings;
use crate::engine::{
    build_join_graph, collect_targets, model_context, register_calculated, resolve_field,
    CalculatedExpr, PageLimits,
};
use crate::error::{QueryError, QueryResult};
use crate::expr::{CompileContext, Fragment, ScalarValue, SqlBackend};
use crate::model::{AggregationColumn, Model, QueryObject};
use crate::query::{FilterNode, OrderSpec, QueryRequest};
use crate::sql::dialect::{Dialect, SqlDialect};

/// A fully assembled SQL query.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    /// The paged data statement.
    pub sql: String,
    /// The total-count statement, when `return_total` was requested.
    pub count_sql: Option<String>,
}

/// Compiles a model plus request into one dialect's SQL.
#[derive(Debug, Clone, Copy)]
pub struct SqlQueryEngine {
    dialect: Dialect,
    limits: PageLimits,
}

impl SqlQueryEngine {
    pub fn new(dialect: Dialect) -> Self {
        let settings = Settings::default();
        Self {
            dialect,
            limits: PageLimits {
                default_limit: settings.default_limit,
                max_limit: settings.max_limit,
            },
        }
    }

    /// Dialect and page limits from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dialect: settings.default_dialect,
            limits: PageLimits {
                default_limit: settings.default_limit,
                max_limit: settings.max_limit,
            },
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Compile a request with no calculated fields.
    pub fn compile(&self, model: &Arc<Model>, request: &QueryRequest) -> QueryResult<CompiledSql> {
        self.compile_with(model, request, &[])
    }

    /// Compile a request, registering `calculated` expression trees
    /// first so fields and filters may reference them by name.
    pub fn compile_with(
        &self,
        model: &Arc<Model>,
        request: &QueryRequest,
        calculated: &[CalculatedExpr],
    ) -> QueryResult<CompiledSql> {
        let mut context = model_context(model, Box::new(SqlBackend::new(self.dialect)));
        register_calculated(&mut context, calculated)?;

        let mut fragments: Vec<Fragment> = Vec::new();

        // Select list: grouped requests select their group columns,
        // everything else selects the requested fields.
        let (select_items, group_exprs) = if request.group_by.is_empty() {
            let mut items = Vec::with_capacity(request.fields.len());
            for name in &request.fields {
                let field = resolve_field(&mut context, name)?;
                items.push(format!(
                    "{} AS {}",
                    field.fragment.text(),
                    self.dialect.quote_identifier(&field.alias)
                ));
                fragments.push(field.fragment);
            }
            (items, Vec::new())
        } else {
            let mut items = Vec::with_capacity(request.group_by.len());
            let mut keys = Vec::new();
            for spec in &request.group_by {
                let field = resolve_field(&mut context, &spec.field)?;
                if field.fragment.has_aggregate {
                    let message = match spec.agg {
                        None => "aggregate expressions cannot be grouping keys",
                        Some(_) => "aggregate expressions cannot be aggregated again",
                    };
                    return Err(QueryError::InvalidAggregationUsage {
                        column: spec.field.clone(),
                        message: message.to_string(),
                    });
                }
                let column = match spec.agg {
                    None => AggregationColumn::group_key(field.alias.clone(), field.fragment.text()),
                    Some(agg) => {
                        AggregationColumn::aggregate(field.alias.clone(), field.fragment.text(), agg)
                    }
                };
                if column.group_by_name.is_some() {
                    keys.push(column.expr.clone());
                }
                items.push(format!(
                    "{} AS {}",
                    column.declare(),
                    self.dialect.quote_identifier(&column.name)
                ));
                fragments.push(field.fragment);
            }
            (items, keys)
        };

        // An empty select list cannot become a well-formed statement.
        if select_items.is_empty() {
            return Err(QueryError::EmptySelection);
        }

        let where_clause = self.render_filters(&mut context, &request.filters, &mut fragments)?;

        let mut order_items = Vec::with_capacity(request.order_by.len());
        for spec in &request.order_by {
            let field = resolve_field(&mut context, &spec.field)?;
            order_items.push(self.order_element(field.fragment.text(), spec));
            fragments.push(field.fragment);
        }

        let targets = collect_targets(model, &fragments, &context);
        let mut graph = build_join_graph(model);
        graph.validate()?;
        let path = graph.path(&targets)?;

        let mut joins = String::new();
        for edge in path.iter() {
            let to = model
                .query_object(&edge.to)
                .ok_or_else(|| QueryError::UnreachableTarget(edge.to.clone()))?;
            // The ON condition addresses both sides by their binding
            // alias (the table name unless one was declared).
            let from_alias = model
                .query_object(&edge.from)
                .map(|object| object.alias.as_str())
                .unwrap_or(edge.from.as_str());
            joins.push_str(&format!(
                " {} {} ON {}.{} = {}.{}",
                edge.kind.as_sql(),
                self.table_reference(to),
                self.dialect.quote_identifier(from_alias),
                self.dialect.quote_identifier(&edge.foreign_key),
                self.dialect.quote_identifier(&to.alias),
                self.dialect.quote_identifier(&to.primary_key),
            ));
        }

        let mut core = format!(
            "SELECT {} FROM {}{}",
            select_items.join(", "),
            self.table_reference(&model.base),
            joins
        );
        if let Some(filter) = &where_clause {
            core.push_str(" WHERE ");
            core.push_str(filter);
        }
        if !group_exprs.is_empty() {
            core.push_str(" GROUP BY ");
            core.push_str(&group_exprs.join(", "));
        }

        let count_sql = if request.return_total {
            Some(format!(
                "SELECT COUNT(*) FROM ({}) {}",
                core,
                self.dialect.quote_identifier("__total")
            ))
        } else {
            None
        };

        if !order_items.is_empty() {
            core.push_str(" ORDER BY ");
            core.push_str(&order_items.join(", "));
        }

        let limit = self.limits.effective(request.limit);
        let sql = self.dialect.generate_paging_sql(&core, request.start, limit);
        debug!(model = %model.name, dialect = %self.dialect, joins = path.len(), "sql assembled");

        Ok(CompiledSql { sql, count_sql })
    }

    /// A quoted table reference with its alias when one differs.
    fn table_reference(&self, object: &QueryObject) -> String {
        let qualified = object.qualified_name(self.dialect);
        if object.alias != object.name {
            format!("{} {}", qualified, self.dialect.quote_identifier(&object.alias))
        } else {
            qualified
        }
    }

    fn order_element(&self, expr: &str, spec: &OrderSpec) -> String {
        match spec.nulls_first {
            None => format!("{} {}", expr, spec.dir.as_sql()),
            Some(nulls_first) => {
                if self.dialect.supports_native_nulls_ordering() {
                    self.dialect.build_null_order_clause(
                        &format!("{} {}", expr, spec.dir.as_sql()),
                        nulls_first,
                    )
                } else {
                    format!(
                        "{} {}",
                        self.dialect.build_null_order_clause(expr, nulls_first),
                        spec.dir.as_sql()
                    )
                }
            }
        }
    }

    fn render_filters(
        &self,
        context: &mut CompileContext,
        filters: &[FilterNode],
        fragments: &mut Vec<Fragment>,
    ) -> QueryResult<Option<String>> {
        if filters.is_empty() {
            return Ok(None);
        }
        let rendered: Vec<String> = filters
            .iter()
            .map(|node| self.render_filter(context, node, fragments))
            .collect::<QueryResult<_>>()?;
        Ok(Some(rendered.join(" AND ")))
    }

    fn render_filter(
        &self,
        context: &mut CompileContext,
        node: &FilterNode,
        fragments: &mut Vec<Fragment>,
    ) -> QueryResult<String> {
        if node.is_group() {
            let connector = match node.op.to_ascii_lowercase().as_str() {
                "or" => " OR ",
                "and" => " AND ",
                other => return Err(QueryError::UnsupportedOperator(other.to_string())),
            };
            let rendered: Vec<String> = node
                .children
                .iter()
                .map(|child| self.render_filter(context, child, fragments))
                .collect::<QueryResult<_>>()?;
            return Ok(format!("({})", rendered.join(connector)));
        }

        let field_name = node
            .field
            .as_deref()
            .ok_or_else(|| QueryError::UnsupportedOperator(node.op.clone()))?;
        let field = resolve_field(context, field_name)?;
        if field.fragment.has_aggregate {
            return Err(QueryError::InvalidAggregationUsage {
                column: field_name.to_string(),
                message: "aggregate expressions cannot be filtered".to_string(),
            });
        }
        let expr = field.fragment.text().to_string();
        fragments.push(field.fragment);

        let clause = match node.op.as_str() {
            "=" | ">" | ">=" | "<" | "<=" => {
                format!("{} {} {}", expr, node.op, self.literal_of(context, node)?)
            }
            "!=" => format!("{} <> {}", expr, self.literal_of(context, node)?),
            "like" => format!("{} LIKE {}", expr, self.literal_of(context, node)?),
            "in" => {
                let values = self.literal_list(context, node);
                if values.is_empty() {
                    return Err(QueryError::UnsupportedOperator("in".to_string()));
                }
                format!("{} IN ({})", expr, values.join(", "))
            }
            "between" => {
                let low = node.values.first().filter(|v| **v != ScalarValue::Null);
                let high = node.values.get(1).filter(|v| **v != ScalarValue::Null);
                match (low, high) {
                    (Some(low), Some(high)) => format!(
                        "{} BETWEEN {} AND {}",
                        expr,
                        self.render_literal(context, low),
                        self.render_literal(context, high)
                    ),
                    // An open end drops that side of the range.
                    (Some(low), None) => {
                        format!("{} >= {}", expr, self.render_literal(context, low))
                    }
                    (None, Some(high)) => {
                        format!("{} <= {}", expr, self.render_literal(context, high))
                    }
                    (None, None) => {
                        return Err(QueryError::UnsupportedOperator("between".to_string()))
                    }
                }
            }
            other => return Err(QueryError::UnsupportedOperator(other.to_string())),
        };
        Ok(clause)
    }

    fn literal_of(&self, context: &CompileContext, node: &FilterNode) -> QueryResult<String> {
        let value = node
            .value
            .as_ref()
            .ok_or_else(|| QueryError::UnsupportedOperator(node.op.clone()))?;
        Ok(self.render_literal(context, value))
    }

    fn literal_list(&self, context: &CompileContext, node: &FilterNode) -> Vec<String> {
        if node.values.is_empty() {
            node.value
                .iter()
                .map(|v| self.render_literal(context, v))
                .collect()
        } else {
            node.values
                .iter()
                .map(|v| self.render_literal(context, v))
                .collect()
        }
    }

    fn render_literal(&self, context: &CompileContext, value: &ScalarValue) -> String {
        context
            .backend
            .emit_literal(value)
            .as_text()
            .unwrap_or_default()
            .to_string()
    }
}
