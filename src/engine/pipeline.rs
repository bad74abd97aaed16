//! Document-store aggregation pipeline assembly.
//!
//! Emits an ordered list of `$match` / `$project` / `$sort` / `$skip` /
//! `$limit` stages. A sort always ends with an `_id` key so paginated
//! reads stay stable, and `return_total` yields a parallel `$count`
//! stage list.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::Settings;
use crate::engine::{model_context, register_calculated, resolve_field, CalculatedExpr, PageLimits};
use crate::error::{QueryError, QueryResult};
use crate::expr::{PipelineBackend, ScalarValue};
use crate::model::Model;
use crate::query::{FilterNode, QueryRequest, SortDir};

/// A fully assembled pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPipeline {
    /// The paged data stages.
    pub stages: Vec<Value>,
    /// The counting stages, when `return_total` was requested.
    pub count_stages: Option<Vec<Value>>,
}

/// Compiles a model plus request into aggregation-pipeline stages.
#[derive(Debug, Clone, Copy)]
pub struct PipelineQueryEngine {
    limits: PageLimits,
}

impl PipelineQueryEngine {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            limits: PageLimits {
                default_limit: settings.default_limit,
                max_limit: settings.max_limit,
            },
        }
    }

    /// Compile a request with no calculated fields.
    pub fn compile(
        &self,
        model: &Arc<Model>,
        request: &QueryRequest,
    ) -> QueryResult<CompiledPipeline> {
        self.compile_with(model, request, &[])
    }

    /// Compile a request, registering `calculated` expression trees
    /// first so projected fields may reference them by name.
    pub fn compile_with(
        &self,
        model: &Arc<Model>,
        request: &QueryRequest,
        calculated: &[CalculatedExpr],
    ) -> QueryResult<CompiledPipeline> {
        let mut context = model_context(model, Box::new(PipelineBackend));
        register_calculated(&mut context, calculated)?;

        let mut stages: Vec<Value> = Vec::new();

        let match_doc = self.match_document(model, &request.filters)?;
        if let Some(doc) = &match_doc {
            stages.push(json!({ "$match": doc }));
        }

        if !request.fields.is_empty() {
            let mut projection = Map::new();
            for name in &request.fields {
                let field = resolve_field(&mut context, name)?;
                let value = field
                    .fragment
                    .value
                    .as_doc()
                    .cloned()
                    .unwrap_or(Value::Null);
                projection.insert(field.alias, value);
            }
            stages.push(json!({ "$project": Value::Object(projection) }));
        }

        if !request.order_by.is_empty() {
            let mut sort = Map::new();
            for spec in &request.order_by {
                let column = model.require_column(&spec.field)?;
                let key = column.physical_column().unwrap_or(&column.name).to_string();
                let dir = match spec.dir {
                    SortDir::Asc => 1,
                    SortDir::Desc => -1,
                };
                sort.insert(key, json!(dir));
            }
            // Stable pagination needs a total order.
            if !sort.contains_key("_id") {
                sort.insert("_id".to_string(), json!(1));
            }
            stages.push(json!({ "$sort": Value::Object(sort) }));
        }

        if request.start > 0 {
            stages.push(json!({ "$skip": request.start }));
        }
        stages.push(json!({ "$limit": self.limits.effective(request.limit) }));

        let count_stages = if request.return_total {
            let mut counting = Vec::new();
            if let Some(doc) = match_doc {
                counting.push(json!({ "$match": doc }));
            }
            counting.push(json!({ "$count": "total" }));
            Some(counting)
        } else {
            None
        };

        debug!(model = %model.name, stages = stages.len(), "pipeline assembled");
        Ok(CompiledPipeline {
            stages,
            count_stages,
        })
    }

    fn match_document(
        &self,
        model: &Model,
        filters: &[FilterNode],
    ) -> QueryResult<Option<Value>> {
        if filters.is_empty() {
            return Ok(None);
        }
        let rendered: Vec<Value> = filters
            .iter()
            .map(|node| self.filter_document(model, node))
            .collect::<QueryResult<_>>()?;
        if rendered.len() == 1 {
            Ok(rendered.into_iter().next())
        } else {
            Ok(Some(json!({ "$and": rendered })))
        }
    }

    fn filter_document(&self, model: &Model, node: &FilterNode) -> QueryResult<Value> {
        if node.is_group() {
            let key = match node.op.to_ascii_lowercase().as_str() {
                "and" => "$and",
                "or" => "$or",
                other => return Err(QueryError::UnsupportedOperator(other.to_string())),
            };
            let children: Vec<Value> = node
                .children
                .iter()
                .map(|child| self.filter_document(model, child))
                .collect::<QueryResult<_>>()?;
            return Ok(json!({ key: children }));
        }

        let field_name = node
            .field
            .as_deref()
            .ok_or_else(|| QueryError::UnsupportedOperator(node.op.clone()))?;
        let column = model.require_column(field_name)?;
        let key = column.physical_column().unwrap_or(&column.name).to_string();

        let condition = match node.op.as_str() {
            "=" => json!({ "$eq": self.value_of(node)? }),
            "!=" => json!({ "$ne": self.value_of(node)? }),
            ">" => json!({ "$gt": self.value_of(node)? }),
            ">=" => json!({ "$gte": self.value_of(node)? }),
            "<" => json!({ "$lt": self.value_of(node)? }),
            "<=" => json!({ "$lte": self.value_of(node)? }),
            "like" => json!({ "$regex": self.value_of(node)? }),
            "in" => {
                let values: Vec<Value> = if node.values.is_empty() {
                    node.value.iter().map(ScalarValue::to_json).collect()
                } else {
                    node.values.iter().map(ScalarValue::to_json).collect()
                };
                if values.is_empty() {
                    return Err(QueryError::UnsupportedOperator("in".to_string()));
                }
                json!({ "$in": values })
            }
            "between" => {
                let low = node.values.first().filter(|v| **v != ScalarValue::Null);
                let high = node.values.get(1).filter(|v| **v != ScalarValue::Null);
                let mut range = Map::new();
                if let Some(low) = low {
                    range.insert("$gte".to_string(), low.to_json());
                }
                if let Some(high) = high {
                    range.insert("$lte".to_string(), high.to_json());
                }
                if range.is_empty() {
                    return Err(QueryError::UnsupportedOperator("between".to_string()));
                }
                Value::Object(range)
            }
            other => return Err(QueryError::UnsupportedOperator(other.to_string())),
        };
        Ok(json!({ key: condition }))
    }

    fn value_of(&self, node: &FilterNode) -> QueryResult<Value> {
        node.value
            .as_ref()
            .map(ScalarValue::to_json)
            .ok_or_else(|| QueryError::UnsupportedOperator(node.op.clone()))
    }
}

impl Default for PipelineQueryEngine {
    fn default() -> Self {
        Self::new()
    }
}
