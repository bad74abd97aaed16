//! FROM-clause participants and their key relationships.

use std::collections::HashMap;

use crate::sql::dialect::{Dialect, SqlDialect};

/// A table participating in a query: name, FROM-clause alias, optional
/// schema, primary key, and the foreign keys joining it to other tables.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryObject {
    pub name: String,
    pub alias: String,
    pub schema: Option<String>,
    pub primary_key: String,
    /// Target table name -> foreign-key column on this table.
    pub foreign_keys: HashMap<String, String>,
}

impl QueryObject {
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            schema: None,
            primary_key: primary_key.into(),
            foreign_keys: HashMap::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_foreign_key(
        mut self,
        target: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.insert(target.into(), column.into());
        self
    }

    /// The foreign-key column on this table joining to `target`, if any.
    pub fn foreign_key_to(&self, target: &str) -> Option<&str> {
        self.foreign_keys.get(target).map(String::as_str)
    }

    /// Schema-qualified, quoted table reference for `dialect`.
    pub fn qualified_name(&self, dialect: Dialect) -> String {
        dialect.qualified_table_name(self.schema.as_deref(), &self.name)
    }
}

/// A query object with per-query foreign-key overrides layered on top.
///
/// Overrides take precedence over the base table's declared keys; the
/// base is otherwise untouched and shared.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQueryObject {
    pub base: QueryObject,
    /// Target table name -> overriding foreign-key column.
    pub overrides: HashMap<String, String>,
}

impl ResolvedQueryObject {
    pub fn new(base: QueryObject) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(
        mut self,
        target: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.overrides.insert(target.into(), column.into());
        self
    }

    pub fn foreign_key_to(&self, target: &str) -> Option<&str> {
        self.overrides
            .get(target)
            .map(String::as_str)
            .or_else(|| self.base.foreign_key_to(target))
    }
}
