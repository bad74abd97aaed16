//! Deserializable model-definition shapes.
//!
//! These mirror the wire form a model is loaded from; `Model::from_def`
//! turns them into the indexed runtime model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::column::{Aggregation, ColumnType};

/// A complete model definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDef {
    pub name: String,
    /// Base table every query starts from.
    pub table: TableDef,
    /// Joined tables reachable from the base.
    #[serde(default)]
    pub joins: Vec<TableDef>,
    #[serde(default)]
    pub dimensions: Vec<DimensionDef>,
    #[serde(default)]
    pub measures: Vec<MeasureDef>,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub calculated: Vec<CalculatedFieldDef>,
}

/// A FROM-clause participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDef {
    pub name: String,
    pub alias: Option<String>,
    pub schema: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Target table name -> foreign-key column on this table.
    #[serde(default)]
    pub foreign_keys: HashMap<String, String>,
}

fn default_primary_key() -> String {
    "id".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionDef {
    pub name: String,
    pub caption: Option<String>,
    /// Owning table; the base table when absent.
    pub table: Option<String>,
    pub id_column: String,
    pub caption_column: Option<String>,
    /// Foreign-key column on the base table joining this dimension's
    /// table, overriding the base table's declared key.
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub children: Vec<DimensionDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDef {
    pub name: String,
    pub caption: Option<String>,
    /// Physical column; the measure name when absent.
    pub column: Option<String>,
    #[serde(default = "default_measure_type")]
    pub column_type: ColumnType,
    #[serde(default = "default_aggregation")]
    pub aggregation: Aggregation,
}

fn default_measure_type() -> ColumnType {
    ColumnType::Number
}

fn default_aggregation() -> Aggregation {
    Aggregation::Sum
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub name: String,
    pub caption: Option<String>,
    pub column: Option<String>,
    #[serde(default)]
    pub column_type: ColumnType,
    pub dict: Option<DictDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictDef {
    pub name: String,
    pub value_column: String,
    pub caption_column: String,
}

/// A plain physical column exposed without dimension or measure semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub name: String,
    pub caption: Option<String>,
    pub column: Option<String>,
    #[serde(default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub deprecated: bool,
}

/// A calculated field: a named expression in the upstream scripting
/// syntax, compiled per query by the expression layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedFieldDef {
    pub name: String,
    pub caption: Option<String>,
    pub formula: String,
    pub column_type: Option<ColumnType>,
}
