//! The dimensional model: a catalogue of query objects, dimensions,
//! measures, properties and plain columns, indexed by field name.
//!
//! The index is built once at load time. Insertion order is dimensions
//! (id field, then caption field, nested children after their parent),
//! then measures, then properties, then plain columns; the first name
//! collision fails the whole build.

pub mod column;
pub mod def;
pub mod dimension;
pub mod path;
pub mod query_object;

pub use column::{Aggregation, AggregationColumn, ColumnId, ColumnSource, ColumnType, ModelColumn};
pub use def::{
    CalculatedFieldDef, ColumnDef, DictDef, DimensionDef, MeasureDef, ModelDef, PropertyDef,
    TableDef,
};
pub use dimension::{DictRef, Dimension, Measure, Property};
pub use path::DimensionPath;
pub use query_object::{QueryObject, ResolvedQueryObject};

use std::collections::HashMap;

use crate::error::{QueryError, QueryResult};

/// An initialized dimensional model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    /// Base table every query against this model starts from.
    pub base: QueryObject,
    /// Joined tables, keyed by name.
    pub joined: HashMap<String, QueryObject>,
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<Measure>,
    pub properties: Vec<Property>,
    pub plain_columns: Vec<ModelColumn>,
    /// Calculated-field definitions, in declaration order so later
    /// fields may reference earlier ones.
    pub calculated: Vec<CalculatedFieldDef>,
    index: HashMap<String, ModelColumn>,
}

impl Model {
    /// Build and index a model from its definition.
    pub fn from_def(def: ModelDef) -> QueryResult<Self> {
        let base = query_object_from_def(&def.table);
        let mut joined = HashMap::new();
        for table in &def.joins {
            joined.insert(table.name.clone(), query_object_from_def(table));
        }

        let base_table = base.name.clone();
        let dimensions: Vec<Dimension> = def
            .dimensions
            .iter()
            .map(|d| dimension_from_def(d, &base_table))
            .collect();
        let measures: Vec<Measure> = def
            .measures
            .iter()
            .map(|m| {
                Measure::new(
                    m.name.clone(),
                    m.caption.clone().unwrap_or_else(|| m.name.clone()),
                    m.column.clone().unwrap_or_else(|| m.name.clone()),
                )
                .with_type(m.column_type)
                .with_aggregation(m.aggregation)
            })
            .collect();
        let properties: Vec<Property> = def
            .properties
            .iter()
            .map(|p| {
                let mut prop = Property::new(
                    p.name.clone(),
                    p.caption.clone().unwrap_or_else(|| p.name.clone()),
                    p.column.clone().unwrap_or_else(|| p.name.clone()),
                )
                .with_type(p.column_type);
                if let Some(dict) = &p.dict {
                    prop = prop.with_dict(DictRef {
                        dict: dict.name.clone(),
                        value_column: dict.value_column.clone(),
                        caption_column: dict.caption_column.clone(),
                    });
                }
                prop
            })
            .collect();
        let plain_columns: Vec<ModelColumn> = def
            .columns
            .iter()
            .map(|c| {
                let mut col = ModelColumn::physical(
                    c.name.clone(),
                    c.caption.clone().unwrap_or_else(|| c.name.clone()),
                    base_table.clone(),
                    c.column.clone().unwrap_or_else(|| c.name.clone()),
                    c.column_type,
                );
                col.deprecated = c.deprecated;
                col
            })
            .collect();

        let mut model = Self {
            name: def.name,
            base,
            joined,
            dimensions,
            measures,
            properties,
            plain_columns,
            calculated: def.calculated,
            index: HashMap::new(),
        };
        model.init()?;
        Ok(model)
    }

    /// Build the name index. Fails on the first duplicate name.
    fn init(&mut self) -> QueryResult<()> {
        let mut index = HashMap::new();

        for dim in &self.dimensions {
            insert_dimension_fields(&mut index, dim, &[])?;
        }
        for measure in &self.measures {
            let mut col = ModelColumn::physical(
                measure.name.clone(),
                measure.caption.clone(),
                self.base.name.clone(),
                measure.column.clone(),
                measure.column_type,
            );
            col.aggregation = Some(measure.aggregation);
            insert_unique(&mut index, col)?;
        }
        for property in &self.properties {
            let column_type = if property.dict.is_some() {
                ColumnType::Dict
            } else {
                property.column_type
            };
            insert_unique(
                &mut index,
                ModelColumn::physical(
                    property.name.clone(),
                    property.caption.clone(),
                    self.base.name.clone(),
                    property.column.clone(),
                    column_type,
                ),
            )?;
        }
        for column in &self.plain_columns {
            insert_unique(&mut index, column.clone())?;
        }

        self.index = index;
        Ok(())
    }

    /// Look up an indexed column by field name.
    pub fn column(&self, name: &str) -> Option<&ModelColumn> {
        self.index.get(name)
    }

    /// Look up a column, failing with `ColumnNotFound`.
    pub fn require_column(&self, name: &str) -> QueryResult<&ModelColumn> {
        self.column(name)
            .ok_or_else(|| QueryError::ColumnNotFound(name.to_string()))
    }

    /// All indexed field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// The query object owning `table`, base included.
    pub fn query_object(&self, table: &str) -> Option<&QueryObject> {
        if self.base.name == table {
            Some(&self.base)
        } else {
            self.joined.get(table)
        }
    }

    /// The calculated-field definition named `name`, if any.
    pub fn calculated_def(&self, name: &str) -> Option<&CalculatedFieldDef> {
        self.calculated.iter().find(|c| c.name == name)
    }
}

fn query_object_from_def(def: &TableDef) -> QueryObject {
    let mut object = QueryObject::new(def.name.clone(), def.primary_key.clone());
    if let Some(alias) = &def.alias {
        object = object.with_alias(alias.clone());
    }
    if let Some(schema) = &def.schema {
        object = object.with_schema(schema.clone());
    }
    for (target, column) in &def.foreign_keys {
        object = object.with_foreign_key(target.clone(), column.clone());
    }
    object
}

fn dimension_from_def(def: &DimensionDef, base_table: &str) -> Dimension {
    let mut dim = Dimension::new(
        def.name.clone(),
        def.caption.clone().unwrap_or_else(|| def.name.clone()),
        def.table.clone().unwrap_or_else(|| base_table.to_string()),
        def.id_column.clone(),
    )
    .with_type(def.column_type);
    if let Some(caption_column) = &def.caption_column {
        dim = dim.with_caption_column(caption_column.clone());
    }
    if let Some(foreign_key) = &def.foreign_key {
        dim = dim.with_foreign_key(foreign_key.clone());
    }
    for child in &def.children {
        dim = dim.with_child(dimension_from_def(child, base_table));
    }
    dim
}

fn insert_dimension_fields(
    index: &mut HashMap<String, ModelColumn>,
    dim: &Dimension,
    parents: &[&str],
) -> QueryResult<()> {
    let path: Vec<&str> = parents.iter().copied().chain([dim.name.as_str()]).collect();
    let prefix = path.join(".");

    insert_unique(
        index,
        ModelColumn::physical(
            format!("{}${}", prefix, dim.id_column),
            dim.caption.clone(),
            dim.table.clone(),
            dim.id_column.clone(),
            dim.column_type,
        ),
    )?;
    if let Some(caption_column) = &dim.caption_column {
        insert_unique(
            index,
            ModelColumn::physical(
                format!("{}${}", prefix, caption_column),
                dim.caption.clone(),
                dim.table.clone(),
                caption_column.clone(),
                ColumnType::Text,
            ),
        )?;
    }
    for child in &dim.children {
        insert_dimension_fields(index, child, &path)?;
    }
    Ok(())
}

fn insert_unique(
    index: &mut HashMap<String, ModelColumn>,
    column: ModelColumn,
) -> QueryResult<()> {
    let name = column.name.clone();
    if index.insert(name.clone(), column).is_some() {
        return Err(QueryError::DuplicateColumn(name));
    }
    Ok(())
}
