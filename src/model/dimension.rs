//! Dimensions, measures and properties.

use crate::model::column::{Aggregation, ColumnType};

/// A modeled business entity exposing id (and usually caption) sub-fields.
///
/// A coded dimension contributes two addressable fields,
/// `<name>$<id_column>` and `<name>$<caption_column>`; nested children
/// contribute dotted paths under their parent (`product.category$...`).
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub caption: String,
    /// Owning query object (the base table for inline dimensions, a
    /// joined table otherwise).
    pub table: String,
    pub id_column: String,
    pub caption_column: Option<String>,
    /// Foreign-key column overriding the base table's declared key for
    /// this dimension's table.
    pub foreign_key: Option<String>,
    pub column_type: ColumnType,
    pub children: Vec<Dimension>,
}

impl Dimension {
    pub fn new(
        name: impl Into<String>,
        caption: impl Into<String>,
        table: impl Into<String>,
        id_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            table: table.into(),
            id_column: id_column.into(),
            caption_column: None,
            foreign_key: None,
            column_type: ColumnType::Text,
            children: Vec::new(),
        }
    }

    pub fn with_caption_column(mut self, column: impl Into<String>) -> Self {
        self.caption_column = Some(column.into());
        self
    }

    pub fn with_foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn with_child(mut self, child: Dimension) -> Self {
        self.children.push(child);
        self
    }
}

/// A numeric column carrying aggregation semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub name: String,
    pub caption: String,
    /// Physical column on the base table.
    pub column: String,
    pub column_type: ColumnType,
    pub aggregation: Aggregation,
}

impl Measure {
    pub fn new(
        name: impl Into<String>,
        caption: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            column: column.into(),
            column_type: ColumnType::Number,
            aggregation: Aggregation::Sum,
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }
}

/// Reference into a shared dictionary table: the dictionary name plus
/// its value and caption columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DictRef {
    pub dict: String,
    pub value_column: String,
    pub caption_column: String,
}

/// A descriptive attribute of the base table.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub caption: String,
    pub column: String,
    pub column_type: ColumnType,
    pub dict: Option<DictRef>,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        caption: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            column: column.into(),
            column_type: ColumnType::Text,
            dict: None,
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn with_dict(mut self, dict: DictRef) -> Self {
        self.dict = Some(dict);
        self
    }
}
