//! Dimension paths.
//!
//! A dimension field is addressed as `<path>$<column>` where the path is a
//! chain of dimension names. References use dots between segments
//! (`product.category$categoryId`); column aliases use underscores
//! (`product_category$categoryId`). Both forms round-trip through their
//! parse/format pair.

/// A parsed dimension field reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimensionPath {
    segments: Vec<String>,
    column: String,
}

impl DimensionPath {
    /// A single-level path `<dimension>$<column>`.
    pub fn new(dimension: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            segments: vec![dimension.into()],
            column: column.into(),
        }
    }

    /// Parse the dot reference form, e.g. `product.category$categoryId`.
    ///
    /// Returns `None` for names without a `$` separator (plain columns
    /// and measures are not dimension paths).
    pub fn parse(reference: &str) -> Option<Self> {
        Self::parse_with(reference, '.')
    }

    /// Parse the underscore alias form, e.g. `product_category$categoryId`.
    pub fn parse_underscore(alias: &str) -> Option<Self> {
        Self::parse_with(alias, '_')
    }

    fn parse_with(s: &str, separator: char) -> Option<Self> {
        let (path, column) = s.split_once('$')?;
        if path.is_empty() || column.is_empty() {
            return None;
        }
        let segments: Vec<String> = path.split(separator).map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self {
            segments,
            column: column.to_string(),
        })
    }

    /// The dot reference form.
    pub fn to_column_ref(&self) -> String {
        format!("{}${}", self.segments.join("."), self.column)
    }

    /// The underscore alias form.
    pub fn to_column_alias(&self) -> String {
        format!("{}${}", self.segments.join("_"), self.column)
    }

    /// Extend the path with a nested dimension, keeping the column.
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self {
            segments,
            column: self.column.clone(),
        }
    }

    /// The path one level up, or `None` at the top level.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            column: self.column.clone(),
        })
    }

    /// Whether the path crosses more than one dimension.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// The dimension chain, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The innermost dimension name.
    pub fn leaf(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// The column part after `$`.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl std::fmt::Display for DimensionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_column_ref())
    }
}
