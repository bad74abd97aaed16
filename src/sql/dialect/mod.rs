//! SQL dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` to handle its specific syntax:
//!
//! - Identifier quoting: `"` (PG/SQLite), `` ` `` (MySQL), `[]` (T-SQL)
//! - Pagination: LIMIT/OFFSET vs `limit s,l` vs OFFSET FETCH
//! - NULLS FIRST/LAST: native vs IS NOT NULL / CASE WHEN emulation
//! - String aggregation: GROUP_CONCAT vs STRING_AGG
//! - Date rendering: DATE_FORMAT / TO_CHAR / strftime / CONVERT style 23
//! - Catalog introspection SQL
//!
//! # Usage
//!
//! ```ignore
//! use strata::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! ```

pub mod helpers;
mod mysql;
mod postgres;
mod sqlite;
mod tsql;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use tsql::TSql;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Database product name in vendor metadata form, e.g. `MYSQL`.
    fn product_name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - PostgreSQL/SQLite: `"identifier"`
    /// - MySQL: `` `identifier` ``
    /// - T-SQL: `[identifier]`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote an optional identifier, passing `None` through unchanged.
    fn quote_identifier_opt(&self, ident: Option<&str>) -> Option<String> {
        ident.map(|i| self.quote_identifier(i))
    }

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Append the dialect's pagination clause to a complete statement.
    ///
    /// `start` is a zero-based row offset; `limit` is the page size.
    ///
    /// - MySQL: `limit start,limit` (or `limit limit` when start is 0)
    /// - PostgreSQL/SQLite: `LIMIT limit OFFSET start` (OFFSET omitted at 0)
    /// - T-SQL: `OFFSET start ROWS FETCH NEXT limit ROWS ONLY`, with a
    ///   trivial ORDER BY synthesized when the statement has none
    fn generate_paging_sql(&self, sql: &str, start: u64, limit: u64) -> String;

    // =========================================================================
    // NULLS Ordering
    // =========================================================================

    /// Render an ORDER BY element that places NULLs first or last.
    ///
    /// The input is an already-rendered column expression, optionally with
    /// a trailing ASC/DESC.
    fn build_null_order_clause(&self, column_expr: &str, nulls_first: bool) -> String;

    /// Whether this dialect supports NULLS FIRST/LAST in ORDER BY natively.
    ///
    /// MySQL and T-SQL emulate it with an extra sort key.
    fn supports_native_nulls_ordering(&self) -> bool {
        false
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Render a string-aggregation call over `column` joined by `separator`.
    fn build_string_agg_function(&self, column: &str, separator: &str) -> String;

    /// Render `column` as an ISO `YYYY-MM-DD` string.
    fn build_date_format_function(&self, column: &str) -> String;

    /// Remap a function name for this dialect.
    ///
    /// Different databases use different names for the same functions:
    /// - `STRFTIME` → `TO_CHAR` (PostgreSQL) / `DATE_FORMAT` (MySQL)
    /// - `NVL` → `IFNULL` (MySQL/SQLite) / `COALESCE` (PostgreSQL/T-SQL)
    /// - `LENGTH` → `LEN` (T-SQL)
    ///
    /// Returns `Some(new_name)` if the function should be remapped, `None` to
    /// keep the original. The input is matched case-insensitively.
    fn remap_function(&self, name: &str) -> Option<&'static str> {
        let _ = name;
        None
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Expression yielding the current schema/database name.
    fn current_schema_function(&self) -> &'static str;

    /// Parameterized statement returning column metadata for a table:
    /// name, max character length, key marker (`PRI` for primary key
    /// members), and data type.
    fn column_metadata_sql(&self) -> &'static str;

    /// Statement listing the tables of the current schema.
    fn query_tables_sql(&self) -> &'static str;

    /// A schema-qualified, quoted table reference.
    fn qualified_table_name(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(s) => format!("{}.{}", self.quote_identifier(s), self.quote_identifier(table)),
            None => self.quote_identifier(table),
        }
    }

    /// Cheapest statement that proves a connection is alive.
    fn validation_query(&self) -> &'static str {
        "SELECT 1"
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
    Sqlite,
    TSql,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
            Dialect::Sqlite => &Sqlite,
            Dialect::TSql => &TSql,
        }
    }

    /// Resolve a dialect from its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mysql" => Some(Dialect::MySql),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "sqlite" => Some(Dialect::Sqlite),
            "tsql" | "sqlserver" | "mssql" => Some(Dialect::TSql),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn product_name(&self) -> &'static str {
        self.dialect().product_name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn generate_paging_sql(&self, sql: &str, start: u64, limit: u64) -> String {
        self.dialect().generate_paging_sql(sql, start, limit)
    }

    fn build_null_order_clause(&self, column_expr: &str, nulls_first: bool) -> String {
        self.dialect().build_null_order_clause(column_expr, nulls_first)
    }

    fn supports_native_nulls_ordering(&self) -> bool {
        self.dialect().supports_native_nulls_ordering()
    }

    fn build_string_agg_function(&self, column: &str, separator: &str) -> String {
        self.dialect().build_string_agg_function(column, separator)
    }

    fn build_date_format_function(&self, column: &str) -> String {
        self.dialect().build_date_format_function(column)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        self.dialect().remap_function(name)
    }

    fn current_schema_function(&self) -> &'static str {
        self.dialect().current_schema_function()
    }

    fn column_metadata_sql(&self) -> &'static str {
        self.dialect().column_metadata_sql()
    }

    fn query_tables_sql(&self) -> &'static str {
        self.dialect().query_tables_sql()
    }

    fn validation_query(&self) -> &'static str {
        self.dialect().validation_query()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
