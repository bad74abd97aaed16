//! SQL Server (T-SQL) dialect.
//!
//! T-SQL differences from ANSI:
//! - Square-bracket identifier quoting (`[name]`)
//! - OFFSET/FETCH paging, which requires an ORDER BY clause
//! - No NULLS FIRST/LAST (emulated with a CASE WHEN sort key)
//! - CONVERT with style 23 for ISO date rendering

use super::helpers;
use super::SqlDialect;

/// SQL Server dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn product_name(&self) -> &'static str {
        "SQLSERVER"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn generate_paging_sql(&self, sql: &str, start: u64, limit: u64) -> String {
        helpers::paging_offset_fetch(sql, start, limit)
    }

    fn build_null_order_clause(&self, column_expr: &str, nulls_first: bool) -> String {
        helpers::null_order_case_when(column_expr, nulls_first)
    }

    fn build_string_agg_function(&self, column: &str, separator: &str) -> String {
        format!("STRING_AGG({}, '{}')", column, separator)
    }

    fn build_date_format_function(&self, column: &str) -> String {
        format!("CONVERT(VARCHAR(10), {}, 23)", column)
    }

    fn current_schema_function(&self) -> &'static str {
        "SCHEMA_NAME()"
    }

    fn column_metadata_sql(&self) -> &'static str {
        "SELECT c.COLUMN_NAME, c.CHARACTER_MAXIMUM_LENGTH, \
         CASE WHEN k.COLUMN_NAME IS NOT NULL THEN 'PRI' ELSE '' END AS COLUMN_KEY, \
         c.DATA_TYPE \
         FROM INFORMATION_SCHEMA.COLUMNS c \
         LEFT JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k \
           ON c.TABLE_NAME = k.TABLE_NAME AND c.COLUMN_NAME = k.COLUMN_NAME \
           AND OBJECTPROPERTY(OBJECT_ID(k.CONSTRAINT_SCHEMA + '.' + k.CONSTRAINT_NAME), 'IsPrimaryKey') = 1 \
         WHERE c.TABLE_NAME = ? AND c.TABLE_SCHEMA = ?"
    }

    fn query_tables_sql(&self) -> &'static str {
        "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = SCHEMA_NAME()"
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        match name.to_ascii_uppercase().as_str() {
            "NVL" | "IFNULL" => Some("COALESCE"),
            "LENGTH" => Some("LEN"),
            _ => None,
        }
    }
}
