//! SQLite dialect.

use super::helpers;
use super::SqlDialect;

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn product_name(&self) -> &'static str {
        "SQLITE"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn generate_paging_sql(&self, sql: &str, start: u64, limit: u64) -> String {
        helpers::paging_limit_offset(sql, start, limit)
    }

    fn build_null_order_clause(&self, column_expr: &str, nulls_first: bool) -> String {
        helpers::null_order_native(column_expr, nulls_first)
    }

    fn supports_native_nulls_ordering(&self) -> bool {
        true
    }

    fn build_string_agg_function(&self, column: &str, separator: &str) -> String {
        format!("GROUP_CONCAT({}, '{}')", column, separator)
    }

    fn build_date_format_function(&self, column: &str) -> String {
        format!("strftime('%Y-%m-%d', {})", column)
    }

    fn current_schema_function(&self) -> &'static str {
        "'main'"
    }

    fn column_metadata_sql(&self) -> &'static str {
        "SELECT name AS column_name, NULL AS character_maximum_length, \
         CASE WHEN pk > 0 THEN 'PRI' ELSE '' END AS column_key, \
         type AS data_type FROM pragma_table_info(?)"
    }

    fn query_tables_sql(&self) -> &'static str {
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'"
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        match name.to_ascii_uppercase().as_str() {
            "NVL" | "ISNULL" => Some("IFNULL"),
            "TO_CHAR" | "DATE_FORMAT" => Some("STRFTIME"),
            "LEN" => Some("LENGTH"),
            _ => None,
        }
    }
}
