//! PostgreSQL 12+ dialect.

use super::helpers;
use super::SqlDialect;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn product_name(&self) -> &'static str {
        "POSTGRESQL"
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
        format!("STRING_AGG({}::text, '{}')", column, separator)
    }

    fn build_date_format_function(&self, column: &str) -> String {
        format!("TO_CHAR({}, 'YYYY-MM-DD')", column)
    }

    fn current_schema_function(&self) -> &'static str {
        "current_schema()"
    }

    fn column_metadata_sql(&self) -> &'static str {
        "SELECT c.column_name, c.character_maximum_length, \
         CASE WHEN pk.constraint_type = 'PRIMARY KEY' THEN 'PRI' ELSE '' END AS column_key, \
         c.data_type \
         FROM information_schema.columns c \
         LEFT JOIN information_schema.key_column_usage kcu \
           ON c.table_name = kcu.table_name AND c.column_name = kcu.column_name \
           AND c.table_schema = kcu.table_schema \
         LEFT JOIN information_schema.table_constraints pk \
           ON kcu.constraint_name = pk.constraint_name AND pk.constraint_type = 'PRIMARY KEY' \
         WHERE c.table_name = ? AND c.table_schema = ?"
    }

    fn query_tables_sql(&self) -> &'static str {
        "SELECT table_name FROM information_schema.tables WHERE table_schema = current_schema()"
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        match name.to_ascii_uppercase().as_str() {
            "NVL" | "IFNULL" | "ISNULL" => Some("COALESCE"),
            "STRFTIME" | "DATE_FORMAT" => Some("TO_CHAR"),
            "LEN" => Some("LENGTH"),
            _ => None,
        }
    }
}
