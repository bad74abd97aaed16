//! MySQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - `limit start,limit` pagination
//! - No NULLS FIRST/LAST below 8.0 (emulated with an IS NOT NULL sort key)
//! - GROUP_CONCAT with SEPARATOR for string aggregation
//! - DATE_FORMAT for date rendering

use super::helpers;
use super::SqlDialect;

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn product_name(&self) -> &'static str {
        "MYSQL"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn generate_paging_sql(&self, sql: &str, start: u64, limit: u64) -> String {
        helpers::paging_mysql(sql, start, limit)
    }

    fn build_null_order_clause(&self, column_expr: &str, nulls_first: bool) -> String {
        helpers::null_order_is_not_null(column_expr, nulls_first)
    }

    fn build_string_agg_function(&self, column: &str, separator: &str) -> String {
        format!("GROUP_CONCAT({} SEPARATOR '{}')", column, separator)
    }

    fn build_date_format_function(&self, column: &str) -> String {
        format!("DATE_FORMAT({},'%Y-%m-%d')", column)
    }

    fn current_schema_function(&self) -> &'static str {
        "DATABASE()"
    }

    fn column_metadata_sql(&self) -> &'static str {
        "SELECT column_NAME, CHARACTER_MAXIMUM_LENGTH, column_key, DATA_TYPE \
         FROM information_schema.COLUMNS WHERE table_name = ? AND table_schema = ?"
    }

    fn query_tables_sql(&self) -> &'static str {
        "SELECT T.TABLE_NAME FROM information_schema.TABLES T WHERE T.TABLE_SCHEMA = DATABASE()"
    }

    fn validation_query(&self) -> &'static str {
        "select 1"
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        match name.to_ascii_uppercase().as_str() {
            "NVL" => Some("IFNULL"),
            "ISNULL" => Some("IFNULL"),
            "STRFTIME" | "TO_CHAR" => Some("DATE_FORMAT"),
            "LEN" => Some("LENGTH"),
            _ => None,
        }
    }
}
