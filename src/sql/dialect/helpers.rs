//! Shared helper functions for SQL dialect implementations.
//!
//! Reusable building blocks that dialects compose to implement the
//! `SqlDialect` trait with minimal duplication.

use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: SQL Server
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

// =============================================================================
// Pagination
// =============================================================================

/// MySQL-style paging: `limit start,limit`, or `limit limit` when start is 0.
pub fn paging_mysql(sql: &str, start: u64, limit: u64) -> String {
    if start > 0 {
        format!("{} limit {},{}", sql, start, limit)
    } else {
        format!("{} limit {}", sql, limit)
    }
}

/// LIMIT/OFFSET paging: `LIMIT limit OFFSET start`, OFFSET omitted when 0.
/// Used by: Postgres, SQLite
pub fn paging_limit_offset(sql: &str, start: u64, limit: u64) -> String {
    if start > 0 {
        format!("{} LIMIT {} OFFSET {}", sql, limit, start)
    } else {
        format!("{} LIMIT {}", sql, limit)
    }
}

/// Matches an ORDER BY clause as words, so an identifier like
/// `"order by hand"` inside quotes of another name does not count.
static ORDER_BY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\border\s+by\b").expect("order-by pattern"));

/// SQL Server paging: OFFSET ... ROWS FETCH NEXT ... ROWS ONLY.
///
/// The clause is only valid after an ORDER BY; a trivial one is synthesized
/// when the statement has none. An existing ORDER BY is never duplicated.
pub fn paging_offset_fetch(sql: &str, start: u64, limit: u64) -> String {
    let mut out = String::with_capacity(sql.len() + 64);
    out.push_str(sql);
    if !ORDER_BY_RE.is_match(sql) {
        out.push_str(" ORDER BY (SELECT NULL)");
    }
    out.push_str(&format!(
        " OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
        start, limit
    ));
    out
}

/// Whether a statement already carries an ORDER BY clause.
pub fn has_order_by(sql: &str) -> bool {
    ORDER_BY_RE.is_match(sql)
}

// =============================================================================
// NULL Ordering
// =============================================================================

/// Native `NULLS FIRST` / `NULLS LAST` suffix.
/// Used by: Postgres, SQLite 3.30+
pub fn null_order_native(column_expr: &str, nulls_first: bool) -> String {
    if nulls_first {
        format!("{} NULLS FIRST", column_expr)
    } else {
        format!("{} NULLS LAST", column_expr)
    }
}

/// MySQL emulation via `IS NOT NULL` sort key.
pub fn null_order_is_not_null(column_expr: &str, nulls_first: bool) -> String {
    if nulls_first {
        format!("({}) IS NOT NULL, {}", column_expr, column_expr)
    } else {
        format!("({}) IS NOT NULL DESC, {}", column_expr, column_expr)
    }
}

/// SQL Server emulation via a CASE WHEN sort key.
pub fn null_order_case_when(column_expr: &str, nulls_first: bool) -> String {
    if nulls_first {
        format!(
            "CASE WHEN {} IS NULL THEN 0 ELSE 1 END, {}",
            column_expr, column_expr
        )
    } else {
        format!(
            "CASE WHEN {} IS NULL THEN 1 ELSE 0 END, {}",
            column_expr, column_expr
        )
    }
}
