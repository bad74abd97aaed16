//! Dialect syntax rules across the four engines.

use strata::sql::dialect::{Dialect, SqlDialect};

const ALL: [Dialect; 4] = [
    Dialect::MySql,
    Dialect::Postgres,
    Dialect::Sqlite,
    Dialect::TSql,
];

#[test]
fn optional_identifier_passes_none_through() {
    for dialect in ALL {
        assert_eq!(dialect.quote_identifier_opt(None), None);
        assert!(dialect.quote_identifier_opt(Some("users")).is_some());
    }
}

#[test]
fn quoting_wraps_in_dialect_marks() {
    assert_eq!(Dialect::MySql.quote_identifier("users"), "`users`");
    assert_eq!(Dialect::Postgres.quote_identifier("users"), "\"users\"");
    assert_eq!(Dialect::Sqlite.quote_identifier("users"), "\"users\"");
    assert_eq!(Dialect::TSql.quote_identifier("users"), "[users]");
}

#[test]
fn string_literals_double_single_quotes() {
    for dialect in ALL {
        assert_eq!(dialect.quote_string("O'Brien"), "'O''Brien'");
    }
}

#[test]
fn null_ordering_native_support() {
    assert!(!Dialect::MySql.supports_native_nulls_ordering());
    assert!(!Dialect::TSql.supports_native_nulls_ordering());
    assert!(Dialect::Postgres.supports_native_nulls_ordering());
    assert!(Dialect::Sqlite.supports_native_nulls_ordering());
}

#[test]
fn null_order_clause_shapes() {
    assert_eq!(
        Dialect::Postgres.build_null_order_clause("\"t\".\"c\"", true),
        "\"t\".\"c\" NULLS FIRST"
    );
    assert_eq!(
        Dialect::Sqlite.build_null_order_clause("\"t\".\"c\"", false),
        "\"t\".\"c\" NULLS LAST"
    );
    assert_eq!(
        Dialect::MySql.build_null_order_clause("`t`.`c`", true),
        "(`t`.`c`) IS NOT NULL, `t`.`c`"
    );
    assert_eq!(
        Dialect::MySql.build_null_order_clause("`t`.`c`", false),
        "(`t`.`c`) IS NOT NULL DESC, `t`.`c`"
    );
    assert_eq!(
        Dialect::TSql.build_null_order_clause("[t].[c]", true),
        "CASE WHEN [t].[c] IS NULL THEN 0 ELSE 1 END, [t].[c]"
    );
    assert_eq!(
        Dialect::TSql.build_null_order_clause("[t].[c]", false),
        "CASE WHEN [t].[c] IS NULL THEN 1 ELSE 0 END, [t].[c]"
    );
}

#[test]
fn string_aggregation_per_engine() {
    assert_eq!(
        Dialect::MySql.build_string_agg_function("`t`.`c`", ","),
        "GROUP_CONCAT(`t`.`c` SEPARATOR ',')"
    );
    assert_eq!(
        Dialect::Postgres.build_string_agg_function("\"t\".\"c\"", ","),
        "STRING_AGG(\"t\".\"c\"::text, ',')"
    );
    assert_eq!(
        Dialect::Sqlite.build_string_agg_function("\"t\".\"c\"", ","),
        "GROUP_CONCAT(\"t\".\"c\", ',')"
    );
    assert_eq!(
        Dialect::TSql.build_string_agg_function("[t].[c]", ","),
        "STRING_AGG([t].[c], ',')"
    );
}

#[test]
fn date_formatting_per_engine() {
    assert_eq!(
        Dialect::MySql.build_date_format_function("`t`.`c`"),
        "DATE_FORMAT(`t`.`c`,'%Y-%m-%d')"
    );
    assert_eq!(
        Dialect::Postgres.build_date_format_function("\"t\".\"c\""),
        "TO_CHAR(\"t\".\"c\", 'YYYY-MM-DD')"
    );
    assert_eq!(
        Dialect::Sqlite.build_date_format_function("\"t\".\"c\""),
        "strftime('%Y-%m-%d', \"t\".\"c\")"
    );
    assert_eq!(
        Dialect::TSql.build_date_format_function("[t].[c]"),
        "CONVERT(VARCHAR(10), [t].[c], 23)"
    );
}

#[test]
fn product_names_are_stable_labels() {
    assert_eq!(Dialect::MySql.product_name(), "MYSQL");
    assert_eq!(Dialect::Postgres.product_name(), "POSTGRESQL");
    assert_eq!(Dialect::Sqlite.product_name(), "SQLITE");
    assert_eq!(Dialect::TSql.product_name(), "SQLSERVER");
}

#[test]
fn current_schema_expression() {
    assert_eq!(Dialect::MySql.current_schema_function(), "DATABASE()");
    assert_eq!(Dialect::Postgres.current_schema_function(), "current_schema()");
    assert_eq!(Dialect::Sqlite.current_schema_function(), "'main'");
    assert_eq!(Dialect::TSql.current_schema_function(), "SCHEMA_NAME()");
}

#[test]
fn catalog_queries_exist_for_every_engine() {
    for dialect in ALL {
        assert!(!dialect.column_metadata_sql().is_empty());
        assert!(!dialect.query_tables_sql().is_empty());
        assert!(!dialect.validation_query().is_empty());
    }
}

#[test]
fn function_remapping_follows_the_engine() {
    assert_eq!(Dialect::MySql.remap_function("NVL"), Some("IFNULL"));
    assert_eq!(Dialect::Postgres.remap_function("NVL"), Some("COALESCE"));
    assert_eq!(Dialect::Sqlite.remap_function("NVL"), Some("IFNULL"));
    assert_eq!(Dialect::TSql.remap_function("NVL"), Some("COALESCE"));

    assert_eq!(Dialect::MySql.remap_function("TO_CHAR"), Some("DATE_FORMAT"));
    assert_eq!(Dialect::Postgres.remap_function("DATE_FORMAT"), Some("TO_CHAR"));
    assert_eq!(Dialect::TSql.remap_function("LENGTH"), Some("LEN"));
    assert_eq!(Dialect::TSql.remap_function("LEN"), None);
}

#[test]
fn dialect_resolves_from_configuration_names() {
    assert_eq!(Dialect::from_name("mysql"), Some(Dialect::MySql));
    assert_eq!(Dialect::from_name("postgresql"), Some(Dialect::Postgres));
    assert_eq!(Dialect::from_name("SQLSERVER"), Some(Dialect::TSql));
    assert_eq!(Dialect::from_name("db2"), None);
}
