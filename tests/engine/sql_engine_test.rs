//! End-to-end SQL assembly.

use std::sync::Arc;

use insta::assert_snapshot;
use strata::engine::CalculatedExpr;
use strata::model::{Aggregation, Model, ModelDef};
use strata::query::{FilterNode, GroupSpec, OrderSpec, QueryRequest};
use strata::{Dialect, Expr, QueryError, SqlQueryEngine};

fn orders_model() -> Arc<Model> {
    let def: ModelDef = serde_json::from_str(
        r#"{
            "name": "Orders",
            "table": {"name": "orders", "foreignKeys": {"customer": "customer_id"}},
            "joins": [{"name": "customer"}],
            "dimensions": [{
                "name": "customer",
                "table": "customer",
                "idColumn": "id",
                "captionColumn": "caption"
            }],
            "measures": [{"name": "amount"}],
            "columns": [{"name": "orderId", "column": "order_id"}]
        }"#,
    )
    .unwrap();
    Arc::new(Model::from_def(def).unwrap())
}

fn orders_request() -> QueryRequest {
    let mut request = QueryRequest::new(["orderId", "customer$caption", "amount"]);
    request.filters = vec![FilterNode::compare("customer$id", "=", "C001")];
    request.limit = Some(10);
    request
}

#[test]
fn dimension_reference_produces_exactly_one_join() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let compiled = engine.compile(&orders_model(), &orders_request()).unwrap();
    assert_eq!(compiled.sql.matches("JOIN").count(), 1);
    assert_snapshot!(compiled.sql, @"SELECT `orders`.`order_id` AS `orderId`, `customer`.`caption` AS `customer$caption`, `orders`.`amount` AS `amount` FROM `orders` LEFT JOIN `customer` ON `orders`.`customer_id` = `customer`.`id` WHERE `customer`.`id` = 'C001' limit 10");
}

#[test]
fn base_only_requests_have_no_joins() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = QueryRequest::new(["orderId", "amount"]);
    request.limit = Some(5);
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    assert!(!compiled.sql.contains("JOIN"));
    assert_snapshot!(compiled.sql, @"SELECT `orders`.`order_id` AS `orderId`, `orders`.`amount` AS `amount` FROM `orders` limit 5");
}

#[test]
fn return_total_adds_a_count_statement() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = orders_request();
    request.return_total = true;
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    let count_sql = compiled.count_sql.unwrap();
    assert!(count_sql.starts_with("SELECT COUNT(*) FROM (SELECT"));
    assert!(count_sql.ends_with("`__total`"));
    assert!(!count_sql.contains("limit"));
}

#[test]
fn group_by_builds_keys_and_aggregates() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = QueryRequest::new(Vec::<String>::new());
    request.group_by = vec![
        GroupSpec::key("customer$caption"),
        GroupSpec::aggregate("amount", Aggregation::Sum),
    ];
    request.limit = Some(100);
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    assert!(compiled
        .sql
        .contains("SUM(`orders`.`amount`) AS `amount`"));
    assert!(compiled.sql.contains("GROUP BY `customer`.`caption`"));
    // The aggregate column is never a grouping key.
    assert!(!compiled.sql.contains("GROUP BY `customer`.`caption`, SUM"));
}

#[test]
fn order_by_uses_native_null_placement_on_postgres() {
    let engine = SqlQueryEngine::new(Dialect::Postgres);
    let mut request = QueryRequest::new(["orderId"]);
    request.order_by = vec![OrderSpec {
        field: "amount".to_string(),
        dir: strata::SortDir::Desc,
        nulls_first: Some(false),
    }];
    request.limit = Some(10);
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    assert!(compiled
        .sql
        .contains("ORDER BY \"orders\".\"amount\" DESC NULLS LAST"));
}

#[test]
fn order_by_emulates_null_placement_on_mysql() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = QueryRequest::new(["orderId"]);
    request.order_by = vec![OrderSpec {
        field: "amount".to_string(),
        dir: strata::SortDir::Desc,
        nulls_first: Some(true),
    }];
    request.limit = Some(10);
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    assert!(compiled
        .sql
        .contains("ORDER BY (`orders`.`amount`) IS NOT NULL, `orders`.`amount` DESC"));
}

#[test]
fn tsql_paging_synthesizes_an_order_by() {
    let engine = SqlQueryEngine::new(Dialect::TSql);
    let mut request = QueryRequest::new(["orderId"]);
    request.start = 20;
    request.limit = Some(10);
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    assert!(compiled.sql.contains("ORDER BY (SELECT NULL)"));
    assert!(compiled
        .sql
        .ends_with("OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"));
    assert_eq!(compiled.sql.matches("ORDER BY").count(), 1);
}

#[test]
fn limits_default_and_clamp() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let request = QueryRequest::new(["orderId"]);
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    assert!(compiled.sql.ends_with("limit 20"));

    let mut request = QueryRequest::new(["orderId"]);
    request.limit = Some(5000);
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    assert!(compiled.sql.ends_with("limit 1000"));
}

#[test]
fn calculated_fields_join_their_dependencies() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let calculated = [CalculatedExpr::new(
        "customerTag",
        "Customer Tag",
        Expr::call(
            "concat",
            vec![Expr::column("customer$caption"), Expr::literal("!")],
        ),
    )];
    let mut request = QueryRequest::new(["orderId", "customerTag"]);
    request.limit = Some(10);
    let compiled = engine
        .compile_with(&orders_model(), &request, &calculated)
        .unwrap();
    // The customer table is joined even though no customer field was
    // selected directly.
    assert_eq!(compiled.sql.matches("LEFT JOIN `customer`").count(), 1);
    assert!(compiled
        .sql
        .contains("CONCAT(`customer`.`caption`, '!') AS `customerTag`"));
}

#[test]
fn nested_dimension_chains_two_joins_in_order() {
    let def: ModelDef = serde_json::from_str(
        r#"{
            "name": "Sales",
            "table": {"name": "sales", "foreignKeys": {"product": "product_id"}},
            "joins": [
                {"name": "product", "foreignKeys": {"category": "category_id"}},
                {"name": "category", "primaryKey": "categoryId"}
            ],
            "dimensions": [{
                "name": "product",
                "table": "product",
                "idColumn": "id",
                "children": [
                    {"name": "category", "table": "category", "idColumn": "categoryId"}
                ]
            }]
        }"#,
    )
    .unwrap();
    let model = Arc::new(Model::from_def(def).unwrap());
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = QueryRequest::new(["product.category$categoryId"]);
    request.limit = Some(10);
    let compiled = engine.compile(&model, &request).unwrap();
    let product_at = compiled.sql.find("LEFT JOIN `product`").unwrap();
    let category_at = compiled.sql.find("LEFT JOIN `category`").unwrap();
    assert!(product_at < category_at);
    assert!(compiled
        .sql
        .contains("`category`.`categoryId` AS `product_category$categoryId`"));
}

#[test]
fn filters_support_groups_in_and_between() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = QueryRequest::new(["orderId"]);
    request.filters = vec![
        FilterNode::group(
            "or",
            vec![
                FilterNode::compare("customer$id", "=", "C001"),
                FilterNode::compare("customer$id", "=", "C002"),
            ],
        ),
        FilterNode::with_values("amount", "between", [10i64, 20i64]),
        FilterNode::with_values("orderId", "in", ["A", "B"]),
    ];
    request.limit = Some(10);
    let compiled = engine.compile(&orders_model(), &request).unwrap();
    assert!(compiled
        .sql
        .contains("(`customer`.`id` = 'C001' OR `customer`.`id` = 'C002')"));
    assert!(compiled
        .sql
        .contains("`orders`.`amount` BETWEEN 10 AND 20"));
    assert!(compiled.sql.contains("`orders`.`order_id` IN ('A', 'B')"));
}

#[test]
fn unknown_filter_operator_fails() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = QueryRequest::new(["orderId"]);
    request.filters = vec![FilterNode::compare("orderId", "~", "x")];
    assert_eq!(
        engine.compile(&orders_model(), &request).unwrap_err(),
        QueryError::UnsupportedOperator("~".to_string())
    );
}

#[test]
fn filtering_on_an_aggregate_calculated_field_fails() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let calculated = [CalculatedExpr::new(
        "total",
        "Total",
        Expr::call("sum", vec![Expr::column("amount")]),
    )];
    let mut request = QueryRequest::new(["orderId"]);
    request.filters = vec![FilterNode::compare("total", ">", 100i64)];
    let err = engine
        .compile_with(&orders_model(), &request, &calculated)
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::InvalidAggregationUsage { column, .. } if column == "total"
    ));
}

#[test]
fn aliased_tables_bind_and_qualify_by_alias() {
    let def: ModelDef = serde_json::from_str(
        r#"{
            "name": "Orders",
            "table": {"name": "orders", "alias": "o", "foreignKeys": {"customer": "customer_id"}},
            "joins": [{"name": "customer", "alias": "c"}],
            "dimensions": [{
                "name": "customer",
                "table": "customer",
                "idColumn": "id",
                "captionColumn": "caption"
            }],
            "columns": [{"name": "orderId", "column": "order_id"}]
        }"#,
    )
    .unwrap();
    let model = Arc::new(Model::from_def(def).unwrap());
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = QueryRequest::new(["orderId", "customer$caption"]);
    request.limit = Some(10);
    let compiled = engine.compile(&model, &request).unwrap();
    assert!(compiled.sql.contains("FROM `orders` `o`"));
    assert!(compiled.sql.contains("`o`.`order_id` AS `orderId`"));
    assert!(compiled
        .sql
        .contains("LEFT JOIN `customer` `c` ON `o`.`customer_id` = `c`.`id`"));
    assert!(compiled.sql.contains("`c`.`caption` AS `customer$caption`"));
    // The bound table name must not leak into any clause.
    assert!(!compiled.sql.contains("`orders`.`order_id`"));
}

#[test]
fn empty_selection_fails_fast() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let request = QueryRequest::new(Vec::<String>::new());
    assert_eq!(
        engine.compile(&orders_model(), &request).unwrap_err(),
        QueryError::EmptySelection
    );
}

#[test]
fn grouping_by_an_aggregate_calculated_field_fails() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let calculated = [CalculatedExpr::new(
        "total",
        "Total",
        Expr::call("sum", vec![Expr::column("amount")]),
    )];
    let mut request = QueryRequest::new(Vec::<String>::new());
    request.group_by = vec![GroupSpec::key("total")];
    let err = engine
        .compile_with(&orders_model(), &request, &calculated)
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::InvalidAggregationUsage { column, .. } if column == "total"
    ));
}

#[test]
fn dimension_foreign_key_overrides_the_base_join_column() {
    let def: ModelDef = serde_json::from_str(
        r#"{
            "name": "Orders",
            "table": {"name": "orders", "foreignKeys": {"customer": "customer_id"}},
            "joins": [{"name": "customer"}],
            "dimensions": [{
                "name": "customer",
                "table": "customer",
                "idColumn": "id",
                "captionColumn": "caption",
                "foreignKey": "buyer_id"
            }],
            "columns": [{"name": "orderId", "column": "order_id"}]
        }"#,
    )
    .unwrap();
    let model = Arc::new(Model::from_def(def).unwrap());
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let mut request = QueryRequest::new(["orderId", "customer$caption"]);
    request.limit = Some(10);
    let compiled = engine.compile(&model, &request).unwrap();
    assert!(compiled
        .sql
        .contains("ON `orders`.`buyer_id` = `customer`.`id`"));
}

#[test]
fn unknown_field_aborts_the_whole_compilation() {
    let engine = SqlQueryEngine::new(Dialect::MySql);
    let request = QueryRequest::new(["orderId", "ghost"]);
    assert_eq!(
        engine.compile(&orders_model(), &request).unwrap_err(),
        QueryError::ColumnNotFound("ghost".to_string())
    );
}
