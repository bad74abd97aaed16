//! Aggregate detection on compiled fragments.

use std::sync::Arc;

use strata::expr::{CompileContext, SqlBackend};
use strata::model::{Aggregation, Model, ModelDef};
use strata::{Dialect, Expr};

fn model() -> Arc<Model> {
    let def: ModelDef = serde_json::from_str(
        r#"{
            "name": "Orders",
            "table": {"name": "orders"},
            "measures": [{"name": "amount"}],
            "columns": [{"name": "orderId", "column": "order_id"}]
        }"#,
    )
    .unwrap();
    Arc::new(Model::from_def(def).unwrap())
}

fn context() -> CompileContext {
    CompileContext::new(model(), Box::new(SqlBackend::new(Dialect::MySql)))
}

#[test]
fn a_single_aggregate_call_carries_its_kind() {
    let mut ctx = context();
    let fragment = Expr::call("sum", vec![Expr::column("amount")])
        .compile(&mut ctx)
        .unwrap();
    assert!(fragment.has_aggregate);
    assert_eq!(fragment.aggregation, Some(Aggregation::Sum));
    assert_eq!(fragment.text(), "SUM(`orders`.`amount`)");
}

#[test]
fn compound_aggregate_expressions_drop_the_kind() {
    let mut ctx = context();
    let expr = Expr::binary(
        Expr::call("sum", vec![Expr::column("amount")]),
        "+",
        Expr::call("count", vec![Expr::column("orderId")]),
    );
    let fragment = expr.compile(&mut ctx).unwrap();
    assert!(fragment.has_aggregate);
    assert_eq!(fragment.aggregation, None);
}

#[test]
fn an_outer_call_over_an_aggregate_drops_the_kind() {
    let mut ctx = context();
    let expr = Expr::call(
        "round",
        vec![Expr::call("avg", vec![Expr::column("amount")])],
    );
    let fragment = expr.compile(&mut ctx).unwrap();
    assert!(fragment.has_aggregate);
    assert_eq!(fragment.aggregation, None);
}

#[test]
fn negating_an_aggregate_drops_the_kind() {
    let mut ctx = context();
    let expr = Expr::unary("-", Expr::call("sum", vec![Expr::column("amount")]));
    let fragment = expr.compile(&mut ctx).unwrap();
    assert!(fragment.has_aggregate);
    assert_eq!(fragment.aggregation, None);
}

#[test]
fn group_concat_aggregates_without_a_kind() {
    let mut ctx = context();
    let fragment = Expr::call("group_concat", vec![Expr::column("orderId")])
        .compile(&mut ctx)
        .unwrap();
    assert!(fragment.has_aggregate);
    assert_eq!(fragment.aggregation, None);
}

#[test]
fn plain_expressions_report_no_aggregate() {
    let mut ctx = context();
    let fragment = Expr::binary(Expr::column("amount"), "*", Expr::literal(2i64))
        .compile(&mut ctx)
        .unwrap();
    assert!(!fragment.has_aggregate);
    assert_eq!(fragment.aggregation, None);
}

#[test]
fn count_infers_integer_and_sum_infers_number() {
    let mut ctx = context();
    let count = Expr::call("count", vec![Expr::column("orderId")])
        .compile(&mut ctx)
        .unwrap();
    assert_eq!(count.column_type, strata::model::ColumnType::Integer);
    let sum = Expr::call("sum", vec![Expr::column("amount")])
        .compile(&mut ctx)
        .unwrap();
    assert_eq!(sum.column_type, strata::model::ColumnType::Number);
}
