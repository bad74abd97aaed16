//! Model building and the name index.

use strata::model::{Aggregation, ColumnId, ColumnType, Model, ModelDef};
use strata::QueryError;

fn orders_def() -> ModelDef {
    serde_json::from_str(
        r#"{
            "name": "Orders",
            "table": {
                "name": "orders",
                "foreignKeys": {"customer": "customer_id"}
            },
            "joins": [{"name": "customer"}],
            "dimensions": [{
                "name": "customer",
                "table": "customer",
                "idColumn": "id",
                "captionColumn": "caption"
            }],
            "measures": [{"name": "amount"}],
            "properties": [{
                "name": "status",
                "dict": {"name": "order_status", "valueColumn": "code", "captionColumn": "label"}
            }],
            "columns": [{"name": "orderId", "column": "order_id"}]
        }"#,
    )
    .unwrap()
}

#[test]
fn dimension_expands_to_id_and_caption_fields() {
    let model = Model::from_def(orders_def()).unwrap();
    let id = model.column("customer$id").unwrap();
    let caption = model.column("customer$caption").unwrap();
    assert!(id.referenced().contains(&ColumnId::new("customer", "id")));
    assert!(caption
        .referenced()
        .contains(&ColumnId::new("customer", "caption")));
}

#[test]
fn measures_and_properties_index_by_name() {
    let model = Model::from_def(orders_def()).unwrap();
    assert_eq!(
        model.column("amount").unwrap().aggregation,
        Some(Aggregation::Sum)
    );
    assert_eq!(
        model.column("status").unwrap().column_type,
        ColumnType::Dict
    );
    assert!(model.column("orderId").is_some());
}

#[test]
fn missing_column_lookup_is_typed() {
    let model = Model::from_def(orders_def()).unwrap();
    assert_eq!(
        model.require_column("nope").unwrap_err(),
        QueryError::ColumnNotFound("nope".to_string())
    );
}

#[test]
fn duplicate_names_fail_initialization() {
    let mut def = orders_def();
    def.columns.push(def.columns[0].clone());
    assert_eq!(
        Model::from_def(def).unwrap_err(),
        QueryError::DuplicateColumn("orderId".to_string())
    );

    // A measure colliding with a dimension field fails the same way.
    let mut def = orders_def();
    def.measures[0].name = "customer$id".to_string();
    assert_eq!(
        Model::from_def(def).unwrap_err(),
        QueryError::DuplicateColumn("customer$id".to_string())
    );
}

#[test]
fn nested_dimensions_index_dotted_paths() {
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
                "captionColumn": "name",
                "children": [
                    {"name": "category", "table": "category", "idColumn": "categoryId"}
                ]
            }]
        }"#,
    )
    .unwrap();
    let model = Model::from_def(def).unwrap();
    assert!(model.column("product$id").is_some());
    assert!(model.column("product$name").is_some());
    let nested = model.column("product.category$categoryId").unwrap();
    assert!(nested
        .referenced()
        .contains(&ColumnId::new("category", "categoryId")));
}

#[test]
fn base_and_joined_query_objects_resolve() {
    let model = Model::from_def(orders_def()).unwrap();
    assert_eq!(model.query_object("orders").unwrap().primary_key, "id");
    assert!(model.query_object("customer").is_some());
    assert!(model.query_object("warehouse").is_none());
    assert_eq!(
        model.base.foreign_key_to("customer"),
        Some("customer_id")
    );
}
