use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use semquery::catalog::{CatalogError, CatalogScope, load_catalog_document};
use semquery::models::{FieldKind, FieldType};
use serde_json::json;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

fn write_catalog() -> PathBuf {
    let temp = unique_temp_dir("semquery-catalog");
    std::fs::create_dir_all(&temp).expect("temp dir should be creatable");
    let path = temp.join("catalog.json");
    let document = json!({
        "views": [
            {
                "name": "orders",
                "dimensions": [
                    {"name": "status", "type": "string", "expr": "status"},
                    {"name": "ordered_on", "type": "date"}
                ],
                "measures": [
                    {"name": "total", "type": "sum", "description": "Order value"}
                ]
            },
            {
                "name": "customers",
                "dimensions": [{"name": "is_active", "type": "boolean"}],
                "measures": []
            }
        ],
        "topics": [
            {"name": "sales", "base_view": "orders", "views": ["customers"]},
            {"name": "broken", "base_view": "orders", "views": ["returns"]}
        ]
    });
    std::fs::write(
        &path,
        serde_json::to_string_pretty(&document).expect("catalog should serialize"),
    )
    .expect("catalog should be writable");
    path
}

#[test]
fn loads_views_and_topics_from_disk() {
    let document = load_catalog_document(&write_catalog()).expect("catalog should load");

    let view = document
        .field_catalog(&CatalogScope::View("orders".to_string()))
        .expect("view exists");
    assert_eq!(view.len(), 3);
    assert_eq!(view.field_type("orders.ordered_on"), Some(FieldType::Date));

    let topic = document
        .field_catalog(&CatalogScope::Topic("sales".to_string()))
        .expect("topic exists");
    assert_eq!(topic.topic.as_deref(), Some("sales"));
    assert_eq!(
        topic.find("customers.is_active").map(|(kind, field)| (kind, field.field_type)),
        Some((FieldKind::Dimension, Some(FieldType::Boolean)))
    );
}

#[test]
fn scope_lookups_fail_with_typed_errors() {
    let document = load_catalog_document(&write_catalog()).expect("catalog should load");

    assert_eq!(
        document.field_catalog(&CatalogScope::View("invoices".to_string())),
        Err(CatalogError::UnknownView {
            name: "invoices".to_string()
        })
    );
    assert_eq!(
        document.field_catalog(&CatalogScope::Topic("broken".to_string())),
        Err(CatalogError::TopicViewMissing {
            topic: "broken".to_string(),
            view: "returns".to_string()
        })
    );
}

#[test]
fn unreadable_catalog_reports_the_path() {
    let missing = unique_temp_dir("semquery-catalog-missing").join("catalog.json");
    let err = load_catalog_document(&missing).expect_err("missing catalog must fail");
    assert!(
        format!("{err:#}").contains("failed to read catalog"),
        "unexpected error: {err:#}"
    );
}
