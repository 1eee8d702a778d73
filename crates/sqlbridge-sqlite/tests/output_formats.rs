//! Output shaping: the five format tags, default-format selection and
//! the exact JSON rendering the facade promises.

use sqlbridge_core::{ColumnDef, OutputFormat, QueryOutput, Settings, Value};

fn people_db() -> sqlbridge_core::Database {
    let db = sqlbridge_sqlite::open_in_memory().expect("in-memory database");
    let mut create = db.create_table("people");
    create
        .column(ColumnDef::new("id", "int").primary_key().auto_increment())
        .column(ColumnDef::new("name", "varchar(50)").not_null())
        .column(ColumnDef::new("age", "int").not_null());
    assert!(create.execute().unwrap());

    let mut insert = db.insert("people");
    assert!(insert.prepare_columns(&["name", "age"]).unwrap());
    insert.set_value("name", "Bryan").set_value("age", 34);
    assert!(insert.execute().unwrap());
    insert.set_value("name", "Steve").set_value("age", 32);
    assert!(insert.execute().unwrap());
    db
}

#[test]
fn test_json_output_matches_fixed_literal() {
    let db = people_db();
    let mut query = db.table("people").select();
    query.columns(&["id", "name", "age"]).order_asc("id");
    assert_eq!(
        query.get_all(Some(OutputFormat::Json)).unwrap().as_json().unwrap(),
        r#"[{"id":1,"name":"Bryan","age":34},{"id":2,"name":"Steve","age":32}]"#
    );
}

#[test]
fn test_pretty_json_round_trips_to_same_rows() {
    let db = people_db();
    let mut query = db.table("people").select();
    query.columns(&["id", "name", "age"]).order_asc("id");
    let pretty = query.get_all(Some(OutputFormat::JsonPretty)).unwrap();
    let text = pretty.as_json().unwrap();
    assert!(text.contains('\n'));
    let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(parsed[0]["name"], serde_json::json!("Bryan"));
    assert_eq!(parsed[1]["age"], serde_json::json!(32));
}

#[test]
fn test_assoc_rows_preserve_column_order() {
    let db = people_db();
    let mut query = db.table("people").select();
    query.columns(&["name", "age", "id"]).order_asc("id");
    let out = query.get_all(Some(OutputFormat::Assoc)).unwrap();
    let rows = out.as_rows().unwrap();
    let keys: Vec<&String> = rows[0].keys().collect();
    assert_eq!(keys, vec!["name", "age", "id"]);
}

#[test]
fn test_obj_rows_are_json_objects() {
    let db = people_db();
    let mut query = db.table("people").select();
    query.columns(&["id", "name"]).order_asc("id");
    match query.get_all(Some(OutputFormat::Obj)).unwrap() {
        QueryOutput::Obj(rows) => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0]["name"], serde_json::json!("Bryan"));
        }
        other => panic!("unexpected output: {other:?}"),
    }
}

#[test]
fn test_column_output_is_flat_first_column() {
    let db = people_db();
    let mut query = db.table("people").select();
    query.column("name").order_asc("id");
    match query.get_all(Some(OutputFormat::Column)).unwrap() {
        QueryOutput::Column(values) => {
            assert_eq!(values, vec![serde_json::json!("Bryan"), serde_json::json!("Steve")]);
        }
        other => panic!("unexpected output: {other:?}"),
    }
}

#[test]
fn test_default_format_comes_from_settings() {
    let db = sqlbridge_sqlite::open(
        &Settings::new("sqlite")
            .database(":memory:")
            .default_output_format("json"),
    )
    .unwrap();

    let mut create = db.create_table("t");
    create.column(ColumnDef::new("id", "int").primary_key());
    assert!(create.execute().unwrap());
    let mut insert = db.insert("t");
    insert.set_value("id", 7);
    assert!(insert.execute().unwrap());

    let mut query = db.table("t").select();
    query.column("id");
    assert_eq!(query.get_all(None).unwrap().as_json().unwrap(), r#"[{"id":7}]"#);
}

#[test]
fn test_format_tags_parse_case_insensitively() {
    assert_eq!(OutputFormat::parse("jsonpp").unwrap(), OutputFormat::JsonPretty);
    assert_eq!(OutputFormat::parse("ASSOC").unwrap(), OutputFormat::Assoc);
    assert_eq!(OutputFormat::parse("Column").unwrap(), OutputFormat::Column);
    assert!(OutputFormat::parse("csv").is_err());
}

#[test]
fn test_failed_select_yields_empty_shape_with_error() {
    let db = people_db();
    let mut query = db.table("missing").select();
    query.column("id");
    let out = query.get_all(Some(OutputFormat::Json)).unwrap();
    assert_eq!(out.as_json(), Some("[]"));
    assert!(query.has_error());

    let out = query.get_all(Some(OutputFormat::Assoc)).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_null_values_render_as_json_null() {
    let db = people_db();
    let mut create = db.create_table("opt");
    create
        .column(ColumnDef::new("id", "int").primary_key())
        .column(ColumnDef::new("note", "text"));
    assert!(create.execute().unwrap());
    let mut insert = db.insert("opt");
    insert.set_value("id", 1).set_value("note", Value::Null);
    assert!(insert.execute().unwrap());

    let mut query = db.table("opt").select();
    query.columns(&["id", "note"]);
    assert_eq!(
        query.get_all(Some(OutputFormat::Json)).unwrap().as_json().unwrap(),
        r#"[{"id":1,"note":null}]"#
    );
}
