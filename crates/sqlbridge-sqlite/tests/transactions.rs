//! Transaction semantics: atomicity, the no-op guards, and the
//! raise-inside-transaction error policy.

mod common;

use common::{customer_db, seed_customers_and_orders};
use sqlbridge_core::{Error, Value};

fn order_count(db: &sqlbridge_core::Database) -> i64 {
    let mut query = db.table("order").select();
    query.count("n");
    match query.get_column().unwrap() {
        Some(Value::Int(n)) => n,
        other => panic!("unexpected count: {other:?}"),
    }
}

#[test]
fn test_commit_applies_both_deletes() {
    let db = customer_db();
    seed_customers_and_orders(&db);
    assert_eq!(order_count(&db), 3);

    db.begin_transaction().unwrap();
    let mut first = db.table("order").delete();
    first.where_equal("orderId", 10308);
    assert!(first.execute().unwrap());
    let mut second = db.table("order").delete();
    second.where_equal("orderId", 10309);
    assert!(second.execute().unwrap());
    db.commit().unwrap();

    assert_eq!(order_count(&db), 1);
}

#[test]
fn test_rollback_applies_neither_delete() {
    let db = customer_db();
    seed_customers_and_orders(&db);
    let before = order_count(&db);

    db.begin_transaction().unwrap();
    let mut first = db.table("order").delete();
    first.where_equal("orderId", 10308);
    assert!(first.execute().unwrap());
    let mut second = db.table("order").delete();
    second.where_equal("orderId", 10309);
    assert!(second.execute().unwrap());
    db.rollback().unwrap();

    assert_eq!(order_count(&db), before);
}

#[test]
fn test_failure_inside_transaction_raises() {
    let db = customer_db();
    seed_customers_and_orders(&db);

    db.begin_transaction().unwrap();
    let mut insert = db.insert("customer");
    insert.set_value("customerId", 1).set_value("customerName", "dup");
    let err = insert.execute().unwrap_err();
    assert!(matches!(err, Error::Sql(_)));
    db.rollback().unwrap();

    // the same failure outside a transaction is recorded instead
    let mut insert = db.insert("customer");
    insert.set_value("customerId", 1).set_value("customerName", "dup");
    assert!(!insert.execute().unwrap());
    assert!(insert.has_error());
}

#[test]
fn test_begin_inside_transaction_is_a_noop() {
    let db = customer_db();
    seed_customers_and_orders(&db);

    db.begin_transaction().unwrap();
    assert!(db.in_transaction());
    // nesting is not supported; the second begin must not error
    db.begin_transaction().unwrap();

    let mut delete = db.table("order").delete();
    delete.where_equal("orderId", 10308);
    assert!(delete.execute().unwrap());
    db.commit().unwrap();
    assert!(!db.in_transaction());
    assert_eq!(order_count(&db), 2);

    // committing with no open transaction is a guard, not an error
    db.commit().unwrap();
}
