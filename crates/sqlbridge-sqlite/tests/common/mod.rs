//! Shared fixtures for the integration tests.

use sqlbridge_core::{ColumnDef, Database};

/// Opens an in-memory database with the customer/order schema used
/// across the suite.
pub fn customer_db() -> Database {
    let db = sqlbridge_sqlite::open_in_memory().expect("in-memory database");

    let mut create = db.create_table("customer");
    create
        .column(ColumnDef::new("customerId", "int").primary_key().auto_increment())
        .column(ColumnDef::new("customerName", "varchar(50)").not_null());
    assert!(create.execute().expect("create customer"));

    let mut create = db.create_table("order");
    create
        .column(ColumnDef::new("orderId", "int").primary_key())
        .column(ColumnDef::new("customerId", "int").not_null())
        .column(ColumnDef::new("orderDate", "varchar(10)").not_null())
        .fk("fk_order_customer", "customerId", "customer", "customerId");
    assert!(create.execute().expect("create order"));

    db
}

/// Seeds the three customers and three orders the reference scenarios
/// use: customerB owns two orders, customerZ one, customerA none.
pub fn seed_customers_and_orders(db: &Database) {
    let mut insert = db.insert("customer");
    assert!(insert.prepare_columns(&["customerId", "customerName"]).unwrap());
    for (id, name) in [(1, "customerB"), (2, "customerZ"), (3, "customerA")] {
        insert.set_value("customerId", id).set_value("customerName", name);
        assert!(insert.execute().unwrap());
    }

    let mut insert = db.insert("order");
    assert!(insert
        .prepare_columns(&["orderId", "customerId", "orderDate"])
        .unwrap());
    for (order, customer, date) in [
        (10308, 2, "2016-09-18"),
        (10309, 1, "2016-09-20"),
        (10310, 1, "2016-10-04"),
    ] {
        insert
            .set_value("orderId", order)
            .set_value("customerId", customer)
            .set_value("orderDate", date);
        assert!(insert.execute().unwrap());
    }
}
