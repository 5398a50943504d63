//! Child lists: parent-scoped rows in their own tables.

use entrydb_core::db::PARENT_ID_FIELD;
use entrydb_core::prelude::*;
use std::collections::BTreeMap;

fn invoice_type() -> EntryType {
    EntryType::builder("invoice")
        .field(FieldDefinition::new("customer", FieldType::Text).required())
        .child(
            ChildList::new("lines", "Line Items").fields(vec![
                FieldDefinition::new("sku", FieldType::Text).required(),
                FieldDefinition::new("qty", FieldType::Int),
            ]),
        )
        .child(ChildList::new("audit", "Audit Trail").read_only())
        .build()
        .unwrap()
}

fn setup() -> (Database, String) {
    let mut db = Database::in_memory();
    db.register(invoice_type()).unwrap();

    let parent = db
        .create(
            "invoice",
            BTreeMap::from([("customer".to_string(), Value::from("acme"))]),
            &UserSession::system(),
        )
        .unwrap();

    (db, parent.id)
}

fn line(sku: &str, qty: i64) -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("sku".to_string(), Value::from(sku)),
        ("qty".to_string(), Value::Int(qty)),
    ])
}

#[test]
fn children_are_scoped_to_their_parent() {
    let (db, parent_id) = setup();
    let other = db
        .create(
            "invoice",
            BTreeMap::from([("customer".to_string(), Value::from("globex"))]),
            &UserSession::system(),
        )
        .unwrap();

    db.add_child("invoice", &parent_id, "lines", line("a-1", 2)).unwrap();
    db.add_child("invoice", &parent_id, "lines", line("a-2", 1)).unwrap();
    db.add_child("invoice", &other.id, "lines", line("b-1", 5)).unwrap();

    let rows = db.children("invoice", &parent_id, "lines").unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.get(PARENT_ID_FIELD).as_text() == Some(parent_id.as_str())));

    // series ids, in insertion order
    assert_eq!(rows[0].get("sku"), &Value::from("a-1"));
    assert_eq!(rows[1].get("sku"), &Value::from("a-2"));
    assert!(rows[0].id.parse::<u64>().unwrap() < rows[1].id.parse::<u64>().unwrap());
}

#[test]
fn child_rows_are_validated_against_the_child_fields() {
    let (db, parent_id) = setup();

    let err = db
        .add_child(
            "invoice",
            &parent_id,
            "lines",
            BTreeMap::from([("qty".to_string(), Value::Int(1))]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingRequiredField { field }) if field == "sku"
    ));

    let err = db
        .add_child(
            "invoice",
            &parent_id,
            "lines",
            BTreeMap::from([("sku".to_string(), Value::from("x")), ("nope".to_string(), Value::Null)]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownColumn { column }) if column == "nope"
    ));
}

#[test]
fn read_only_child_lists_reject_writes() {
    let (db, parent_id) = setup();

    let err = db
        .add_child("invoice", &parent_id, "audit", BTreeMap::new())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Store(StoreError::ReadOnlyChild { child }) if child == "audit"
    ));
}

#[test]
fn adding_to_a_missing_parent_fails() {
    let (db, _) = setup();

    assert!(matches!(
        db.add_child("invoice", "ghost", "lines", line("a", 1)).unwrap_err(),
        Error::Store(StoreError::NotFound { .. })
    ));
}

#[test]
fn unknown_child_lists_are_rejected() {
    let (db, parent_id) = setup();

    assert!(matches!(
        db.children("invoice", &parent_id, "nope").unwrap_err(),
        Error::UnknownChild { child, .. } if child == "nope"
    ));
}

#[test]
fn child_rows_can_be_deleted() {
    let (db, parent_id) = setup();

    let row = db.add_child("invoice", &parent_id, "lines", line("a-1", 2)).unwrap();
    db.delete_child("invoice", "lines", &row.id).unwrap();

    assert!(db.children("invoice", &parent_id, "lines").unwrap().is_empty());
}
