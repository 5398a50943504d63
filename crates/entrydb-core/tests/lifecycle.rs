//! End-to-end save/delete pipeline behavior against the in-memory
//! backend.

use entrydb_core::prelude::*;
use std::collections::BTreeMap;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

fn task_type() -> EntryType {
    EntryType::builder("task")
        .label("Task")
        .title_field("title")
        .edit_log()
        .field(FieldDefinition::new("title", FieldType::Text).required().in_list())
        .field(FieldDefinition::new("priority", FieldType::Int).default_value(Value::Int(3)))
        .field(FieldDefinition::new("slug", FieldType::Text).unique())
        .field(FieldDefinition::new("kind", FieldType::Text).read_only())
        .build()
        .unwrap()
}

fn values(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn db_with(entry_type: EntryType) -> Database {
    let mut db = Database::in_memory();
    db.register(entry_type).unwrap();
    db
}

#[test]
fn create_applies_defaults_and_stamps_timestamps() {
    let db = db_with(task_type());

    let record = db
        .create("task", values(&[("title", Value::from("write docs"))]), &UserSession::system())
        .unwrap();

    assert!(!record.id.is_empty());
    assert_eq!(record.get("priority"), &Value::Int(3));
    assert!(record.created_at > 0);
    assert_eq!(record.created_at, record.updated_at);
}

#[test]
fn create_rejects_undeclared_keys() {
    let db = db_with(task_type());

    let err = db
        .create(
            "task",
            values(&[("title", Value::from("x")), ("bogus", Value::from("y"))]),
            &UserSession::system(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownColumn { column }) if column == "bogus"
    ));
}

#[test]
fn create_rejects_missing_required_field() {
    let db = db_with(task_type());

    let err = db
        .create("task", BTreeMap::new(), &UserSession::system())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingRequiredField { field }) if field == "title"
    ));
}

#[test]
fn hooks_run_in_registration_order() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let trace = |tag: &'static str, order: &Arc<std::sync::Mutex<Vec<&'static str>>>| {
        let order = Arc::clone(order);
        Hook::new(move |_| {
            order.lock().unwrap().push(tag);
            Ok(())
        })
    };

    let entry_type = EntryType::builder("task")
        .field(FieldDefinition::new("title", FieldType::Text))
        .hook(HookPhase::BeforeValidate, trace("before_validate", &order))
        .hook(HookPhase::Validate, trace("validate_1", &order))
        .hook(HookPhase::Validate, trace("validate_2", &order))
        .hook(HookPhase::BeforeInsert, trace("before_insert", &order))
        .hook(HookPhase::BeforeSave, trace("before_save", &order))
        .hook(HookPhase::AfterInsert, trace("after_insert", &order))
        .hook(HookPhase::AfterSave, trace("after_save", &order))
        .build()
        .unwrap();

    let db = db_with(entry_type);
    db.create("task", BTreeMap::new(), &UserSession::system())
        .unwrap();

    assert_eq!(
        *order.lock().unwrap(),
        [
            "before_validate",
            "validate_1",
            "validate_2",
            "before_insert",
            "before_save",
            "after_insert",
            "after_save",
        ]
    );
}

#[test]
fn failing_validate_hook_aborts_before_insert_phases() {
    let reached = Arc::new(AtomicUsize::new(0));
    let reached_clone = Arc::clone(&reached);

    let entry_type = EntryType::builder("task")
        .field(FieldDefinition::new("title", FieldType::Text))
        .hook(
            HookPhase::Validate,
            Hook::new(|_| Err(HookError::invalid_field("title", "always wrong"))),
        )
        .hook(
            HookPhase::BeforeInsert,
            Hook::new(move |_| {
                reached_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .build()
        .unwrap();

    let db = db_with(entry_type);
    let err = db
        .create("task", BTreeMap::new(), &UserSession::system())
        .unwrap_err();

    assert!(matches!(err, Error::Hook(HookError::Invalid { .. })));
    assert_eq!(reached.load(Ordering::SeqCst), 0);
    // nothing persisted
    assert_eq!(db.count("task", &CountOptions::new()).unwrap(), 0);
}

#[test]
fn hooks_can_rewrite_the_record_before_persist() {
    let entry_type = EntryType::builder("task")
        .field(FieldDefinition::new("title", FieldType::Text))
        .hook(
            HookPhase::BeforeSave,
            Hook::new(|record| {
                let title = record.get("title").to_string().to_uppercase();
                record.set("title", Value::Text(title));
                Ok(())
            }),
        )
        .build()
        .unwrap();

    let db = db_with(entry_type);
    let record = db
        .create("task", values(&[("title", Value::from("shout"))]), &UserSession::system())
        .unwrap();

    assert_eq!(db.get("task", &record.id).unwrap().unwrap().get("title"), &Value::from("SHOUT"));
}

#[test]
fn update_patches_and_bumps_updated_at() {
    let db = db_with(task_type());
    let record = db
        .create("task", values(&[("title", Value::from("draft"))]), &UserSession::system())
        .unwrap();

    let updated = db
        .update(
            "task",
            &record.id,
            values(&[("title", Value::from("final"))]),
            &UserSession::system(),
        )
        .unwrap();

    assert_eq!(updated.get("title"), &Value::from("final"));
    assert_eq!(updated.get("priority"), &Value::Int(3));
    assert!(updated.updated_at >= record.updated_at);
}

#[test]
fn update_rejects_read_only_fields() {
    let db = db_with(task_type());
    let record = db
        .create(
            "task",
            values(&[("title", Value::from("t")), ("kind", Value::from("bug"))]),
            &UserSession::system(),
        )
        .unwrap();

    let err = db
        .update(
            "task",
            &record.id,
            values(&[("kind", Value::from("feature"))]),
            &UserSession::system(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::ReadOnlyField { field }) if field == "kind"
    ));
}

#[test]
fn unique_fields_are_enforced_across_the_table() {
    let db = db_with(task_type());
    let session = UserSession::system();

    db.create(
        "task",
        values(&[("title", Value::from("a")), ("slug", Value::from("dup"))]),
        &session,
    )
    .unwrap();

    let err = db
        .create(
            "task",
            values(&[("title", Value::from("b")), ("slug", Value::from("dup"))]),
            &session,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::NotUnique { field, .. }) if field == "slug"
    ));

    // updating a record to its own current value is not a collision
    let second = db
        .create(
            "task",
            values(&[("title", Value::from("b")), ("slug", Value::from("other"))]),
            &session,
        )
        .unwrap();
    db.update(
        "task",
        &second.id,
        values(&[("slug", Value::from("other"))]),
        &session,
    )
    .unwrap();
}

#[test]
fn delete_removes_the_record() {
    let db = db_with(task_type());
    let session = UserSession::system();
    let record = db
        .create("task", values(&[("title", Value::from("gone"))]), &session)
        .unwrap();

    let removed = db.delete("task", &record.id, &session).unwrap();

    assert_eq!(removed.id, record.id);
    assert!(db.get("task", &record.id).unwrap().is_none());
    assert!(matches!(
        db.delete("task", &record.id, &session).unwrap_err(),
        Error::Store(StoreError::NotFound { .. })
    ));
}

#[test]
fn edit_log_records_the_full_lifecycle() {
    let db = db_with(task_type());
    let session = UserSession::system();

    let record = db
        .create("task", values(&[("title", Value::from("v1"))]), &session)
        .unwrap();
    db.update(
        "task",
        &record.id,
        values(&[("title", Value::from("v2"))]),
        &session,
    )
    .unwrap();
    db.delete("task", &record.id, &session).unwrap();

    let log = db.edit_log("task", &record.id).unwrap();
    let actions: Vec<EditAction> = log.iter().map(|e| e.action).collect();
    assert_eq!(actions, [EditAction::Create, EditAction::Update, EditAction::Delete]);

    // the update entry carries a per-field before/after diff
    let diff = &log[1].edit_data["title"];
    assert_eq!(diff["from"], serde_json::json!("v1"));
    assert_eq!(diff["to"], serde_json::json!("v2"));

    // title field drives the logged entry title
    assert_eq!(log[0].entry_title, "v1");
    assert_eq!(log[0].user, "system");
}

#[test]
fn no_op_update_writes_no_edit_log_entry() {
    let db = db_with(task_type());
    let session = UserSession::system();

    let record = db
        .create("task", values(&[("title", Value::from("same"))]), &session)
        .unwrap();
    db.update(
        "task",
        &record.id,
        values(&[("title", Value::from("same"))]),
        &session,
    )
    .unwrap();

    let log = db.edit_log("task", &record.id).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, EditAction::Create);
}

#[test]
fn types_without_edit_log_stay_silent() {
    let entry_type = EntryType::builder("scratch")
        .field(FieldDefinition::new("note", FieldType::Text))
        .build()
        .unwrap();
    let db = db_with(entry_type);

    let record = db
        .create("scratch", values(&[("note", Value::from("x"))]), &UserSession::system())
        .unwrap();

    assert!(db.edit_log("scratch", &record.id).unwrap().is_empty());
}

#[test]
fn unknown_type_names_are_rejected_up_front() {
    let db = Database::in_memory();

    assert!(matches!(
        db.create("ghost", BTreeMap::new(), &UserSession::system()).unwrap_err(),
        Error::UnknownEntryType(name) if name == "ghost"
    ));
}

#[test]
fn duplicate_registration_fails() {
    let mut db = Database::in_memory();
    db.register(task_type()).unwrap();

    assert!(matches!(
        db.register(task_type()).unwrap_err(),
        Error::DuplicateType(name) if name == "task"
    ));
}
