//! entrydb — a typed schema model and engine for record/entry-oriented
//! data.
//!
//! ## Crate layout
//! - `schema`: field types, values, coercion/validation, type builders,
//!   hooks, actions, settings.
//! - `core`: the engine — storage boundary, id generation, the save and
//!   delete pipelines, the list/report/count query surface, and the
//!   edit log.
//!
//! The `prelude` module mirrors the surface application code uses to
//! declare types and talk to a [`Database`](core::db::Database).

pub use entrydb_core as core;
pub use entrydb_schema as schema;

pub mod prelude {
    pub use entrydb_core::prelude::*;
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    // the facade surface is enough to declare a type and store a record
    #[test]
    fn facade_round_trip() {
        let mut db = Database::in_memory();
        db.register(
            EntryType::builder("note")
                .field(FieldDefinition::new("body", FieldType::LongText).required())
                .build()
                .unwrap(),
        )
        .unwrap();

        let record = db
            .create(
                "note",
                [("body".to_string(), Value::from("hello"))].into(),
                &UserSession::system(),
            )
            .unwrap();

        assert_eq!(db.get("note", &record.id).unwrap().unwrap(), record);
    }
}
