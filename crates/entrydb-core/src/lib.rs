pub mod actions;
pub mod db;
pub mod error;
pub mod id;
pub mod query;
pub mod store;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        db::Database,
        error::{ActionError, Error, QueryError},
        id::IdError,
        query::{
            AdvancedFilter, Columns, CountOptions, FilterOp, FilterValue, ListOptions, ListResult,
            ReportOptions, ReportResult,
        },
        store::{MemoryStore, Storage, StoreError},
    };
    pub use entrydb_schema::prelude::*;
}
