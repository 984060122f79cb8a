//! The table store behind the data access layer.
//!
//! Unlike the functions in [`crate::models`], everything here reports failures and keeps
//! "no such row" (`Ok(None)`) apart from "the store failed" (`Err`).

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::models::{Entity, Record};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Courses,
    Instructors,
    Testimonials,
}

impl Collection {
    pub fn table(self) -> &'static str {
        match self {
            Collection::Courses => "courses",
            Collection::Instructors => "instructors",
            Collection::Testimonials => "testimonials",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Ties in either order go to the most recently inserted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    /// `created_at` descending.
    Newest,
    /// Ascending by the entity's label column (`title` or `name`).
    Label,
}

impl OrderBy {
    pub(crate) fn clause<F: Entity>(self) -> String {
        match self {
            OrderBy::Newest => "created_at DESC, seq DESC".to_string(),
            OrderBy::Label => format!("{} ASC, seq DESC", F::LABEL_COLUMN),
        }
    }

    /// Sorts records that arrive newest-inserted first; both sorts are stable.
    pub(crate) fn sort<F: Entity>(self, records: &mut [Record<F>]) {
        match self {
            OrderBy::Newest => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            OrderBy::Label => records.sort_by(|a, b| a.label().cmp(b.label())),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is unreachable")]
    Unavailable,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed {collection} row: {source}")]
    Malformed {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(Arc<MemoryStore>),
}

impl Store {
    pub fn memory() -> (Self, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::new());
        (Store::Memory(memory.clone()), memory)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }

    pub async fn list<F: Entity>(&self, order: OrderBy) -> Result<Vec<Record<F>>, StoreError> {
        match self {
            Store::Postgres(pg) => pg.list(order).await,
            Store::Memory(memory) => memory.list(order),
        }
    }

    pub async fn list_where<F: Entity>(
        &self,
        column: &'static str,
        value: &str,
        order: OrderBy,
    ) -> Result<Vec<Record<F>>, StoreError> {
        match self {
            Store::Postgres(pg) => pg.list_where(column, value, order).await,
            Store::Memory(memory) => memory.list_where(column, value, order),
        }
    }

    pub async fn get<F: Entity>(&self, id: &str) -> Result<Option<Record<F>>, StoreError> {
        match self {
            Store::Postgres(pg) => pg.get(id).await,
            Store::Memory(memory) => memory.get(id),
        }
    }

    pub async fn insert<F: Entity>(&self, fields: F) -> Result<Record<F>, StoreError> {
        match self {
            Store::Postgres(pg) => pg.insert(fields).await,
            Store::Memory(memory) => memory.insert(fields),
        }
    }

    pub async fn replace<F: Entity>(&self, id: &str, fields: F) -> Result<Option<Record<F>>, StoreError> {
        match self {
            Store::Postgres(pg) => pg.replace(id, fields).await,
            Store::Memory(memory) => memory.replace(id, fields),
        }
    }

    /// Deleting an id that does not exist succeeds.
    pub async fn delete<F: Entity>(&self, id: &str) -> Result<(), StoreError> {
        match self {
            Store::Postgres(pg) => pg.delete::<F>(id).await,
            Store::Memory(memory) => memory.delete::<F>(id),
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Store::Postgres(pg) => pg.ping().await,
            Store::Memory(memory) => memory.ping(),
        }
    }
}
