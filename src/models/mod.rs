//! Data access layer: one CRUD contract per collection.
//!
//! These functions never fail. A store error is logged and turned into an empty list,
//! `None` or `false`, so a page can always render. `get_by_id` returns `None` both when
//! no row matches and when the store failed; callers cannot tell the two apart.

use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, Postgres, Row,
};
use tracing::{debug, error};

use crate::store::{Collection, OrderBy, Store};

pub mod course;
pub mod instructor;
pub mod testimonial;

/// A stored row: generated identity plus the entity's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<F> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: F,
}

impl<F> Deref for Record<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.fields
    }
}

impl<'r, F> FromRow<'r, PgRow> for Record<F>
where
    F: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            fields: F::from_row(row)?,
        })
    }
}

pub type RecordQuery<'q, F> = QueryAs<'q, Postgres, Record<F>, PgArguments>;

/// The writable fields of one collection.
pub trait Entity:
    Clone + Send + Sync + Unpin + Serialize + DeserializeOwned + for<'r> FromRow<'r, PgRow> + 'static
{
    /// Partial update; `None` leaves a field unchanged.
    type Patch: DeserializeOwned + Send + 'static;

    const COLLECTION: Collection;
    const LABEL_COLUMN: &'static str;
    /// Writable columns, in the order `bind` pushes them.
    const COLUMNS: &'static [&'static str];

    fn label(&self) -> &str;

    fn apply(&mut self, patch: Self::Patch);

    fn bind<'q>(&self, query: RecordQuery<'q, Self>) -> RecordQuery<'q, Self>;

    /// Blank optional fields become absent.
    fn normalized(self) -> Self {
        self
    }
}

pub async fn list<F: Entity>(store: &Store, order: OrderBy) -> Vec<Record<F>> {
    match store.list::<F>(order).await {
        Ok(records) => records,
        Err(err) => {
            error!(collection = %F::COLLECTION, error = %err, "Error fetching records");
            Vec::new()
        }
    }
}

pub async fn list_where<F: Entity>(
    store: &Store,
    column: &'static str,
    value: &str,
    order: OrderBy,
) -> Vec<Record<F>> {
    match store.list_where::<F>(column, value, order).await {
        Ok(records) => records,
        Err(err) => {
            error!(collection = %F::COLLECTION, column, value, error = %err, "Error fetching records");
            Vec::new()
        }
    }
}

pub async fn get_by_id<F: Entity>(store: &Store, id: &str) -> Option<Record<F>> {
    match store.get::<F>(id).await {
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            debug!(collection = %F::COLLECTION, id, "No record with this id");
            None
        }
        Err(err) => {
            error!(collection = %F::COLLECTION, id, error = %err, "Error fetching record");
            None
        }
    }
}

pub async fn create<F: Entity>(store: &Store, fields: F) -> Option<Record<F>> {
    match store.insert(fields.normalized()).await {
        Ok(record) => Some(record),
        Err(err) => {
            error!(collection = %F::COLLECTION, error = %err, "Error creating record");
            None
        }
    }
}

/// Fields missing from `patch` keep their stored value. Concurrent updates are last-write-wins.
pub async fn update<F: Entity>(store: &Store, id: &str, patch: F::Patch) -> Option<Record<F>> {
    let mut fields = get_by_id::<F>(store, id).await?.fields;
    fields.apply(patch);

    match store.replace(id, fields.normalized()).await {
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            debug!(collection = %F::COLLECTION, id, "Record vanished before update");
            None
        }
        Err(err) => {
            error!(collection = %F::COLLECTION, id, error = %err, "Error updating record");
            None
        }
    }
}

pub async fn delete<F: Entity>(store: &Store, id: &str) -> bool {
    match store.delete::<F>(id).await {
        Ok(()) => true,
        Err(err) => {
            error!(collection = %F::COLLECTION, id, error = %err, "Error deleting record");
            false
        }
    }
}

pub(crate) fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Tells a missing key (`None`) apart from an explicit `null` (`Some(None)`).
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
