use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock,
    },
};

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    locks::{rw_read, rw_write},
    models::{Entity, Record},
};

use super::{Collection, OrderBy, StoreError};

/// Rows kept as JSON documents per collection, in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Collection, Vec<Value>>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    pub fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    pub fn list<F: Entity>(&self, order: OrderBy) -> Result<Vec<Record<F>>, StoreError> {
        self.select(|_| true, order)
    }

    pub fn list_where<F: Entity>(
        &self,
        column: &str,
        value: &str,
        order: OrderBy,
    ) -> Result<Vec<Record<F>>, StoreError> {
        self.select(|row| row.get(column).and_then(Value::as_str) == Some(value), order)
    }

    pub fn get<F: Entity>(&self, id: &str) -> Result<Option<Record<F>>, StoreError> {
        self.check()?;
        let tables = rw_read(&self.tables, "memory_store.get");

        tables
            .get(&F::COLLECTION)
            .and_then(|rows| rows.iter().find(|row| has_id(row, id)))
            .map(decode::<F>)
            .transpose()
    }

    pub fn insert<F: Entity>(&self, fields: F) -> Result<Record<F>, StoreError> {
        self.check()?;

        let record = Record {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            fields,
        };
        let row = encode(&record)?;

        rw_write(&self.tables, "memory_store.insert")
            .entry(F::COLLECTION)
            .or_default()
            .push(row);

        Ok(record)
    }

    pub fn replace<F: Entity>(&self, id: &str, fields: F) -> Result<Option<Record<F>>, StoreError> {
        self.check()?;
        let mut tables = rw_write(&self.tables, "memory_store.replace");

        let Some(row) = tables
            .get_mut(&F::COLLECTION)
            .and_then(|rows| rows.iter_mut().find(|row| has_id(row, id)))
        else {
            return Ok(None);
        };

        let current = decode::<F>(row)?;
        let record = Record {
            id: current.id,
            created_at: current.created_at,
            fields,
        };
        *row = encode(&record)?;

        Ok(Some(record))
    }

    pub fn delete<F: Entity>(&self, id: &str) -> Result<(), StoreError> {
        self.check()?;

        if let Some(rows) = rw_write(&self.tables, "memory_store.delete").get_mut(&F::COLLECTION) {
            rows.retain(|row| !has_id(row, id));
        }
        Ok(())
    }

    fn select<F: Entity>(
        &self,
        keep: impl Fn(&Value) -> bool,
        order: OrderBy,
    ) -> Result<Vec<Record<F>>, StoreError> {
        self.check()?;
        let tables = rw_read(&self.tables, "memory_store.select");

        let mut records = match tables.get(&F::COLLECTION) {
            Some(rows) => rows
                .iter()
                .rev()
                .filter(|row| keep(row))
                .map(decode::<F>)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        order.sort(&mut records);

        Ok(records)
    }
}

fn has_id(row: &Value, id: &str) -> bool {
    row.get("id").and_then(Value::as_str) == Some(id)
}

fn decode<F: Entity>(row: &Value) -> Result<Record<F>, StoreError> {
    serde_json::from_value(row.clone()).map_err(|source| StoreError::Malformed {
        collection: F::COLLECTION,
        source,
    })
}

fn encode<F: Entity>(record: &Record<F>) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|source| StoreError::Malformed {
        collection: F::COLLECTION,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{course::CourseFields, instructor::InstructorFields};

    fn course(title: &str, instructor_id: &str) -> CourseFields {
        CourseFields {
            title: title.to_string(),
            description: "desc".to_string(),
            duration: "4 Weeks".to_string(),
            instructor_id: instructor_id.to_string(),
            image_url: "/img.png".to_string(),
            registration_link: None,
        }
    }

    fn instructor(name: &str) -> InstructorFields {
        InstructorFields {
            name: name.to_string(),
            bio: "bio".to_string(),
            image_url: "/img.png".to_string(),
        }
    }

    #[test]
    fn newest_first_even_when_timestamps_tie() {
        let store = MemoryStore::new();
        let first = store.insert(course("First", "x")).unwrap();
        let second = store.insert(course("Second", "x")).unwrap();
        let third = store.insert(course("Third", "x")).unwrap();

        let ids: Vec<String> = store
            .list::<CourseFields>(OrderBy::Newest)
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect();

        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn label_order_is_alphabetical() {
        let store = MemoryStore::new();
        store.insert(instructor("Prof. James Chen")).unwrap();
        store.insert(instructor("Dr. Sarah Reynolds")).unwrap();
        store.insert(instructor("Eng. Maria Rodriguez")).unwrap();

        let names: Vec<String> = store
            .list::<InstructorFields>(OrderBy::Label)
            .unwrap()
            .into_iter()
            .map(|record| record.fields.name)
            .collect();

        assert_eq!(names, vec!["Dr. Sarah Reynolds", "Eng. Maria Rodriguez", "Prof. James Chen"]);
    }

    #[test]
    fn replace_keeps_identity_and_creation_time() {
        let store = MemoryStore::new();
        let created = store.insert(course("Grid Basics", "x")).unwrap();

        let replaced = store
            .replace(&created.id, course("Grid Advanced", "y"))
            .unwrap()
            .unwrap();

        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.created_at, created.created_at);
        assert_eq!(replaced.fields.title, "Grid Advanced");
        assert!(store.replace("missing", course("Nope", "x")).unwrap().is_none());
    }

    #[test]
    fn list_where_filters_on_a_column() {
        let store = MemoryStore::new();
        store.insert(course("A", "one")).unwrap();
        store.insert(course("B", "two")).unwrap();
        store.insert(course("C", "one")).unwrap();

        let titles: Vec<String> = store
            .list_where::<CourseFields>("instructor_id", "one", OrderBy::Newest)
            .unwrap()
            .into_iter()
            .map(|record| record.fields.title)
            .collect();

        assert_eq!(titles, vec!["C", "A"]);
    }

    #[test]
    fn delete_is_idempotent_and_scoped_to_its_collection() {
        let store = MemoryStore::new();
        let created = store.insert(course("A", "x")).unwrap();
        store.insert(instructor("Someone")).unwrap();

        store.delete::<CourseFields>(&created.id).unwrap();
        store.delete::<CourseFields>(&created.id).unwrap();

        assert!(store.get::<CourseFields>(&created.id).unwrap().is_none());
        assert_eq!(store.list::<InstructorFields>(OrderBy::Label).unwrap().len(), 1);
    }

    #[test]
    fn offline_store_fails_every_operation() {
        let store = MemoryStore::new();
        let created = store.insert(course("A", "x")).unwrap();
        store.set_offline(true);

        assert!(matches!(store.ping(), Err(StoreError::Unavailable)));
        assert!(matches!(store.list::<CourseFields>(OrderBy::Newest), Err(StoreError::Unavailable)));
        assert!(matches!(store.get::<CourseFields>(&created.id), Err(StoreError::Unavailable)));
        assert!(matches!(store.insert(course("B", "x")), Err(StoreError::Unavailable)));
        assert!(matches!(store.delete::<CourseFields>(&created.id), Err(StoreError::Unavailable)));

        store.set_offline(false);
        assert!(store.get::<CourseFields>(&created.id).unwrap().is_some());
    }
}
