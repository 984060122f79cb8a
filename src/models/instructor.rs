use serde::{Deserialize, Serialize};

use crate::store::{Collection, OrderBy, Store};

use super::{set, Entity, Record, RecordQuery};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InstructorFields {
    pub name: String,
    /// Multi-line free text.
    pub bio: String,
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InstructorPatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

pub type Instructor = Record<InstructorFields>;

impl Entity for InstructorFields {
    type Patch = InstructorPatch;

    const COLLECTION: Collection = Collection::Instructors;
    const LABEL_COLUMN: &'static str = "name";
    const COLUMNS: &'static [&'static str] = &["name", "bio", "image_url"];

    fn label(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, patch: InstructorPatch) {
        set(&mut self.name, patch.name);
        set(&mut self.bio, patch.bio);
        set(&mut self.image_url, patch.image_url);
    }

    fn bind<'q>(&self, query: RecordQuery<'q, Self>) -> RecordQuery<'q, Self> {
        query
            .bind(self.name.clone())
            .bind(self.bio.clone())
            .bind(self.image_url.clone())
    }
}

/// Alphabetical by name.
pub async fn get_all_instructors(store: &Store) -> Vec<Instructor> {
    super::list(store, OrderBy::Label).await
}

pub async fn get_instructor_by_id(store: &Store, id: &str) -> Option<Instructor> {
    super::get_by_id(store, id).await
}

pub async fn create_instructor(store: &Store, instructor: InstructorFields) -> Option<Instructor> {
    super::create(store, instructor).await
}

pub async fn update_instructor(store: &Store, id: &str, patch: InstructorPatch) -> Option<Instructor> {
    super::update::<InstructorFields>(store, id, patch).await
}

/// Courses that reference the instructor are left untouched.
pub async fn delete_instructor(store: &Store, id: &str) -> bool {
    super::delete::<InstructorFields>(store, id).await
}
