use serde::{Deserialize, Serialize};

use crate::store::{Collection, OrderBy, Store};

use super::{blank_to_none, nullable, set, Entity, Record, RecordQuery};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseFields {
    pub title: String,
    pub description: String,
    /// Free text, e.g. "6 Weeks".
    pub duration: String,
    /// Not enforced: the instructor may no longer exist.
    pub instructor_id: String,
    pub image_url: String,
    #[serde(default)]
    pub registration_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub instructor_id: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub registration_link: Option<Option<String>>,
}

pub type Course = Record<CourseFields>;

impl Entity for CourseFields {
    type Patch = CoursePatch;

    const COLLECTION: Collection = Collection::Courses;
    const LABEL_COLUMN: &'static str = "title";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "duration",
        "instructor_id",
        "image_url",
        "registration_link",
    ];

    fn label(&self) -> &str {
        &self.title
    }

    fn apply(&mut self, patch: CoursePatch) {
        set(&mut self.title, patch.title);
        set(&mut self.description, patch.description);
        set(&mut self.duration, patch.duration);
        set(&mut self.instructor_id, patch.instructor_id);
        set(&mut self.image_url, patch.image_url);
        set(&mut self.registration_link, patch.registration_link);
    }

    fn bind<'q>(&self, query: RecordQuery<'q, Self>) -> RecordQuery<'q, Self> {
        query
            .bind(self.title.clone())
            .bind(self.description.clone())
            .bind(self.duration.clone())
            .bind(self.instructor_id.clone())
            .bind(self.image_url.clone())
            .bind(self.registration_link.clone())
    }

    fn normalized(self) -> Self {
        Self {
            registration_link: blank_to_none(self.registration_link),
            ..self
        }
    }
}

pub async fn get_all_courses(store: &Store) -> Vec<Course> {
    super::list(store, OrderBy::Newest).await
}

pub async fn get_courses_by_instructor(store: &Store, instructor_id: &str) -> Vec<Course> {
    super::list_where(store, "instructor_id", instructor_id, OrderBy::Newest).await
}

pub async fn get_course_by_id(store: &Store, id: &str) -> Option<Course> {
    super::get_by_id(store, id).await
}

pub async fn create_course(store: &Store, course: CourseFields) -> Option<Course> {
    super::create(store, course).await
}

pub async fn update_course(store: &Store, id: &str, patch: CoursePatch) -> Option<Course> {
    super::update::<CourseFields>(store, id, patch).await
}

pub async fn delete_course(store: &Store, id: &str) -> bool {
    super::delete::<CourseFields>(store, id).await
}
