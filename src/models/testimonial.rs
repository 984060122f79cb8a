use serde::{Deserialize, Serialize};

use crate::store::{Collection, OrderBy, Store};

use super::{blank_to_none, nullable, set, Entity, Record, RecordQuery};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TestimonialFields {
    pub name: String,
    pub position: String,
    pub company: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestimonialPatch {
    pub name: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
}

pub type Testimonial = Record<TestimonialFields>;

impl Entity for TestimonialFields {
    type Patch = TestimonialPatch;

    const COLLECTION: Collection = Collection::Testimonials;
    const LABEL_COLUMN: &'static str = "name";
    const COLUMNS: &'static [&'static str] = &["name", "position", "company", "content", "image_url"];

    fn label(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, patch: TestimonialPatch) {
        set(&mut self.name, patch.name);
        set(&mut self.position, patch.position);
        set(&mut self.company, patch.company);
        set(&mut self.content, patch.content);
        set(&mut self.image_url, patch.image_url);
    }

    fn bind<'q>(&self, query: RecordQuery<'q, Self>) -> RecordQuery<'q, Self> {
        query
            .bind(self.name.clone())
            .bind(self.position.clone())
            .bind(self.company.clone())
            .bind(self.content.clone())
            .bind(self.image_url.clone())
    }

    fn normalized(self) -> Self {
        Self {
            image_url: blank_to_none(self.image_url),
            ..self
        }
    }
}

pub async fn get_all_testimonials(store: &Store) -> Vec<Testimonial> {
    super::list(store, OrderBy::Newest).await
}

pub async fn get_testimonial_by_id(store: &Store, id: &str) -> Option<Testimonial> {
    super::get_by_id(store, id).await
}

pub async fn create_testimonial(store: &Store, testimonial: TestimonialFields) -> Option<Testimonial> {
    super::create(store, testimonial).await
}

pub async fn update_testimonial(store: &Store, id: &str, patch: TestimonialPatch) -> Option<Testimonial> {
    super::update::<TestimonialFields>(store, id, patch).await
}

pub async fn delete_testimonial(store: &Store, id: &str) -> bool {
    super::delete::<TestimonialFields>(store, id).await
}
