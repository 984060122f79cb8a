//! Per-session admin state: the locally held lists and the form lifecycle of each entity kind.

use std::{collections::HashMap, future::Future};

use crate::{
    models::{
        course::{create_course, delete_course, get_course_by_id, update_course, Course, CourseFields, CoursePatch},
        instructor::{
            create_instructor, delete_instructor, get_instructor_by_id, update_instructor, Instructor,
            InstructorFields, InstructorPatch,
        },
        testimonial::{
            create_testimonial, delete_testimonial, get_testimonial_by_id, update_testimonial, Testimonial,
            TestimonialFields, TestimonialPatch,
        },
        Entity, Record,
    },
    store::{Collection, Store},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    New,
    Existing(String),
}

/// Idle → Editing → Submitting → Idle. A form that is submitting refuses a second submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Editing(FormTarget),
    Submitting(FormTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionInProgress;

#[derive(Debug, Default)]
pub struct AdminWorkspace {
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub testimonials: Vec<Testimonial>,
    forms: HashMap<Collection, FormState>,
}

impl AdminWorkspace {
    pub fn form(&self, collection: Collection) -> FormState {
        self.forms.get(&collection).cloned().unwrap_or_default()
    }

    pub fn edit(&mut self, collection: Collection, target: FormTarget) -> Result<(), SubmissionInProgress> {
        self.transition(collection, FormState::Editing(target))
    }

    pub fn submit(&mut self, collection: Collection, target: FormTarget) -> Result<(), SubmissionInProgress> {
        self.transition(collection, FormState::Submitting(target))
    }

    /// Back to Idle, whatever the submission's outcome.
    pub fn settle(&mut self, collection: Collection) {
        self.forms.insert(collection, FormState::Idle);
    }

    fn transition(&mut self, collection: Collection, next: FormState) -> Result<(), SubmissionInProgress> {
        if matches!(self.form(collection), FormState::Submitting(_)) {
            return Err(SubmissionInProgress);
        }
        self.forms.insert(collection, next);
        Ok(())
    }

    /// New records go to the front; existing ones are replaced in place.
    pub fn upsert<F: AdminEntity>(&mut self, record: Record<F>) {
        let list = F::local(self);
        match list.iter_mut().find(|existing| existing.id == record.id) {
            Some(slot) => *slot = record,
            None => list.insert(0, record),
        }
    }

    pub fn remove<F: AdminEntity>(&mut self, id: &str) -> Option<Record<F>> {
        let list = F::local(self);
        let index = list.iter().position(|record| record.id == id)?;
        Some(list.remove(index))
    }
}

/// An entity the admin workspace can manage.
pub trait AdminEntity: Entity {
    /// Lower-case name used in prompts, e.g. "course".
    const NOUN: &'static str;
    const TITLE: &'static str;

    fn local(workspace: &mut AdminWorkspace) -> &mut Vec<Record<Self>>;

    /// Public pages whose rendering depends on this record.
    fn affected_paths(id: &str, record: Option<&Record<Self>>) -> Vec<String>;

    fn fetch(store: &Store, id: &str) -> impl Future<Output = Option<Record<Self>>>;

    fn create(store: &Store, fields: Self) -> impl Future<Output = Option<Record<Self>>>;

    fn update(store: &Store, id: &str, patch: Self::Patch) -> impl Future<Output = Option<Record<Self>>>;

    fn delete(store: &Store, id: &str) -> impl Future<Output = bool>;
}

impl AdminEntity for CourseFields {
    const NOUN: &'static str = "course";
    const TITLE: &'static str = "Course";

    fn local(workspace: &mut AdminWorkspace) -> &mut Vec<Course> {
        &mut workspace.courses
    }

    fn affected_paths(id: &str, record: Option<&Course>) -> Vec<String> {
        let mut paths = vec!["/".to_string(), "/courses".to_string(), format!("/courses/{id}")];
        if let Some(course) = record {
            paths.push(format!("/experts/{}", course.instructor_id));
        }
        paths
    }

    async fn fetch(store: &Store, id: &str) -> Option<Course> {
        get_course_by_id(store, id).await
    }

    async fn create(store: &Store, fields: Self) -> Option<Course> {
        create_course(store, fields).await
    }

    async fn update(store: &Store, id: &str, patch: CoursePatch) -> Option<Course> {
        update_course(store, id, patch).await
    }

    async fn delete(store: &Store, id: &str) -> bool {
        delete_course(store, id).await
    }
}

impl AdminEntity for InstructorFields {
    const NOUN: &'static str = "instructor";
    const TITLE: &'static str = "Instructor";

    fn local(workspace: &mut AdminWorkspace) -> &mut Vec<Instructor> {
        &mut workspace.instructors
    }

    fn affected_paths(id: &str, _record: Option<&Instructor>) -> Vec<String> {
        vec![
            "/".to_string(),
            "/experts".to_string(),
            format!("/experts/{id}"),
            "/courses".to_string(),
        ]
    }

    async fn fetch(store: &Store, id: &str) -> Option<Instructor> {
        get_instructor_by_id(store, id).await
    }

    async fn create(store: &Store, fields: Self) -> Option<Instructor> {
        create_instructor(store, fields).await
    }

    async fn update(store: &Store, id: &str, patch: InstructorPatch) -> Option<Instructor> {
        update_instructor(store, id, patch).await
    }

    async fn delete(store: &Store, id: &str) -> bool {
        delete_instructor(store, id).await
    }
}

impl AdminEntity for TestimonialFields {
    const NOUN: &'static str = "testimonial";
    const TITLE: &'static str = "Testimonial";

    fn local(workspace: &mut AdminWorkspace) -> &mut Vec<Testimonial> {
        &mut workspace.testimonials
    }

    fn affected_paths(_id: &str, _record: Option<&Testimonial>) -> Vec<String> {
        vec!["/".to_string()]
    }

    async fn fetch(store: &Store, id: &str) -> Option<Testimonial> {
        get_testimonial_by_id(store, id).await
    }

    async fn create(store: &Store, fields: Self) -> Option<Testimonial> {
        create_testimonial(store, fields).await
    }

    async fn update(store: &Store, id: &str, patch: TestimonialPatch) -> Option<Testimonial> {
        update_testimonial(store, id, patch).await
    }

    async fn delete(store: &Store, id: &str) -> bool {
        delete_testimonial(store, id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn instructor(id: &str, name: &str) -> Instructor {
        Record {
            id: id.to_string(),
            created_at: Utc::now(),
            fields: InstructorFields {
                name: name.to_string(),
                bio: String::new(),
                image_url: String::new(),
            },
        }
    }

    #[test]
    fn form_lifecycle() {
        let mut workspace = AdminWorkspace::default();
        let courses = Collection::Courses;
        assert_eq!(workspace.form(courses), FormState::Idle);

        workspace.edit(courses, FormTarget::Existing("c1".to_string())).unwrap();
        assert_eq!(workspace.form(courses), FormState::Editing(FormTarget::Existing("c1".to_string())));

        workspace.submit(courses, FormTarget::Existing("c1".to_string())).unwrap();
        assert_eq!(workspace.submit(courses, FormTarget::New), Err(SubmissionInProgress));
        assert_eq!(workspace.edit(courses, FormTarget::New), Err(SubmissionInProgress));

        // other kinds are independent
        workspace.submit(Collection::Instructors, FormTarget::New).unwrap();

        workspace.settle(courses);
        assert_eq!(workspace.form(courses), FormState::Idle);
    }

    #[test]
    fn upsert_prepends_new_and_replaces_existing() {
        let mut workspace = AdminWorkspace::default();
        workspace.upsert(instructor("a", "Ada"));
        workspace.upsert(instructor("b", "Bo"));
        workspace.upsert(instructor("a", "Ada Lovelace"));

        let names: Vec<&str> = workspace.instructors.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Bo", "Ada Lovelace"]);

        let removed = workspace.remove::<InstructorFields>("b").unwrap();
        assert_eq!(removed.name, "Bo");
        assert!(workspace.remove::<InstructorFields>("b").is_none());
        assert_eq!(workspace.instructors.len(), 1);
    }

    #[test]
    fn course_paths_include_the_instructor_page_when_known() {
        assert_eq!(
            CourseFields::affected_paths("c1", None),
            vec!["/", "/courses", "/courses/c1"]
        );
    }
}
