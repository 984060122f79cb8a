//! View models and askama templates for the public site.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use askama::Template;
use thiserror::Error;
use tracing::error;

use crate::{
    errors::CustomError,
    models::{course::Course, instructor::Instructor, testimonial::Testimonial},
};

pub const COURSE_PLACEHOLDER: &str = "/placeholder.svg?height=600&width=800";
pub const INSTRUCTOR_PLACEHOLDER: &str = "/placeholder.svg?height=400&width=400";
pub const TESTIMONIAL_PLACEHOLDER: &str = "/placeholder.svg?height=100&width=100";

const UNKNOWN_INSTRUCTOR: &str = "Unknown";

#[derive(Debug, Error)]
#[error("Template rendering failed")]
pub struct RenderError(#[source] askama::Error);

impl ResponseError for RenderError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(CustomError::new(self.to_string()))
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub fn render<T: Template>(template: &T) -> Result<String, RenderError> {
    template.render().map_err(|err| {
        error!(error = %err, "Template rendering failed");
        RenderError(err)
    })
}

fn or_placeholder(url: &str, placeholder: &str) -> String {
    if url.trim().is_empty() {
        placeholder.to_string()
    } else {
        url.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct CourseCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub instructor_name: String,
    pub image_url: String,
    pub registration_link: Option<String>,
}

impl CourseCard {
    /// The instructor is looked up in `instructors`; a dangling reference shows as "Unknown".
    pub fn new(course: &Course, instructors: &[Instructor]) -> Self {
        let instructor_name = instructors
            .iter()
            .find(|instructor| instructor.id == course.instructor_id)
            .map(|instructor| instructor.name.clone())
            .unwrap_or_else(|| UNKNOWN_INSTRUCTOR.to_string());

        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            duration: course.duration.clone(),
            instructor_name,
            image_url: or_placeholder(&course.image_url, COURSE_PLACEHOLDER),
            registration_link: course.registration_link.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpertCard {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub image_url: String,
}

impl From<&Instructor> for ExpertCard {
    fn from(instructor: &Instructor) -> Self {
        Self {
            id: instructor.id.clone(),
            name: instructor.name.clone(),
            bio: instructor.bio.clone(),
            image_url: or_placeholder(&instructor.image_url, INSTRUCTOR_PLACEHOLDER),
        }
    }
}

impl ExpertCard {
    /// Bio lines as paragraphs, blank lines dropped.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.bio
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TestimonialCard {
    pub name: String,
    pub position: String,
    pub company: String,
    pub content: String,
    pub image_url: String,
}

impl From<&Testimonial> for TestimonialCard {
    fn from(testimonial: &Testimonial) -> Self {
        Self {
            name: testimonial.name.clone(),
            position: testimonial.position.clone(),
            company: testimonial.company.clone(),
            content: testimonial.content.clone(),
            image_url: or_placeholder(
                testimonial.image_url.as_deref().unwrap_or_default(),
                TESTIMONIAL_PLACEHOLDER,
            ),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub course_count: usize,
    pub expert_count: usize,
    pub featured: Vec<CourseCard>,
    pub experts: Vec<ExpertCard>,
    pub testimonials: Vec<TestimonialCard>,
}

#[derive(Template)]
#[template(path = "courses.html")]
pub struct CoursesTemplate {
    pub courses: Vec<CourseCard>,
}

#[derive(Template)]
#[template(path = "course.html")]
pub struct CourseTemplate {
    pub course: CourseCard,
    pub instructor: Option<ExpertCard>,
}

#[derive(Template)]
#[template(path = "experts.html")]
pub struct ExpertsTemplate {
    pub experts: Vec<ExpertCard>,
}

#[derive(Template)]
#[template(path = "expert.html")]
pub struct ExpertTemplate {
    pub expert: ExpertCard,
    pub courses: Vec<CourseCard>,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate;

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub noun: &'static str,
    pub back_href: &'static str,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{course::CourseFields, instructor::InstructorFields, testimonial::TestimonialFields, Record};

    fn record<F>(id: &str, fields: F) -> Record<F> {
        Record { id: id.to_string(), created_at: Utc::now(), fields }
    }

    fn course(instructor_id: &str, image_url: &str) -> Course {
        record(
            "c1",
            CourseFields {
                title: "Grid Basics".to_string(),
                description: "Load flow".to_string(),
                duration: "4 Weeks".to_string(),
                instructor_id: instructor_id.to_string(),
                image_url: image_url.to_string(),
                registration_link: None,
            },
        )
    }

    #[test]
    fn dangling_instructor_shows_unknown() {
        let instructors = vec![record(
            "i1",
            InstructorFields { name: "PK Sinha".to_string(), bio: String::new(), image_url: String::new() },
        )];

        assert_eq!(CourseCard::new(&course("i1", "/a.png"), &instructors).instructor_name, "PK Sinha");
        assert_eq!(CourseCard::new(&course("gone", "/a.png"), &instructors).instructor_name, "Unknown");
    }

    #[test]
    fn missing_images_fall_back_to_placeholders() {
        assert_eq!(CourseCard::new(&course("i1", " "), &[]).image_url, COURSE_PLACEHOLDER);

        let testimonial = record(
            "t1",
            TestimonialFields {
                name: "Ravi".to_string(),
                position: "Plant Manager".to_string(),
                company: "NTPC".to_string(),
                content: "Great".to_string(),
                image_url: None,
            },
        );
        assert_eq!(TestimonialCard::from(&testimonial).image_url, TESTIMONIAL_PLACEHOLDER);
    }

    #[test]
    fn bio_splits_into_paragraphs() {
        let expert = ExpertCard {
            id: "i1".to_string(),
            name: "PK Sinha".to_string(),
            bio: "First line.\n\n  Second line.  \n".to_string(),
            image_url: INSTRUCTOR_PLACEHOLDER.to_string(),
        };

        assert_eq!(expert.paragraphs(), vec!["First line.", "Second line."]);
    }

    #[test]
    fn empty_home_page_renders() {
        let html = render(&HomeTemplate {
            course_count: 0,
            expert_count: 0,
            featured: Vec::new(),
            experts: Vec::new(),
            testimonials: Vec::new(),
        })
        .unwrap();

        assert!(html.contains("No courses available yet."));
        assert!(html.contains("No testimonials yet."));
    }
}
