use std::future::Future;

use actix_web::{get, http::{header::ContentType, StatusCode}, web, HttpResponse};
use tracing::{debug, warn};

use crate::{
    models::{
        course::{get_all_courses, get_course_by_id, get_courses_by_instructor},
        instructor::{get_all_instructors, get_instructor_by_id},
        testimonial::get_all_testimonials,
    },
    views::{
        render, AboutTemplate, CourseCard, CourseTemplate, CoursesTemplate, ExpertCard, ExpertTemplate,
        ExpertsTemplate, HomeTemplate, NotFoundTemplate, RenderError, TestimonialCard,
    },
    GlobalState,
};

/// A rendered page; only `Found` pages are cached.
enum Page {
    Found(String),
    Missing(String),
}

fn html(status: StatusCode, cache: &'static str, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .insert_header(("x-cache", cache))
        .body(body)
}

/// Serves the page cached under `key`, rendering it with `page` on a miss.
///
/// `key` is the canonical path built from decoded parameters, so every spelling of a
/// URL shares one entry and matches what revalidation clears.
async fn serve(
    data: &GlobalState,
    key: &str,
    page: impl Future<Output = Result<Page, RenderError>>,
) -> Result<HttpResponse, RenderError> {
    if let Some(cached) = data.cache.get(key) {
        debug!(path = key, "Page cache hit");
        return Ok(html(StatusCode::OK, "hit", cached));
    }

    match page.await? {
        Page::Found(body) => {
            // reads fail soft to empty lists; don't pin that empty page in the cache
            match data.store.ping().await {
                Ok(()) => data.cache.put(key, body.clone()),
                Err(err) => warn!(path = key, error = %err, "Store unreachable, page not cached"),
            }
            Ok(html(StatusCode::OK, "miss", body))
        }
        Page::Missing(body) => Ok(html(StatusCode::NOT_FOUND, "miss", body)),
    }
}

fn not_found(noun: &'static str, back_href: &'static str) -> Result<Page, RenderError> {
    render(&NotFoundTemplate { noun, back_href }).map(Page::Missing)
}

#[get("/")]
pub async fn home_page(data: web::Data<GlobalState>) -> Result<HttpResponse, RenderError> {
    let store = &data.store;
    serve(&data, "/", async {
        let (courses, instructors, testimonials) = futures_util::join!(
            get_all_courses(store),
            get_all_instructors(store),
            get_all_testimonials(store),
        );

        render(&HomeTemplate {
            course_count: courses.len(),
            expert_count: instructors.len(),
            featured: courses.iter().take(3).map(|course| CourseCard::new(course, &instructors)).collect(),
            experts: instructors.iter().map(ExpertCard::from).collect(),
            testimonials: testimonials.iter().map(TestimonialCard::from).collect(),
        })
        .map(Page::Found)
    })
    .await
}

#[get("/courses")]
pub async fn courses_page(data: web::Data<GlobalState>) -> Result<HttpResponse, RenderError> {
    let store = &data.store;
    serve(&data, "/courses", async {
        let (courses, instructors) = futures_util::join!(get_all_courses(store), get_all_instructors(store));

        render(&CoursesTemplate {
            courses: courses.iter().map(|course| CourseCard::new(course, &instructors)).collect(),
        })
        .map(Page::Found)
    })
    .await
}

#[get("/courses/{id}")]
pub async fn course_page(data: web::Data<GlobalState>, path: web::Path<String>) -> Result<HttpResponse, RenderError> {
    let store = &data.store;
    let id = path.into_inner();
    serve(&data, &format!("/courses/{id}"), async {
        let Some(course) = get_course_by_id(store, &id).await else {
            return not_found("course", "/courses");
        };
        let instructor = get_instructor_by_id(store, &course.instructor_id).await;
        let instructors: Vec<_> = instructor.into_iter().collect();

        render(&CourseTemplate {
            course: CourseCard::new(&course, &instructors),
            instructor: instructors.first().map(ExpertCard::from),
        })
        .map(Page::Found)
    })
    .await
}

#[get("/experts")]
pub async fn experts_page(data: web::Data<GlobalState>) -> Result<HttpResponse, RenderError> {
    let store = &data.store;
    serve(&data, "/experts", async {
        let instructors = get_all_instructors(store).await;

        render(&ExpertsTemplate {
            experts: instructors.iter().map(ExpertCard::from).collect(),
        })
        .map(Page::Found)
    })
    .await
}

#[get("/experts/{id}")]
pub async fn expert_page(data: web::Data<GlobalState>, path: web::Path<String>) -> Result<HttpResponse, RenderError> {
    let store = &data.store;
    let id = path.into_inner();
    serve(&data, &format!("/experts/{id}"), async {
        let Some(instructor) = get_instructor_by_id(store, &id).await else {
            return not_found("expert", "/experts");
        };
        let courses = get_courses_by_instructor(store, &id).await;
        let instructors = [instructor];

        render(&ExpertTemplate {
            expert: ExpertCard::from(&instructors[0]),
            courses: courses.iter().map(|course| CourseCard::new(course, &instructors)).collect(),
        })
        .map(Page::Found)
    })
    .await
}

#[get("/about")]
pub async fn about_page(data: web::Data<GlobalState>) -> Result<HttpResponse, RenderError> {
    serve(&data, "/about", async { render(&AboutTemplate).map(Page::Found) }).await
}
