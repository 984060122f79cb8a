pub mod admin;
pub mod public;
pub mod revalidate;

use actix_web::{get, middleware::from_fn, web, Responder};

use crate::{
    middlewares::admin::admin_middleware,
    models::{course::CourseFields, instructor::InstructorFields, testimonial::TestimonialFields},
};

#[get("/health")]
pub async fn health() -> impl Responder{
    "ok"
}

/// Every route of the site; shared by `main` and the test app.
pub fn configure(cfg: &mut web::ServiceConfig){
    cfg.service(
        web::scope("/api")
        .service(health)
        .service(
            web::resource("/revalidate")
            .route(web::get().to(revalidate::revalidate_get))
            .route(web::post().to(revalidate::revalidate_post))
        )
        // login must come before the guarded /admin scope, else the scope swallows it
        .service(admin::login)
        .service(
            web::scope("/admin")
            .wrap(from_fn(admin_middleware))
            .service(admin::logout)
            .service(admin::dashboard)
            .configure(admin::entity_routes::<CourseFields>)
            .configure(admin::entity_routes::<InstructorFields>)
            .configure(admin::entity_routes::<TestimonialFields>)
        )
    )
    .service(public::home_page)
    .service(public::courses_page)
    .service(public::course_page)
    .service(public::experts_page)
    .service(public::expert_page)
    .service(public::about_page);
}
