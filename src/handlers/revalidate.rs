use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use tracing::error;

use crate::{
    schema::{RevalidateRequest, RevalidateResponse},
    GlobalState,
};

async fn revalidate_path(data: &GlobalState, path: Option<String>) -> HttpResponse {
    let path = path.filter(|path| !path.is_empty()).unwrap_or_else(|| "/".to_string());

    match data.revalidator.revalidate(&path).await {
        Ok(()) => HttpResponse::Ok().json(RevalidateResponse {
            revalidated: true,
            now: Utc::now().timestamp_millis(),
            path,
            error: None,
        }),
        Err(err) => {
            error!(path = %path, error = %err, "Error revalidating");
            HttpResponse::InternalServerError().json(RevalidateResponse {
                revalidated: false,
                now: Utc::now().timestamp_millis(),
                path,
                error: Some(err.to_string()),
            })
        }
    }
}

/// `GET /api/revalidate?path=/courses`
pub async fn revalidate_get(data: web::Data<GlobalState>, query: web::Query<RevalidateRequest>) -> impl Responder {
    revalidate_path(&data, query.into_inner().path).await
}

/// `POST /api/revalidate` with `{"path": "/courses"}`; an empty body means `/`.
pub async fn revalidate_post(data: web::Data<GlobalState>, body: Option<web::Json<RevalidateRequest>>) -> impl Responder {
    let path = body.and_then(|body| body.into_inner().path);
    revalidate_path(&data, path).await
}
