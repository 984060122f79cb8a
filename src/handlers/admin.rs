use actix_web::{get, post, web::{self, Json, ReqData}, HttpResponse};

use crate::{
    auth::{AuthError, Session},
    controller::AdminError,
    schema::{DeleteQuery, MessageResponse, PasswordForm, SigninResponse},
    workspace::AdminEntity,
    GlobalState,
};

#[post("/admin/login")]
pub async fn login(data: web::Data<GlobalState>, form: Json<PasswordForm>) -> Result<HttpResponse, AuthError> {
    let grant = data.auth.login(&form.password)?;
    data.admin.open(&grant.session);

    Ok(HttpResponse::Ok().json(SigninResponse {
        message: String::from("Signed in successfully"),
        token: grant.token,
    }))
}

#[post("/logout")]
pub async fn logout(data: web::Data<GlobalState>, session: ReqData<Session>) -> HttpResponse {
    data.auth.logout(&session);
    data.admin.close(&session);

    HttpResponse::Ok().json(MessageResponse { message: String::from("Signed out") })
}

#[get("/dashboard")]
pub async fn dashboard(data: web::Data<GlobalState>, session: ReqData<Session>) -> Result<HttpResponse, AdminError> {
    let summary = data.admin.dashboard(&session).await?;
    Ok(HttpResponse::Ok().json(summary))
}

async fn list<F: AdminEntity>(data: web::Data<GlobalState>, session: ReqData<Session>) -> Result<HttpResponse, AdminError> {
    let records = data.admin.list::<F>(&session)?;
    Ok(HttpResponse::Ok().json(records))
}

async fn edit<F: AdminEntity>(
    data: web::Data<GlobalState>,
    session: ReqData<Session>,
    path: web::Path<String>,
) -> Result<HttpResponse, AdminError> {
    let record = data.admin.edit::<F>(&session, &path).await?;
    Ok(HttpResponse::Ok().json(record))
}

async fn create<F: AdminEntity>(
    data: web::Data<GlobalState>,
    session: ReqData<Session>,
    fields: Json<F>,
) -> Result<HttpResponse, AdminError> {
    let outcome = data.admin.create(&session, fields.into_inner()).await?;
    Ok(HttpResponse::Created().json(outcome))
}

async fn update<F: AdminEntity>(
    data: web::Data<GlobalState>,
    session: ReqData<Session>,
    path: web::Path<String>,
    patch: Json<F::Patch>,
) -> Result<HttpResponse, AdminError> {
    let outcome = data.admin.update::<F>(&session, &path, patch.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

async fn delete<F: AdminEntity>(
    data: web::Data<GlobalState>,
    session: ReqData<Session>,
    path: web::Path<String>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse, AdminError> {
    let outcome = data.admin.delete::<F>(&session, &path, query.confirm).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// `/{collection}` and `/{collection}/{id}` for one entity kind.
pub fn entity_routes<F: AdminEntity>(cfg: &mut web::ServiceConfig) {
    let collection = F::COLLECTION.table();

    cfg.service(
        web::resource(format!("/{collection}"))
            .route(web::get().to(list::<F>))
            .route(web::post().to(create::<F>)),
    )
    .service(
        web::resource(format!("/{collection}/{{id}}"))
            .route(web::get().to(edit::<F>))
            .route(web::put().to(update::<F>))
            .route(web::delete().to(delete::<F>)),
    );
}
