use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web, Error, HttpMessage, ResponseError,
};
use tracing::debug;

use crate::{auth::AuthError, GlobalState};

/// Resolves the bearer token to an open [`Session`](crate::auth::Session) and
/// stores it in the request extensions; anything else is answered with 401.
pub async fn admin_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, Error> {
    let data = req.app_data::<web::Data<GlobalState>>().cloned();
    let Some(data) = data else {
        let res = AuthError::Internal.error_response();
        return Ok(req.into_response(res).map_into_right_body());
    };

    let token = match req.headers().get(header::AUTHORIZATION) {
        None => Err(AuthError::MissingToken),
        Some(value) => value.to_str().map_err(|_| AuthError::InvalidToken),
    };

    let session = match token.and_then(|token| data.auth.authenticate(token)) {
        Ok(session) => session,
        Err(err) => {
            debug!(path = req.path(), error = %err, "Rejected admin request");
            let res = err.error_response();
            return Ok(req.into_response(res).map_into_right_body());
        }
    };

    req.extensions_mut().insert(session);

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}
