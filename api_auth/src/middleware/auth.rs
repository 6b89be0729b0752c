use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    Error, HttpMessage,
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    web,
};
use common::{error::AppError, jwt};
use futures::future::{Ready, ok};

use crate::services::auth::AuthService;

/// Resolves the bearer token to an active user and stores it in the request
/// extensions, where handlers pick it up with `web::ReqData<User>`.
/// Requests without a usable token are answered with 401 before reaching
/// the wrapped service.
pub struct AuthMiddleware;

impl AuthMiddleware {
    pub fn new() -> Self {
        AuthMiddleware
    }
}

impl Default for AuthMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let auth = req.app_data::<web::Data<AuthService>>().cloned();
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|header| header.to_str().ok())
            .and_then(jwt::bearer_token)
            .map(str::to_string);

        Box::pin(async move {
            let Some(auth) = auth else {
                let error = AppError::Internal("AuthService is not registered".to_string());
                return Ok(req.into_response(error.to_http_response()));
            };

            // no token passed - 401
            let Some(token) = token else {
                let error = AppError::Unauthenticated("No token, authorization denied".to_string());
                return Ok(req.into_response(error.to_http_response()));
            };

            match auth.resolve_current_user(&token).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    srv.call(req).await.map(|res| res.map_into_boxed_body())
                }
                Err(error) => Ok(req.into_response(error.to_http_response())),
            }
        })
    }
}
