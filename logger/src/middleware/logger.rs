use std::rc::Rc;
use std::time::Instant;

use actix_web::body::{self, BoxBody, MessageBody};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    error::ErrorInternalServerError,
};
use colored::Colorize;
use db::models::user::User;
use futures::future::{LocalBoxFuture, Ready, ready};
use log::{debug, info};
use serde_json::Value;

/// Logs one line per request: status, method, path, elapsed time and the
/// authenticated user when there is one. Error bodies are logged at debug
/// level. Request bodies are never logged since they carry passwords.
pub struct LoggerMiddleware {}

impl LoggerMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for LoggerMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().to_string();
        let path = req.path().to_string();
        let query_string = req.query_string().to_string();
        let started = Instant::now();
        let srv = Rc::clone(&self.service);

        Box::pin(async move {
            let res = srv.call(req).await?.map_into_boxed_body();

            let status = res.status();
            let status_code = status.as_u16();
            let elapsed_ms = started.elapsed().as_millis();
            // set by the auth middleware further in
            let user_id = res
                .request()
                .extensions()
                .get::<User>()
                .map(|user| user.id.to_string());

            let colored_status = match status_code {
                200..=299 => status_code.to_string().green(),
                300..=399 => status_code.to_string().yellow(),
                400..=499 => status_code.to_string().bright_red(),
                _ => status_code.to_string().red(),
            };
            let colored_method = match method.as_str() {
                "GET" => method.blue(),
                "POST" => method.yellow(),
                "PUT" => method.purple(),
                "DELETE" => method.red(),
                _ => method.normal(),
            };
            let target = if query_string.is_empty() {
                path
            } else {
                format!("{}?{}", path, query_string)
            };

            info!(
                "[{}] {} {} {} user_id={}",
                colored_status,
                colored_method,
                target.bright_white(),
                format!("({}ms)", elapsed_ms).bright_black(),
                user_id.unwrap_or_else(|| "None".to_string()).bright_blue(),
            );

            if status_code < 400 || !log::log_enabled!(log::Level::Debug) {
                return Ok(res);
            }

            // Copy the error body and rebuild the response around it
            let (req, res) = res.into_parts();
            let headers = res.headers().clone();
            let body_bytes = body::to_bytes(res.into_body())
                .await
                .map_err(ErrorInternalServerError)?;
            let response_body = serde_json::from_slice::<Value>(&body_bytes).unwrap_or(Value::Null);
            debug!(
                "  Response: {}",
                serde_json::to_string(&response_body)
                    .unwrap_or_default()
                    .bright_yellow()
            );

            let mut new_res = HttpResponse::build(status);
            for (key, value) in headers.iter() {
                new_res.insert_header((key.clone(), value.clone()));
            }
            Ok(ServiceResponse::new(req, new_res.body(body_bytes)))
        })
    }
}
