use actix_web::{HttpRequest, HttpResponse, Responder, error::JsonPayloadError, web};
use serde::Serialize;

use crate::error::{AppError, Res};

pub struct Success;
impl Success {
    pub fn created<T: Serialize>(body: T) -> Res<impl Responder> {
        Result::Ok(HttpResponse::Created().json(body))
    }
    pub fn ok<T: Serialize>(body: T) -> Res<impl Responder> {
        Result::Ok(HttpResponse::Ok().json(body))
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// JSON extractor config that answers malformed bodies with `{message}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        let message = match &err {
            JsonPayloadError::ContentType => "Expected a JSON request body".to_string(),
            JsonPayloadError::Deserialize(e) => format!("Invalid request body: {}", e),
            other => format!("Invalid request body: {}", other),
        };
        AppError::Validation(message).into()
    })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> HttpResponse {
    AppError::NotFound("Route not found".to_string()).to_http_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{
        App,
        http::StatusCode,
        test::{TestRequest, call_service, init_service, read_body_json},
    };

    #[actix_web::test]
    async fn test_unknown_route_returns_json_404() {
        let app =
            init_service(App::new().default_service(web::route().to(not_found))).await;
        let req = TestRequest::get().uri("/nope").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = read_body_json(resp).await;
        assert_eq!(body["message"], "Route not found");
    }

    #[test]
    fn test_message_response_serializes() {
        let json = serde_json::to_value(MessageResponse::new("OTP sent successfully")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "OTP sent successfully" }));
    }
}
