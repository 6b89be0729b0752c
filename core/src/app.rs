use actix_web::{Responder, get, web};
use common::{
    error::Res,
    http::{MessageResponse, Success},
};

/// Registers every route. `dev_routes` enables development-only endpoints.
pub fn configure(cfg: &mut web::ServiceConfig, dev_routes: bool) {
    cfg.service(get_health).service(
        web::scope("/api")
            .service(api_auth::mount_auth(dev_routes))
            .service(api_notes::mount_notes().wrap(api_auth::auth_middleware())),
    );
}

#[get("/")]
async fn get_health() -> Res<impl Responder> {
    Success::ok(MessageResponse::new("NoteTaking API is running!"))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use actix_web::{
        App,
        http::{StatusCode, header},
        test,
    };
    use api_auth::AuthService;
    use api_notes::NoteService;
    use argon2::{Algorithm, Argon2, Params, Version};
    use common::{env_config::Config, google::GoogleVerifier, http, mailer::LogMailer};
    use db::memory::{MemoryNoteStore, MemoryUserStore};
    use serde_json::{Value, json};

    use super::*;

    macro_rules! app {
        () => {{
            let config = Config::for_tests();
            let verifier = GoogleVerifier::new(&config.google, Duration::from_secs(1)).unwrap();
            let params = Params::new(1024, 1, 1, None).unwrap();
            let auth = AuthService::with_hasher(
                Arc::new(MemoryUserStore::new()),
                Arc::new(LogMailer),
                Arc::new(verifier),
                config,
                Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            )
            .unwrap();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(auth))
                    .app_data(web::Data::new(NoteService::new(Arc::new(
                        MemoryNoteStore::new(),
                    ))))
                    .app_data(http::json_config())
                    .wrap(logger::middleware())
                    .configure(|cfg| configure(cfg, true))
                    .default_service(web::route().to(http::not_found)),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_health_and_fallback() {
        let app = app!();

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "NoteTaking API is running!" }));

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/api/nothing").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Route not found" }));
    }

    #[actix_web::test]
    async fn test_signup_then_take_notes() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/auth/test-otp")
            .set_json(json!({ "email": "ada@example.com", "name": "Ada" }))
            .to_request();
        let issued: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/verify-otp")
            .set_json(json!({
                "email": "ada@example.com",
                "otp": issued["otp"],
                "password": "hunter22"
            }))
            .to_request();
        let signed_up: Value = test::call_and_read_body_json(&app, req).await;
        let bearer = format!("Bearer {}", signed_up["token"].as_str().unwrap());

        let req = test::TestRequest::post()
            .uri("/api/notes")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "title": "first", "content": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri("/api/notes")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed["notes"][0]["title"], "first");

        let req = test::TestRequest::get()
            .uri("/api/auth/curruser")
            .insert_header((header::AUTHORIZATION, bearer))
            .to_request();
        let current: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(current["user"]["id"], signed_up["user"]["id"]);
        assert_eq!(current["user"]["name"], "Ada");
    }
}
