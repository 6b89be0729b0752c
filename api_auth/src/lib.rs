use actix_web::web;
use middleware::auth::AuthMiddleware;

pub mod routes {
    pub mod auth;
    pub mod user;
}
pub mod middleware {
    pub mod auth;
}
pub mod services {
    pub mod auth;
    pub(crate) mod otp;
}
pub mod dtos {
    pub mod auth;
}

pub use services::auth::AuthService;

/// Routes under `/auth`. `dev_routes` adds `POST /auth/test-otp`.
/// `GET /auth/curruser` carries its own auth middleware.
pub fn mount_auth(dev_routes: bool) -> actix_web::Scope {
    let scope = web::scope("/auth")
        .service(routes::auth::post_send_otp)
        .service(routes::auth::post_verify_otp)
        .service(routes::auth::post_login)
        .service(routes::auth::post_google)
        .service(
            web::resource("/curruser")
                .wrap(auth_middleware())
                .route(web::get().to(routes::user::get_current_user)),
        );

    if dev_routes {
        scope.service(routes::auth::post_test_otp)
    } else {
        scope
    }
}

// Auth middleware
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}
