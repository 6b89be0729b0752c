use actix_web::web;

pub mod routes {
    pub mod note;
}
pub mod services {
    pub mod note;
}
pub mod dtos {
    pub mod note;
}

pub use services::note::NoteService;

/// Notes of the authenticated caller. Wrap the scope with
/// `api_auth::auth_middleware()`; handlers read the resolved user.
pub fn mount_notes() -> actix_web::Scope {
    web::scope("/notes")
        .service(routes::note::get_notes)
        .service(routes::note::post_note)
        .service(routes::note::put_note)
        .service(routes::note::delete_note)
}
