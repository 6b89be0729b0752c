use actix_web::{Responder, delete, get, post, put, web};
use common::{
    error::Res,
    http::{MessageResponse, Success},
};
use db::models::user::User;

use crate::{
    dtos::note::{NoteEnvelope, NoteInput, NotesResponse},
    services::note::NoteService,
};

/// Lists the caller's notes, newest first.
///
/// # Output
/// - Success: `{ notes: [{ id, title, content, createdAt, updatedAt }] }`
/// - Error: 401 without a valid bearer token
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/notes', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('token')}` }
/// });
/// const { notes } = await response.json();
/// ```
#[get("")]
pub async fn get_notes(
    user: web::ReqData<User>,
    notes: web::Data<NoteService>,
) -> Res<impl Responder> {
    let notes = notes.list(user.id).await?;
    Success::ok(NotesResponse { notes })
}

/// Creates a note. Both `title` and `content` must be non-blank.
#[post("")]
pub async fn post_note(
    user: web::ReqData<User>,
    notes: web::Data<NoteService>,
    req: web::Json<NoteInput>,
) -> Res<impl Responder> {
    let note = notes.create(user.id, req.into_inner()).await?;
    Success::created(NoteEnvelope { note })
}

/// Replaces title and content of one of the caller's notes.
///
/// # Output
/// - Success: `{ note }`
/// - Error: 400 for blank fields, 404 when the note is missing or not the caller's
#[put("/{id}")]
pub async fn put_note(
    user: web::ReqData<User>,
    notes: web::Data<NoteService>,
    path: web::Path<String>,
    req: web::Json<NoteInput>,
) -> Res<impl Responder> {
    let note = notes.update(user.id, &path, req.into_inner()).await?;
    Success::ok(NoteEnvelope { note })
}

#[delete("/{id}")]
pub async fn delete_note(
    user: web::ReqData<User>,
    notes: web::Data<NoteService>,
    path: web::Path<String>,
) -> Res<impl Responder> {
    notes.delete(user.id, &path).await?;
    Success::ok(MessageResponse::new("Note deleted successfully"))
}
