use std::sync::Arc;

use common::error::{AppError, Res};
use db::{
    dtos::note::{NoteCreateRequest, NoteUpdateRequest},
    note::NoteStore,
};
use uuid::Uuid;

use crate::dtos::note::{NoteInput, NoteResponse};

const MSG_NOTE_NOT_FOUND: &str = "Note not found";

/// CRUD over the caller's own notes. A note owned by someone else is
/// reported exactly like a missing one.
pub struct NoteService {
    notes: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteStore>) -> Self {
        NoteService { notes }
    }

    pub async fn list(&self, user_id: Uuid) -> Res<Vec<NoteResponse>> {
        let notes = self.notes.list_by_owner(user_id).await?;
        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }

    pub async fn create(&self, user_id: Uuid, input: NoteInput) -> Res<NoteResponse> {
        let (title, content) = validate(input)?;
        let note = self
            .notes
            .insert(NoteCreateRequest {
                user_id,
                title,
                content,
            })
            .await?;
        log::debug!("User {} created note {}", user_id, note.id);
        Ok(note.into())
    }

    pub async fn update(&self, user_id: Uuid, note_id: &str, input: NoteInput) -> Res<NoteResponse> {
        let note_id = parse_note_id(note_id)?;
        let (title, content) = validate(input)?;
        self.notes
            .update_owned(NoteUpdateRequest {
                note_id,
                user_id,
                title,
                content,
            })
            .await?
            .map(NoteResponse::from)
            .ok_or_else(not_found)
    }

    pub async fn delete(&self, user_id: Uuid, note_id: &str) -> Res<()> {
        let note_id = parse_note_id(note_id)?;
        if !self.notes.delete_owned(note_id, user_id).await? {
            return Err(not_found());
        }
        log::debug!("User {} deleted note {}", user_id, note_id);
        Ok(())
    }
}

fn not_found() -> AppError {
    AppError::NotFound(MSG_NOTE_NOT_FOUND.to_string())
}

/// Ids that are not UUIDs cannot name a stored note.
fn parse_note_id(note_id: &str) -> Res<Uuid> {
    Uuid::parse_str(note_id).map_err(|_| not_found())
}

fn validate(input: NoteInput) -> Res<(String, String)> {
    let title = input.title.map(|t| t.trim().to_string()).unwrap_or_default();
    let content = input.content.unwrap_or_default();
    if title.is_empty() || content.trim().is_empty() {
        return Err(AppError::Validation(
            "Title and content are required".to_string(),
        ));
    }
    Ok((title, content))
}
