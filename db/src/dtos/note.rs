use uuid::Uuid;

pub struct NoteCreateRequest {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
}

pub struct NoteUpdateRequest {
    pub note_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
}
