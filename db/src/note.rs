use std::sync::Arc;

use async_trait::async_trait;
use common::error::{AppError, Res};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    dtos::note::{NoteCreateRequest, NoteUpdateRequest},
    models::note::Note,
};

/// Notes are only ever addressed together with their owner, so a note that
/// belongs to someone else looks exactly like a missing one.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Newest first.
    async fn list_by_owner(&self, user_id: Uuid) -> Res<Vec<Note>>;

    async fn insert(&self, data: NoteCreateRequest) -> Res<Note>;

    async fn update_owned(&self, data: NoteUpdateRequest) -> Res<Option<Note>>;

    /// Returns whether a note was removed.
    async fn delete_owned(&self, note_id: Uuid, user_id: Uuid) -> Res<bool>;
}

pub async fn get_notes_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Vec<Note>> {
    sqlx::query_as::<_, Note>(
        "SELECT * FROM notes WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_note<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: NoteCreateRequest,
) -> Res<Note> {
    sqlx::query_as::<_, Note>(
        r#"
        INSERT INTO notes (user_id, title, content)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(&data.title)
    .bind(&data.content)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_note<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: NoteUpdateRequest,
) -> Res<Option<Note>> {
    sqlx::query_as::<_, Note>(
        r#"
        UPDATE notes
        SET title = $3, content = $4, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(data.note_id)
    .bind(data.user_id)
    .bind(&data.title)
    .bind(&data.content)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn delete_note<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    note_id: Uuid,
    user_id: Uuid,
) -> Res<bool> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
        .bind(note_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub struct PgNoteStore {
    pool: Arc<PgPool>,
}

impl PgNoteStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgNoteStore { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn list_by_owner(&self, user_id: Uuid) -> Res<Vec<Note>> {
        get_notes_by_user_id(&*self.pool, user_id).await
    }

    async fn insert(&self, data: NoteCreateRequest) -> Res<Note> {
        insert_note(&*self.pool, data).await
    }

    async fn update_owned(&self, data: NoteUpdateRequest) -> Res<Option<Note>> {
        update_note(&*self.pool, data).await
    }

    async fn delete_owned(&self, note_id: Uuid, user_id: Uuid) -> Res<bool> {
        delete_note(&*self.pool, note_id, user_id).await
    }
}
