//! In-process stores used for development without Postgres and by tests.
//!
//! They enforce the same uniqueness rules as the database indices.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use common::error::{AppError, Res};
use uuid::Uuid;

use crate::{
    dtos::{
        note::{NoteCreateRequest, NoteUpdateRequest},
        user::{
            ActivationRequest, GoogleLinkRequest, GoogleUserCreateRequest, PendingSignupRequest,
        },
    },
    models::{note::Note, user::User},
    note::NoteStore,
    user::UserStore,
};

fn lock<T>(mutex: &Mutex<T>) -> Res<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("In-memory store lock poisoned".to_string()))
}

/// Postgres keeps microseconds; match it so timestamps compare equal after a round trip.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn email_taken() -> AppError {
    AppError::Conflict("User already exists with this email".to_string())
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, pending ones included.
    pub fn len(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves a stored code expiry, letting tests age a pending signup.
    pub fn set_otp_expiry(&self, email: &str, expiry: DateTime<Utc>) -> Res<()> {
        let mut users = lock(&self.users)?;
        let user = users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.otp_expiry = Some(expiry);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, user_id: Uuid) -> Res<Option<User>> {
        Ok(lock(&self.users)?.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Res<Option<User>> {
        Ok(lock(&self.users)?.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_email_or_google_id(
        &self,
        email: &str,
        google_id: &str,
    ) -> Res<Option<User>> {
        let users = lock(&self.users)?;
        let linked = users
            .iter()
            .find(|u| u.google_id.as_deref() == Some(google_id));
        Ok(linked
            .or_else(|| users.iter().find(|u| u.email == email))
            .cloned())
    }

    async fn upsert_pending(&self, data: PendingSignupRequest) -> Res<User> {
        let mut users = lock(&self.users)?;
        let now = now();

        if let Some(existing) = users.iter_mut().find(|u| u.email == data.email) {
            if existing.is_active() {
                return Err(email_taken());
            }
            existing.name = data.name;
            existing.otp = Some(data.otp);
            existing.otp_expiry = Some(data.otp_expiry);
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            name: data.name,
            password_hash: None,
            google_id: None,
            avatar: None,
            is_email_verified: false,
            otp: Some(data.otp),
            otp_expiry: Some(data.otp_expiry),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn delete_pending(&self, user_id: Uuid) -> Res<()> {
        lock(&self.users)?.retain(|u| !(u.id == user_id && !u.is_active()));
        Ok(())
    }

    async fn activate(&self, data: ActivationRequest) -> Res<Option<User>> {
        let mut users = lock(&self.users)?;
        let Some(user) = users
            .iter_mut()
            .find(|u| u.id == data.user_id && u.accepts_otp(&data.otp, data.now))
        else {
            return Ok(None);
        };

        user.password_hash = Some(data.password_hash);
        user.is_email_verified = true;
        user.otp = None;
        user.otp_expiry = None;
        user.updated_at = now();
        Ok(Some(user.clone()))
    }

    async fn link_google(&self, data: GoogleLinkRequest) -> Res<User> {
        let mut users = lock(&self.users)?;
        if users
            .iter()
            .any(|u| u.id != data.user_id && u.google_id.as_deref() == Some(&data.google_id))
        {
            return Err(email_taken());
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == data.user_id)
            .ok_or_else(|| AppError::Internal("Linked user disappeared".to_string()))?;
        user.google_id = Some(data.google_id);
        if data.avatar.is_some() {
            user.avatar = data.avatar;
        }
        user.is_email_verified = true;
        user.otp = None;
        user.otp_expiry = None;
        user.updated_at = now();
        Ok(user.clone())
    }

    async fn insert_google_user(&self, data: GoogleUserCreateRequest) -> Res<User> {
        let mut users = lock(&self.users)?;
        if users
            .iter()
            .any(|u| u.email == data.email || u.google_id.as_deref() == Some(&data.google_id))
        {
            return Err(email_taken());
        }

        let now = now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            name: data.name,
            password_hash: None,
            google_id: Some(data.google_id),
            avatar: data.avatar,
            is_email_verified: true,
            otp: None,
            otp_expiry: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryNoteStore {
    notes: Mutex<Vec<Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.lock().map(|notes| notes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list_by_owner(&self, user_id: Uuid) -> Res<Vec<Note>> {
        let notes = lock(&self.notes)?;
        // reversed insertion order breaks timestamp ties newest first
        let mut owned: Vec<Note> = notes
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn insert(&self, data: NoteCreateRequest) -> Res<Note> {
        let now = now();
        let note = Note {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            title: data.title,
            content: data.content,
            created_at: now,
            updated_at: now,
        };
        lock(&self.notes)?.push(note.clone());
        Ok(note)
    }

    async fn update_owned(&self, data: NoteUpdateRequest) -> Res<Option<Note>> {
        let mut notes = lock(&self.notes)?;
        let Some(note) = notes
            .iter_mut()
            .find(|n| n.id == data.note_id && n.user_id == data.user_id)
        else {
            return Ok(None);
        };
        note.title = data.title;
        note.content = data.content;
        note.updated_at = now();
        Ok(Some(note.clone()))
    }

    async fn delete_owned(&self, note_id: Uuid, user_id: Uuid) -> Res<bool> {
        let mut notes = lock(&self.notes)?;
        let before = notes.len();
        notes.retain(|n| !(n.id == note_id && n.user_id == user_id));
        Ok(notes.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending(email: &str, otp: &str) -> PendingSignupRequest {
        PendingSignupRequest {
            email: email.to_string(),
            name: "Ada".to_string(),
            otp: otp.to_string(),
            otp_expiry: Utc::now() + Duration::minutes(10),
        }
    }

    #[tokio::test]
    async fn test_repeated_pending_signup_keeps_one_record() {
        let store = MemoryUserStore::new();
        let first = store.upsert_pending(pending("ada@example.com", "111111")).await.unwrap();
        let second = store.upsert_pending(pending("ada@example.com", "222222")).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(second.otp.as_deref(), Some("222222"));
    }

    #[tokio::test]
    async fn test_pending_signup_conflicts_with_active_user() {
        let store = MemoryUserStore::new();
        store
            .insert_google_user(GoogleUserCreateRequest {
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
                google_id: "sub-1".to_string(),
                avatar: None,
            })
            .await
            .unwrap();

        let result = store.upsert_pending(pending("ada@example.com", "111111")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_activate_requires_current_code() {
        let store = MemoryUserStore::new();
        let user = store.upsert_pending(pending("ada@example.com", "111111")).await.unwrap();
        store.upsert_pending(pending("ada@example.com", "222222")).await.unwrap();

        let stale = store
            .activate(ActivationRequest {
                user_id: user.id,
                otp: "111111".to_string(),
                password_hash: "hash".to_string(),
                now: Utc::now(),
            })
            .await
            .unwrap();
        assert!(stale.is_none());

        let active = store
            .activate(ActivationRequest {
                user_id: user.id,
                otp: "222222".to_string(),
                password_hash: "hash".to_string(),
                now: Utc::now(),
            })
            .await
            .unwrap()
            .unwrap();
        assert!(active.is_email_verified);
        assert!(active.otp.is_none() && active.otp_expiry.is_none());
    }

    #[tokio::test]
    async fn test_delete_pending_leaves_active_users() {
        let store = MemoryUserStore::new();
        let user = store
            .insert_google_user(GoogleUserCreateRequest {
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
                google_id: "sub-1".to_string(),
                avatar: None,
            })
            .await
            .unwrap();

        store.delete_pending(user.id).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_notes_are_scoped_to_owner() {
        let store = MemoryNoteStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let note = store
            .insert(NoteCreateRequest {
                user_id: alice,
                title: "t".to_string(),
                content: "c".to_string(),
            })
            .await
            .unwrap();

        assert!(store.list_by_owner(bob).await.unwrap().is_empty());
        assert!(!store.delete_owned(note.id, bob).await.unwrap());
        assert!(store.delete_owned(note.id, alice).await.unwrap());
        assert!(store.is_empty());
    }
}
