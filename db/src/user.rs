use std::sync::Arc;

use async_trait::async_trait;
use common::error::{AppError, Res};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    dtos::user::{
        ActivationRequest, GoogleLinkRequest, GoogleUserCreateRequest, PendingSignupRequest,
    },
    models::user::User,
};

/// Persistent user records. Uniqueness of `email` and `google_id` is the
/// store's job; a violation surfaces as `AppError::Conflict`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> Res<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Res<Option<User>>;

    /// Prefers the record already linked to `google_id` when both match.
    async fn find_by_email_or_google_id(&self, email: &str, google_id: &str)
    -> Res<Option<User>>;

    /// Inserts a pending signup, or replaces name and code of the pending
    /// record that already holds the email. Fails with `Conflict` when an
    /// active user owns the email.
    async fn upsert_pending(&self, data: PendingSignupRequest) -> Res<User>;

    /// Removes a record only while it is still pending.
    async fn delete_pending(&self, user_id: Uuid) -> Res<()>;

    /// Sets the password and marks the record verified, clearing the code.
    /// Returns `None` when the record no longer holds that unexpired code.
    async fn activate(&self, data: ActivationRequest) -> Res<Option<User>>;

    async fn link_google(&self, data: GoogleLinkRequest) -> Res<User>;

    async fn insert_google_user(&self, data: GoogleUserCreateRequest) -> Res<User>;
}

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_email_or_google_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
    google_id: &str,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE email = $1 OR google_id = $2
        ORDER BY COALESCE(google_id = $2, FALSE) DESC
        LIMIT 1
        "#,
    )
    .bind(email)
    .bind(google_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn upsert_pending_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: PendingSignupRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, otp, otp_expiry, is_email_verified)
        VALUES ($1, $2, $3, $4, FALSE)
        ON CONFLICT (email) DO UPDATE
        SET name = EXCLUDED.name,
            otp = EXCLUDED.otp,
            otp_expiry = EXCLUDED.otp_expiry,
            updated_at = now()
        WHERE users.is_email_verified = FALSE
        RETURNING *
        "#,
    )
    .bind(&data.email)
    .bind(&data.name)
    .bind(&data.otp)
    .bind(data.otp_expiry)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::Conflict("User already exists with this email".to_string()))
}

pub async fn delete_pending_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM users WHERE id = $1 AND is_email_verified = FALSE")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn activate_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ActivationRequest,
) -> Res<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET password_hash = $3,
            is_email_verified = TRUE,
            otp = NULL,
            otp_expiry = NULL,
            updated_at = now()
        WHERE id = $1
          AND otp = $2
          AND otp_expiry > $4
          AND is_email_verified = FALSE
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(&data.otp)
    .bind(&data.password_hash)
    .bind(data.now)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn link_google_account<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: GoogleLinkRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET google_id = $2,
            avatar = COALESCE($3, avatar),
            is_email_verified = TRUE,
            otp = NULL,
            otp_expiry = NULL,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(&data.google_id)
    .bind(&data.avatar)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_google_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: GoogleUserCreateRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, google_id, avatar, is_email_verified)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING *
        "#,
    )
    .bind(&data.email)
    .bind(&data.name)
    .bind(&data.google_id)
    .bind(&data.avatar)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub struct PgUserStore {
    pool: Arc<PgPool>,
}

impl PgUserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgUserStore { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, user_id: Uuid) -> Res<Option<User>> {
        get_user_by_id(&*self.pool, user_id).await
    }

    async fn find_by_email(&self, email: &str) -> Res<Option<User>> {
        get_user_by_email(&*self.pool, email).await
    }

    async fn find_by_email_or_google_id(
        &self,
        email: &str,
        google_id: &str,
    ) -> Res<Option<User>> {
        get_user_by_email_or_google_id(&*self.pool, email, google_id).await
    }

    async fn upsert_pending(&self, data: PendingSignupRequest) -> Res<User> {
        upsert_pending_user(&*self.pool, data).await
    }

    async fn delete_pending(&self, user_id: Uuid) -> Res<()> {
        delete_pending_user(&*self.pool, user_id).await
    }

    async fn activate(&self, data: ActivationRequest) -> Res<Option<User>> {
        activate_user(&*self.pool, data).await
    }

    async fn link_google(&self, data: GoogleLinkRequest) -> Res<User> {
        link_google_account(&*self.pool, data).await
    }

    async fn insert_google_user(&self, data: GoogleUserCreateRequest) -> Res<User> {
        insert_google_user(&*self.pool, data).await
    }
}
