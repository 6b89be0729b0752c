use chrono::{DateTime, Utc};
use uuid::Uuid;

pub struct PendingSignupRequest {
    pub email: String,
    pub name: String,
    pub otp: String,
    pub otp_expiry: DateTime<Utc>,
}

pub struct ActivationRequest {
    pub user_id: Uuid,
    /// Code the caller verified; the update only applies while it is still stored.
    pub otp: String,
    pub password_hash: String,
    pub now: DateTime<Utc>,
}

pub struct GoogleLinkRequest {
    pub user_id: Uuid,
    pub google_id: String,
    pub avatar: Option<String>,
}

pub struct GoogleUserCreateRequest {
    pub email: String,
    pub name: String,
    pub google_id: String,
    pub avatar: Option<String>,
}
