use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub avatar: Option<String>,
    pub is_email_verified: bool,
    pub otp: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where an email sits in the signup flow. Absence of a record is `None`
/// at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupState {
    PendingVerification,
    Active,
}

impl User {
    pub fn signup_state(&self) -> SignupState {
        if self.is_email_verified {
            SignupState::Active
        } else {
            SignupState::PendingVerification
        }
    }

    pub fn is_active(&self) -> bool {
        self.signup_state() == SignupState::Active
    }

    /// True when this is a pending signup holding `code` and the code has not expired.
    pub fn accepts_otp(&self, code: &str, now: DateTime<Utc>) -> bool {
        if self.is_active() {
            return false;
        }
        match (&self.otp, self.otp_expiry) {
            (Some(stored), Some(expiry)) => expiry > now && constant_time_eq(stored, code),
            _ => false,
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
