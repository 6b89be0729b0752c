//! Google ID token verification.
//!
//! The token is handed to Google's `tokeninfo` endpoint, which checks the
//! signature and expiry. The audience and issuer are then checked locally.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::env_config::GoogleConfig;

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Error, Debug)]
pub enum IdentityError {
    /// The provider refused the credential or it was issued for someone else.
    #[error("credential rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or answered garbage.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Profile fields taken from a verified credential. Presence of each field
/// is checked by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifiedIdentity {
    pub subject: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    iss: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl TokenInfo {
    fn into_identity(self, client_id: &str) -> Result<VerifiedIdentity, IdentityError> {
        if self.aud.as_deref() != Some(client_id) {
            return Err(IdentityError::Rejected("audience mismatch".to_string()));
        }
        match self.iss.as_deref() {
            Some(iss) if GOOGLE_ISSUERS.contains(&iss) => {}
            _ => return Err(IdentityError::Rejected("unexpected issuer".to_string())),
        }

        Ok(VerifiedIdentity {
            subject: non_empty(self.sub),
            email: non_empty(self.email),
            name: non_empty(self.name),
            picture: non_empty(self.picture),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleVerifier {
    pub fn new(config: &GoogleConfig, timeout: Duration) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(GoogleVerifier {
            client,
            client_id: config.client_id.clone(),
            tokeninfo_url: config.tokeninfo_url.clone(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Failed to reach Google: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(IdentityError::Rejected(format!(
                "Google returned status {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(IdentityError::Unavailable(format!(
                "Google returned status {}",
                status
            )));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            IdentityError::Unavailable(format!("Failed to parse Google token info: {}", e))
        })?;

        info.into_identity(&self.client_id)
    }
}
