use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use common::{
    env_config::Config,
    error::{AppError, Res},
    google::{IdentityError, IdentityVerifier},
    jwt,
    mailer::{MailSender, OtpMail},
};
use db::{
    dtos::user::{
        ActivationRequest, GoogleLinkRequest, GoogleUserCreateRequest, PendingSignupRequest,
    },
    models::user::User,
    user::UserStore,
};

use crate::{
    dtos::auth::{
        AuthResponse, GoogleAuthRequest, LoginRequest, PublicUser, SendOtpRequest,
        TestOtpResponse, VerifyOtpRequest,
    },
    services::otp::generate_otp,
};

pub const MSG_OTP_SENT: &str = "OTP sent successfully";
const MSG_TEST_OTP: &str = "OTP generated successfully (development mode)";
const MSG_SIGNUP: &str = "Signup successful";
const MSG_LOGIN: &str = "Login successful";
const MSG_GOOGLE: &str = "Google authentication successful";
const MSG_TOKEN_INVALID: &str = "Token is not valid";
const MSG_INVALID_GOOGLE_TOKEN: &str = "Invalid Google token";

/// Drives the signup, login and Google sign-in flows.
///
/// Per email the account moves from no record, to a pending signup holding a
/// code, to an active user. Only active users ever receive a token.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn MailSender>,
    identity: Arc<dyn IdentityVerifier>,
    config: Arc<Config>,
    hasher: Argon2<'static>,
    /// Verified against when no stored hash exists, so unknown accounts are
    /// rejected at the same cost as wrong passwords.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn MailSender>,
        identity: Arc<dyn IdentityVerifier>,
        config: Arc<Config>,
    ) -> Res<Self> {
        Self::with_hasher(users, mailer, identity, config, Argon2::default())
    }

    /// Same as `new` with explicit argon2 parameters.
    pub fn with_hasher(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn MailSender>,
        identity: Arc<dyn IdentityVerifier>,
        config: Arc<Config>,
        hasher: Argon2<'static>,
    ) -> Res<Self> {
        let dummy_hash = hash_password(&hasher, "no-such-account")?;
        Ok(AuthService {
            users,
            mailer,
            identity,
            config,
            hasher,
            dummy_hash,
        })
    }

    /// Stores a pending signup and mails its code. The pending record is
    /// removed again when the mail cannot be delivered.
    pub async fn request_signup_otp(&self, request: SendOtpRequest) -> Res<()> {
        let (user, code) = self.store_pending_signup(request).await?;

        let mail = OtpMail {
            to_email: &user.email,
            to_name: &user.name,
            code: &code,
            expires_in_minutes: self.config.otp_ttl_minutes,
        };
        if let Err(e) = self.mailer.send_otp(mail).await {
            log::error!("Failed to send OTP email to {}: {}", user.email, e);
            if let Err(e) = self.users.delete_pending(user.id).await {
                log::error!("Failed to roll back pending signup {}: {}", user.id, e);
            }
            return Err(AppError::Delivery("Failed to send OTP email".to_string()));
        }

        log::info!("Signup OTP sent to {}", user.email);
        Ok(())
    }

    /// Development variant of `request_signup_otp` that returns the code
    /// instead of mailing it.
    pub async fn issue_test_otp(&self, request: SendOtpRequest) -> Res<TestOtpResponse> {
        let (user, code) = self.store_pending_signup(request).await?;
        log::debug!("Issued development OTP for {}", user.email);
        Ok(TestOtpResponse {
            message: MSG_TEST_OTP.to_string(),
            otp: code,
            user_id: user.id,
        })
    }

    async fn store_pending_signup(&self, request: SendOtpRequest) -> Res<(User, String)> {
        let (Some(email), Some(name)) = (normalize_email(request.email), required(request.name))
        else {
            return Err(AppError::Validation(
                "Email and name are required".to_string(),
            ));
        };

        if let Some(existing) = self.users.find_by_email(&email).await? {
            if existing.is_active() {
                return Err(AppError::Conflict(
                    "User already exists with this email".to_string(),
                ));
            }
        }

        let code = generate_otp();
        let user = self
            .users
            .upsert_pending(PendingSignupRequest {
                email,
                name,
                otp: code.clone(),
                otp_expiry: Utc::now() + Duration::minutes(self.config.otp_ttl_minutes),
            })
            .await?;
        Ok((user, code))
    }

    /// Activates a pending signup whose unexpired code matches. Every kind of
    /// mismatch fails with the same `InvalidOrExpiredOtp`.
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> Res<AuthResponse> {
        let (Some(email), Some(otp), Some(password)) = (
            normalize_email(request.email),
            required(request.otp),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Email, OTP, and password are required".to_string(),
            ));
        };

        let now = Utc::now();
        let pending = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|user| user.accepts_otp(&otp, now))
            .ok_or(AppError::InvalidOrExpiredOtp)?;

        let password_hash = hash_password(&self.hasher, &password)?;

        // the store re-checks the code, so a concurrent re-request wins
        let user = self
            .users
            .activate(ActivationRequest {
                user_id: pending.id,
                otp,
                password_hash,
                now,
            })
            .await?
            .ok_or(AppError::InvalidOrExpiredOtp)?;

        log::info!("User {} verified email {}", user.id, user.email);
        self.authenticated(&user, MSG_SIGNUP)
    }

    pub async fn login(&self, request: LoginRequest) -> Res<AuthResponse> {
        let (Some(email), Some(password)) = (
            normalize_email(request.email),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        };

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(User::is_active);
        let stored_hash = user.as_ref().and_then(|u| u.password_hash.as_deref());
        let has_hash = stored_hash.is_some();
        let is_valid = self.verify_password(&password, stored_hash.unwrap_or(&self.dummy_hash));

        match user {
            Some(user) if is_valid && has_hash => {
                log::info!("User {} logged in", user.id);
                self.authenticated(&user, MSG_LOGIN)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    /// Signs in with a Google ID token, linking or creating the account.
    pub async fn google_auth(&self, request: GoogleAuthRequest) -> Res<AuthResponse> {
        let Some(credential) = required(request.credential) else {
            return Err(AppError::Validation(
                "Google credential is required".to_string(),
            ));
        };

        let identity = self
            .identity
            .verify(&credential)
            .await
            .map_err(|e| match e {
                IdentityError::Rejected(reason) => {
                    log::info!("Google credential rejected: {}", reason);
                    AppError::InvalidIdentityCredential(MSG_INVALID_GOOGLE_TOKEN.to_string())
                }
                IdentityError::Unavailable(reason) => {
                    AppError::Internal(format!("Google token verification failed: {}", reason))
                }
            })?;

        let (Some(google_id), Some(email), Some(name)) = (
            identity.subject,
            normalize_email(identity.email),
            identity.name,
        ) else {
            return Err(AppError::InvalidIdentityCredential(
                "Google ID, email, and name are required".to_string(),
            ));
        };

        let user = match self
            .users
            .find_by_email_or_google_id(&email, &google_id)
            .await?
        {
            // an existing link is never replaced
            Some(user) if user.google_id.is_some() => user,
            Some(user) => {
                let user = self
                    .users
                    .link_google(GoogleLinkRequest {
                        user_id: user.id,
                        google_id,
                        avatar: identity.picture,
                    })
                    .await?;
                log::info!("Linked Google account to user {}", user.id);
                user
            }
            None => {
                let user = self
                    .users
                    .insert_google_user(GoogleUserCreateRequest {
                        email,
                        name,
                        google_id,
                        avatar: identity.picture,
                    })
                    .await?;
                log::info!("Created user {} from Google sign-in", user.id);
                user
            }
        };

        self.authenticated(&user, MSG_GOOGLE)
    }

    /// Maps a bearer token to the live, active user it was issued for.
    pub async fn resolve_current_user(&self, token: &str) -> Res<User> {
        let claims = jwt::validate_jwt(token, &self.config.jwt_config.secret)?;
        self.users
            .find_by_id(claims.user_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| AppError::Unauthenticated(MSG_TOKEN_INVALID.to_string()))
    }

    fn authenticated(&self, user: &User, message: &str) -> Res<AuthResponse> {
        let token = jwt::generate_jwt(user.id, &self.config.jwt_config)?;
        Ok(AuthResponse {
            message: message.to_string(),
            token,
            user: PublicUser::from(user),
        })
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .hasher
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                log::warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }
}

fn hash_password(hasher: &Argon2<'static>, password: &str) -> Res<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Trimmed value, `None` when absent or blank.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_email(value: Option<String>) -> Option<String> {
    required(value).map(|email| email.to_lowercase())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use argon2::{Algorithm, Params, Version};
    use async_trait::async_trait;
    use common::{
        env_config::JwtConfig,
        google::VerifiedIdentity,
        mailer::MailError,
    };
    use db::memory::MemoryUserStore;

    use super::*;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingMailer {
        fn failing() -> Self {
            RecordingMailer {
                fail: true,
                ..Default::default()
            }
        }

        fn last_code(&self) -> String {
            self.sent.lock().unwrap().last().unwrap().1.clone()
        }

        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MailSender for RecordingMailer {
        async fn send_otp(&self, mail: OtpMail<'_>) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((mail.to_email.to_string(), mail.code.to_string()));
            Ok(())
        }
    }

    enum FakeVerifier {
        Accepts(VerifiedIdentity),
        Rejects,
        Down,
    }

    #[async_trait]
    impl IdentityVerifier for FakeVerifier {
        async fn verify(&self, _credential: &str) -> Result<VerifiedIdentity, IdentityError> {
            match self {
                FakeVerifier::Accepts(identity) => Ok(identity.clone()),
                FakeVerifier::Rejects => Err(IdentityError::Rejected("bad signature".to_string())),
                FakeVerifier::Down => Err(IdentityError::Unavailable("timeout".to_string())),
            }
        }
    }

    fn google_identity(subject: &str, email: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            subject: Some(subject.to_string()),
            email: Some(email.to_string()),
            name: Some("Grace".to_string()),
            picture: Some("https://example.com/grace.png".to_string()),
        }
    }

    struct Harness {
        service: AuthService,
        users: Arc<MemoryUserStore>,
        mailer: Arc<RecordingMailer>,
    }

    fn harness_with(mailer: RecordingMailer, verifier: FakeVerifier) -> Harness {
        let users = Arc::new(MemoryUserStore::new());
        let mailer = Arc::new(mailer);
        let service = service_on(users.clone(), mailer.clone(), verifier);
        Harness {
            service,
            users,
            mailer,
        }
    }

    fn service_on(
        users: Arc<MemoryUserStore>,
        mailer: Arc<RecordingMailer>,
        verifier: FakeVerifier,
    ) -> AuthService {
        let params = Params::new(1024, 1, 1, None).unwrap();
        AuthService::with_hasher(
            users,
            mailer,
            Arc::new(verifier),
            Config::for_tests(),
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        )
        .unwrap()
    }

    fn harness() -> Harness {
        harness_with(RecordingMailer::default(), FakeVerifier::Rejects)
    }

    fn signup(email: &str) -> SendOtpRequest {
        SendOtpRequest {
            email: Some(email.to_string()),
            name: Some("Ada".to_string()),
        }
    }

    fn verify(email: &str, otp: &str) -> VerifyOtpRequest {
        VerifyOtpRequest {
            email: Some(email.to_string()),
            otp: Some(otp.to_string()),
            password: Some("hunter22".to_string()),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    async fn active_user(h: &Harness, email: &str) -> AuthResponse {
        h.service.request_signup_otp(signup(email)).await.unwrap();
        let code = h.mailer.last_code();
        h.service.verify_otp(verify(email, &code)).await.unwrap()
    }

    #[tokio::test]
    async fn test_signup_creates_one_pending_record_and_one_mail() {
        let h = harness();
        h.service
            .request_signup_otp(signup("ada@example.com"))
            .await
            .unwrap();

        assert_eq!(h.users.len(), 1);
        assert_eq!(h.mailer.count(), 1);
        let user = h.users.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert!(!user.is_email_verified);
        assert_eq!(user.otp.as_deref(), Some(h.mailer.last_code().as_str()));
    }

    #[tokio::test]
    async fn test_signup_requires_email_and_name() {
        let h = harness();
        let result = h
            .service
            .request_signup_otp(SendOtpRequest {
                email: Some("ada@example.com".to_string()),
                name: Some("   ".to_string()),
            })
            .await;

        match result {
            Err(AppError::Validation(message)) => {
                assert_eq!(message, "Email and name are required")
            }
            other => panic!("expected validation error, got {:?}", other.err()),
        }
        assert!(h.users.is_empty());
    }

    #[tokio::test]
    async fn test_signup_for_active_email_conflicts() {
        let h = harness();
        active_user(&h, "ada@example.com").await;

        let result = h.service.request_signup_otp(signup("ada@example.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_failed_delivery_rolls_back_pending_record() {
        let h = harness_with(RecordingMailer::failing(), FakeVerifier::Rejects);
        let result = h.service.request_signup_otp(signup("ada@example.com")).await;

        assert!(matches!(result, Err(AppError::Delivery(_))));
        assert!(h.users.is_empty());
    }

    #[tokio::test]
    async fn test_resending_replaces_previous_code() {
        let h = harness();
        h.service.request_signup_otp(signup("ada@example.com")).await.unwrap();
        let first = h.mailer.last_code();
        h.service.request_signup_otp(signup("ada@example.com")).await.unwrap();
        let second = h.mailer.last_code();

        assert_eq!(h.users.len(), 1);
        if first != second {
            let result = h.service.verify_otp(verify("ada@example.com", &first)).await;
            assert!(matches!(result, Err(AppError::InvalidOrExpiredOtp)));
        }
        assert!(h.service.verify_otp(verify("ada@example.com", &second)).await.is_ok());
    }

    #[tokio::test]
    async fn test_verify_activates_and_token_resolves_to_user() {
        let h = harness();
        let response = active_user(&h, "ada@example.com").await;

        assert_eq!(response.message, "Signup successful");
        assert!(response.user.is_email_verified);

        let stored = h.users.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert!(stored.otp.is_none() && stored.otp_expiry.is_none());
        assert!(stored.password_hash.as_deref().unwrap().starts_with("$argon2id$"));

        let resolved = h.service.resolve_current_user(&response.token).await.unwrap();
        assert_eq!(resolved.id, response.user.id);
    }

    #[tokio::test]
    async fn test_verify_failures_are_indistinguishable() {
        let h = harness();
        h.service.request_signup_otp(signup("ada@example.com")).await.unwrap();
        let code = h.mailer.last_code();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        let wrong_code = h.service.verify_otp(verify("ada@example.com", wrong)).await;
        let unknown = h.service.verify_otp(verify("bob@example.com", &code)).await;

        h.users
            .set_otp_expiry("ada@example.com", Utc::now() - Duration::minutes(1))
            .unwrap();
        let expired = h.service.verify_otp(verify("ada@example.com", &code)).await;

        for result in [wrong_code, unknown, expired] {
            assert!(matches!(result, Err(AppError::InvalidOrExpiredOtp)));
        }
    }

    #[tokio::test]
    async fn test_verify_twice_fails_the_second_time() {
        let h = harness();
        h.service.request_signup_otp(signup("ada@example.com")).await.unwrap();
        let code = h.mailer.last_code();
        h.service.verify_otp(verify("ada@example.com", &code)).await.unwrap();

        let again = h.service.verify_otp(verify("ada@example.com", &code)).await;
        assert!(matches!(again, Err(AppError::InvalidOrExpiredOtp)));
    }

    #[tokio::test]
    async fn test_email_is_normalised() {
        let h = harness();
        h.service
            .request_signup_otp(signup("  Ada@Example.COM "))
            .await
            .unwrap();
        let code = h.mailer.last_code();
        let response = h
            .service
            .verify_otp(verify("ada@example.com", &code))
            .await
            .unwrap();
        assert_eq!(response.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_login_succeeds_with_correct_password() {
        let h = harness();
        let signed_up = active_user(&h, "ada@example.com").await;

        let response = h.service.login(login("ada@example.com", "hunter22")).await.unwrap();
        assert_eq!(response.message, "Login successful");
        assert_eq!(response.user.id, signed_up.user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let h = harness();
        active_user(&h, "ada@example.com").await;
        h.service.request_signup_otp(signup("pending@example.com")).await.unwrap();

        let wrong_password = h.service.login(login("ada@example.com", "nope")).await;
        let unknown = h.service.login(login("bob@example.com", "hunter22")).await;
        let pending = h.service.login(login("pending@example.com", "hunter22")).await;

        for result in [wrong_password, unknown, pending] {
            assert!(matches!(result, Err(AppError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn test_google_sign_in_creates_verified_user_once() {
        let h = harness_with(
            RecordingMailer::default(),
            FakeVerifier::Accepts(google_identity("sub-1", "grace@example.com")),
        );
        let request = || GoogleAuthRequest {
            credential: Some("id-token".to_string()),
        };

        let first = h.service.google_auth(request()).await.unwrap();
        let before = h.users.find_by_id(first.user.id).await.unwrap().unwrap();
        let second = h.service.google_auth(request()).await.unwrap();
        let after = h.users.find_by_id(first.user.id).await.unwrap().unwrap();

        assert_eq!(first.message, "Google authentication successful");
        assert!(first.user.is_email_verified);
        assert_eq!(first.user.id, second.user.id);
        assert_eq!(h.users.len(), 1);
        assert_eq!(before.updated_at, after.updated_at);
        assert!(after.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_google_sign_in_links_pending_signup() {
        let h = harness_with(
            RecordingMailer::default(),
            FakeVerifier::Accepts(google_identity("sub-1", "ada@example.com")),
        );
        h.service.request_signup_otp(signup("ada@example.com")).await.unwrap();

        let response = h
            .service
            .google_auth(GoogleAuthRequest {
                credential: Some("id-token".to_string()),
            })
            .await
            .unwrap();

        let stored = h.users.find_by_id(response.user.id).await.unwrap().unwrap();
        assert_eq!(h.users.len(), 1);
        assert!(stored.is_email_verified);
        assert_eq!(stored.google_id.as_deref(), Some("sub-1"));
        assert!(stored.otp.is_none() && stored.otp_expiry.is_none());
        assert_eq!(stored.avatar.as_deref(), Some("https://example.com/grace.png"));
    }

    #[tokio::test]
    async fn test_google_sign_in_links_active_password_account() {
        let h = harness_with(
            RecordingMailer::default(),
            FakeVerifier::Accepts(google_identity("sub-1", "ada@example.com")),
        );
        let signed_up = active_user(&h, "ada@example.com").await;

        let response = h
            .service
            .google_auth(GoogleAuthRequest {
                credential: Some("id-token".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(response.user.id, signed_up.user.id);
        let stored = h.users.find_by_id(signed_up.user.id).await.unwrap().unwrap();
        assert_eq!(stored.google_id.as_deref(), Some("sub-1"));
        assert!(stored.password_hash.is_some());
        assert!(h.service.login(login("ada@example.com", "hunter22")).await.is_ok());
    }

    #[tokio::test]
    async fn test_google_sign_in_keeps_existing_link() {
        let h = harness_with(
            RecordingMailer::default(),
            FakeVerifier::Accepts(google_identity("sub-1", "grace@example.com")),
        );
        let request = || GoogleAuthRequest {
            credential: Some("id-token".to_string()),
        };
        let first = h.service.google_auth(request()).await.unwrap();
        let before = h.users.find_by_id(first.user.id).await.unwrap().unwrap();

        let other_subject = service_on(
            h.users.clone(),
            h.mailer.clone(),
            FakeVerifier::Accepts(google_identity("sub-2", "grace@example.com")),
        );
        let second = other_subject.google_auth(request()).await.unwrap();
        let after = h.users.find_by_id(first.user.id).await.unwrap().unwrap();

        assert_eq!(second.user.id, first.user.id);
        assert_eq!(h.users.len(), 1);
        assert_eq!(after.google_id.as_deref(), Some("sub-1"));
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_google_credential_failures() {
        let request = || GoogleAuthRequest {
            credential: Some("id-token".to_string()),
        };

        let rejected = harness_with(RecordingMailer::default(), FakeVerifier::Rejects)
            .service
            .google_auth(request())
            .await;
        match rejected {
            Err(AppError::InvalidIdentityCredential(message)) => {
                assert_eq!(message, "Invalid Google token")
            }
            other => panic!("expected invalid credential, got {:?}", other.err()),
        }

        let mut partial = google_identity("sub-1", "grace@example.com");
        partial.name = None;
        let incomplete = harness_with(RecordingMailer::default(), FakeVerifier::Accepts(partial))
            .service
            .google_auth(request())
            .await;
        assert!(matches!(
            incomplete,
            Err(AppError::InvalidIdentityCredential(_))
        ));

        let down = harness_with(RecordingMailer::default(), FakeVerifier::Down)
            .service
            .google_auth(request())
            .await;
        assert!(matches!(down, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthenticated() {
        let h = harness();
        let response = active_user(&h, "ada@example.com").await;

        let expired = jwt::generate_jwt(
            response.user.id,
            &JwtConfig {
                secret: "test-secret".to_string(),
                expiration_hours: -1,
            },
        )
        .unwrap();

        let result = h.service.resolve_current_user(&expired).await;
        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_token_for_missing_user_is_unauthenticated() {
        let h = harness();
        let token =
            jwt::generate_jwt(uuid::Uuid::new_v4(), &Config::for_tests().jwt_config).unwrap();

        let result = h.service.resolve_current_user(&token).await;
        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }
}
